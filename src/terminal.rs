//! Interactive terminal companion to the browser front-end.
//!
//! Drives the same page workflows against the same backend. It never plays
//! audio itself; playable chapters print their stream URL instead.

use crate::core::config::Config;
use crate::core::models::{Book, BookId, UploadFile};
use crate::core::route::Route;
use crate::services::api::{Backend, HttpBackend};
use crate::services::pages::book::{self, BookDetail, ChapterAction, StatusBadge};
use crate::services::pages::casting::{self, CastingState, AUTO_ASSIGN_LABEL};
use crate::services::pages::library::{self, DeleteOutcome};
use crate::services::pages::settings::SettingsState;
use crate::services::pages::upload::UploadForm;
use crate::services::pages::voices::group_by_locale;
use crate::services::refresh::{AutoRefresh, TickFn};
use crate::services::toast::{Notifier, ToastKind};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use inquire::list_option::ListOption;
use inquire::{Confirm, Select, Text};
use log::{debug, info};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Notify;

/// Prints notifications on stdout instead of showing toasts.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, kind: ToastKind, message: String) {
        let marker = match kind {
            ToastKind::Success => "✔",
            ToastKind::Error => "✖",
            ToastKind::Info => "ℹ",
        };
        println!("{} {}", marker, message);
    }
}

const MENU_LIBRARY: &str = "Library";
const MENU_UPLOAD: &str = "Upload a book";
const MENU_VOICES: &str = "Voices";
const MENU_SETTINGS: &str = "Settings";
const MENU_QUIT: &str = "Quit";

pub async fn run(config: Config) -> Result<()> {
    let backend = HttpBackend::new(config.clone())?;
    let notifier = ConsoleNotifier;
    info!("Using backend at {}", config.api_base_url);

    loop {
        let choice = Select::new(
            "What do you want to do?",
            vec![MENU_LIBRARY, MENU_UPLOAD, MENU_VOICES, MENU_SETTINGS, MENU_QUIT],
        )
        .prompt_skippable()?;

        let next = match choice {
            Some(MENU_LIBRARY) => library_menu(&backend, &notifier, &config).await?,
            Some(MENU_UPLOAD) => upload_menu(&backend, &notifier).await?,
            Some(MENU_VOICES) => {
                voices_menu(&backend, &notifier).await;
                None
            }
            Some(MENU_SETTINGS) => {
                settings_menu(&backend, &notifier, &config).await?;
                None
            }
            _ => break,
        };
        if let Some(route) = next {
            open_route(&backend, &notifier, &config, route).await?;
        }
    }
    Ok(())
}

async fn open_route(backend: &dyn Backend, notifier: &dyn Notifier, config: &Config, route: Route) -> Result<()> {
    debug!("Opening {}", route);
    match route {
        Route::Book(id) => book_menu(backend, notifier, config, id).await,
        Route::Casting(id) => casting_menu(backend, notifier, config, id).await,
        _ => Ok(()),
    }
}

/// Prompts with `labels` and maps the answer back by position, so two
/// identical labels still pick two different items.
fn select_item<'a, T>(prompt: &str, items: &'a [T], labels: Vec<String>) -> Result<Option<&'a T>> {
    let choice = Select::new(prompt, labels).raw_prompt_skippable()?;
    Ok(chosen(items, choice))
}

fn chosen<'a, T>(items: &'a [T], choice: Option<ListOption<String>>) -> Option<&'a T> {
    choice.and_then(|option| items.get(option.index))
}

fn book_label(book: &Book) -> String {
    format!("{} - {} [{}]", book.title, book.author, book.status)
}

async fn library_menu(backend: &dyn Backend, notifier: &dyn Notifier, config: &Config) -> Result<Option<Route>> {
    let mut page = library::LibraryPage::new();
    page.finish_loading(library::fetch_books(backend, notifier).await);
    if page.is_empty() {
        println!("No books yet. Upload one first.");
        return Ok(None);
    }

    let cards = page.cards(config);
    let labels: Vec<String> = page.books.iter().map(book_label).collect();
    Ok(select_item("Select a book:", &cards, labels)?.map(|card| card.route))
}

async fn upload_menu(backend: &dyn Backend, notifier: &dyn Notifier) -> Result<Option<Route>> {
    let Some(path) = Text::new("Path to the EPUB file:").prompt_skippable()? else {
        return Ok(None);
    };
    let file = match read_upload(Path::new(path.trim())).await {
        Ok(file) => file,
        Err(e) => {
            notifier.error(&format!("{:#}", e));
            return Ok(None);
        }
    };
    println!("Selected {} ({})", file.name, file.size_label());

    let mut form = UploadForm::new();
    form.auto_process = Confirm::new("Process automatically? (No opens casting first)")
        .with_default(true)
        .prompt()?;
    form.select(file);
    Ok(form.submit(backend, notifier).await)
}

async fn read_upload(path: &Path) -> Result<UploadFile> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(UploadFile::new(name, bytes))
}

const BOOK_REFRESH: &str = "Refresh";
const BOOK_WATCH: &str = "Watch progress";
const BOOK_PLAY: &str = "Play a chapter";
const BOOK_GENERATE: &str = "Generate a chapter";
const BOOK_GENERATE_ALL: &str = "Generate all chapters";
const BOOK_CASTING: &str = "Cast voices";
const BOOK_COVER: &str = "Upload cover";
const BOOK_DELETE: &str = "Delete book";
const BOOK_BACK: &str = "Back";

async fn book_menu(backend: &dyn Backend, notifier: &dyn Notifier, config: &Config, book_id: BookId) -> Result<()> {
    let mut detail = BookDetail::new(book_id);
    detail.refresh(backend, notifier).await;

    loop {
        if detail.not_found() {
            println!("Book not found");
            return Ok(());
        }
        print_book(&detail);

        let mut options = vec![BOOK_REFRESH, BOOK_WATCH, BOOK_PLAY, BOOK_GENERATE];
        if detail.can_generate_all() {
            options.push(BOOK_GENERATE_ALL);
        }
        options.extend([BOOK_CASTING, BOOK_COVER, BOOK_DELETE, BOOK_BACK]);

        match Select::new("Book actions:", options).prompt_skippable()? {
            Some(BOOK_REFRESH) => detail.refresh(backend, notifier).await,
            Some(BOOK_WATCH) => watch_progress(backend, notifier, config, &mut detail).await?,
            Some(BOOK_PLAY) => play_chapter(&detail, notifier, config)?,
            Some(BOOK_GENERATE) => {
                if let Some(chapter_id) = pick_chapter(&detail, |a| matches!(a, ChapterAction::Generate | ChapterAction::Play))? {
                    detail.generating = Some(chapter_id);
                    book::generate_chapter(backend, notifier, chapter_id).await;
                    detail.generating = None;
                    tokio::time::sleep(config.generation_refresh_delay()).await;
                    detail.refresh(backend, notifier).await;
                }
            }
            Some(BOOK_GENERATE_ALL) => {
                detail.batch_generating = true;
                book::generate_all(backend, notifier, &detail.chapters, config.generate_all_delay()).await;
                detail.batch_generating = false;
                detail.refresh(backend, notifier).await;
            }
            Some(BOOK_CASTING) => {
                casting_menu(backend, notifier, config, book_id).await?;
                detail.refresh(backend, notifier).await;
            }
            Some(BOOK_COVER) => {
                if let Some(path) = Text::new("Path to the cover image:").prompt_skippable()? {
                    match read_upload(Path::new(path.trim())).await {
                        Ok(file) => {
                            if book::upload_cover(backend, notifier, book_id, file).await {
                                detail.refresh(backend, notifier).await;
                            }
                        }
                        Err(e) => notifier.error(&format!("{:#}", e)),
                    }
                }
            }
            Some(BOOK_DELETE) => {
                let confirm = |message: &str| Confirm::new(message).with_default(false).prompt().unwrap_or(false);
                if library::delete_book(backend, notifier, confirm, book_id).await == DeleteOutcome::Deleted {
                    return Ok(());
                }
            }
            _ => return Ok(()),
        }
    }
}

fn print_book(detail: &BookDetail) {
    let Some(book) = &detail.book else {
        return;
    };
    println!();
    println!("{} by {} [{}]", book.title, book.author, book.status);
    match detail.ready_badge() {
        Some(badge) => println!("{} ({})", detail.progress_label(), badge),
        None => println!("{}", detail.progress_label()),
    }
    for row in detail.chapter_rows() {
        let progress = row
            .progress
            .map(|p| format!(" {:.0}%", p))
            .unwrap_or_default();
        let marker = match row.badge {
            StatusBadge::Completed => "●",
            StatusBadge::Processing => "◐",
            StatusBadge::Pending => "○",
        };
        println!("  {} {} {} [{}{}]", marker, row.position_label, row.title, row.status_label, progress);
    }
}

fn pick_chapter(detail: &BookDetail, wanted: impl Fn(&ChapterAction) -> bool) -> Result<Option<i64>> {
    let rows: Vec<_> = detail.chapter_rows().into_iter().filter(|r| wanted(&r.action)).collect();
    if rows.is_empty() {
        println!("No matching chapters.");
        return Ok(None);
    }
    let labels: Vec<String> = rows.iter().map(|r| format!("{} {}", r.position_label, r.title)).collect();
    Ok(select_item("Select a chapter:", &rows, labels)?.map(|row| row.id))
}

fn play_chapter(detail: &BookDetail, notifier: &dyn Notifier, config: &Config) -> Result<()> {
    if detail.completed_chapters().is_empty() {
        notifier.info(book::NOTHING_TO_PLAY);
        return Ok(());
    }
    if let Some(chapter_id) = pick_chapter(detail, |a| *a == ChapterAction::Play)? {
        if let Some(request) = detail.play_request(chapter_id, config) {
            println!(
                "Chapter {}: {}\n{}",
                request.chapter.position, request.chapter.title, request.audio_url
            );
        }
    }
    Ok(())
}

/// Polls the book on the refresh interval until every chapter is done or
/// the user presses Ctrl-C.
async fn watch_progress(
    backend: &dyn Backend,
    notifier: &dyn Notifier,
    config: &Config,
    detail: &mut BookDetail,
) -> Result<()> {
    let pb = ProgressBar::new(detail.chapters.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    pb.set_position(detail.completed_chapters().len() as u64);

    let wake = Arc::new(Notify::new());
    let waker = wake.clone();
    let tick: TickFn = Arc::new(move || waker.notify_one());
    let mut refresh = AutoRefresh::new(config.refresh_interval(), tick);
    refresh.set_enabled(true);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = wake.notified() => {
                detail.refresh(backend, notifier).await;
                pb.set_length(detail.chapters.len() as u64);
                pb.set_position(detail.completed_chapters().len() as u64);
                pb.set_message(format!("{:.0}%", detail.completion_percentage()));
                if !detail.chapters.is_empty() && detail.completed_chapters().len() == detail.chapters.len() {
                    break;
                }
            }
        }
    }

    refresh.set_enabled(false);
    pb.finish_with_message("done watching");
    Ok(())
}

const CAST_PICK: &str = "Assign a voice";
const CAST_LOCALE: &str = "Change voice language";
const CAST_ANALYZE: &str = "Detect characters";
const CAST_GENERATE: &str = "Start generation";

async fn casting_menu(backend: &dyn Backend, notifier: &dyn Notifier, config: &Config, book_id: BookId) -> Result<()> {
    let mut state = CastingState::new(book_id, config.default_voice_locale.clone());
    state.reload(backend, notifier).await;

    loop {
        println!();
        if state.characters.is_empty() {
            println!("No characters detected yet.");
        }
        for character in &state.characters {
            println!(
                "  {} ({}) -> {}",
                character.name,
                casting::character_subtitle(character),
                character.assigned_voice_id.as_deref().unwrap_or(AUTO_ASSIGN_LABEL)
            );
        }
        println!("Voice language: {}", state.selected_locale);

        let options = vec![CAST_PICK, CAST_LOCALE, CAST_ANALYZE, CAST_GENERATE, BOOK_BACK];
        match Select::new("Casting:", options).prompt_skippable()? {
            Some(CAST_PICK) => assign_voice(backend, notifier, &mut state).await?,
            Some(CAST_LOCALE) => {
                let locales = state.locales();
                let cursor = locales.iter().position(|l| *l == state.selected_locale).unwrap_or(0);
                if let Some(locale) = Select::new("Voice language:", locales)
                    .with_starting_cursor(cursor)
                    .prompt_skippable()?
                {
                    state.selected_locale = locale;
                }
            }
            Some(CAST_ANALYZE) => {
                if casting::request_analysis(backend, notifier, book_id).await {
                    state.analyzing = true;
                    println!("Analyzing characters...");
                    tokio::time::sleep(config.analysis_refresh_delay()).await;
                    state.reload(backend, notifier).await;
                }
            }
            Some(CAST_GENERATE) => {
                state.starting_generation = true;
                let started =
                    casting::start_full_generation(backend, notifier, book_id, config.casting_batch_delay()).await;
                state.starting_generation = false;
                if started {
                    return Ok(());
                }
            }
            _ => return Ok(()),
        }
    }
}

async fn assign_voice(backend: &dyn Backend, notifier: &dyn Notifier, state: &mut CastingState) -> Result<()> {
    let names: Vec<String> = state.characters.iter().map(|c| c.name.clone()).collect();
    if names.is_empty() {
        return Ok(());
    }
    let Some(character_id) = select_item("Character:", &state.characters, names)?.map(|c| c.id) else {
        return Ok(());
    };

    // `None` stands for auto-assign
    let mut options = vec![None];
    options.extend(state.filtered_voices().into_iter().map(Some));
    let labels: Vec<String> = options
        .iter()
        .map(|option| match option {
            Some(voice) => casting::voice_option_label(voice, false),
            None => AUTO_ASSIGN_LABEL.to_string(),
        })
        .collect();
    let Some(picked) = select_item("Voice:", &options, labels)? else {
        return Ok(());
    };
    let voice_id = picked.map(|v| v.short_name.clone()).unwrap_or_default();

    state.assign_locally(character_id, &voice_id);
    casting::persist_voice_assignment(backend, notifier, character_id, &voice_id).await;
    Ok(())
}

async fn voices_menu(backend: &dyn Backend, notifier: &dyn Notifier) {
    let Some(voices) = crate::services::pages::report(backend.list_voices().await, notifier, "Failed to load voices")
    else {
        return;
    };
    for group in group_by_locale(&voices) {
        println!("{} ({} voices)", group.locale, group.voices.len());
        for voice in &group.voices {
            println!("  {} - {}", casting::voice_option_label(voice, false), voice.short_name);
        }
    }
}

async fn settings_menu(backend: &dyn Backend, notifier: &dyn Notifier, config: &Config) -> Result<()> {
    let mut state = SettingsState::new();
    state.load(backend, notifier).await;
    if let Some(mode) = state.mode() {
        println!("{}: {}", mode.title(), mode.description());
        println!("Gemini API key: {}", state.api_key_label());
        if let Some(hint) = state.api_key_hint() {
            println!("{}", hint);
        }

        let question = format!("Switch to {}?", mode.toggled().title());
        if Confirm::new(&question).with_default(false).prompt()? {
            state.toggle_mode(backend, notifier).await;
        }
    }

    if Confirm::new("Change backend address?").with_default(false).prompt()? {
        let address = Text::new("Backend address:")
            .with_default(&config.api_base_url)
            .prompt()?;
        let updated = Config {
            api_base_url: address.trim().to_string(),
            ..config.clone()
        };
        updated.base_url()?;
        updated.save()?;
        println!("Configuration saved. Restart to use the new address.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::BookStatus;

    #[test]
    fn test_book_label() {
        let book = Book {
            id: 1,
            title: "Les Misérables".to_string(),
            author: "Victor Hugo".to_string(),
            status: BookStatus::from("processing".to_string()),
            cover_path: None,
        };
        assert_eq!(book_label(&book), "Les Misérables - Victor Hugo [PROCESSING]");
    }

    #[test]
    fn test_duplicate_labels_resolve_by_position() {
        let book = |id| Book {
            id,
            title: "novel.epub".to_string(),
            author: "Unknown".to_string(),
            status: BookStatus::Processing,
            cover_path: None,
        };
        let books = vec![book(1), book(2)];
        let labels: Vec<String> = books.iter().map(book_label).collect();
        assert_eq!(labels[0], labels[1]);

        let picked = chosen(&books, Some(ListOption::new(1, labels[1].clone())));
        assert_eq!(picked.map(|b| b.id), Some(2));
        assert_eq!(chosen(&books, None).map(|b| b.id), None);
        assert_eq!(chosen(&books, Some(ListOption::new(5, String::new()))).map(|b| b.id), None);
    }

    #[tokio::test]
    async fn test_read_upload_keeps_file_name() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("novel.epub");
        std::fs::write(&path, b"PK")?;

        let file = read_upload(&path).await?;
        assert_eq!(file.name, "novel.epub");
        assert_eq!(file.content_type(), "application/epub+zip");
        assert_eq!(file.bytes, b"PK".to_vec());
        Ok(())
    }

    #[tokio::test]
    async fn test_read_upload_missing_file() {
        let err = read_upload(Path::new("/definitely/not/here.epub")).await.unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
