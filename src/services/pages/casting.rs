use crate::core::models::{BookId, Character, CharacterId, Voice};
use crate::services::api::Backend;
use crate::services::batch::generate_sequentially;
use crate::services::pages::report;
use crate::services::toast::Notifier;
use crate::utils::time::sleep;
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::time::Duration;

pub const AUTO_ASSIGN_LABEL: &str = "Auto-assign";

/// Characters of a book plus the voice catalog to pick from.
#[derive(Debug, Clone, PartialEq)]
pub struct CastingState {
    pub book_id: BookId,
    pub characters: Vec<Character>,
    pub voices: Vec<Voice>,
    pub loading: bool,
    pub selected_locale: String,
    pub analyzing: bool,
    pub starting_generation: bool,
}

pub async fn fetch_casting(backend: &dyn Backend, book_id: BookId) -> Result<(Vec<Character>, Vec<Voice>)> {
    let characters = backend.list_characters(book_id).await?;
    let voices = backend.list_voices().await?;
    Ok((characters, voices))
}

impl CastingState {
    pub fn new(book_id: BookId, default_locale: impl Into<String>) -> Self {
        Self {
            book_id,
            characters: Vec::new(),
            voices: Vec::new(),
            loading: true,
            selected_locale: default_locale.into(),
            analyzing: false,
            starting_generation: false,
        }
    }

    pub fn apply_fetch(&mut self, result: Result<(Vec<Character>, Vec<Voice>)>, notifier: &dyn Notifier) {
        if let Some((characters, voices)) = report(result, notifier, "Failed to load data") {
            self.characters = characters;
            self.voices = voices;
            // a finished reload ends a pending analysis wait
            self.analyzing = false;
        }
        self.loading = false;
    }

    pub async fn reload(&mut self, backend: &dyn Backend, notifier: &dyn Notifier) {
        self.loading = true;
        let result = fetch_casting(backend, self.book_id).await;
        self.apply_fetch(result, notifier);
    }

    pub fn locales(&self) -> Vec<String> {
        unique_locales(&self.voices)
    }

    pub fn filtered_voices(&self) -> Vec<&Voice> {
        voices_for_locale(&self.voices, &self.selected_locale)
    }

    /// Optimistic local update, visible before the backend answers.
    pub fn assign_locally(&mut self, character_id: CharacterId, voice_id: &str) {
        apply_voice_assignment(&mut self.characters, character_id, voice_id);
    }
}

/// Sorted, de-duplicated locales of the catalog.
pub fn unique_locales(voices: &[Voice]) -> Vec<String> {
    voices
        .iter()
        .map(|v| v.locale.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn voices_for_locale<'a>(voices: &'a [Voice], locale: &str) -> Vec<&'a Voice> {
    voices.iter().filter(|v| v.locale == locale).collect()
}

/// `Denise (Female)`, optionally followed by ` - fr-FR`.
pub fn voice_option_label(voice: &Voice, with_locale: bool) -> String {
    let mut label = format!("{} ({})", voice.display_name(), voice.gender);
    if with_locale {
        label.push_str(" - ");
        label.push_str(&voice.locale);
    }
    label
}

/// An empty selection means auto-assign and clears the local value.
pub fn apply_voice_assignment(characters: &mut [Character], character_id: CharacterId, voice_id: &str) {
    if let Some(character) = characters.iter_mut().find(|c| c.id == character_id) {
        character.assigned_voice_id = (!voice_id.is_empty()).then(|| voice_id.to_string());
    }
}

/// Best-effort save. The optimistic local value is kept on failure.
pub async fn persist_voice_assignment(
    backend: &dyn Backend,
    notifier: &dyn Notifier,
    character_id: CharacterId,
    voice_id: &str,
) -> bool {
    report(
        backend.assign_voice(character_id, voice_id).await,
        notifier,
        "Failed to save voice selection",
    )
    .is_some()
}

/// Starts character detection. Results show up on a later reload.
pub async fn request_analysis(backend: &dyn Backend, notifier: &dyn Notifier, book_id: BookId) -> bool {
    report(backend.analyze_book(book_id).await, notifier, "Failed to start character analysis").is_some()
}

/// Starts character detection, gives the backend `delay` to work on it,
/// then fetches the casting data again. `None` when detection did not start.
pub async fn analyze_and_refetch(
    backend: &dyn Backend,
    notifier: &dyn Notifier,
    book_id: BookId,
    delay: Duration,
) -> Option<Result<(Vec<Character>, Vec<Voice>)>> {
    if !request_analysis(backend, notifier, book_id).await {
        return None;
    }
    sleep(delay).await;
    Some(fetch_casting(backend, book_id).await)
}

/// Triggers every chapter of the book in order.
pub async fn start_full_generation(
    backend: &dyn Backend,
    notifier: &dyn Notifier,
    book_id: BookId,
    delay: Duration,
) -> bool {
    let result = async {
        let chapters = backend
            .list_chapters(book_id)
            .await
            .context("Failed to list chapters")?;
        let ids: Vec<_> = chapters.iter().map(|c| c.id).collect();
        generate_sequentially(backend, &ids, delay).await
    }
    .await;
    match report(result, notifier, "Failed to start generation") {
        Some(_) => {
            notifier.success("Generation started!");
            true
        }
        None => false,
    }
}

pub fn character_subtitle(character: &Character) -> String {
    format!(
        "{} • {}",
        character.gender.as_deref().filter(|g| !g.is_empty()).unwrap_or("Unknown"),
        character.age_category.as_deref().filter(|a| !a.is_empty()).unwrap_or("Adult")
    )
}

/// Tone and voice-quality tags, when present.
pub fn character_tags(character: &Character) -> Vec<String> {
    [&character.tone, &character.voice_quality]
        .into_iter()
        .flatten()
        .filter(|t| !t.is_empty())
        .cloned()
        .collect()
}

/// First `max_chars` characters followed by an ellipsis.
pub fn description_preview(description: &str, max_chars: usize) -> String {
    let head: String = description.chars().take(max_chars).collect();
    format!("{}...", head)
}
