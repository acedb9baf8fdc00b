use super::{book_id_param, not_found};
use crate::core::models::ChapterId;
use crate::core::route::Route;
use crate::services::pages::book::{
    self, fetch_book_detail, BookDetail, BookPlayIntent, ChapterAction, ChapterRow, StatusBadge, NOTHING_TO_PLAY,
};
use crate::services::pages::library::{self, DeleteOutcome};
use crate::services::refresh::{AutoRefresh, TickFn};
use crate::services::toast::Notifier;
use crate::ui::cover::CoverView;
use crate::ui::pages::casting::CastingModal;
use crate::ui::{confirm, picked_file, read_file, use_app};
use crate::utils::time::sleep;
use leptos::*;
use leptos_router::use_navigate;
use std::rc::Rc;

fn badge_class(badge: StatusBadge) -> &'static str {
    match badge {
        StatusBadge::Completed => "badge badge-completed",
        StatusBadge::Processing => "badge badge-processing",
        StatusBadge::Pending => "badge badge-pending",
    }
}

#[component]
pub fn BookPage() -> impl IntoView {
    let Some(book_id) = book_id_param() else {
        return not_found();
    };
    let app = use_app();
    let config = app.config.clone();
    let toasts = app.toasts;
    let playback = app.playback;
    let navigate = use_navigate();

    let detail = create_rw_signal(BookDetail::new(book_id));
    let show_casting = create_rw_signal(false);

    let load: Rc<dyn Fn()> = {
        let backend = app.backend.clone();
        Rc::new(move || {
            let backend = backend.clone();
            spawn_local(async move {
                let result = fetch_book_detail(&*backend, book_id).await;
                detail.try_update(|d| d.apply_fetch(result, &toasts));
            });
        })
    };
    load();

    let tick: TickFn = load.clone();
    let refresh = store_value(AutoRefresh::new(config.refresh_interval(), tick));
    refresh.update_value(|r| r.set_enabled(detail.with_untracked(|d| d.auto_refresh)));
    on_cleanup(move || {
        refresh.try_update_value(|r| r.set_enabled(false));
    });
    let toggle_refresh = move |_| {
        let mut enabled = false;
        refresh.update_value(|r| enabled = r.toggle());
        detail.update(|d| d.auto_refresh = enabled);
    };

    let generate = {
        let backend = app.backend.clone();
        let load = load.clone();
        let delay = config.generation_refresh_delay();
        Callback::new(move |chapter_id: ChapterId| {
            detail.update(|d| d.generating = Some(chapter_id));
            let backend = backend.clone();
            let load = load.clone();
            spawn_local(async move {
                let started = book::generate_chapter(&*backend, &toasts, chapter_id).await;
                detail.try_update(|d| {
                    if d.generating == Some(chapter_id) {
                        d.generating = None;
                    }
                });
                if started {
                    sleep(delay).await;
                    load();
                }
            });
        })
    };

    let cancel = Callback::new(move |_: ()| detail.update(|d| d.cancel_generation(&toasts)));

    let play_chapter = {
        let config = config.clone();
        Callback::new(move |chapter_id: ChapterId| {
            if let Some(request) = detail.with(|d| d.play_request(chapter_id, &config)) {
                playback.update(|s| s.start(request));
            }
        })
    };

    let play_book = {
        let config = config.clone();
        move |_| {
            let playing = playback.with(|s| s.is_playing_book(book_id));
            match detail.with(|d| d.play_intent(playing, &config)) {
                BookPlayIntent::NothingToPlay => toasts.info(NOTHING_TO_PLAY),
                BookPlayIntent::Pause => playback.update(|s| s.pause()),
                BookPlayIntent::Play(request) => playback.update(|s| s.start(request)),
            }
        }
    };

    let generate_all = {
        let backend = app.backend.clone();
        let load = load.clone();
        let delay = config.generate_all_delay();
        move |_| {
            if !detail.with_untracked(|d| d.can_generate_all()) {
                return;
            }
            detail.update(|d| d.batch_generating = true);
            let chapters = detail.with_untracked(|d| d.chapters.clone());
            let backend = backend.clone();
            let load = load.clone();
            spawn_local(async move {
                book::generate_all(&*backend, &toasts, &chapters, delay).await;
                detail.try_update(|d| d.batch_generating = false);
                load();
            });
        }
    };

    let on_cover = {
        let backend = app.backend.clone();
        let load = load.clone();
        move |ev: web_sys::Event| {
            let Some(file) = picked_file(&ev) else {
                return;
            };
            let backend = backend.clone();
            let load = load.clone();
            spawn_local(async move {
                let upload = match read_file(file).await {
                    Ok(upload) => upload,
                    Err(e) => {
                        log::error!("{:#}", e);
                        toasts.error("Cover upload failed");
                        return;
                    }
                };
                if book::upload_cover(&*backend, &toasts, book_id, upload).await {
                    load();
                }
            });
        }
    };

    let on_delete = {
        let backend = app.backend.clone();
        let navigate = navigate.clone();
        move |_| {
            let backend = backend.clone();
            let navigate = navigate.clone();
            spawn_local(async move {
                if library::delete_book(&*backend, &toasts, confirm, book_id).await == DeleteOutcome::Deleted {
                    navigate(&Route::Library.path(), Default::default());
                }
            });
        }
    };

    let cover = {
        let config = config.clone();
        Signal::derive(move || detail.with(|d| d.cover(&config)))
    };

    view! {
        <section class="page book-detail">
            {move || {
                if detail.with(|d| d.loading) {
                    return view! { <p class="loading">"Loading..."</p> }.into_view();
                }
                if detail.with(|d| d.not_found()) {
                    return not_found();
                }
                ().into_view()
            }}
            <Show when=move || detail.with(|d| d.book.is_some())>
                <header class="book-header">
                    <CoverView
                        overlay=cover
                        title=detail.with_untracked(|d| d.book.as_ref().map(|b| b.title.clone()).unwrap_or_default())
                    />
                    <div class="book-meta">
                        <h2>{move || detail.with(|d| d.book.as_ref().map(|b| b.title.clone()))}</h2>
                        <p class="author">{move || detail.with(|d| d.book.as_ref().map(|b| b.author.clone()))}</p>
                        <p class="progress-label">
                            {move || detail.with(|d| d.progress_label())}
                            {move || {
                                detail.with(|d| d.ready_badge()).map(|b| view! { <span class="ready-badge">{b}</span> })
                            }}
                        </p>
                        <div class="progress-bar">
                            <div
                                class="progress-fill"
                                style=move || format!("width: {}%;", detail.with(|d| d.completion_percentage()))
                            ></div>
                        </div>
                        <div class="actions">
                            <button class="primary" on:click=play_book.clone()>
                                {move || if playback.with(|s| s.is_playing_book(book_id)) { "Pause" } else { "Play" }}
                            </button>
                            <button
                                disabled=move || !detail.with(|d| d.can_generate_all())
                                on:click=generate_all.clone()
                            >
                                {move || {
                                    if detail.with(|d| d.batch_generating) { "Generating..." } else { "Generate All" }
                                }}
                            </button>
                            <button on:click=move |_| show_casting.set(true)>"Casting"</button>
                            <label class="button">
                                "Upload cover"
                                <input type="file" accept="image/*" hidden=true on:change=on_cover.clone()/>
                            </label>
                            <button class=move || if detail.with(|d| d.auto_refresh) { "toggle on" } else { "toggle" }
                                on:click=toggle_refresh
                            >
                                {move || if detail.with(|d| d.auto_refresh) { "Auto-refresh on" } else { "Auto-refresh off" }}
                            </button>
                            <button class="danger" on:click=on_delete.clone()>"Delete"</button>
                        </div>
                    </div>
                </header>
                <ul class="chapter-list">
                    {move || {
                        detail
                            .with(|d| d.chapter_rows())
                            .into_iter()
                            .map(|row| view! { <ChapterItem row=row generate=generate cancel=cancel play=play_chapter/> })
                            .collect_view()
                    }}
                </ul>
            </Show>
            <Show when=move || show_casting.get()>
                <CastingModal book_id=book_id on_close=Callback::new(move |_: ()| show_casting.set(false))/>
            </Show>
        </section>
    }
    .into_view()
}

#[component]
fn ChapterItem(
    row: ChapterRow,
    generate: Callback<ChapterId>,
    cancel: Callback<()>,
    play: Callback<ChapterId>,
) -> impl IntoView {
    let id = row.id;
    let action = match row.action {
        ChapterAction::Play => view! {
            <button class="primary" on:click=move |_| play.call(id)>"Play"</button>
            <button title="Regenerate" on:click=move |_| generate.call(id)>"Regenerate"</button>
        }
        .into_view(),
        ChapterAction::Generating { cancellable } => view! {
            <span class="busy">"Generating..."</span>
            {cancellable.then(|| view! { <button class="danger" on:click=move |_| cancel.call(())>"Cancel"</button> })}
        }
        .into_view(),
        ChapterAction::Generate => view! {
            <button on:click=move |_| generate.call(id)>"Generate"</button>
        }
        .into_view(),
    };

    view! {
        <li class="chapter-row">
            <span class="chapter-position">{row.position_label}</span>
            <div class="chapter-main">
                <p class="chapter-title">{row.title}</p>
                <span class=badge_class(row.badge)>{row.status_label}</span>
                {row.progress.map(|p| view! {
                    <div class="progress-bar small">
                        <div class="progress-fill" style=format!("width: {}%;", p)></div>
                    </div>
                })}
            </div>
            <div class="chapter-actions">{action}</div>
        </li>
    }
}
