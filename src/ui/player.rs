use crate::services::playback::{AudioHandle, PLAYBACK_SPEEDS};
use crate::services::player::{reconcile, speed_label, PlayerClock, PlayerView};
use crate::ui::use_app;
use crate::utils::time::now_ms;
use leptos::*;
use leptos_router::use_navigate;
use web_sys::HtmlAudioElement;

const LYRICS_PLACEHOLDER: &str = "Text synchronization is not available for this chapter yet.";

/// Reads one field of the current frame, or its default when nothing is
/// loaded.
fn field<T: Default + 'static>(
    view: Memo<Option<PlayerView>>,
    get: impl Fn(&PlayerView) -> T + Copy + 'static,
) -> impl Fn() -> T + Copy + 'static {
    move || view.with(|v| v.as_ref().map(get).unwrap_or_default())
}

/// Bottom bar that outlives page changes. Owns the only audio element.
#[component]
pub fn PersistentPlayer() -> impl IntoView {
    let app = use_app();
    let playback = app.playback;
    let config = app.config.clone();
    let clock = create_rw_signal(PlayerClock::new());
    let show_speeds = create_rw_signal(false);
    let audio_ref = create_node_ref::<html::Audio>();
    let navigate = use_navigate();

    audio_ref.on_load(move |audio| {
        let element: &HtmlAudioElement = &audio;
        playback.update(|store| store.attach(element.clone()));
    });

    // Any change of source or play flag is pushed to the element.
    create_effect(move |_| {
        playback.with(|store| {
            let outcome = reconcile(store);
            if outcome.loaded.is_some() {
                clock.set(PlayerClock::new());
            }
        });
    });

    let on_time_update = move || {
        if let Some(position) = playback.with_untracked(|s| s.handle().map(|h| h.current_time())) {
            let mut next = clock.get_untracked();
            if next.on_time_update(now_ms(), position) {
                clock.set(next);
            }
        }
    };
    let on_duration = move || {
        if let Some(duration) = playback.with_untracked(|s| s.handle().map(|h| h.duration())) {
            let mut next = clock.get_untracked();
            if next.on_duration_change(duration) {
                clock.set(next);
            }
        }
    };
    let on_error = move || {
        if let Some(audio) = audio_ref.get_untracked() {
            let code = audio.error().map(|e| e.code()).unwrap_or(0);
            let src = playback.with_untracked(|s| s.audio_url().map(str::to_string)).unwrap_or_default();
            log::error!("Audio element error {} for {}", code, src);
        }
    };
    let on_seek = move |value: String| {
        if let Ok(position) = value.parse::<f64>() {
            playback.with_untracked(|s| clock.update(|c| c.seek(s.handle(), position)));
        }
    };

    // The frame depends on the store only; clock changes update single
    // attributes and text nodes so the seek input is never replaced.
    let view_model = create_memo(move |_| playback.with(|store| PlayerView::build(store, &config)));
    let has_session = create_memo(move |_| view_model.with(Option::is_some));
    let cover_url = create_memo(move |_| view_model.with(|v| v.as_ref().and_then(|p| p.cover_url.clone())));
    let show_lyrics = create_memo(move |_| view_model.with(|v| v.as_ref().is_some_and(|p| p.show_lyrics)));
    let times = create_memo(move |_| clock.with(PlayerClock::times));

    let book_title = field(view_model, |p| p.book_title.clone());
    let chapter_label = field(view_model, |p| p.chapter_label.clone());
    let play_label = field(view_model, |p| p.play_label);
    let current_speed = field(view_model, |p| p.speed_label.clone());

    let open_book = move || {
        if let Some(route) = view_model.with_untracked(|v| v.as_ref().map(|p| p.book_route)) {
            navigate(&route.path(), Default::default());
        }
    };

    view! {
        <audio
            node_ref=audio_ref
            preload="metadata"
            on:timeupdate=move |_| on_time_update()
            on:durationchange=move |_| on_duration()
            on:loadedmetadata=move |_| on_duration()
            on:error=move |_| on_error()
        />
        {move || {
            let open_book = open_book.clone();
            has_session.get().then(|| view! {
                <div class="player">
                    <input
                        class="player-seek"
                        type="range"
                        min="0"
                        step="0.1"
                        max=move || times.with(|t| t.seek_max)
                        prop:value=move || times.with(|t| t.position)
                        on:input=move |ev| on_seek(event_target_value(&ev))
                    />
                    <div class="player-body">
                        <div class="player-info" on:click=move |_| open_book()>
                            {move || cover_url.get().map(|url| view! { <img class="player-cover" src=url alt=""/> })}
                            <div>
                                <p class="player-title">{book_title}</p>
                                <p class="player-chapter">{chapter_label}</p>
                            </div>
                        </div>
                        <div class="player-controls">
                            <span class="player-time">{move || times.with(|t| t.elapsed.clone())}</span>
                            <button class="player-toggle" on:click=move |_| playback.update(|s| s.toggle_play())>
                                {play_label}
                            </button>
                            <span class="player-time">{move || times.with(|t| t.total.clone())}</span>
                        </div>
                        <div class="player-extras">
                            <div class="player-speed">
                                <button on:click=move |_| show_speeds.update(|v| *v = !*v)>{current_speed}</button>
                                {move || {
                                    show_speeds.get().then(|| view! {
                                        <ul class="speed-menu">
                                            {PLAYBACK_SPEEDS
                                                .iter()
                                                .map(|&speed| view! {
                                                    <li
                                                        class:selected=move || playback.with(|s| s.speed() == speed)
                                                        on:click=move |_| {
                                                            playback.update(|s| s.set_playback_speed(speed));
                                                            show_speeds.set(false);
                                                        }
                                                    >
                                                        {speed_label(speed)}
                                                    </li>
                                                })
                                                .collect_view()}
                                        </ul>
                                    })
                                }}
                            </div>
                            <button
                                class:active=move || show_lyrics.get()
                                title="Text display"
                                on:click=move |_| playback.update(|s| s.toggle_lyrics())
                            >
                                "Text"
                            </button>
                        </div>
                    </div>
                    {move || show_lyrics.get().then(|| view! {
                        <div class="lyrics-panel">
                            <h3>"Text Display"</h3>
                            <p>{LYRICS_PLACEHOLDER}</p>
                        </div>
                    })}
                </div>
            })
        }}
    }
}
