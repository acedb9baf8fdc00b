use super::{book_id_param, not_found};
use crate::core::models::{BookId, Character, CharacterId, Voice};
use crate::core::route::Route;
use crate::services::pages::casting::{
    self, character_subtitle, character_tags, description_preview, fetch_casting, voice_option_label, CastingState,
    AUTO_ASSIGN_LABEL,
};
use crate::ui::{use_app, AppContext};
use crate::utils::time::sleep;
use leptos::*;
use leptos_router::use_navigate;

const PAGE_PREVIEW_CHARS: usize = 80;
const MODAL_PREVIEW_CHARS: usize = 60;

/// State and assignment callback shared by the page and the modal.
struct Casting {
    state: RwSignal<CastingState>,
    assign: Callback<(CharacterId, String)>,
}

fn use_casting(app: &AppContext, book_id: BookId) -> Casting {
    let state = create_rw_signal(CastingState::new(book_id, app.config.default_voice_locale.clone()));
    let toasts = app.toasts;

    {
        let backend = app.backend.clone();
        spawn_local(async move {
            let result = fetch_casting(&*backend, book_id).await;
            state.try_update(|s| s.apply_fetch(result, &toasts));
        });
    }

    let assign = {
        let backend = app.backend.clone();
        Callback::new(move |(character_id, voice_id): (CharacterId, String)| {
            state.update(|s| s.assign_locally(character_id, &voice_id));
            let backend = backend.clone();
            spawn_local(async move {
                casting::persist_voice_assignment(&*backend, &toasts, character_id, &voice_id).await;
            });
        })
    };

    Casting { state, assign }
}

#[component]
fn LocaleFilter(state: RwSignal<CastingState>) -> impl IntoView {
    view! {
        <label class="locale-filter">
            "Voice language "
            <select
                prop:value=move || state.with(|s| s.selected_locale.clone())
                on:change=move |ev| {
                    let locale = event_target_value(&ev);
                    state.update(|s| s.selected_locale = locale);
                }
            >
                {move || {
                    let selected = state.with(|s| s.selected_locale.clone());
                    state
                        .with(|s| s.locales())
                        .into_iter()
                        .map(|locale| {
                            let is_selected = locale == selected;
                            view! { <option value=locale.clone() selected=is_selected>{locale}</option> }
                        })
                        .collect_view()
                }}
            </select>
        </label>
    }
}

#[component]
fn VoiceSelect(character_id: CharacterId, assigned: Option<String>, voices: Vec<Voice>, assign: Callback<(CharacterId, String)>) -> impl IntoView {
    let current = assigned.unwrap_or_default();
    view! {
        <select
            class="voice-select"
            on:change=move |ev| assign.call((character_id, event_target_value(&ev)))
        >
            <option value="" selected=current.is_empty()>{AUTO_ASSIGN_LABEL}</option>
            {voices
                .iter()
                .map(|voice| {
                    let selected = voice.short_name == current;
                    view! {
                        <option value=voice.short_name.clone() selected=selected>
                            {voice_option_label(voice, false)}
                        </option>
                    }
                })
                .collect_view()}
        </select>
    }
}

#[component]
fn CharacterCard(
    character: Character,
    voices: Vec<Voice>,
    assign: Callback<(CharacterId, String)>,
    preview_chars: usize,
) -> impl IntoView {
    let preview = character
        .description
        .as_deref()
        .filter(|d| !d.is_empty())
        .map(|d| description_preview(d, preview_chars));
    let mut tags = character_tags(&character);
    if let Some(age) = character.age_category.clone().filter(|a| !a.is_empty()) {
        tags.push(age);
    }

    view! {
        <div class=if character.is_narrator() { "character-card narrator" } else { "character-card" }>
            <div class="avatar">{character.initial()}</div>
            <div class="character-info">
                <h4>{character.name.clone()}</h4>
                <p class="subtitle">{character_subtitle(&character)}</p>
                {preview.map(|p| view! { <p class="description">{p}</p> })}
                <div class="tags">
                    {tags.into_iter().map(|t| view! { <span class="tag">{t}</span> }).collect_view()}
                </div>
            </div>
            <VoiceSelect
                character_id=character.id
                assigned=character.assigned_voice_id.clone()
                voices=voices
                assign=assign
            />
        </div>
    }
}

fn character_list(casting: &Casting, preview_chars: usize) -> impl Fn() -> View {
    let state = casting.state;
    let assign = casting.assign;
    move || {
        let (characters, voices) = state.with(|s| {
            (s.characters.clone(), s.filtered_voices().into_iter().cloned().collect::<Vec<_>>())
        });
        characters
            .into_iter()
            .map(|character| {
                view! {
                    <CharacterCard
                        character=character
                        voices=voices.clone()
                        assign=assign
                        preview_chars=preview_chars
                    />
                }
            })
            .collect_view()
    }
}

#[component]
pub fn CastingPage() -> impl IntoView {
    let Some(book_id) = book_id_param() else {
        return not_found();
    };
    let app = use_app();
    let casting = use_casting(&app, book_id);
    let state = casting.state;
    let navigate = use_navigate();

    let start = {
        let backend = app.backend.clone();
        let toasts = app.toasts;
        let batch_delay = app.config.casting_batch_delay();
        let redirect_delay = app.config.casting_redirect_delay();
        move |_| {
            if state.with_untracked(|s| s.starting_generation) {
                return;
            }
            state.update(|s| s.starting_generation = true);
            let backend = backend.clone();
            let navigate = navigate.clone();
            spawn_local(async move {
                let started = casting::start_full_generation(&*backend, &toasts, book_id, batch_delay).await;
                state.try_update(|s| s.starting_generation = false);
                if started {
                    sleep(redirect_delay).await;
                    navigate(&Route::Book(book_id).path(), Default::default());
                }
            });
        }
    };

    view! {
        <section class="page casting">
            <header class="casting-header">
                <a href=Route::Book(book_id).path()>"Back to book"</a>
                <h2>"Casting"</h2>
                <LocaleFilter state=state/>
                <button
                    class="primary"
                    disabled=move || state.with(|s| s.starting_generation || s.loading)
                    on:click=start
                >
                    {move || if state.with(|s| s.starting_generation) { "Starting..." } else { "Start generation" }}
                </button>
            </header>
            {move || {
                if state.with(|s| s.loading) {
                    view! { <p class="loading">"Loading..."</p> }.into_view()
                } else if state.with(|s| s.characters.is_empty()) {
                    view! { <p class="empty-state">"No characters detected yet."</p> }.into_view()
                } else {
                    ().into_view()
                }
            }}
            <div class="character-grid">{character_list(&casting, PAGE_PREVIEW_CHARS)}</div>
        </section>
    }
    .into_view()
}

/// Casting opened over the book page.
#[component]
pub fn CastingModal(book_id: BookId, on_close: Callback<()>) -> impl IntoView {
    let app = use_app();
    let casting = use_casting(&app, book_id);
    let state = casting.state;

    let analyze = {
        let backend = app.backend.clone();
        let toasts = app.toasts;
        let delay = app.config.analysis_refresh_delay();
        move |_| {
            state.update(|s| s.analyzing = true);
            let backend = backend.clone();
            // The modal may be closed before this finishes; only `try_update`
            // touches its state afterwards.
            spawn_local(async move {
                let refetched = casting::analyze_and_refetch(&*backend, &toasts, book_id, delay).await;
                state.try_update(|s| match refetched {
                    Some(result) => s.apply_fetch(result, &toasts),
                    None => s.analyzing = false,
                });
            });
        }
    };

    view! {
        <div class="modal-backdrop" on:click=move |_| on_close.call(())>
            <div class="modal" on:click=|ev| ev.stop_propagation()>
                <header class="modal-header">
                    <h3>"Casting"</h3>
                    <LocaleFilter state=state/>
                    <button title="Close" on:click=move |_| on_close.call(())>"×"</button>
                </header>
                {move || {
                    if state.with(|s| s.loading) {
                        return view! { <p class="loading">"Loading..."</p> }.into_view();
                    }
                    if !state.with(|s| s.characters.is_empty()) {
                        return ().into_view();
                    }
                    let analyze = analyze.clone();
                    view! {
                        <div class="empty-state">
                            <p>"No characters detected yet."</p>
                            <button
                                class="primary"
                                disabled=move || state.with(|s| s.analyzing)
                                on:click=analyze
                            >
                                {move || if state.with(|s| s.analyzing) { "Analyzing..." } else { "Detect characters" }}
                            </button>
                        </div>
                    }
                    .into_view()
                }}
                <div class="character-list">{character_list(&casting, MODAL_PREVIEW_CHARS)}</div>
            </div>
        </div>
    }
}
