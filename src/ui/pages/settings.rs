use crate::services::pages::settings::SettingsState;
use crate::ui::use_app;
use leptos::*;

#[component]
pub fn SettingsPage() -> impl IntoView {
    let app = use_app();
    let state = create_rw_signal(SettingsState::new());
    let toasts = app.toasts;

    {
        let backend = app.backend.clone();
        spawn_local(async move {
            let mut loaded = SettingsState::new();
            loaded.load(&*backend, &toasts).await;
            state.try_set(loaded);
        });
    }

    let toggle = {
        let backend = app.backend.clone();
        move |_| {
            let mut current = state.get_untracked();
            if current.saving {
                return;
            }
            state.update(|s| s.saving = true);
            let backend = backend.clone();
            spawn_local(async move {
                current.toggle_mode(&*backend, &toasts).await;
                state.try_set(current);
            });
        }
    };

    view! {
        <section class="page settings">
            <h2>"Settings"</h2>
            {move || {
                if state.with(|s| s.loading) {
                    return view! { <p class="loading">"Loading..."</p> }.into_view();
                }
                let Some(mode) = state.with(|s| s.mode()) else {
                    return view! { <p class="empty-state">"Settings are unavailable"</p> }.into_view();
                };
                let toggle = toggle.clone();
                view! {
                    <div class="card mode-card">
                        <h3>{mode.title()}</h3>
                        <p>{mode.description()}</p>
                        <button class="primary" disabled=move || state.with(|s| s.saving) on:click=toggle>
                            {move || {
                                if state.with(|s| s.saving) {
                                    "Switching...".to_string()
                                } else {
                                    format!("Switch to {}", mode.toggled().title())
                                }
                            }}
                        </button>
                        {move || state.with(|s| s.message.clone()).map(|m| view! { <p class="mode-message">{m}</p> })}
                    </div>
                    <div class="card api-key-card">
                        <h3>"Gemini API key"</h3>
                        <p>{move || state.with(|s| s.api_key_label())}</p>
                        {move || state.with(|s| s.api_key_hint()).map(|h| view! { <p class="hint">{h}</p> })}
                    </div>
                }
                .into_view()
            }}
        </section>
    }
}
