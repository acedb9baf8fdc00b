use crate::services::api::Backend;
use crate::services::pages::casting::voice_option_label;
use crate::services::pages::report;
use crate::services::pages::voices::{group_by_locale, LocaleGroup};
use crate::ui::use_app;
use leptos::*;

#[component]
pub fn VoicesPage() -> impl IntoView {
    let app = use_app();
    let groups = create_rw_signal(None::<Vec<LocaleGroup>>);

    {
        let backend = app.backend.clone();
        let toasts = app.toasts;
        spawn_local(async move {
            let voices = report(backend.list_voices().await, &toasts, "Failed to load voices").unwrap_or_default();
            groups.try_set(Some(group_by_locale(&voices)));
        });
    }

    view! {
        <section class="page voices">
            <h2>"Voices"</h2>
            {move || match groups.get() {
                None => view! { <p class="loading">"Loading..."</p> }.into_view(),
                Some(groups) if groups.is_empty() => view! { <p class="empty-state">"No voices available"</p> }.into_view(),
                Some(groups) => groups
                    .into_iter()
                    .map(|group| {
                        view! {
                            <div class="locale-group">
                                <h3>{group.locale.clone()} <span class="count">{group.voices.len()}</span></h3>
                                <ul>
                                    {group
                                        .voices
                                        .iter()
                                        .map(|voice| view! {
                                            <li title=voice.short_name.clone()>{voice_option_label(voice, false)}</li>
                                        })
                                        .collect_view()}
                                </ul>
                            </div>
                        }
                    })
                    .collect_view(),
            }}
        </section>
    }
}
