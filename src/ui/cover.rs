use crate::services::cover::CoverOverlay;
use leptos::*;

/// Book cover that fills with colour as chapters are generated.
#[component]
pub fn CoverView(#[prop(into)] overlay: MaybeSignal<CoverOverlay>, #[prop(into)] title: String) -> impl IntoView {
    move || {
        let current = overlay.get();
        let clip = current.clip_path().unwrap_or_default();
        match current {
            CoverOverlay::Placeholder => view! {
                <div class="cover cover-placeholder">
                    <span>{title.chars().next().map(String::from).unwrap_or_default()}</span>
                </div>
            }
            .into_view(),
            CoverOverlay::Plain { url } => view! {
                <div class="cover">
                    <img src=url alt=title.clone()/>
                </div>
            }
            .into_view(),
            CoverOverlay::Generating { url, label, .. } => view! {
                <div class="cover cover-generating">
                    <img class="cover-base" src=url.clone() alt=title.clone()/>
                    <img class="cover-reveal" src=url alt="" style=format!("clip-path: {};", clip)/>
                    {label.map(|l| view! { <span class="cover-label">{l}</span> })}
                </div>
            }
            .into_view(),
        }
    }
}
