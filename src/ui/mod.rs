mod audio;
mod cover;
mod pages;
mod player;
mod toast;

use crate::core::config::Config;
use crate::core::models::UploadFile;
use crate::core::route::NAV_ITEMS;
use crate::services::api::HttpBackend;
use crate::services::playback::PlaybackStore;
use anyhow::{anyhow, Result};
use leptos::*;
use leptos_router::*;
use std::rc::Rc;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlAudioElement;

use player::PersistentPlayer;
use toast::ToastContainer;
pub use toast::ToastHandle;

/// Shared by every page: configuration, backend client, toasts and the
/// single playback store driven by the persistent player.
#[derive(Clone)]
pub struct AppContext {
    pub config: Rc<Config>,
    pub backend: Rc<HttpBackend>,
    pub toasts: ToastHandle,
    pub playback: RwSignal<PlaybackStore<HtmlAudioElement>>,
}

pub fn use_app() -> AppContext {
    expect_context::<AppContext>()
}

#[component]
pub fn App() -> impl IntoView {
    let config = Config::default();
    let backend = match HttpBackend::new(config.clone()) {
        Ok(backend) => backend,
        Err(e) => {
            log::error!("Cannot create backend client: {:#}", e);
            return view! { <p class="fatal">"Invalid backend address: " {e.to_string()}</p> }.into_view();
        }
    };

    let toasts = ToastHandle::new(config.toast_ttl());
    provide_context(AppContext {
        config: Rc::new(config),
        backend: Rc::new(backend),
        toasts,
        playback: create_rw_signal(PlaybackStore::new()),
    });

    view! {
        <Router>
            <div class="app-shell">
                <Sidebar/>
                <main class="app-main">
                    <Routes>
                        <Route path="/" view=pages::HomePage/>
                        <Route path="/books" view=pages::LibraryPage/>
                        <Route path="/books/:id" view=pages::BookPage/>
                        <Route path="/books/:id/casting" view=pages::CastingPage/>
                        <Route path="/voices" view=pages::VoicesPage/>
                        <Route path="/settings" view=pages::SettingsPage/>
                    </Routes>
                </main>
            </div>
            <PersistentPlayer/>
            <ToastContainer toasts=toasts/>
        </Router>
    }
    .into_view()
}

#[component]
fn Sidebar() -> impl IntoView {
    let location = use_location();

    view! {
        <nav class="sidebar">
            <h1 class="brand">"ScriptVox"</h1>
            <ul>
                {NAV_ITEMS
                    .iter()
                    .map(|item| {
                        let route = item.route;
                        let class = move || {
                            if location.pathname.with(|p| route.is_active(p)) { "nav-item active" } else { "nav-item" }
                        };
                        view! {
                            <li>
                                <a href=route.path() class=class>{item.name}</a>
                            </li>
                        }
                    })
                    .collect_view()}
            </ul>
        </nav>
    }
}

/// Reads a picked file fully into memory.
pub(crate) async fn read_file(file: web_sys::File) -> Result<UploadFile> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| anyhow!("Failed to read {}: {:?}", file.name(), e))?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
    Ok(UploadFile::new(file.name(), bytes).with_mime(file.type_()))
}

pub(crate) fn picked_file(ev: &web_sys::Event) -> Option<web_sys::File> {
    let input: web_sys::HtmlInputElement = event_target(ev);
    input.files().and_then(|files| files.get(0))
}

pub(crate) fn confirm(message: &str) -> bool {
    window().confirm_with_message(message).unwrap_or(false)
}
