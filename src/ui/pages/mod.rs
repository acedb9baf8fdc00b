mod book;
mod casting;
mod home;
mod library;
mod settings;
mod voices;

pub use book::BookPage;
pub use casting::CastingPage;
pub use home::HomePage;
pub use library::LibraryPage;
pub use settings::SettingsPage;
pub use voices::VoicesPage;

use crate::core::models::BookId;
use leptos::*;
use leptos_router::use_params_map;

/// `:id` segment of the current route.
fn book_id_param() -> Option<BookId> {
    use_params_map().with_untracked(|p| p.get("id").and_then(|id| id.parse().ok()))
}

fn not_found() -> View {
    view! { <p class="empty-state">"Book not found"</p> }.into_view()
}
