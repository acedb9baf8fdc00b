use crate::core::models::BookId;
use crate::services::pages::library::{self, DeleteOutcome, LibraryPage as Library, StatusIcon};
use crate::ui::cover::CoverView;
use crate::ui::{confirm, use_app};
use leptos::*;

fn icon(status: StatusIcon) -> &'static str {
    match status {
        StatusIcon::Ready => "✔",
        StatusIcon::Processing => "⟳",
        StatusIcon::Idle => "•",
    }
}

#[component]
pub fn LibraryPage() -> impl IntoView {
    let app = use_app();
    let page = create_rw_signal(Library::new());

    {
        let backend = app.backend.clone();
        let toasts = app.toasts;
        spawn_local(async move {
            let books = library::fetch_books(&*backend, &toasts).await;
            page.try_update(|p| p.finish_loading(books));
        });
    }

    let delete = {
        let backend = app.backend.clone();
        let toasts = app.toasts;
        Callback::new(move |id: BookId| {
            let backend = backend.clone();
            spawn_local(async move {
                if library::delete_book(&*backend, &toasts, confirm, id).await == DeleteOutcome::Deleted {
                    page.try_update(|p| p.remove(id));
                }
            });
        })
    };

    let config = app.config.clone();
    view! {
        <section class="page library">
            <h2>"Library"</h2>
            {move || {
                if page.with(|p| p.loading) {
                    return view! { <p class="loading">"Loading..."</p> }.into_view();
                }
                if page.with(|p| p.is_empty()) {
                    return view! {
                        <div class="empty-state">
                            <p>"No books yet"</p>
                            <a href="/">"Upload your first book"</a>
                        </div>
                    }
                    .into_view();
                }
                let cards = page.with(|p| p.cards(&config));
                view! {
                    <div class="book-grid">
                        {cards
                            .into_iter()
                            .map(|card| {
                                let id = card.id;
                                view! {
                                    <div class="book-card">
                                        <a href=card.route.path()>
                                            <CoverView overlay=card.cover title=card.title.clone()/>
                                            <h3>{card.title}</h3>
                                            <p class="author">{card.author}</p>
                                            <p class="status">
                                                <span class="status-icon">{icon(card.icon)}</span>
                                                {card.status_label}
                                            </p>
                                        </a>
                                        <button class="danger" title="Delete book" on:click=move |_| delete.call(id)>
                                            "Delete"
                                        </button>
                                    </div>
                                }
                            })
                            .collect_view()}
                    </div>
                }
                .into_view()
            }}
        </section>
    }
}
