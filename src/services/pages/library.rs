use crate::core::config::Config;
use crate::core::models::{Book, BookId, BookStatus};
use crate::core::route::Route;
use crate::services::api::Backend;
use crate::services::cover::CoverOverlay;
use crate::services::pages::report;
use crate::services::toast::Notifier;
use log::info;

pub const DELETE_CONFIRMATION: &str =
    "Are you sure you want to delete this book? This cannot be undone.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIcon {
    Ready,
    Processing,
    Idle,
}

impl StatusIcon {
    pub fn for_status(status: &BookStatus) -> Self {
        match status {
            BookStatus::Ready => StatusIcon::Ready,
            BookStatus::Processing => StatusIcon::Processing,
            BookStatus::Other(_) => StatusIcon::Idle,
        }
    }
}

/// One tile of the library grid.
#[derive(Debug, Clone, PartialEq)]
pub struct BookCard {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub status_label: String,
    pub icon: StatusIcon,
    pub cover: CoverOverlay,
    pub route: Route,
}

impl BookCard {
    pub fn new(book: &Book, config: &Config) -> Self {
        // The grid has no per-book progress: a processing book is drawn in
        // the generating style with nothing revealed yet.
        let processing = book.status == BookStatus::Processing;
        Self {
            id: book.id,
            title: book.title.clone(),
            author: book.author.clone(),
            status_label: book.status.to_string(),
            icon: StatusIcon::for_status(&book.status),
            cover: CoverOverlay::for_cover(config, book.cover_path.as_deref(), 0.0, processing),
            route: Route::Book(book.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LibraryPage {
    pub books: Vec<Book>,
    pub loading: bool,
}

impl Default for LibraryPage {
    fn default() -> Self {
        Self {
            books: Vec::new(),
            loading: true,
        }
    }
}

impl LibraryPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish_loading(&mut self, books: Option<Vec<Book>>) {
        if let Some(books) = books {
            self.books = books;
        }
        self.loading = false;
    }

    pub fn is_empty(&self) -> bool {
        !self.loading && self.books.is_empty()
    }

    pub fn cards(&self, config: &Config) -> Vec<BookCard> {
        self.books.iter().map(|b| BookCard::new(b, config)).collect()
    }

    /// Removes exactly the deleted book, keeping everyone else in order.
    pub fn remove(&mut self, id: BookId) {
        self.books.retain(|b| b.id != id);
    }
}

pub async fn fetch_books(backend: &dyn Backend, notifier: &dyn Notifier) -> Option<Vec<Book>> {
    report(backend.list_books().await, notifier, "Failed to load books")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Cancelled,
    Deleted,
    Failed,
}

/// Deletes after the user confirms. No request is sent otherwise.
pub async fn delete_book(
    backend: &dyn Backend,
    notifier: &dyn Notifier,
    confirm: impl FnOnce(&str) -> bool,
    id: BookId,
) -> DeleteOutcome {
    if !confirm(DELETE_CONFIRMATION) {
        return DeleteOutcome::Cancelled;
    }
    match report(backend.delete_book(id).await, notifier, "Failed to delete book") {
        Some(()) => {
            info!("Book {} deleted", id);
            notifier.success("Book deleted successfully");
            DeleteOutcome::Deleted
        }
        None => DeleteOutcome::Failed,
    }
}
