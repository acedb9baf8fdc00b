use crate::core::models::BookId;
use std::fmt;

/// Every page reachable in the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Library,
    Book(BookId),
    Casting(BookId),
    Voices,
    Settings,
}

pub struct NavItem {
    pub name: &'static str,
    pub route: Route,
}

pub const NAV_ITEMS: [NavItem; 4] = [
    NavItem { name: "Home", route: Route::Home },
    NavItem { name: "Library", route: Route::Library },
    NavItem { name: "Voices", route: Route::Voices },
    NavItem { name: "Settings", route: Route::Settings },
];

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Library => "/books".to_string(),
            Route::Book(id) => format!("/books/{}", id),
            Route::Casting(id) => format!("/books/{}/casting", id),
            Route::Voices => "/voices".to_string(),
            Route::Settings => "/settings".to_string(),
        }
    }

    pub fn parse(path: &str) -> Option<Route> {
        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Some(Route::Home),
            ["books"] => Some(Route::Library),
            ["books", id] => id.parse().ok().map(Route::Book),
            ["books", id, "casting"] => id.parse().ok().map(Route::Casting),
            ["voices"] => Some(Route::Voices),
            ["settings"] => Some(Route::Settings),
            _ => None,
        }
    }

    /// Where a freshly uploaded book goes next.
    pub fn after_upload(book_id: BookId, auto_process: bool) -> Route {
        if auto_process {
            Route::Book(book_id)
        } else {
            Route::Casting(book_id)
        }
    }

    /// Sidebar highlighting compares exact paths.
    pub fn is_active(&self, current_path: &str) -> bool {
        Route::parse(current_path) == Some(*self)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_parse_back() {
        for route in [
            Route::Home,
            Route::Library,
            Route::Book(42),
            Route::Casting(42),
            Route::Voices,
            Route::Settings,
        ] {
            assert_eq!(Route::parse(&route.path()), Some(route));
        }
        assert_eq!(Route::parse("/books/abc"), None);
        assert_eq!(Route::parse("/books/7/"), Some(Route::Book(7)));
    }

    #[test]
    fn test_after_upload() {
        assert_eq!(Route::after_upload(42, true).path(), "/books/42");
        assert_eq!(Route::after_upload(42, false).path(), "/books/42/casting");
    }

    #[test]
    fn test_sidebar_highlight_is_exact() {
        assert!(Route::Library.is_active("/books"));
        assert!(!Route::Library.is_active("/books/3"));
        assert!(Route::Home.is_active("/"));
    }
}
