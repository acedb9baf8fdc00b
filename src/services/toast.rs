use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TOAST_ID: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub kind: ToastKind,
    pub expires_at_ms: f64,
}

/// Receives user-facing status messages from page workflows.
pub trait Notifier {
    fn notify(&self, kind: ToastKind, message: String);

    fn success(&self, message: &str) {
        self.notify(ToastKind::Success, message.to_string());
    }

    fn error(&self, message: &str) {
        self.notify(ToastKind::Error, message.to_string());
    }

    fn info(&self, message: &str) {
        self.notify(ToastKind::Info, message.to_string());
    }
}

/// Visible toasts, oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Toasts {
    items: Vec<Toast>,
}

impl Toasts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Toast] {
        &self.items
    }

    pub fn push(&mut self, kind: ToastKind, message: String, now_ms: f64, ttl_ms: f64) -> u64 {
        let id = NEXT_TOAST_ID.fetch_add(1, Ordering::Relaxed);
        self.items.push(Toast {
            id,
            message,
            kind,
            expires_at_ms: now_ms + ttl_ms,
        });
        id
    }

    pub fn dismiss(&mut self, id: u64) {
        self.items.retain(|t| t.id != id);
    }

    /// Drops every toast whose lifetime has passed.
    pub fn prune(&mut self, now_ms: f64) {
        self.items.retain(|t| t.expires_at_ms > now_ms);
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct RecordingNotifier {
        pub messages: Mutex<Vec<(ToastKind, String)>>,
    }

    impl RecordingNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn messages(&self) -> Vec<(ToastKind, String)> {
            self.messages.lock().unwrap().clone()
        }

        pub fn last(&self) -> Option<(ToastKind, String)> {
            self.messages.lock().unwrap().last().cloned()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, kind: ToastKind, message: String) {
            self.messages.lock().unwrap().push((kind, message));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic() {
        let mut toasts = Toasts::new();
        let a = toasts.push(ToastKind::Info, "a".to_string(), 0.0, 3000.0);
        let b = toasts.push(ToastKind::Error, "b".to_string(), 0.0, 3000.0);
        assert!(b > a);
        assert_eq!(toasts.items().len(), 2);
    }

    #[test]
    fn test_dismiss_removes_only_that_toast() {
        let mut toasts = Toasts::new();
        let a = toasts.push(ToastKind::Info, "a".to_string(), 0.0, 3000.0);
        let b = toasts.push(ToastKind::Success, "b".to_string(), 0.0, 3000.0);
        toasts.dismiss(a);
        assert_eq!(toasts.items().len(), 1);
        assert_eq!(toasts.items()[0].id, b);
    }

    #[test]
    fn test_prune_after_ttl() {
        let mut toasts = Toasts::new();
        toasts.push(ToastKind::Info, "early".to_string(), 1_000.0, 3000.0);
        toasts.push(ToastKind::Info, "late".to_string(), 2_500.0, 3000.0);
        toasts.prune(3_999.0);
        assert_eq!(toasts.items().len(), 2);
        toasts.prune(4_000.0);
        assert_eq!(toasts.items().len(), 1);
        assert_eq!(toasts.items()[0].message, "late");
        toasts.prune(5_500.0);
        assert!(toasts.items().is_empty());
    }
}
