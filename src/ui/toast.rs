use crate::services::toast::{Notifier, ToastKind, Toasts};
use crate::utils::time::now_ms;
use leptos::*;
use std::time::Duration;

/// Browser notifier: pushes a toast and schedules its removal.
#[derive(Clone, Copy)]
pub struct ToastHandle {
    toasts: RwSignal<Toasts>,
    ttl: Duration,
}

impl ToastHandle {
    pub fn new(ttl: Duration) -> Self {
        Self {
            toasts: create_rw_signal(Toasts::new()),
            ttl,
        }
    }

    pub fn dismiss(&self, id: u64) {
        self.toasts.update(|t| t.dismiss(id));
    }
}

impl Notifier for ToastHandle {
    fn notify(&self, kind: ToastKind, message: String) {
        let ttl_ms = self.ttl.as_millis() as f64;
        self.toasts.update(|t| {
            t.push(kind, message, now_ms(), ttl_ms);
        });
        let toasts = self.toasts;
        set_timeout(move || toasts.update(|t| t.prune(now_ms())), self.ttl);
    }
}

fn kind_class(kind: ToastKind) -> &'static str {
    match kind {
        ToastKind::Success => "toast toast-success",
        ToastKind::Error => "toast toast-error",
        ToastKind::Info => "toast toast-info",
    }
}

#[component]
pub fn ToastContainer(toasts: ToastHandle) -> impl IntoView {
    view! {
        <div class="toast-container">
            <For
                each=move || toasts.toasts.with(|t| t.items().to_vec())
                key=|toast| toast.id
                children=move |toast| {
                    let id = toast.id;
                    view! {
                        <div class=kind_class(toast.kind)>
                            <span>{toast.message}</span>
                            <button class="toast-close" on:click=move |_| toasts.dismiss(id)>"×"</button>
                        </div>
                    }
                }
            />
        </div>
    }
}
