//! Dismissible notifications shown in a corner of the screen.
//!
//! [`Toaster`] owns the queue and renders it; anything below it calls
//! [`use_toasts`] and pushes messages. Each toast dismisses itself after
//! [`TOAST_TIMEOUT`].

use std::time::Duration;

use dioxus::prelude::*;

use crate::icons::FaXmark;
use crate::Icon;

pub const TOAST_TIMEOUT: Duration = Duration::from_secs(5);
/// Older toasts are dropped beyond this many.
pub const MAX_VISIBLE: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

impl ToastKind {
    fn class(&self) -> &'static str {
        match self {
            ToastKind::Info => "toast toast--info",
            ToastKind::Success => "toast toast--success",
            ToastKind::Error => "toast toast--error",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ToastQueue {
    next_id: u64,
    items: Vec<Toast>,
}

impl ToastQueue {
    pub fn push(&mut self, kind: ToastKind, message: impl Into<String>) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.items.push(Toast {
            id,
            kind,
            message: message.into(),
        });
        if self.items.len() > MAX_VISIBLE {
            let overflow = self.items.len() - MAX_VISIBLE;
            self.items.drain(..overflow);
        }
        id
    }

    /// Returns whether a toast was removed.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|t| t.id != id);
        self.items.len() != before
    }

    pub fn items(&self) -> &[Toast] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Handle for pushing toasts, available below [`Toaster`].
#[derive(Clone, Copy, PartialEq)]
pub struct Toasts {
    queue: Signal<ToastQueue>,
}

impl Toasts {
    pub fn show(&self, kind: ToastKind, message: impl Into<String>) {
        let mut queue = self.queue;
        let id = queue.write().push(kind, message);
        spawn(async move {
            crate::sleep(TOAST_TIMEOUT).await;
            queue.write().dismiss(id);
        });
    }

    pub fn info(&self, message: impl Into<String>) {
        self.show(ToastKind::Info, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show(ToastKind::Success, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.show(ToastKind::Error, message);
    }

    pub fn dismiss(&self, id: u64) {
        let mut queue = self.queue;
        queue.write().dismiss(id);
    }
}

pub fn use_toasts() -> Toasts {
    use_context::<Toasts>()
}

#[component]
pub fn Toaster(children: Element) -> Element {
    let queue = use_signal(ToastQueue::default);
    let toasts = use_context_provider(|| Toasts { queue });

    rsx! {
        {children}

        if !queue().is_empty() {
            div {
                class: "toaster",
                role: "status",
                for toast in queue().items().iter().cloned() {
                    div {
                        key: "{toast.id}",
                        class: toast.kind.class(),
                        span { class: "toast-message", "{toast.message}" }
                        button {
                            class: "toast-close",
                            title: "Dismiss",
                            onclick: move |_| toasts.dismiss(toast.id),
                            Icon { icon: FaXmark, width: 12, height: 12 }
                        }
                    }
                }
            }
        }
    }
}
