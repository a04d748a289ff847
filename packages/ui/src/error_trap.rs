//! Top-level trap for errors raised while rendering.
//!
//! [`RenderErrorTrap`] wraps the router in an `ErrorBoundary`. A caught error
//! replaces the page with a recovery screen offering "Try again" (clears the
//! error and re-renders) and "Home". Every caught error bumps an
//! [`ErrorCounter`]; from [`SUPPORT_HINT_AFTER`] errors on, the screen also
//! suggests contacting the association's administrators.

use dioxus::prelude::*;

use crate::icons::{FaHouse, FaRotateRight, FaTriangleExclamation};
use crate::Icon;

pub const SUPPORT_HINT_AFTER: u32 = 3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ErrorCounter {
    count: u32,
}

impl ErrorCounter {
    /// Count one more caught error and return the new total.
    pub fn record(&mut self) -> u32 {
        self.count = self.count.saturating_add(1);
        self.count
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn suggests_support(&self) -> bool {
        self.count >= SUPPORT_HINT_AFTER
    }
}

#[component]
pub fn RenderErrorTrap(children: Element) -> Element {
    let counter = use_signal(ErrorCounter::default);

    rsx! {
        ErrorBoundary {
            handle_error: move |errors: ErrorContext| {
                let message = errors
                    .error()
                    .map(|e| e.to_string())
                    .unwrap_or_default();
                let retry = errors.clone();
                let home = errors.clone();
                rsx! {
                    RecoveryScreen {
                        message,
                        counter,
                        on_retry: move |_| retry.clear_errors(),
                        on_home: move |_| {
                            home.clear_errors();
                            go_home();
                        },
                    }
                }
            },
            {children}
        }
    }
}

fn go_home() {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(window) = web_sys::window() {
            let _ = window.location().set_href("/");
        }
    }
    // Off the web the router re-renders its current route once cleared.
}

#[component]
fn RecoveryScreen(
    message: String,
    counter: Signal<ErrorCounter>,
    on_retry: EventHandler<()>,
    on_home: EventHandler<()>,
) -> Element {
    // Count once per mounted recovery screen.
    use_effect(move || {
        let total = counter.write().record();
        tracing::error!("render error #{total}");
    });
    let report = portal::ErrorReport::classify(&message);

    rsx! {
        div {
            class: "recovery-screen",
            Icon { icon: FaTriangleExclamation, width: 40, height: 40 }
            h1 { "Something went wrong" }
            p { class: "recovery-message", "{report.message()}" }
            if counter().suggests_support() {
                p {
                    class: "recovery-support",
                    "This keeps happening. Please contact the association's administrators."
                }
            }
            div {
                class: "recovery-actions",
                button {
                    class: "primary",
                    onclick: move |_| on_retry.call(()),
                    Icon { icon: FaRotateRight, width: 14, height: 14 }
                    "Try again"
                }
                button {
                    class: "secondary",
                    onclick: move |_| on_home.call(()),
                    Icon { icon: FaHouse, width: 14, height: 14 }
                    "Home"
                }
            }
        }
    }
}
