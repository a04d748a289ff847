use dioxus::prelude::*;

use crate::icons::FaRightToBracket;
use crate::{report_error, use_backend, Icon};

/// Email and password sign-in. The auth provider picks the new session up from
/// its event stream; the route decides where to go once it is applied.
#[component]
pub fn LoginView() -> Element {
    let client = use_backend();
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut submitting = use_signal(|| false);

    let onsubmit = move |evt: FormEvent| {
        evt.prevent_default();
        let client = client.clone();
        async move {
            if submitting() {
                return;
            }
            submitting.set(true);
            error.set(None);
            match client.auth().sign_in_with_password(&email(), &password()).await {
                Ok(_) => password.set(String::new()),
                Err(e) => {
                    let report = report_error("Signing in", &e, false);
                    error.set(Some(report.message().to_string()));
                }
            }
            submitting.set(false);
        }
    };

    rsx! {
        div {
            class: "login-container",
            form {
                class: "login-card",
                onsubmit: onsubmit,
                h1 { "Sign in" }
                p { class: "muted", "Use the email address registered with the association." }
                label { r#for: "login-email", "Email" }
                input {
                    id: "login-email",
                    r#type: "email",
                    autocomplete: "username",
                    value: "{email}",
                    oninput: move |evt| email.set(evt.value()),
                }
                label { r#for: "login-password", "Password" }
                input {
                    id: "login-password",
                    r#type: "password",
                    autocomplete: "current-password",
                    value: "{password}",
                    oninput: move |evt| password.set(evt.value()),
                }
                if let Some(message) = error() {
                    p { class: "form-error", "{message}" }
                }
                button {
                    class: "primary",
                    r#type: "submit",
                    disabled: submitting(),
                    Icon { width: 14, height: 14, icon: FaRightToBracket }
                    if submitting() { "Signing in..." } else { "Sign in" }
                }
            }
        }
    }
}
