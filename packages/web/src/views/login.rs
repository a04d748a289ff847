//! Login page. Members go to the dashboard once the auth provider has applied
//! their session, whether restored on load or from a fresh sign-in.

use dioxus::prelude::*;
use ui::use_auth;
use ui::views::LoginView;

use crate::Route;

#[component]
pub fn Login() -> Element {
    let auth = use_auth();
    let nav = use_navigator();

    use_effect(move || {
        if auth().is_ready() {
            nav.replace(Route::Dashboard {});
        }
    });

    rsx! {
        LoginView {}
    }
}
