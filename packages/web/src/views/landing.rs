use dioxus::prelude::*;
use ui::use_auth;
use ui::views::LandingView;

use crate::Route;

#[component]
pub fn Landing() -> Element {
    let auth = use_auth();

    rsx! {
        LandingView {
            if auth().is_authenticated() {
                Link { class: "button primary", to: Route::Dashboard {}, "Open dashboard" }
            } else {
                Link { class: "button primary", to: Route::Login {}, "Member sign in" }
            }
        }
    }
}
