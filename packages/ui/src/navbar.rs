use dioxus::prelude::*;

use crate::icons::FaUser;
use crate::{use_auth, Icon, LogoutButton, ThemeToggle};

/// Top bar of the signed-in shell. Platform crates pass their router links
/// as children.
#[component]
pub fn Navbar(children: Element) -> Element {
    rsx! {
        header {
            class: "navbar",
            span { class: "navbar-brand", "Residents' Portal" }
            nav {
                class: "navbar-links",
                {children}
            }
            UserMenu {}
        }
    }
}

/// Small counter next to a navigation link; hidden at zero.
#[component]
pub fn NavBadge(count: usize) -> Element {
    if count == 0 {
        return rsx! {};
    }
    rsx! {
        span { class: "nav-badge", {portal::format::badge_count(count)} }
    }
}

#[component]
pub fn UserMenu() -> Element {
    let auth = use_auth();
    let state = auth();
    let role = state.roles.primary().map(|r| r.label());

    rsx! {
        div {
            class: "user-menu",
            Icon { width: 14, height: 14, icon: FaUser }
            span { class: "user-menu-name", "{state.display_name()}" }
            if let Some(role) = role {
                span { class: "user-menu-role", "{role}" }
            }
            ThemeToggle {}
            LogoutButton { class: "secondary" }
        }
    }
}
