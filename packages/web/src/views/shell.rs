use api::queries;
use dioxus::prelude::*;
use ui::{or_default, use_auth, use_backend, Loading, NavBadge, Navbar};

use crate::Route;

/// Layout for every signed-in route: redirects anonymous visitors to the
/// login page and shows the navigation bar with notification and poll counts.
#[component]
pub fn PortalShell() -> Element {
    let auth = use_auth();
    let client = use_backend();
    let nav = use_navigator();
    let mut unread = use_signal(|| 0usize);
    let mut active_polls = use_signal(|| 0usize);

    use_effect(move || {
        if auth().needs_login() {
            nav.replace(Route::Login {});
        }
    });

    let _badges = use_resource(move || {
        let client = client.clone();
        let user_id = auth().user_id();
        async move {
            let Some(user_id) = user_id else {
                return;
            };
            let (notifications, polls) = futures::join!(
                queries::fetch_unread_notifications(&client, user_id),
                queries::count_active_polls(&client),
            );
            unread.set(or_default("Counting notifications", notifications));
            active_polls.set(or_default("Counting polls", polls));
        }
    });

    let state = auth();
    if !state.is_ready() {
        return rsx! { Loading {} };
    }
    let caps = state.capabilities();

    rsx! {
        Navbar {
            Link { to: Route::Dashboard {}, active_class: "active",
                "Dashboard"
                NavBadge { count: active_polls() }
            }
            Link { to: Route::Finance {}, active_class: "active", "Finance" }
            Link { to: Route::Activities {}, active_class: "active", "Activities" }
            Link { to: Route::Gallery {}, active_class: "active", "Gallery" }
            if caps.can_manage_members {
                Link { to: Route::Members {}, active_class: "active", "Members" }
            }
            Link { to: Route::Notifications {}, active_class: "active",
                "Notifications"
                NavBadge { count: unread() }
            }
            if caps.can_view_reports {
                Link { to: Route::Reports {}, active_class: "active", "Reports" }
            }
        }
        main {
            Outlet::<Route> {}
        }
    }
}
