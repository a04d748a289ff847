//! Signed-in routes. Each renders the shared view from `ui`.

use dioxus::prelude::*;
use ui::views::{
    ActivitiesView, DashboardView, FinanceView, GalleryView, MembersView, NotificationsView,
    ReportsView,
};

#[component]
pub fn Dashboard() -> Element {
    rsx! { DashboardView {} }
}

#[component]
pub fn Finance() -> Element {
    rsx! { FinanceView {} }
}

#[component]
pub fn Activities() -> Element {
    rsx! { ActivitiesView {} }
}

#[component]
pub fn Gallery() -> Element {
    rsx! { GalleryView {} }
}

#[component]
pub fn Members() -> Element {
    rsx! { MembersView {} }
}

#[component]
pub fn Notifications() -> Element {
    rsx! { NotificationsView {} }
}

#[component]
pub fn Reports() -> Element {
    rsx! { ReportsView {} }
}
