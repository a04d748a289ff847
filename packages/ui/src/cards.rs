use dioxus::prelude::*;
use portal::Insight;

use crate::icons::{FaCircleCheck, FaCircleExclamation, FaSpinner};
use crate::Icon;

/// One headline figure.
#[component]
pub fn StatCard(
    label: String,
    value: String,
    #[props(default)] detail: Option<String>,
    /// Extra class for colouring, e.g. `"stat-card--warning"`.
    #[props(default = "".to_string())]
    tone: String,
) -> Element {
    rsx! {
        div {
            class: "stat-card {tone}",
            span { class: "stat-card-label", "{label}" }
            strong { class: "stat-card-value", "{value}" }
            if let Some(detail) = detail {
                span { class: "stat-card-detail", "{detail}" }
            }
        }
    }
}

#[component]
pub fn InsightList(insights: Vec<Insight>) -> Element {
    if insights.is_empty() {
        return rsx! {
            EmptyState { message: "Nothing needs attention right now." }
        };
    }

    rsx! {
        ul {
            class: "insight-list",
            for (idx, insight) in insights.iter().enumerate() {
                li {
                    key: "{idx}",
                    class: if insight.is_warning() { "insight insight--warning" } else { "insight" },
                    if insight.is_warning() {
                        Icon { width: 14, height: 14, icon: FaCircleExclamation }
                    } else {
                        Icon { width: 14, height: 14, icon: FaCircleCheck }
                    }
                    span { {insight.message()} }
                }
            }
        }
    }
}

#[component]
pub fn EmptyState(message: String) -> Element {
    rsx! {
        p { class: "empty-state", "{message}" }
    }
}

#[component]
pub fn Loading(#[props(default = "Loading...".to_string())] label: String) -> Element {
    rsx! {
        div {
            class: "loading",
            Icon { width: 16, height: 16, icon: FaSpinner }
            span { "{label}" }
        }
    }
}
