use api::{queries, Dashboard};
use chrono::Utc;
use dioxus::prelude::*;
use portal::aggregate::month_short_name;
use portal::format::{currency, percent_change};
use portal::insights;

use crate::{or_default, use_auth, use_backend, BarChart, InsightList, Loading, StatCard};
use super::UpcomingList;

/// Signed-in overview: headline figures, dues chart, upcoming activities and
/// insights.
#[component]
pub fn DashboardView() -> Element {
    let client = use_backend();
    let auth = use_auth();
    let prefix = client.config().display.currency_prefix.clone();
    let mut dashboard = use_signal(|| Option::<Dashboard>::None);

    let _loader = use_resource(move || {
        let client = client.clone();
        let user_id = auth().user_id();
        async move {
            let data = or_default(
                "Loading dashboard",
                queries::fetch_dashboard(&client, user_id, Utc::now()).await,
            );
            dashboard.set(Some(data));
        }
    });

    let Some(data) = dashboard() else {
        return rsx! { Loading {} };
    };
    let stats = &data.stats;
    let trend = insights::month_over_month(stats.previous_month_dues, stats.current_month_dues)
        .map(|insight| match insight {
            portal::Insight::DuesIncrease { percent } => percent_change(percent),
            portal::Insight::DuesDecrease { percent } => percent_change(-percent),
            _ => String::new(),
        });
    let balance_tone = if stats.finance.balance < 0.0 { "stat-card--warning" } else { "" };
    let labels: Vec<String> = (1..=12).map(|m| month_short_name(m).to_string()).collect();

    rsx! {
        section {
            class: "view dashboard",
            h1 { "Dashboard" }
            div {
                class: "stat-grid",
                StatCard {
                    label: "Members",
                    value: "{stats.members.total}",
                    detail: format!("{} active, {} pending", stats.members.active, stats.members.pending),
                }
                StatCard {
                    label: "Dues this month",
                    value: currency(stats.current_month_dues, &prefix),
                    detail: trend,
                }
                StatCard {
                    label: "Balance",
                    value: currency(stats.finance.balance, &prefix),
                    tone: balance_tone,
                }
                StatCard { label: "Active polls", value: "{stats.active_polls}" }
                StatCard { label: "Upcoming activities", value: "{stats.upcoming_activities}" }
                StatCard { label: "Unread notifications", value: "{stats.unread_notifications}" }
            }
            div {
                class: "panel-grid",
                div {
                    class: "panel",
                    BarChart {
                        title: "Dues collected this year",
                        values: data.monthly_dues.to_vec(),
                        labels,
                        prefix: prefix.clone(),
                    }
                }
                div {
                    class: "panel",
                    h2 { "Insights" }
                    InsightList { insights: data.insights() }
                }
            }
            div {
                class: "panel",
                h2 { "Upcoming activities" }
                UpcomingList { activities: data.upcoming.clone(), prefix }
            }
        }
    }
}
