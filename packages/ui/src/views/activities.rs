use api::queries;
use chrono::Utc;
use dioxus::prelude::*;
use portal::format::currency;
use portal::{Activity, UpcomingActivity};

use crate::{report_error, use_backend, EmptyState, Loading};

const DATE_FORMAT: &str = "%d %b %Y, %H:%M";

/// Upcoming activities with their registration counts.
#[component]
pub fn UpcomingList(activities: Vec<UpcomingActivity>, #[props(default)] prefix: String) -> Element {
    if activities.is_empty() {
        return rsx! {
            EmptyState { message: "No upcoming activities." }
        };
    }

    rsx! {
        ul {
            class: "activity-list",
            for item in activities {
                li {
                    key: "{item.activity.id}",
                    class: "activity",
                    div {
                        class: "activity-main",
                        strong { "{item.activity.title}" }
                        span { class: "muted", {item.activity.start_time.format(DATE_FORMAT).to_string()} }
                        if let Some(location) = &item.activity.location {
                            span { class: "muted", "{location}" }
                        }
                    }
                    div {
                        class: "activity-side",
                        span { {registration_label(&item)} }
                        if let Some(fee) = item.activity.fee.filter(|f| *f > 0.0) {
                            span { class: "muted", {currency(fee, &prefix)} }
                        }
                        if let Some(percent) = item.fill_percent {
                            div {
                                class: "fill-bar",
                                div { class: "fill-bar-value", style: "width: {percent.min(100)}%" }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn registration_label(item: &UpcomingActivity) -> String {
    match item.activity.capacity {
        Some(capacity) => format!("{} / {capacity} registered", item.registrations),
        None => format!("{} registered", item.registrations),
    }
}

#[component]
pub fn ActivitiesView() -> Element {
    let client = use_backend();
    let prefix = client.config().display.currency_prefix.clone();
    let mut upcoming = use_signal(Vec::<UpcomingActivity>::new);
    let mut past = use_signal(Vec::<Activity>::new);
    let mut loaded = use_signal(|| false);

    let _loader = use_resource(move || {
        let client = client.clone();
        async move {
            let now = Utc::now();
            let (next, all) = futures::join!(
                queries::fetch_upcoming_activities(&client, now, None),
                queries::fetch_activities(&client),
            );
            match next {
                Ok(rows) => upcoming.set(rows),
                Err(e) => {
                    report_error("Loading upcoming activities", &e, true);
                }
            }
            match all {
                Ok(rows) => past.set(rows.into_iter().filter(|a| a.start_time <= now).collect()),
                Err(e) => {
                    report_error("Loading activities", &e, false);
                }
            }
            loaded.set(true);
        }
    });

    if !loaded() {
        return rsx! { Loading {} };
    }

    rsx! {
        section {
            class: "view activities",
            h1 { "Activities" }
            div {
                class: "panel",
                h2 { "Upcoming" }
                UpcomingList { activities: upcoming(), prefix }
            }
            div {
                class: "panel",
                h2 { "Past" }
                if past.read().is_empty() {
                    EmptyState { message: "No past activities." }
                } else {
                    ul {
                        class: "activity-list",
                        for activity in past() {
                            li {
                                key: "{activity.id}",
                                class: "activity activity--past",
                                strong { "{activity.title}" }
                                span { class: "muted", {activity.start_time.format(DATE_FORMAT).to_string()} }
                            }
                        }
                    }
                }
            }
        }
    }
}
