//! Public landing page. Keeps itself current through realtime subscriptions
//! on the tables it summarises.

use std::cell::RefCell;
use std::rc::Rc;

use api::{queries, ChangeEvent, RealtimeClient, RealtimeSubscription};
use chrono::Utc;
use dioxus::prelude::*;
use futures::StreamExt;
use portal::{GalleryItem, LandingStats, UpcomingActivity};
use tracing::debug;

use super::{GalleryGrid, UpcomingList};
use crate::{or_default, use_backend, StatCard};

/// Tables whose changes refresh the landing page.
pub const WATCHED_TABLES: [&str; 3] = [
    queries::tables::PROFILES,
    queries::tables::ACTIVITIES,
    queries::tables::GALLERY,
];
const PREVIEW_PHOTOS: usize = 6;
const PREVIEW_ACTIVITIES: usize = 3;

#[derive(Clone, Debug, Default, PartialEq)]
struct Landing {
    stats: LandingStats,
    upcoming: Vec<UpcomingActivity>,
    gallery: Vec<GalleryItem>,
}

/// `children` is the sign-in call to action, rendered in the hero.
#[component]
pub fn LandingView(children: Element) -> Element {
    let client = use_backend();
    let prefix = client.config().display.currency_prefix.clone();
    let mut landing = use_signal(Landing::default);

    let loader_client = client.clone();
    let loader = use_resource(move || {
        let client = loader_client.clone();
        async move {
            let now = Utc::now();
            let (stats, upcoming, gallery) = futures::join!(
                queries::fetch_landing_stats(&client, now),
                queries::fetch_upcoming_activities(&client, now, Some(PREVIEW_ACTIVITIES)),
                queries::fetch_gallery(&client, Some(PREVIEW_PHOTOS)),
            );
            landing.set(Landing {
                stats: or_default("Loading statistics", stats),
                upcoming: or_default("Loading activities", upcoming),
                gallery: or_default("Loading gallery", gallery),
            });
        }
    });

    let subscriptions = use_hook(|| Rc::new(RefCell::new(Vec::<RealtimeSubscription>::new())));
    let held = subscriptions.clone();
    use_hook(move || {
        let (tx, mut rx) = futures::channel::mpsc::unbounded::<ChangeEvent>();
        let realtime = RealtimeClient::connect(&client);
        let mut guard = held.borrow_mut();
        for table in WATCHED_TABLES {
            let tx = tx.clone();
            guard.push(realtime.subscribe(table, move |event| {
                let _ = tx.unbounded_send(event);
            }));
        }

        let mut loader = loader;
        spawn(async move {
            while let Some(event) = rx.next().await {
                debug!("{:?} on {}, refreshing landing page", event.kind, event.table);
                loader.restart();
            }
        });
    });
    use_drop(move || subscriptions.borrow_mut().clear());

    let data = landing();

    rsx! {
        section {
            class: "view landing",
            div {
                class: "hero",
                h1 { "Residents' Association" }
                p { "Dues, activities and news for our neighbourhood, in one place." }
                {children}
            }
            div {
                class: "stat-grid",
                StatCard { label: "Active members", value: "{data.stats.active_members}" }
                StatCard { label: "Upcoming activities", value: "{data.stats.upcoming_activities}" }
                StatCard { label: "Photos", value: "{data.stats.gallery_items}" }
            }
            div {
                class: "panel",
                h2 { "Coming up" }
                UpcomingList { activities: data.upcoming, prefix }
            }
            div {
                class: "panel",
                h2 { "Latest photos" }
                GalleryGrid { items: data.gallery }
            }
        }
    }
}
