use api::queries;
use dioxus::prelude::*;
use portal::GalleryItem;

use crate::{report_error, use_backend, EmptyState, Loading};

/// Grid of photos, newest first.
#[component]
pub fn GalleryGrid(items: Vec<GalleryItem>) -> Element {
    if items.is_empty() {
        return rsx! {
            EmptyState { message: "No photos yet." }
        };
    }

    rsx! {
        div {
            class: "gallery-grid",
            for item in items {
                figure {
                    key: "{item.id}",
                    class: "gallery-item",
                    img { src: "{item.image_url}", alt: "{item.title}", loading: "lazy" }
                    figcaption {
                        strong { "{item.title}" }
                        if let Some(date) = item.event_date {
                            span { class: "muted", {date.format("%d %b %Y").to_string()} }
                        }
                    }
                }
            }
        }
    }
}

#[component]
pub fn GalleryView() -> Element {
    let client = use_backend();
    let mut items = use_signal(|| Option::<Vec<GalleryItem>>::None);

    let _loader = use_resource(move || {
        let client = client.clone();
        async move {
            let rows = match queries::fetch_gallery(&client, None).await {
                Ok(rows) => rows,
                Err(e) => {
                    report_error("Loading gallery", &e, true);
                    Vec::new()
                }
            };
            items.set(Some(rows));
        }
    });

    rsx! {
        section {
            class: "view gallery",
            h1 { "Gallery" }
            {match items() {
                Some(items) => rsx! { GalleryGrid { items } },
                None => rsx! { Loading {} },
            }}
        }
    }
}
