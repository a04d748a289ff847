use api::queries;
use dioxus::prelude::*;
use portal::notifications::unread_count;
use portal::Notification;

use crate::{report_error, use_auth, use_backend, EmptyState, Loading};

#[component]
pub fn NotificationsView() -> Element {
    let client = use_backend();
    let auth = use_auth();
    let mut rows = use_signal(|| Option::<Vec<Notification>>::None);

    let _loader = use_resource(move || {
        let client = client.clone();
        let user_id = auth().user_id();
        async move {
            let Some(user_id) = user_id else {
                rows.set(Some(Vec::new()));
                return;
            };
            let fetched = match queries::fetch_notifications(&client, user_id).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    report_error("Loading notifications", &e, true);
                    Vec::new()
                }
            };
            rows.set(Some(fetched));
        }
    });

    let Some(rows) = rows() else {
        return rsx! { Loading {} };
    };
    let unread = auth().user_id().map(|id| unread_count(&rows, id)).unwrap_or(0);

    rsx! {
        section {
            class: "view notifications",
            h1 { "Notifications" }
            p { class: "muted", "{unread} unread" }
            if rows.is_empty() {
                EmptyState { message: "You have no notifications." }
            } else {
                ul {
                    class: "notification-list",
                    for notification in rows {
                        li {
                            key: "{notification.id}",
                            class: if notification.is_read { "notification" } else { "notification notification--unread" },
                            div {
                                class: "notification-head",
                                strong { "{notification.title}" }
                                if notification.user_id.is_none() {
                                    span { class: "tag", "Everyone" }
                                }
                                span { class: "muted", {notification.created_at.format("%d %b %Y, %H:%M").to_string()} }
                            }
                            if let Some(message) = &notification.message {
                                p { "{message}" }
                            }
                        }
                    }
                }
            }
        }
    }
}
