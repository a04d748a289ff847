//! Row-change subscriptions over the realtime websocket.
//!
//! A [`RealtimeClient`] owns one socket. Each [`RealtimeClient::subscribe`] call
//! registers a callback for a table; the first subscriber of a table joins its
//! channel and the last one to drop its [`RealtimeSubscription`] leaves it.
//! Frames to the socket go through an unbounded channel so subscribing never
//! waits on the network. The socket task holds only a weak handle and stops
//! once the client and every subscription are gone.

mod protocol;

#[cfg(not(target_arch = "wasm32"))]
mod native;
#[cfg(target_arch = "wasm32")]
mod wasm;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use crate::client::BackendClient;

pub use protocol::{change_event, topic_for, ChangeEvent, ChangeKind, Frame};

type Callback = Arc<dyn Fn(ChangeEvent) + Send + Sync>;

struct Shared {
    subscribers: Mutex<HashMap<String, Vec<(u64, Callback)>>>,
    next_id: AtomicU64,
    next_ref: AtomicU64,
    access_token: Option<String>,
    outgoing: UnboundedSender<String>,
}

impl Shared {
    fn next_ref(&self) -> u64 {
        self.next_ref.fetch_add(1, Ordering::Relaxed)
    }

    fn send(&self, frame: Frame) {
        let text = match frame.encode() {
            Ok(text) => text,
            Err(e) => {
                warn!("could not encode {} frame: {e}", frame.event);
                return;
            }
        };
        if self.outgoing.unbounded_send(text).is_err() {
            debug!("realtime socket closed, dropping {} frame", frame.event);
        }
    }

    /// Route one incoming text frame to the callbacks of its topic.
    fn handle_text(&self, text: &str) {
        let frame = match Frame::decode(text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("undecodable realtime frame: {e}");
                return;
            }
        };
        if let Some(reason) = frame.reply_error() {
            warn!("realtime {} rejected: {reason}", frame.topic);
            return;
        }
        let Some(event) = change_event(&frame) else {
            return;
        };
        let callbacks: Vec<Callback> = match self.subscribers.lock() {
            Ok(subscribers) => subscribers
                .get(&frame.topic)
                .map(|list| list.iter().map(|(_, cb)| cb.clone()).collect())
                .unwrap_or_default(),
            Err(_) => return,
        };
        debug!("{:?} on {} -> {} subscribers", event.kind, event.table, callbacks.len());
        for callback in callbacks {
            callback(event.clone());
        }
    }
}

#[derive(Clone)]
pub struct RealtimeClient {
    shared: Arc<Shared>,
}

impl RealtimeClient {
    /// Open the websocket for `client`'s backend and start its heartbeat.
    pub fn connect(client: &BackendClient) -> Self {
        let config = client.config();
        let token = client.session().map(|s| s.access_token);
        let (realtime, outgoing) = Self::with_channel(token);
        let heartbeat = Duration::from_secs(config.realtime.heartbeat_secs.max(1));
        let url = config.backend.realtime_url();
        debug!("connecting realtime socket");

        #[cfg(not(target_arch = "wasm32"))]
        native::spawn(url, heartbeat, outgoing, Arc::downgrade(&realtime.shared));
        #[cfg(target_arch = "wasm32")]
        wasm::spawn(url, heartbeat, outgoing, Arc::downgrade(&realtime.shared));

        realtime
    }

    /// Client whose outgoing frames land in the returned receiver.
    fn with_channel(access_token: Option<String>) -> (Self, UnboundedReceiver<String>) {
        let (outgoing, receiver) = mpsc::unbounded();
        let shared = Arc::new(Shared {
            subscribers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            next_ref: AtomicU64::new(1),
            access_token,
            outgoing,
        });
        (Self { shared }, receiver)
    }

    /// Call `callback` for every insert, update or delete on `table`.
    pub fn subscribe(
        &self,
        table: &str,
        callback: impl Fn(ChangeEvent) + Send + Sync + 'static,
    ) -> RealtimeSubscription {
        let topic = topic_for(table);
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        let first = match self.shared.subscribers.lock() {
            Ok(mut subscribers) => {
                let list = subscribers.entry(topic.clone()).or_default();
                list.push((id, Arc::new(callback)));
                list.len() == 1
            }
            Err(_) => false,
        };
        if first {
            let reference = self.shared.next_ref();
            self.shared.send(Frame::join(
                table,
                reference,
                self.shared.access_token.as_deref(),
            ));
        }
        RealtimeSubscription {
            shared: self.shared.clone(),
            topic,
            id,
        }
    }
}

/// Keeps a callback registered. Dropping it unregisters, leaving the channel
/// when no other subscriber of the table remains.
pub struct RealtimeSubscription {
    shared: Arc<Shared>,
    topic: String,
    id: u64,
}

impl RealtimeSubscription {
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl Drop for RealtimeSubscription {
    fn drop(&mut self) {
        let last = match self.shared.subscribers.lock() {
            Ok(mut subscribers) => {
                let Some(list) = subscribers.get_mut(&self.topic) else {
                    return;
                };
                list.retain(|(id, _)| *id != self.id);
                let empty = list.is_empty();
                if empty {
                    subscribers.remove(&self.topic);
                }
                empty
            }
            Err(_) => false,
        };
        if last {
            let reference = self.shared.next_ref();
            self.shared.send(Frame::leave(&self.topic, reference));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures::StreamExt;
    use std::sync::atomic::AtomicUsize;

    fn next_frame(receiver: &mut UnboundedReceiver<String>) -> Frame {
        let text = block_on(receiver.next()).unwrap();
        Frame::decode(&text).unwrap()
    }

    fn counter() -> (Arc<AtomicUsize>, impl Fn(ChangeEvent) + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = count.clone();
        (count, move |_event: ChangeEvent| {
            inner.fetch_add(1, Ordering::SeqCst);
        })
    }

    const PROFILE_INSERT: &str = r#"{"topic":"realtime:public:profiles","event":"postgres_changes",
        "payload":{"data":{"type":"INSERT","table":"profiles","record":{"id":"p1"}}}}"#;

    #[test]
    fn test_join_once_per_table() {
        let (realtime, mut frames) = RealtimeClient::with_channel(Some("jwt".to_string()));
        let _a = realtime.subscribe("profiles", |_| {});
        let _b = realtime.subscribe("profiles", |_| {});

        let join = next_frame(&mut frames);
        assert_eq!(join.event, "phx_join");
        assert_eq!(join.topic, "realtime:public:profiles");
        assert_eq!(join.payload["access_token"], "jwt");

        let _c = realtime.subscribe("gallery", |_| {});
        assert_eq!(next_frame(&mut frames).topic, "realtime:public:gallery");
    }

    #[test]
    fn test_dispatch_to_topic_subscribers() {
        let (realtime, _frames) = RealtimeClient::with_channel(None);
        let (profiles_a, cb_a) = counter();
        let (profiles_b, cb_b) = counter();
        let (gallery, cb_g) = counter();
        let _a = realtime.subscribe("profiles", cb_a);
        let _b = realtime.subscribe("profiles", cb_b);
        let _g = realtime.subscribe("gallery", cb_g);

        realtime.shared.handle_text(PROFILE_INSERT);
        realtime.shared.handle_text("not json");

        assert_eq!(profiles_a.load(Ordering::SeqCst), 1);
        assert_eq!(profiles_b.load(Ordering::SeqCst), 1);
        assert_eq!(gallery.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_leave_after_last_drop() {
        let (realtime, mut frames) = RealtimeClient::with_channel(None);
        let (count, cb) = counter();
        let first = realtime.subscribe("profiles", cb);
        let second = realtime.subscribe("profiles", |_| {});
        assert_eq!(next_frame(&mut frames).event, "phx_join");

        drop(first);
        realtime.shared.handle_text(PROFILE_INSERT);
        assert_eq!(count.load(Ordering::SeqCst), 0);

        // Still one subscriber, so the next frame is the gallery join.
        let _g = realtime.subscribe("gallery", |_| {});
        assert_eq!(next_frame(&mut frames).topic, "realtime:public:gallery");

        drop(second);
        let leave = next_frame(&mut frames);
        assert_eq!(leave.event, "phx_leave");
        assert_eq!(leave.topic, "realtime:public:profiles");
    }
}
