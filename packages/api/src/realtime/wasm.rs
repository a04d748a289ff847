//! Websocket transport on the browser `WebSocket` API.

use std::sync::Weak;
use std::time::Duration;

use futures::channel::mpsc::{self, UnboundedReceiver};
use futures::{select, StreamExt};
use gloo_timers::future::IntervalStream;
use tracing::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CloseEvent, MessageEvent, WebSocket};

use super::{Frame, Shared};
use crate::error::ApiError;

enum SocketEvent {
    Open,
    Text(String),
    Closed,
}

pub(super) fn spawn(
    url: String,
    heartbeat: Duration,
    outgoing: UnboundedReceiver<String>,
    shared: Weak<Shared>,
) {
    wasm_bindgen_futures::spawn_local(async move {
        match run(&url, heartbeat, outgoing, shared).await {
            Ok(()) => debug!("realtime socket closed"),
            Err(e) => warn!("realtime socket failed: {e}"),
        }
    });
}

fn js_error(value: JsValue) -> ApiError {
    ApiError::Realtime(format!("{value:?}"))
}

async fn run(
    url: &str,
    heartbeat: Duration,
    mut outgoing: UnboundedReceiver<String>,
    shared: Weak<Shared>,
) -> Result<(), ApiError> {
    let socket = WebSocket::new(url).map_err(js_error)?;
    let (events_tx, mut events) = mpsc::unbounded::<SocketEvent>();

    let tx = events_tx.clone();
    let on_open = Closure::<dyn FnMut()>::new(move || {
        let _ = tx.unbounded_send(SocketEvent::Open);
    });
    let tx = events_tx.clone();
    let on_message = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
        if let Some(text) = event.data().as_string() {
            let _ = tx.unbounded_send(SocketEvent::Text(text));
        }
    });
    let tx = events_tx;
    let on_close = Closure::<dyn FnMut(CloseEvent)>::new(move |_event: CloseEvent| {
        let _ = tx.unbounded_send(SocketEvent::Closed);
    });
    socket.set_onopen(Some(on_open.as_ref().unchecked_ref()));
    socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
    socket.set_onclose(Some(on_close.as_ref().unchecked_ref()));

    let result = pump(&socket, heartbeat, &mut outgoing, &mut events, shared).await;

    socket.set_onopen(None);
    socket.set_onmessage(None);
    socket.set_onclose(None);
    let _ = socket.close();
    result
}

async fn pump(
    socket: &WebSocket,
    heartbeat: Duration,
    outgoing: &mut UnboundedReceiver<String>,
    events: &mut UnboundedReceiver<SocketEvent>,
    shared: Weak<Shared>,
) -> Result<(), ApiError> {
    // Frames queued before the socket opened stay in `outgoing` until then.
    loop {
        match events.next().await {
            Some(SocketEvent::Open) => break,
            Some(SocketEvent::Text(_)) => {}
            Some(SocketEvent::Closed) | None => {
                return Err(ApiError::Realtime("closed before opening".to_string()));
            }
        }
    }

    let millis = u32::try_from(heartbeat.as_millis()).unwrap_or(u32::MAX);
    let mut ticks = IntervalStream::new(millis).fuse();
    let mut heartbeat_ref = 0u64;

    loop {
        select! {
            frame = outgoing.next() => match frame {
                Some(text) => socket.send_with_str(&text).map_err(js_error)?,
                None => return Ok(()),
            },
            event = events.next() => match event {
                Some(SocketEvent::Text(text)) => {
                    let Some(shared) = shared.upgrade() else {
                        return Ok(());
                    };
                    shared.handle_text(&text);
                }
                Some(SocketEvent::Open) => {}
                Some(SocketEvent::Closed) | None => return Ok(()),
            },
            _ = ticks.next() => {
                heartbeat_ref += 1;
                socket
                    .send_with_str(&Frame::heartbeat(heartbeat_ref).encode()?)
                    .map_err(js_error)?;
            }
        }
    }
}
