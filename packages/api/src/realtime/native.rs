//! Websocket transport on tokio.

use std::sync::Weak;
use std::time::Duration;

use futures::channel::mpsc::UnboundedReceiver;
use futures::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

use super::{Frame, Shared};
use crate::error::ApiError;

pub(super) fn spawn(
    url: String,
    heartbeat: Duration,
    outgoing: UnboundedReceiver<String>,
    shared: Weak<Shared>,
) {
    tokio::spawn(async move {
        match run(&url, heartbeat, outgoing, shared).await {
            Ok(()) => debug!("realtime socket closed"),
            Err(e) => warn!("realtime socket failed: {e}"),
        }
    });
}

fn socket_error(e: impl std::fmt::Display) -> ApiError {
    ApiError::Realtime(e.to_string())
}

async fn run(
    url: &str,
    heartbeat: Duration,
    mut outgoing: UnboundedReceiver<String>,
    shared: Weak<Shared>,
) -> Result<(), ApiError> {
    let (stream, _) = tokio_tungstenite::connect_async(url)
        .await
        .map_err(socket_error)?;
    let (mut sink, mut source) = stream.split();
    let mut ticker = tokio::time::interval(heartbeat);
    ticker.tick().await;
    let mut heartbeat_ref = 0u64;

    loop {
        tokio::select! {
            frame = outgoing.next() => match frame {
                Some(text) => sink.send(Message::Text(text)).await.map_err(socket_error)?,
                None => {
                    let _ = sink.close().await;
                    return Ok(());
                }
            },
            incoming = source.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    let Some(shared) = shared.upgrade() else {
                        return Ok(());
                    };
                    shared.handle_text(&text);
                }
                Some(Ok(Message::Close(_))) | None => return Ok(()),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(socket_error(e)),
            },
            _ = ticker.tick() => {
                heartbeat_ref += 1;
                let text = Frame::heartbeat(heartbeat_ref).encode()?;
                sink.send(Message::Text(text)).await.map_err(socket_error)?;
            }
        }
    }
}
