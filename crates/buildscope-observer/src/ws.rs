//! `WebSocket` handler for live graph streaming.
//!
//! Clients connect to `GET /ws/graph` and first receive the current graph
//! and playback status, then a JSON-encoded [`LiveUpdate`] each time the
//! timeline publishes one. All connected clients share one broadcast
//! channel.
//!
//! If a client falls behind, lagged messages are skipped. Graph updates
//! are whole snapshots, so the next one brings the client up to date.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::stream::SplitSink;
use futures::{SinkExt as _, StreamExt as _};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::state::{AppState, LiveUpdate};

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming graph updates.
///
/// # Route
///
/// `GET /ws/graph`
pub async fn ws_graph(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

type WsSender = SplitSink<WebSocket, Message>;

/// Send one update as a text frame. Serialization failures are logged
/// and skipped.
async fn send_update(sender: &mut WsSender, update: &LiveUpdate) -> Result<(), axum::Error> {
    let json = match serde_json::to_string(update) {
        Ok(json) => json,
        Err(e) => {
            warn!("Failed to serialize live update: {e}");
            return Ok(());
        }
    };
    sender.send(Message::Text(json.into())).await
}

/// Handle the `WebSocket` lifecycle: send the current state, then
/// forward each broadcast update until either side goes away.
async fn handle_ws(socket: WebSocket, state: Arc<AppState>) {
    debug!("WebSocket client connected");

    // Subscribe before reading the snapshots so nothing published in
    // between is lost.
    let mut rx = state.subscribe();
    let opening = [
        LiveUpdate::Graph(state.graph.borrow().clone()),
        LiveUpdate::Playback(state.playback.borrow().clone()),
    ];

    let (mut sender, mut receiver) = socket.split();
    for update in &opening {
        if send_update(&mut sender, update).await.is_err() {
            debug!("WebSocket client disconnected (send failed)");
            return;
        }
    }

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(update) => {
                        if send_update(&mut sender, &update).await.is_err() {
                            debug!("WebSocket client disconnected (send failed)");
                            return;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        debug!(skipped = n, "WebSocket client lagged, skipping ahead");
                    }
                    Err(RecvError::Closed) => {
                        debug!("Broadcast channel closed, shutting down WebSocket");
                        return;
                    }
                }
            }
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            debug!("WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {e}");
                        return;
                    }
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}
