//! `WebSocket` handler: one connection is one chat channel.
//!
//! Clients connect to `GET /ws` and first receive a `hello` frame carrying
//! the channel and actor ids assigned to the connection. After that, every
//! [`ClientFrame`] the client sends is queued as an
//! [`InboundEvent`](crate::state::InboundEvent), and every broadcast
//! [`ServerFrame`] visible to the channel is forwarded as a text frame.
//!
//! If a client falls behind, lagged frames are skipped and the client
//! resumes from the most recent one.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use lifebot_types::{ActorId, ChannelId, ClientFrame, ServerFrame};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::error::GatewayError;
use crate::state::{AppState, InboundEvent};

/// Upgrade an HTTP request to a `WebSocket` chat connection.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_chat(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

fn encode(frame: &ServerFrame) -> Result<Message, GatewayError> {
    let json = serde_json::to_string(frame)?;
    Ok(Message::Text(json.into()))
}

/// Handle the `WebSocket` lifecycle for one channel.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let channel = ChannelId::new();
    let actor = ActorId::new();
    debug!(%channel, %actor, "WebSocket client connected");

    // Subscribe before greeting so no frame published in between is lost.
    let mut rx = state.subscribe();

    let hello = ServerFrame::Hello { channel, actor };
    match encode(&hello) {
        Ok(msg) => {
            if socket.send(msg).await.is_err() {
                debug!(%channel, "WebSocket client disconnected (hello failed)");
                return;
            }
        }
        Err(e) => {
            warn!(%channel, error = %e, "Failed to serialize hello frame");
            return;
        }
    }

    loop {
        tokio::select! {
            // Forward frames published by the bot.
            result = rx.recv() => {
                match result {
                    Ok(frame) => {
                        if !frame.visible_to(channel) {
                            continue;
                        }
                        let msg = match encode(&frame) {
                            Ok(m) => m,
                            Err(e) => {
                                warn!(%channel, error = %e, "Failed to serialize frame");
                                continue;
                            }
                        };
                        if socket.send(msg).await.is_err() {
                            debug!(%channel, "WebSocket client disconnected (send failed)");
                            return;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        debug!(%channel, skipped = n, "WebSocket client lagged, skipping ahead");
                    }
                    Err(RecvError::Closed) => {
                        debug!(%channel, "Broadcast channel closed, shutting down WebSocket");
                        return;
                    }
                }
            }
            // Queue what the client sends.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let frame: ClientFrame = match serde_json::from_str(text.as_str()) {
                            Ok(f) => f,
                            Err(e) => {
                                warn!(%channel, error = %e, "Ignoring malformed client frame");
                                continue;
                            }
                        };
                        let event = InboundEvent::from_client(frame, channel, actor);
                        if let Err(e) = state.submit(event).await {
                            debug!(%channel, error = %e, "Closing WebSocket");
                            return;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(%channel, "WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!(%channel, "WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(%channel, "WebSocket error: {e}");
                        return;
                    }
                    _ => {
                        // Binary and pong frames carry nothing for us.
                    }
                }
            }
        }
    }
}
