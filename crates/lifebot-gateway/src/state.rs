//! Shared application state for the gateway.
//!
//! [`AppState`] holds the broadcast channel for outgoing frames, the
//! in-memory snapshot of the latest session render that the REST endpoints
//! serve, and the sending half of the inbound queue the engine drains.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use lifebot_types::{ActorId, ChannelId, ClientFrame, ServerFrame, TargetId};
use tokio::sync::{broadcast, mpsc, RwLock};

use crate::error::GatewayError;

/// Capacity of the broadcast channel for outgoing frames.
///
/// If a subscriber falls behind by more than this many frames it will
/// receive a [`broadcast::error::RecvError::Lagged`] and skip to the
/// newest frame.
const BROADCAST_CAPACITY: usize = 256;

/// Capacity of the inbound event queue.
pub const INBOUND_CAPACITY: usize = 64;

/// Something a user (or the bot itself) did on the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// A chat message was posted.
    Message {
        /// Channel the message was posted in.
        channel: ChannelId,
        /// Who posted it.
        author: ActorId,
        /// Raw message text.
        content: String,
    },
    /// A reaction was added to or removed from a message.
    Reaction {
        /// Channel the reaction came from.
        channel: ChannelId,
        /// Who reacted.
        actor: ActorId,
        /// The message reacted to.
        target: TargetId,
        /// The reaction emoji.
        emoji: String,
        /// `true` for an added reaction, `false` for a removed one.
        added: bool,
    },
}

impl InboundEvent {
    /// Translate a frame received on a connection.
    pub fn from_client(frame: ClientFrame, channel: ChannelId, actor: ActorId) -> Self {
        match frame {
            ClientFrame::Message { content } => Self::Message {
                channel,
                author: actor,
                content,
            },
            ClientFrame::ReactionAdd { target, emoji } => Self::Reaction {
                channel,
                actor,
                target,
                emoji,
                added: true,
            },
            ClientFrame::ReactionRemove { target, emoji } => Self::Reaction {
                channel,
                actor,
                target,
                emoji,
                added: false,
            },
        }
    }
}

/// The latest session render, served by `GET /api/session`.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct SessionSnapshot {
    /// The render target of the latest session.
    pub target: Option<TargetId>,
    /// Channel the target was posted in.
    pub channel: Option<ChannelId>,
    /// Current render text.
    pub content: String,
    /// Number of edits since the target was created.
    pub edits: u64,
    /// When the render last changed.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Broadcast sender for outgoing frames.
    pub tx: broadcast::Sender<ServerFrame>,
    /// The latest session render.
    pub snapshot: Arc<RwLock<SessionSnapshot>>,
    /// Sending half of the inbound event queue.
    pub inbound: mpsc::Sender<InboundEvent>,
    /// The bot's own actor id.
    pub bot: ActorId,
}

impl AppState {
    /// Create a new application state with an empty snapshot.
    ///
    /// Returns the state together with the receiving half of the inbound
    /// queue.
    pub fn new() -> (Self, mpsc::Receiver<InboundEvent>) {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        let (inbound, inbound_rx) = mpsc::channel(INBOUND_CAPACITY);
        let state = Self {
            tx,
            snapshot: Arc::new(RwLock::new(SessionSnapshot::default())),
            inbound,
            bot: ActorId::new(),
        };
        (state, inbound_rx)
    }

    /// Subscribe to the outgoing frame stream.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerFrame> {
        self.tx.subscribe()
    }

    /// Publish a frame to all connected clients.
    ///
    /// Returns the number of receivers that received the frame.
    /// Returns 0 if no clients are connected (this is not an error).
    pub fn broadcast(&self, frame: ServerFrame) -> usize {
        self.tx.send(frame).unwrap_or(0)
    }

    /// Queue an inbound event for the engine, waiting for queue space.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InboundClosed`] if the engine has stopped
    /// draining the queue.
    pub async fn submit(&self, event: InboundEvent) -> Result<(), GatewayError> {
        self.inbound
            .send(event)
            .await
            .map_err(|_closed| GatewayError::InboundClosed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn client_frames_translate_with_connection_identity() {
        let channel = ChannelId::new();
        let actor = ActorId::new();
        let target = TargetId::new();

        let removed = InboundEvent::from_client(
            ClientFrame::ReactionRemove {
                target,
                emoji: String::from("x"),
            },
            channel,
            actor,
        );
        assert_eq!(
            removed,
            InboundEvent::Reaction {
                channel,
                actor,
                target,
                emoji: String::from("x"),
                added: false,
            }
        );

        let message = InboundEvent::from_client(
            ClientFrame::Message {
                content: String::from("#help"),
            },
            channel,
            actor,
        );
        assert!(matches!(message, InboundEvent::Message { author, .. } if author == actor));
    }

    #[tokio::test]
    async fn submit_fails_once_the_receiver_is_gone() {
        let (state, rx) = AppState::new();
        drop(rx);
        let result = state
            .submit(InboundEvent::Message {
                channel: ChannelId::new(),
                author: ActorId::new(),
                content: String::new(),
            })
            .await;
        assert!(matches!(result, Err(GatewayError::InboundClosed)));
    }

    #[test]
    fn broadcast_without_subscribers_is_not_an_error() {
        let (state, _rx) = AppState::new();
        let sent = state.broadcast(ServerFrame::Reply {
            channel: ChannelId::new(),
            content: String::from("hi"),
        });
        assert_eq!(sent, 0);
    }
}
