//! [`RenderSink`] implementation backed by the gateway.
//!
//! Creating and editing the render target updates the REST snapshot and
//! publishes a frame. Registering an affordance publishes the bot's own
//! reaction and echoes it into the inbound queue, the way a chat platform
//! reports the bot's reactions back to it.

use std::sync::Arc;

use chrono::Utc;
use lifebot_core::sink::{RenderSink, RenderTransportError};
use lifebot_types::{ActorId, Affordance, ChannelId, ServerFrame, TargetId};
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use crate::state::{AppState, InboundEvent};

/// Render sink that publishes to gateway clients.
#[derive(Debug, Clone)]
pub struct GatewaySink {
    state: Arc<AppState>,
}

impl GatewaySink {
    /// Create a sink publishing through `state`.
    pub const fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

impl RenderSink for GatewaySink {
    fn actor(&self) -> ActorId {
        self.state.bot
    }

    async fn create_target(
        &self,
        channel: ChannelId,
        text: &str,
    ) -> Result<TargetId, RenderTransportError> {
        let target = TargetId::new();
        {
            let mut snap = self.state.snapshot.write().await;
            snap.target = Some(target);
            snap.channel = Some(channel);
            text.clone_into(&mut snap.content);
            snap.edits = 0;
            snap.updated_at = Some(Utc::now());
        }
        let receivers = self.state.broadcast(ServerFrame::MessageCreated {
            target,
            channel,
            content: text.to_owned(),
        });
        debug!(target_id = %target, receivers, "Render target created");
        Ok(target)
    }

    async fn update_render(&self, target: TargetId, text: &str) -> Result<(), RenderTransportError> {
        {
            let mut snap = self.state.snapshot.write().await;
            if snap.target != Some(target) {
                return Err(RenderTransportError::Rejected(format!(
                    "unknown target {target}"
                )));
            }
            text.clone_into(&mut snap.content);
            snap.edits = snap.edits.saturating_add(1);
            snap.updated_at = Some(Utc::now());
        }
        self.state.broadcast(ServerFrame::MessageEdited {
            target,
            content: text.to_owned(),
        });
        Ok(())
    }

    async fn register_affordance(
        &self,
        target: TargetId,
        affordance: Affordance,
    ) -> Result<(), RenderTransportError> {
        let emoji = affordance.emoji().to_owned();
        let channel = self.state.snapshot.read().await.channel.unwrap_or_default();

        self.state.broadcast(ServerFrame::ReactionAdded {
            target,
            actor: self.state.bot,
            emoji: emoji.clone(),
        });

        // The engine is busy handling the start that triggered this call, so
        // the echo must not wait for queue space.
        let echo = InboundEvent::Reaction {
            channel,
            actor: self.state.bot,
            target,
            emoji,
            added: true,
        };
        match self.state.inbound.try_send(echo) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                warn!(target_id = %target, ?affordance, "Inbound queue full, reaction echo dropped");
                Ok(())
            }
            Err(TrySendError::Closed(_)) => Err(RenderTransportError::Closed),
        }
    }

    async fn reply(&self, channel: ChannelId, text: &str) -> Result<(), RenderTransportError> {
        self.state.broadcast(ServerFrame::Reply {
            channel,
            content: text.to_owned(),
        });
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_and_update_publish_frames_and_snapshot() {
        let (state, _rx) = AppState::new();
        let state = Arc::new(state);
        let mut frames = state.subscribe();
        let sink = GatewaySink::new(Arc::clone(&state));
        let channel = ChannelId::new();

        let target = sink.create_target(channel, "a").await.unwrap();
        sink.update_render(target, "b").await.unwrap();

        assert_eq!(
            frames.recv().await.unwrap(),
            ServerFrame::MessageCreated {
                target,
                channel,
                content: String::from("a"),
            }
        );
        assert_eq!(
            frames.recv().await.unwrap(),
            ServerFrame::MessageEdited {
                target,
                content: String::from("b"),
            }
        );

        let snap = state.snapshot.read().await;
        assert_eq!(snap.target, Some(target));
        assert_eq!(snap.content, "b");
        assert_eq!(snap.edits, 1);
        assert!(snap.updated_at.is_some());
    }

    #[tokio::test]
    async fn updating_an_unknown_target_is_rejected() {
        let (state, _rx) = AppState::new();
        let sink = GatewaySink::new(Arc::new(state));
        let result = sink.update_render(TargetId::new(), "x").await;
        assert!(matches!(result, Err(RenderTransportError::Rejected(_))));
    }

    #[tokio::test]
    async fn registrations_are_echoed_as_the_bot() {
        let (state, mut rx) = AppState::new();
        let state = Arc::new(state);
        let sink = GatewaySink::new(Arc::clone(&state));
        let channel = ChannelId::new();
        let target = sink.create_target(channel, "grid").await.unwrap();

        sink.register_affordance(target, Affordance::Start)
            .await
            .unwrap();

        assert_eq!(
            rx.recv().await.unwrap(),
            InboundEvent::Reaction {
                channel,
                actor: state.bot,
                target,
                emoji: String::from(Affordance::Start.emoji()),
                added: true,
            }
        );
    }

    #[tokio::test]
    async fn registration_fails_when_the_engine_is_gone() {
        let (state, rx) = AppState::new();
        drop(rx);
        let sink = GatewaySink::new(Arc::new(state));
        let result = sink.register_affordance(TargetId::new(), Affordance::Pick).await;
        assert_eq!(result, Err(RenderTransportError::Closed));
    }

    #[tokio::test]
    async fn replies_are_addressed_to_their_channel() {
        let (state, _rx) = AppState::new();
        let state = Arc::new(state);
        let mut frames = state.subscribe();
        let sink = GatewaySink::new(Arc::clone(&state));
        let channel = ChannelId::new();

        sink.reply(channel, "hello").await.unwrap();
        let frame = frames.recv().await.unwrap();
        assert!(frame.visible_to(channel));
        assert!(!frame.visible_to(ChannelId::new()));
    }
}
