//! The inbound event loop.
//!
//! Drains the gateway's inbound queue one event at a time and hands each
//! to the [`SessionController`]: messages as chat lines, reactions as
//! affordance signals. Reactions with an emoji that is not one of the
//! eight controls are dropped here.

use std::future::Future;

use lifebot_core::controller::{Flow, SessionController};
use lifebot_core::event::AffordanceSignal;
use lifebot_core::sink::RenderSink;
use lifebot_gateway::InboundEvent;
use lifebot_types::Affordance;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Why the inbound loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopOutcome {
    /// A user sent `#exit`.
    ShutdownCommand,
    /// The shutdown future resolved (Ctrl-C).
    Interrupted,
    /// Every inbound sender was dropped.
    InboundClosed,
}

/// Hand one inbound event to the controller.
pub async fn dispatch<S: RenderSink>(
    controller: &mut SessionController<S>,
    event: InboundEvent,
) -> Flow {
    match event {
        InboundEvent::Message {
            channel,
            author,
            content,
        } => {
            if author == controller.sink().actor() {
                return Flow::Continue;
            }
            controller.handle_line(channel, &content).await
        }
        InboundEvent::Reaction {
            channel,
            actor,
            target,
            emoji,
            added,
        } => {
            let Some(affordance) = Affordance::from_emoji(&emoji) else {
                debug!(%channel, emoji = %emoji, "Ignoring reaction that is not a control");
                return Flow::Continue;
            };
            // Adding and removing a reaction both activate the control.
            debug!(%channel, ?affordance, added, "Control reaction");
            let signal = AffordanceSignal {
                target,
                actor,
                channel,
                affordance,
            };
            match controller.handle_signal(signal).await {
                Ok(flow) => flow,
                Err(e) => {
                    warn!(%channel, ?affordance, error = %e, "Control event failed");
                    Flow::Continue
                }
            }
        }
    }
}

/// Run until `#exit`, until `shutdown` resolves, or until the queue closes.
pub async fn run<S, F>(
    controller: &mut SessionController<S>,
    inbound: &mut mpsc::Receiver<InboundEvent>,
    shutdown: F,
) -> LoopOutcome
where
    S: RenderSink,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = &mut shutdown => break LoopOutcome::Interrupted,
            event = inbound.recv() => {
                let Some(event) = event else {
                    break LoopOutcome::InboundClosed;
                };
                if dispatch(controller, event).await == Flow::Shutdown {
                    break LoopOutcome::ShutdownCommand;
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use lifebot_core::config::SessionConfig;
    use lifebot_core::render::SHUTDOWN_TEXT;
    use lifebot_core::sink::RecordingSink;
    use lifebot_types::{ActorId, ChannelId, TargetId};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn controller() -> SessionController<RecordingSink> {
        SessionController::new(
            Arc::new(RecordingSink::new()),
            SessionConfig::default(),
            Box::new(SmallRng::seed_from_u64(7)),
        )
    }

    fn message(channel: ChannelId, content: &str) -> InboundEvent {
        InboundEvent::Message {
            channel,
            author: ActorId::new(),
            content: content.to_owned(),
        }
    }

    fn reaction(
        channel: ChannelId,
        actor: ActorId,
        target: TargetId,
        affordance: Affordance,
        added: bool,
    ) -> InboundEvent {
        InboundEvent::Reaction {
            channel,
            actor,
            target,
            emoji: affordance.emoji().to_owned(),
            added,
        }
    }

    #[tokio::test]
    async fn reactions_drive_the_session() {
        let mut c = controller();
        let channel = ChannelId::new();
        let user = ActorId::new();
        dispatch(&mut c, message(channel, "#start 2 2")).await;
        let target = c.active_target().await.unwrap();

        // Add, then remove: two activations of the same control.
        dispatch(&mut c, reaction(channel, user, target, Affordance::Pick, true)).await;
        assert!(c.snapshot().await.unwrap().grid.get(0, 0));
        dispatch(&mut c, reaction(channel, user, target, Affordance::Pick, false)).await;
        assert!(!c.snapshot().await.unwrap().grid.get(0, 0));

        dispatch(&mut c, reaction(channel, user, target, Affordance::ArrowDown, true)).await;
        assert_eq!(c.snapshot().await.unwrap().cursor.x, 1);
    }

    #[tokio::test]
    async fn foreign_emoji_and_bot_reactions_are_ignored() {
        let mut c = controller();
        let channel = ChannelId::new();
        dispatch(&mut c, message(channel, "#start 2 2")).await;
        let target = c.active_target().await.unwrap();
        let bot = c.sink().actor();
        c.sink().reset().await;

        let thumbs = InboundEvent::Reaction {
            channel,
            actor: ActorId::new(),
            target,
            emoji: String::from("\u{1f44d}"),
            added: true,
        };
        dispatch(&mut c, thumbs).await;
        dispatch(&mut c, reaction(channel, bot, target, Affordance::Pick, true)).await;

        assert!(c.sink().calls().await.is_empty());
        assert_eq!(c.snapshot().await.unwrap().grid.live_cells(), 0);
    }

    #[tokio::test]
    async fn control_without_session_keeps_going() {
        let mut c = controller();
        let flow = dispatch(
            &mut c,
            reaction(
                ChannelId::new(),
                ActorId::new(),
                TargetId::new(),
                Affordance::Start,
                true,
            ),
        )
        .await;
        assert_eq!(flow, Flow::Continue);
    }

    #[tokio::test]
    async fn exit_ends_the_loop() {
        let mut c = controller();
        let (tx, mut rx) = mpsc::channel(8);
        let channel = ChannelId::new();
        tx.send(message(channel, "hello")).await.unwrap();
        tx.send(message(channel, "#exit")).await.unwrap();
        tx.send(message(channel, "#help")).await.unwrap();

        let outcome = run(&mut c, &mut rx, std::future::pending()).await;
        assert_eq!(outcome, LoopOutcome::ShutdownCommand);
        assert_eq!(c.sink().replies().await, vec![String::from(SHUTDOWN_TEXT)]);
        // The event after `#exit` is never handled.
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn closed_queue_ends_the_loop() {
        let mut c = controller();
        let (tx, mut rx) = mpsc::channel::<InboundEvent>(1);
        drop(tx);
        let outcome = run(&mut c, &mut rx, std::future::pending()).await;
        assert_eq!(outcome, LoopOutcome::InboundClosed);
    }

    #[tokio::test]
    async fn shutdown_future_interrupts_the_loop() {
        let mut c = controller();
        let (_tx, mut rx) = mpsc::channel::<InboundEvent>(1);
        let outcome = run(&mut c, &mut rx, std::future::ready(())).await;
        assert_eq!(outcome, LoopOutcome::Interrupted);
    }
}
