//! The outward rendering seam.
//!
//! The core never talks to a transport directly. Everything it shows to
//! users goes through a [`RenderSink`]: creating the one render target of a
//! session, editing it in place, registering the eight affordances on it,
//! and replying to a channel. Sink failures are reported to the caller but
//! never touch simulation state.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use lifebot_types::{ActorId, Affordance, ChannelId, TargetId};
use tokio::sync::Mutex;

/// Errors a sink reports for a single delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderTransportError {
    /// The transport is gone (no connection, process shutting down).
    #[error("render transport closed")]
    Closed,

    /// The transport refused the request (rate limit, unknown target, ...).
    #[error("render rejected: {0}")]
    Rejected(String),
}

/// Outward capability used by the session controller.
///
/// Methods return `Send` futures so the stepping loop can render from a
/// spawned task.
pub trait RenderSink: Send + Sync + 'static {
    /// The identity the sink acts under on the platform.
    ///
    /// Signals raised by this actor are the sink's own affordance
    /// registrations and are discarded.
    fn actor(&self) -> ActorId;

    /// Post a new render target in `channel` with initial `text`.
    fn create_target(
        &self,
        channel: ChannelId,
        text: &str,
    ) -> impl Future<Output = Result<TargetId, RenderTransportError>> + Send;

    /// Replace the text of an existing target.
    fn update_render(
        &self,
        target: TargetId,
        text: &str,
    ) -> impl Future<Output = Result<(), RenderTransportError>> + Send;

    /// Attach one control affordance to a target.
    fn register_affordance(
        &self,
        target: TargetId,
        affordance: Affordance,
    ) -> impl Future<Output = Result<(), RenderTransportError>> + Send;

    /// Send a standalone reply to `channel`.
    fn reply(
        &self,
        channel: ChannelId,
        text: &str,
    ) -> impl Future<Output = Result<(), RenderTransportError>> + Send;
}

/// One call observed by a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    /// [`RenderSink::create_target`].
    Created {
        /// Channel the target was posted in.
        channel: ChannelId,
        /// Identifier handed back.
        target: TargetId,
        /// Initial text.
        text: String,
    },
    /// [`RenderSink::update_render`].
    Updated {
        /// Target edited.
        target: TargetId,
        /// New text.
        text: String,
    },
    /// [`RenderSink::register_affordance`].
    Registered {
        /// Target the control was attached to.
        target: TargetId,
        /// The control.
        affordance: Affordance,
    },
    /// [`RenderSink::reply`].
    Replied {
        /// Recipient.
        channel: ChannelId,
        /// Reply text.
        text: String,
    },
}

/// An in-memory sink that records every call.
///
/// Used by tests and by embedders that want to inspect output without a
/// transport. Updates can be made to fail to exercise error handling.
#[derive(Debug)]
pub struct RecordingSink {
    actor: ActorId,
    calls: Mutex<Vec<SinkCall>>,
    fail_updates: AtomicBool,
    next_update_delay_ms: AtomicU64,
}

impl RecordingSink {
    /// Create an empty recording sink with a fresh actor id.
    pub fn new() -> Self {
        Self {
            actor: ActorId::new(),
            calls: Mutex::new(Vec::new()),
            fail_updates: AtomicBool::new(false),
            next_update_delay_ms: AtomicU64::new(0),
        }
    }

    /// Make subsequent [`RenderSink::update_render`] calls fail (or succeed
    /// again). Failed updates are not recorded.
    pub fn set_fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::Release);
    }

    /// Hold the next [`RenderSink::update_render`] call for `delay` before
    /// recording it, like a slow or rate-limited transport.
    pub fn delay_next_update(&self, delay: Duration) {
        let ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.next_update_delay_ms.store(ms, Ordering::Release);
    }

    /// Every call recorded so far.
    pub async fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().await.clone()
    }

    /// Texts of all successful updates, in order.
    pub async fn updates(&self) -> Vec<String> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                SinkCall::Updated { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Texts of all replies, in order.
    pub async fn replies(&self) -> Vec<String> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                SinkCall::Replied { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Affordances registered so far, in order.
    pub async fn registrations(&self) -> Vec<Affordance> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                SinkCall::Registered { affordance, .. } => Some(*affordance),
                _ => None,
            })
            .collect()
    }

    /// Forget all recorded calls.
    pub async fn reset(&self) {
        self.calls.lock().await.clear();
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSink for RecordingSink {
    fn actor(&self) -> ActorId {
        self.actor
    }

    async fn create_target(
        &self,
        channel: ChannelId,
        text: &str,
    ) -> Result<TargetId, RenderTransportError> {
        let target = TargetId::new();
        self.calls.lock().await.push(SinkCall::Created {
            channel,
            target,
            text: text.to_owned(),
        });
        Ok(target)
    }

    async fn update_render(&self, target: TargetId, text: &str) -> Result<(), RenderTransportError> {
        let delay = self.next_update_delay_ms.swap(0, Ordering::AcqRel);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.fail_updates.load(Ordering::Acquire) {
            return Err(RenderTransportError::Rejected(String::from(
                "updates disabled",
            )));
        }
        self.calls.lock().await.push(SinkCall::Updated {
            target,
            text: text.to_owned(),
        });
        Ok(())
    }

    async fn register_affordance(
        &self,
        target: TargetId,
        affordance: Affordance,
    ) -> Result<(), RenderTransportError> {
        self.calls
            .lock()
            .await
            .push(SinkCall::Registered { target, affordance });
        Ok(())
    }

    async fn reply(&self, channel: ChannelId, text: &str) -> Result<(), RenderTransportError> {
        self.calls.lock().await.push(SinkCall::Replied {
            channel,
            text: text.to_owned(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_calls_in_order() {
        let sink = RecordingSink::new();
        let channel = ChannelId::new();
        let target = sink.create_target(channel, "a").await;
        assert!(target.is_ok());
        let target = target.unwrap_or_default();
        let _ = sink.update_render(target, "b").await;
        let _ = sink.register_affordance(target, Affordance::Pick).await;
        let _ = sink.reply(channel, "c").await;

        assert_eq!(sink.calls().await.len(), 4);
        assert_eq!(sink.updates().await, vec![String::from("b")]);
        assert_eq!(sink.registrations().await, vec![Affordance::Pick]);
        assert_eq!(sink.replies().await, vec![String::from("c")]);
    }

    #[tokio::test]
    async fn failing_updates_are_reported_and_not_recorded() {
        let sink = RecordingSink::new();
        sink.set_fail_updates(true);
        let result = sink.update_render(TargetId::new(), "x").await;
        assert!(matches!(result, Err(RenderTransportError::Rejected(_))));
        assert!(sink.updates().await.is_empty());
    }
}
