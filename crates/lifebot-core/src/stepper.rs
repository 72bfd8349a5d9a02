//! The stepping loop that advances a running session.
//!
//! [`Stepper::spawn`] starts a Tokio task that, once per interval, advances
//! the session one generation and renders it. The task:
//!
//! - **Serializes with control events**: the session lock is held only
//!   while stepping and taking the render snapshot, never across the render
//!   call or the cadence wait.
//! - **Renders in state order**: the [`RenderGate`] is taken before the
//!   session lock is released and held until the sink returns, so a slow
//!   edit render can never land on top of a newer step.
//! - **Yields between steps**: the cadence is a [`tokio::time::Interval`]
//!   tick, so event handling proceeds while the loop waits.
//! - **Stops deterministically**: [`Stepper::stop`] wakes the loop through a
//!   [`Notify`] and awaits the task, and the loop never steps a session
//!   whose `running` flag is clear.
//! - **Survives render failures**: a failed render is logged and counted;
//!   the generation it showed is not recomputed.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::session::Session;
use crate::sink::RenderSink;

/// The session slot shared between the controller and the stepping loop.
pub type SharedSession = Arc<Mutex<Option<Session>>>;

/// Orders render delivery between the controller and the stepping loop.
///
/// Acquired while the session lock is held, released once
/// [`RenderSink::update_render`] returns. Never take the session lock while
/// holding the gate.
pub type RenderGate = Arc<Mutex<()>>;

/// Why the stepping loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// [`Stepper::stop`] was called.
    StopRequested,
    /// The session's `running` flag was found clear before a step.
    Paused,
    /// The session slot was emptied.
    SessionEnded,
}

/// Summary of one stepping-loop run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepperResult {
    /// Why the loop ended.
    pub end_reason: StopReason,
    /// Generations advanced by this run.
    pub total_steps: u64,
    /// Renders that the sink rejected.
    pub failed_renders: u64,
}

/// Handle to a running stepping loop.
#[derive(Debug)]
pub struct Stepper {
    stop: Arc<Notify>,
    handle: JoinHandle<StepperResult>,
}

impl Stepper {
    /// Spawn the stepping loop for `session`.
    ///
    /// The first step happens one `interval` after spawning. A zero interval
    /// is raised to one millisecond.
    pub fn spawn<S: RenderSink>(
        session: SharedSession,
        gate: RenderGate,
        sink: Arc<S>,
        interval: Duration,
    ) -> Self {
        let stop = Arc::new(Notify::new());
        let interval = interval.max(Duration::from_millis(1));
        let handle = tokio::spawn(run_steps(session, gate, sink, interval, Arc::clone(&stop)));
        Self { stop, handle }
    }

    /// Whether the loop task has already ended on its own.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop the loop and wait for it to finish.
    ///
    /// If the loop is mid-render, this waits for that render to complete.
    /// Returns `None` if the task panicked or was cancelled.
    pub async fn stop(self) -> Option<StepperResult> {
        self.stop.notify_one();
        match self.handle.await {
            Ok(result) => Some(result),
            Err(e) => {
                warn!(error = %e, "Stepping loop task failed");
                None
            }
        }
    }
}

/// Body of the stepping task.
async fn run_steps<S: RenderSink>(
    session: SharedSession,
    gate: RenderGate,
    sink: Arc<S>,
    interval: Duration,
    stop: Arc<Notify>,
) -> StepperResult {
    let mut total_steps: u64 = 0;
    let mut failed_renders: u64 = 0;

    let start = Instant::now().checked_add(interval).unwrap_or_else(Instant::now);
    let mut ticker = tokio::time::interval_at(start, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(interval_ms = interval.as_millis(), "Stepping loop started");

    let end_reason = loop {
        // --- Wait for the next tick, or a stop request ---
        tokio::select! {
            biased;
            () = stop.notified() => break StopReason::StopRequested,
            _ = ticker.tick() => {}
        }

        // --- Step under the lock ---
        let (target, text, generation, ordered) = {
            let mut guard = session.lock().await;
            match guard.as_mut() {
                Some(s) if s.running => {
                    s.advance();
                    let ordered = gate.lock().await;
                    (s.target(), s.render(), s.generation, ordered)
                }
                Some(_) => break StopReason::Paused,
                None => break StopReason::SessionEnded,
            }
        };
        total_steps = total_steps.saturating_add(1);

        // --- Render outside the lock ---
        match sink.update_render(target, &text).await {
            Ok(()) => debug!(target_id = %target, generation, "Step rendered"),
            Err(e) => {
                failed_renders = failed_renders.saturating_add(1);
                warn!(target_id = %target, generation, error = %e, "Failed to render step");
            }
        }
        drop(ordered);
    };

    info!(
        reason = ?end_reason,
        total_steps,
        failed_renders,
        "Stepping loop ended"
    );

    StepperResult {
        end_reason,
        total_steps,
        failed_renders,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use lifebot_types::TargetId;

    use super::*;
    use crate::grid::tests::glider;
    use crate::sink::RecordingSink;

    const STEP: Duration = Duration::from_millis(1000);

    fn running_session() -> SharedSession {
        let mut session = Session::new(glider(), TargetId::new());
        session.running = true;
        Arc::new(Mutex::new(Some(session)))
    }

    fn spawn_stepper(session: &SharedSession, sink: &Arc<RecordingSink>) -> Stepper {
        Stepper::spawn(
            Arc::clone(session),
            Arc::new(Mutex::new(())),
            Arc::clone(sink),
            STEP,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn steps_once_per_interval() {
        let session = running_session();
        let sink = Arc::new(RecordingSink::new());
        let stepper = spawn_stepper(&session, &sink);

        tokio::time::sleep(Duration::from_millis(3500)).await;
        let result = stepper.stop().await.unwrap();

        assert_eq!(result.end_reason, StopReason::StopRequested);
        assert_eq!(result.total_steps, 3);
        assert_eq!(sink.updates().await.len(), 3);
        let generation = session.lock().await.as_ref().map(|s| s.generation);
        assert_eq!(generation, Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn renders_match_the_stepped_grid() {
        let session = running_session();
        let sink = Arc::new(RecordingSink::new());
        let stepper = spawn_stepper(&session, &sink);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        let _ = stepper.stop().await;

        let mut expected = Session::new(glider(), TargetId::new());
        expected.running = true;
        expected.advance();
        assert_eq!(sink.updates().await, vec![expected.render()]);
    }

    #[tokio::test(start_paused = true)]
    async fn clearing_running_stops_before_next_step() {
        let session = running_session();
        let sink = Arc::new(RecordingSink::new());
        let stepper = spawn_stepper(&session, &sink);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        session.lock().await.as_mut().unwrap().running = false;
        tokio::time::sleep(Duration::from_millis(5000)).await;

        assert!(stepper.is_finished());
        let result = stepper.stop().await.unwrap();
        assert_eq!(result.end_reason, StopReason::Paused);
        assert_eq!(result.total_steps, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn ends_when_session_is_removed() {
        let session = running_session();
        let sink = Arc::new(RecordingSink::new());
        let stepper = spawn_stepper(&session, &sink);

        session.lock().await.take();
        tokio::time::sleep(Duration::from_millis(1500)).await;

        let result = stepper.stop().await.unwrap();
        assert_eq!(result.end_reason, StopReason::SessionEnded);
        assert_eq!(result.total_steps, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn render_failures_do_not_stop_the_loop() {
        let session = running_session();
        let sink = Arc::new(RecordingSink::new());
        sink.set_fail_updates(true);
        let stepper = spawn_stepper(&session, &sink);

        tokio::time::sleep(Duration::from_millis(2500)).await;
        let result = stepper.stop().await.unwrap();

        assert_eq!(result.total_steps, 2);
        assert_eq!(result.failed_renders, 2);
        // The state kept advancing even though nothing was shown.
        let generation = session.lock().await.as_ref().map(|s| s.generation);
        assert_eq!(generation, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_before_first_tick() {
        let session = running_session();
        let sink = Arc::new(RecordingSink::new());
        let stepper = spawn_stepper(&session, &sink);

        let result = stepper.stop().await.unwrap();
        assert_eq!(result.end_reason, StopReason::StopRequested);
        assert_eq!(result.total_steps, 0);
        assert!(sink.updates().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn held_gate_delays_the_step_render() {
        let session = running_session();
        let sink = Arc::new(RecordingSink::new());
        let gate: RenderGate = Arc::new(Mutex::new(()));
        let stepper = Stepper::spawn(
            Arc::clone(&session),
            Arc::clone(&gate),
            Arc::clone(&sink),
            STEP,
        );

        let held = gate.lock().await;
        tokio::time::sleep(Duration::from_millis(1500)).await;
        // Stepped, but the render waits for the gate.
        assert!(sink.updates().await.is_empty());

        drop(held);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(sink.updates().await.len(), 1);
        let _ = stepper.stop().await;
    }
}
