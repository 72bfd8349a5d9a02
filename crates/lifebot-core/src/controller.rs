//! The session controller: one handler for the whole event vocabulary.
//!
//! [`SessionController`] owns the session slot, the render sink, the
//! randomness source and the handle of the stepping loop. The process
//! event loop feeds it events one at a time through [`handle`], which keeps
//! control events serialized with each other. The stepping loop runs
//! concurrently and is serialized with them through the session lock.
//! Renders from both sides pass through one [`RenderGate`], so the target
//! always ends up showing the latest state.
//!
//! # Event handling
//!
//! | Event | Effect |
//! |-------|--------|
//! | `Start` | new grid and render target, eight affordances registered |
//! | `ToggleRun` | flip `running`, spawn or stop the stepping loop |
//! | `Move` / `ToggleCell` / `Clear` / `Randomize` | mutate, then render |
//! | `Shutdown` | end the session, reply, report [`Flow::Shutdown`] |
//! | `Help` / `HelpDetail` | reply with static text |
//!
//! [`handle`]: SessionController::handle

use std::sync::Arc;

use lifebot_types::{Affordance, ChannelId, TargetId};
use rand::RngCore;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::command::parse_command;
use crate::config::SessionConfig;
use crate::event::{AffordanceSignal, SessionEvent};
use crate::grid::{Grid, GridError};
use crate::render::{self, INVALID_ARGUMENTS_TEXT, SHUTDOWN_TEXT};
use crate::session::{Cursor, Session};
use crate::sink::{RenderSink, RenderTransportError};
use crate::stepper::{RenderGate, SharedSession, Stepper};

/// Errors that can occur while handling a session event.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The requested grid dimensions are not positive.
    #[error("invalid dimensions: {0}")]
    InvalidDimension(#[from] GridError),

    /// The requested grid has more cells than the configured maximum.
    #[error("grid {width}x{height} exceeds the {max_cells}-cell limit")]
    GridTooLarge {
        /// Requested row count.
        width: i64,
        /// Requested column count.
        height: i64,
        /// Configured limit.
        max_cells: u64,
    },

    /// A control event arrived while no session exists.
    #[error("no active session")]
    NoActiveSession,

    /// The sink failed to deliver a render or reply.
    #[error("render failed: {0}")]
    Render(#[from] RenderTransportError),
}

impl SessionError {
    /// Whether the error was caused by user input (and deserves the
    /// generic "invalid arguments" reply).
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::InvalidDimension(_) | Self::GridTooLarge { .. })
    }
}

/// What the process event loop should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep processing events.
    Continue,
    /// Stop the event loop.
    Shutdown,
}

/// Owns the active session and interprets control events against it.
pub struct SessionController<S: RenderSink> {
    sink: Arc<S>,
    session: SharedSession,
    render_gate: RenderGate,
    stepper: Option<Stepper>,
    rng: Box<dyn RngCore + Send>,
    config: SessionConfig,
}

impl<S: RenderSink> SessionController<S> {
    /// Create a controller with no active session.
    pub fn new(sink: Arc<S>, config: SessionConfig, rng: Box<dyn RngCore + Send>) -> Self {
        Self {
            sink,
            session: Arc::new(Mutex::new(None)),
            render_gate: Arc::new(Mutex::new(())),
            stepper: None,
            rng,
            config,
        }
    }

    /// The sink this controller renders into.
    pub const fn sink(&self) -> &Arc<S> {
        &self.sink
    }

    /// Render target of the active session, if any.
    pub async fn active_target(&self) -> Option<TargetId> {
        self.session.lock().await.as_ref().map(Session::target)
    }

    /// A copy of the active session's state.
    pub async fn snapshot(&self) -> Option<Session> {
        self.session.lock().await.clone()
    }

    /// Whether a stepping loop task is alive.
    pub fn is_stepping(&self) -> bool {
        self.stepper.as_ref().is_some_and(|s| !s.is_finished())
    }

    /// Handle one raw chat line from `channel`.
    ///
    /// Non-command lines are ignored. Parse errors and invalid start
    /// requests are answered with the generic invalid-arguments reply.
    pub async fn handle_line(&mut self, channel: ChannelId, line: &str) -> Flow {
        let event = match parse_command(line) {
            Ok(Some(command)) => SessionEvent::from(command),
            Ok(None) => return Flow::Continue,
            Err(e) => {
                warn!(%channel, line, error = %e, "Rejected command");
                self.reply(channel, INVALID_ARGUMENTS_TEXT).await;
                return Flow::Continue;
            }
        };

        match self.handle(event, channel).await {
            Ok(flow) => flow,
            Err(e) => {
                warn!(%channel, line, error = %e, "Command failed");
                if e.is_user_error() {
                    self.reply(channel, INVALID_ARGUMENTS_TEXT).await;
                }
                Flow::Continue
            }
        }
    }

    /// Handle an affordance signal.
    ///
    /// Signals raised by the sink's own actor, or aimed at anything but the
    /// active render target, are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the resulting event fails.
    pub async fn handle_signal(&mut self, signal: AffordanceSignal) -> Result<Flow, SessionError> {
        let active = self.active_target().await;
        let Some(event) = signal.into_event(self.sink.actor(), active) else {
            debug!(
                target_id = %signal.target,
                actor = %signal.actor,
                affordance = ?signal.affordance,
                "Ignoring affordance signal"
            );
            return Ok(Flow::Continue);
        };
        self.handle(event, signal.channel).await
    }

    /// Handle one control event originating from `channel`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoActiveSession`] for session events without
    /// a session, [`SessionError::InvalidDimension`] or
    /// [`SessionError::GridTooLarge`] for a rejected start, and
    /// [`SessionError::Render`] if the closing render failed. A failed
    /// render never undoes the state change that preceded it.
    pub async fn handle(
        &mut self,
        event: SessionEvent,
        channel: ChannelId,
    ) -> Result<Flow, SessionError> {
        debug!(?event, %channel, "Handling event");
        match event {
            SessionEvent::Start { width, height } => self.start(channel, width, height).await?,
            SessionEvent::ToggleRun => self.toggle_run().await?,
            SessionEvent::Move(_)
            | SessionEvent::ToggleCell
            | SessionEvent::Clear
            | SessionEvent::Randomize => self.mutate(event).await?,
            SessionEvent::Shutdown => {
                info!(%channel, "Shutdown requested");
                self.end_session().await;
                self.reply(channel, SHUTDOWN_TEXT).await;
                return Ok(Flow::Shutdown);
            }
            SessionEvent::Help => self.reply(channel, render::HELP_TEXT).await,
            SessionEvent::HelpDetail => {
                let text = render::help_play_text();
                self.reply(channel, &text).await;
            }
        }
        Ok(Flow::Continue)
    }

    /// Stop the stepping loop and drop the active session, if any.
    ///
    /// Returns `true` if a session was active.
    pub async fn end_session(&mut self) -> bool {
        {
            let mut guard = self.session.lock().await;
            if let Some(s) = guard.as_mut() {
                s.running = false;
            }
        }
        self.stop_stepper().await;
        let ended = self.session.lock().await.take();
        if let Some(s) = &ended {
            info!(target_id = %s.target(), generation = s.generation, "Session ended");
        }
        ended.is_some()
    }

    // -----------------------------------------------------------------------
    // Start
    // -----------------------------------------------------------------------

    async fn start(&mut self, channel: ChannelId, width: i64, height: i64) -> Result<(), SessionError> {
        self.check_size(width, height)?;
        let grid = Grid::new(width, height)?;

        if self.end_session().await {
            info!("Replacing active session");
        }

        let initial = render::render_grid(&grid, Cursor::default(), false);
        let target = self.sink.create_target(channel, &initial).await?;
        *self.session.lock().await = Some(Session::new(grid, target));

        for affordance in Affordance::ALL {
            if let Err(e) = self.sink.register_affordance(target, affordance).await {
                warn!(target_id = %target, ?affordance, error = %e, "Failed to register affordance");
            }
        }

        info!(%channel, target_id = %target, width, height, "Session started");
        Ok(())
    }

    /// Reject non-positive or oversized grids before allocating anything.
    fn check_size(&self, width: i64, height: i64) -> Result<(), SessionError> {
        if width <= 0 || height <= 0 {
            return Err(GridError::InvalidDimension { width, height }.into());
        }
        let cells = width
            .checked_mul(height)
            .and_then(|c| u64::try_from(c).ok());
        match cells {
            Some(c) if c <= self.config.max_cells => Ok(()),
            _ => Err(SessionError::GridTooLarge {
                width,
                height,
                max_cells: self.config.max_cells,
            }),
        }
    }

    // -----------------------------------------------------------------------
    // Run / pause
    // -----------------------------------------------------------------------

    async fn toggle_run(&mut self) -> Result<(), SessionError> {
        let running = {
            let mut guard = self.session.lock().await;
            let s = guard.as_mut().ok_or(SessionError::NoActiveSession)?;
            s.running = !s.running;
            s.running
        };

        // A paused loop must be fully quiesced before the paused frame is
        // rendered, or its last in-flight render could land on top of it.
        if !running {
            self.stop_stepper().await;
        }

        let (target, text, ordered) = self.render_snapshot().await?;
        let rendered = self.sink.update_render(target, &text).await;
        drop(ordered);

        if running {
            self.stop_stepper().await;
            self.stepper = Some(Stepper::spawn(
                Arc::clone(&self.session),
                Arc::clone(&self.render_gate),
                Arc::clone(&self.sink),
                self.config.step_interval(),
            ));
        }

        info!(target_id = %target, running, "Run state toggled");
        rendered.map_err(SessionError::from)
    }

    async fn stop_stepper(&mut self) {
        let Some(stepper) = self.stepper.take() else {
            return;
        };
        if let Some(result) = stepper.stop().await {
            debug!(
                reason = ?result.end_reason,
                total_steps = result.total_steps,
                "Stepping loop stopped"
            );
        }
    }

    // -----------------------------------------------------------------------
    // Grid and cursor edits
    // -----------------------------------------------------------------------

    async fn mutate(&mut self, event: SessionEvent) -> Result<(), SessionError> {
        let (target, text, ordered) = {
            let mut guard = self.session.lock().await;
            let s = guard.as_mut().ok_or(SessionError::NoActiveSession)?;
            match event {
                SessionEvent::Move(direction) => s.move_cursor(direction),
                SessionEvent::ToggleCell => {
                    let alive = s.toggle_cell();
                    debug!(x = s.cursor.x, y = s.cursor.y, alive, "Cell toggled");
                }
                SessionEvent::Clear => s.clear(),
                SessionEvent::Randomize => s.randomize(&mut *self.rng),
                SessionEvent::Start { .. }
                | SessionEvent::ToggleRun
                | SessionEvent::Shutdown
                | SessionEvent::Help
                | SessionEvent::HelpDetail => {}
            }
            let ordered = self.render_gate.lock().await;
            (s.target(), s.render(), ordered)
        };
        let rendered = self.sink.update_render(target, &text).await;
        drop(ordered);
        rendered.map_err(SessionError::from)
    }

    // -----------------------------------------------------------------------
    // Output helpers
    // -----------------------------------------------------------------------

    /// Current render of the session, with the render gate already taken.
    async fn render_snapshot(
        &self,
    ) -> Result<(TargetId, String, MutexGuard<'_, ()>), SessionError> {
        let guard = self.session.lock().await;
        let s = guard.as_ref().ok_or(SessionError::NoActiveSession)?;
        let ordered = self.render_gate.lock().await;
        Ok((s.target(), s.render(), ordered))
    }

    async fn reply(&self, channel: ChannelId, text: &str) {
        if let Err(e) = self.sink.reply(channel, text).await {
            warn!(%channel, error = %e, "Failed to send reply");
        }
    }
}
