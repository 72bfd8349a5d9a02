//! The control-event vocabulary and the translation of affordance signals
//! into it.
//!
//! Every input the controller reacts to is a [`SessionEvent`]. Chat
//! commands become events through [`Command`](crate::command::Command);
//! reactions on the render target become events through
//! [`AffordanceSignal::into_event`], which also applies the two
//! access rules for signals.

use lifebot_types::{ActorId, Affordance, ChannelId, Direction, TargetId};

/// One control event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Start a new session with the given dimensions.
    Start {
        /// Requested row count.
        width: i64,
        /// Requested column count.
        height: i64,
    },
    /// Start or pause the stepping loop.
    ToggleRun,
    /// Move the cursor one cell.
    Move(Direction),
    /// Flip the cell under the cursor.
    ToggleCell,
    /// Kill every cell.
    Clear,
    /// Redraw every cell at random.
    Randomize,
    /// End the session and the process event loop.
    Shutdown,
    /// Show the short help text.
    Help,
    /// Show the controls help text.
    HelpDetail,
}

impl From<Affordance> for SessionEvent {
    fn from(affordance: Affordance) -> Self {
        match affordance {
            Affordance::ArrowLeft => Self::Move(Direction::Left),
            Affordance::ArrowRight => Self::Move(Direction::Right),
            Affordance::ArrowUp => Self::Move(Direction::Up),
            Affordance::ArrowDown => Self::Move(Direction::Down),
            Affordance::Pick => Self::ToggleCell,
            Affordance::Refresh => Self::Clear,
            Affordance::Start => Self::ToggleRun,
            Affordance::Randomize => Self::Randomize,
        }
    }
}

/// A user activated (added or removed) an affordance on some target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AffordanceSignal {
    /// The message the signal was raised on.
    pub target: TargetId,
    /// Who raised it.
    pub actor: ActorId,
    /// Channel the target lives in.
    pub channel: ChannelId,
    /// Which control.
    pub affordance: Affordance,
}

impl AffordanceSignal {
    /// Translate the signal into an event, or drop it.
    ///
    /// Signals raised by `sink_actor` (the bot's own affordance
    /// registrations echoed back by the platform) are discarded, as are
    /// signals on any target other than `active_target`.
    pub fn into_event(
        self,
        sink_actor: ActorId,
        active_target: Option<TargetId>,
    ) -> Option<SessionEvent> {
        if self.actor == sink_actor {
            return None;
        }
        if active_target != Some(self.target) {
            return None;
        }
        Some(self.affordance.into())
    }
}
