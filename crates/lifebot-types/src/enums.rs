//! Enumeration types shared by the core and the gateway.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Cursor movement
// ---------------------------------------------------------------------------

/// A cursor movement direction.
///
/// Left/right move along the grid's y axis (columns), up/down along the
/// x axis (rows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Previous column.
    Left,
    /// Next column.
    Right,
    /// Previous row.
    Up,
    /// Next row.
    Down,
}

impl Direction {
    /// The `(dx, dy)` offset this direction applies to the cursor.
    pub const fn delta(self) -> (i64, i64) {
        match self {
            Self::Left => (0, -1),
            Self::Right => (0, 1),
            Self::Up => (-1, 0),
            Self::Down => (1, 0),
        }
    }
}

// ---------------------------------------------------------------------------
// Affordances
// ---------------------------------------------------------------------------

/// A control registered on the render target that users activate to send
/// one event from the fixed vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Affordance {
    /// Move the cursor left.
    ArrowLeft,
    /// Move the cursor right.
    ArrowRight,
    /// Move the cursor up.
    ArrowUp,
    /// Move the cursor down.
    ArrowDown,
    /// Toggle the cell under the cursor.
    Pick,
    /// Clear the grid.
    Refresh,
    /// Start or pause the stepping loop.
    Start,
    /// Fill the grid with random cells.
    Randomize,
}

impl Affordance {
    /// Every affordance, in registration order.
    pub const ALL: [Self; 8] = [
        Self::ArrowLeft,
        Self::ArrowRight,
        Self::ArrowUp,
        Self::ArrowDown,
        Self::Pick,
        Self::Refresh,
        Self::Start,
        Self::Randomize,
    ];

    /// The reaction emoji shown on the render target.
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::ArrowLeft => "\u{2b05}\u{fe0f}",
            Self::ArrowRight => "\u{27a1}\u{fe0f}",
            Self::ArrowUp => "\u{2b06}\u{fe0f}",
            Self::ArrowDown => "\u{2b07}\u{fe0f}",
            Self::Pick => "\u{23cf}\u{fe0f}",
            Self::Refresh => "\u{1f501}",
            Self::Start => "\u{2705}",
            Self::Randomize => "\u{1f3b2}",
        }
    }

    /// Look up the affordance for a reaction emoji.
    ///
    /// Returns `None` for emoji that are not one of the eight controls.
    pub fn from_emoji(emoji: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.emoji() == emoji)
    }
}
