//! Text rendering of a session and the static help texts.
//!
//! The rendered text is consumed by existing chat clients, so the glyphs
//! and the row separator are part of the interface and must not change.

use lifebot_types::Affordance;

use crate::grid::Grid;
use crate::session::Cursor;

/// Glyph for a dead cell.
pub const DEAD: &str = ":black_large_square:";

/// Glyph for a live cell.
pub const ALIVE: &str = ":white_large_square:";

/// Glyph for the cursor while the simulation is paused.
pub const CURSOR: &str = ":yellow_square:";

/// Separator between rows. Not emitted after the last row.
pub const ROW_SEPARATOR: &str = "\n";

/// Render `grid` row by row.
///
/// While paused the cursor cell shows [`CURSOR`] regardless of its state;
/// while running the cursor is hidden.
pub fn render_grid(grid: &Grid, cursor: Cursor, running: bool) -> String {
    let rows: Vec<String> = grid
        .rows()
        .enumerate()
        .map(|(x, row)| {
            row.iter()
                .enumerate()
                .map(|(y, alive)| {
                    if !running && cursor.x == x && cursor.y == y {
                        CURSOR
                    } else if *alive {
                        ALIVE
                    } else {
                        DEAD
                    }
                })
                .collect()
        })
        .collect();
    rows.join(ROW_SEPARATOR)
}

/// Reply for `#help` / `#info`.
pub const HELP_TEXT: &str = "\
'Life-Game' bot help:
#start <width> <height> \u{2014} starts a new game in a new message. Type #help-play for more details
#help / #info \u{2014} shows this message
#exit \u{2014} shuts the bot down.";

/// Reply for malformed commands.
pub const INVALID_ARGUMENTS_TEXT: &str =
    "Invalid arguments received. Type #help-play for more details.";

/// Reply for `#exit`.
pub const SHUTDOWN_TEXT: &str = "Bot shuts down...";

/// Reply for `#help-play`, listing the controls.
pub fn help_play_text() -> String {
    let controls: Vec<String> = Affordance::ALL
        .iter()
        .map(|a| format!("{} \u{2014} {}", a.emoji(), control_description(*a)))
        .collect();
    format!(
        "Creates a new game instance in the following message.\n\
         <width> \u{2014} integer number of rows\n\
         <height> \u{2014} integer number of columns\n\
         ------------\n\
         Controls:\n{}\n\
         ------------\n\
         The field is a torus: moving or counting past an edge wraps to the opposite side.",
        controls.join("\n")
    )
}

const fn control_description(affordance: Affordance) -> &'static str {
    match affordance {
        Affordance::ArrowLeft => "move the cursor left",
        Affordance::ArrowRight => "move the cursor right",
        Affordance::ArrowUp => "move the cursor up",
        Affordance::ArrowDown => "move the cursor down",
        Affordance::Pick => "toggle the cell under the cursor",
        Affordance::Refresh => "clear the field",
        Affordance::Start => "start / pause the simulation",
        Affordance::Randomize => "fill the field randomly",
    }
}
