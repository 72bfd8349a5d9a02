//! Per-session simulation state.
//!
//! A [`Session`] bundles the grid, the cursor, the running flag and the one
//! render target the session draws into. It is plain data: the
//! [`SessionController`](crate::controller::SessionController) serializes
//! access to it behind a lock and decides when to render.

use lifebot_types::{Direction, TargetId};
use rand::Rng;

use crate::grid::{Grid, wrap_offset};
use crate::render::render_grid;

/// The addressable cell used by move and toggle-cell events.
///
/// `x` indexes rows and `y` columns, matching [`Grid`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    /// Row, `0..width`.
    pub x: usize,
    /// Column, `0..height`.
    pub y: usize,
}

impl Cursor {
    /// The cursor moved one cell in `direction`, wrapped to the grid.
    pub fn moved(self, direction: Direction, grid: &Grid) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: wrap_offset(self.x, dx, grid.width()),
            y: wrap_offset(self.y, dy, grid.height()),
        }
    }
}

/// An active Game of Life session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Current generation.
    pub grid: Grid,
    /// Cursor position.
    pub cursor: Cursor,
    /// Whether the stepping loop should be advancing the grid.
    pub running: bool,
    /// Steps applied since the grid was last reset.
    pub generation: u64,
    /// The message this session renders into. Fixed for the session's life.
    target: TargetId,
}

impl Session {
    /// Create a paused session with the cursor at the origin.
    pub const fn new(grid: Grid, target: TargetId) -> Self {
        Self {
            grid,
            cursor: Cursor { x: 0, y: 0 },
            running: false,
            generation: 0,
            target,
        }
    }

    /// The session's render target.
    pub const fn target(&self) -> TargetId {
        self.target
    }

    /// Render the current state.
    pub fn render(&self) -> String {
        render_grid(&self.grid, self.cursor, self.running)
    }

    /// Replace the grid with its next generation.
    pub fn advance(&mut self) {
        self.grid = self.grid.step();
        self.generation = self.generation.saturating_add(1);
    }

    /// Move the cursor one cell.
    pub fn move_cursor(&mut self, direction: Direction) {
        self.cursor = self.cursor.moved(direction, &self.grid);
    }

    /// Flip the cell under the cursor; returns its new state.
    pub fn toggle_cell(&mut self) -> bool {
        self.grid.toggle(self.cursor.x, self.cursor.y)
    }

    /// Kill every cell.
    pub fn clear(&mut self) {
        self.grid = self.grid.cleared();
        self.generation = 0;
    }

    /// Redraw every cell from `rng`.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.grid.randomize(rng);
        self.generation = 0;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn session(width: i64, height: i64) -> Session {
        Session::new(Grid::new(width, height).unwrap(), TargetId::new())
    }

    #[test]
    fn cursor_wraps_on_short_axes() {
        let mut s = session(1, 3);
        s.move_cursor(Direction::Left);
        assert_eq!(s.cursor, Cursor { x: 0, y: 2 });
        s.move_cursor(Direction::Right);
        assert_eq!(s.cursor, Cursor { x: 0, y: 0 });
        s.move_cursor(Direction::Up);
        assert_eq!(s.cursor.x, 0);
        s.move_cursor(Direction::Down);
        assert_eq!(s.cursor.x, 0);
    }

    #[test]
    fn toggle_follows_cursor() {
        let mut s = session(3, 3);
        s.move_cursor(Direction::Down);
        s.move_cursor(Direction::Right);
        assert!(s.toggle_cell());
        assert!(s.grid.get(1, 1));
        assert_eq!(s.grid.live_cells(), 1);
    }

    #[test]
    fn advance_counts_generations() {
        let mut s = session(3, 3);
        s.advance();
        s.advance();
        assert_eq!(s.generation, 2);
        s.clear();
        assert_eq!(s.generation, 0);
    }
}
