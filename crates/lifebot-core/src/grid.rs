//! Toroidal Game of Life grid.
//!
//! The grid is a `width x height` matrix of booleans where `x` indexes rows
//! (`0..width`) and `y` indexes columns (`0..height`). Edges wrap: the cell
//! past the last column is the first column, and likewise for rows. There is
//! no border handling anywhere; every neighbour lookup goes through [`wrap`].
//!
//! # Design Principles
//!
//! - [`Grid::step`] is pure. It reads `&self` and returns the next
//!   generation, so the previous generation stays readable while the next
//!   one is computed.
//! - Dimensions are fixed at construction. Clearing produces a new grid of
//!   the same size rather than resizing.
//! - At dimension 1 a cell reaches itself through wrap-around and is
//!   counted among its own neighbours. That is the torus doing its job and
//!   is deliberately left alone.

use rand::Rng;

/// Errors that can occur when constructing a grid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// A requested dimension was zero or negative.
    #[error("invalid grid dimensions {width}x{height}: both must be positive")]
    InvalidDimension {
        /// Requested width (row count).
        width: i64,
        /// Requested height (column count).
        height: i64,
    },

    /// Rows supplied to [`Grid::from_rows`] differ in length.
    #[error("row {row} has {len} cells, expected {expected}")]
    RaggedRows {
        /// Index of the offending row.
        row: usize,
        /// Its length.
        len: usize,
        /// Length of the first row.
        expected: usize,
    },
}

/// Wrap `value` into `[0, len)`.
///
/// Equivalent to `((value % len) + len) % len`, so negative values wrap
/// from the far end: `wrap(-1, 6) == 5`. `len` must be positive; a
/// non-positive `len` yields 0.
pub const fn wrap(value: i64, len: i64) -> i64 {
    match value.checked_rem_euclid(len) {
        Some(wrapped) => wrapped,
        None => 0,
    }
}

/// Move `index` by `delta` along an axis of length `len`, wrapping around.
pub fn wrap_offset(index: usize, delta: i64, len: usize) -> usize {
    let (Ok(index), Ok(len)) = (i64::try_from(index), i64::try_from(len)) else {
        return 0;
    };
    usize::try_from(wrap(index.saturating_add(delta), len)).unwrap_or(0)
}

/// Build a raw all-dead field of `width` rows by `height` columns.
///
/// Unlike [`Grid::new`] this accepts zero, so `create_field(1, 0)` is a
/// single empty row.
pub fn create_field(width: usize, height: usize) -> Vec<Vec<bool>> {
    (0..width).map(|_| vec![false; height]).collect()
}

/// Offsets of the eight Moore neighbours.
const NEIGHBOUR_OFFSETS: [(i64, i64); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// A toroidal grid of live and dead cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    /// Number of rows (x axis).
    width: usize,

    /// Number of columns (y axis).
    height: usize,

    /// `cells[x][y]`; every row holds exactly `height` cells.
    cells: Vec<Vec<bool>>,
}

impl Grid {
    /// Create an all-dead grid.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimension`] if either dimension is zero
    /// or negative. Sizes are never clamped.
    pub fn new(width: i64, height: i64) -> Result<Self, GridError> {
        let invalid = GridError::InvalidDimension { width, height };
        if width <= 0 || height <= 0 {
            return Err(invalid);
        }
        let (Ok(rows), Ok(cols)) = (usize::try_from(width), usize::try_from(height)) else {
            return Err(invalid);
        };
        Ok(Self {
            width: rows,
            height: cols,
            cells: create_field(rows, cols),
        })
    }

    /// Build a grid from explicit rows (`rows[x][y]`).
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimension`] for an empty input or empty
    /// rows, and [`GridError::RaggedRows`] if the rows differ in length.
    pub fn from_rows(rows: Vec<Vec<bool>>) -> Result<Self, GridError> {
        let expected = rows.first().map_or(0, Vec::len);
        if rows.is_empty() || expected == 0 {
            return Err(GridError::InvalidDimension {
                width: i64::try_from(rows.len()).unwrap_or(i64::MAX),
                height: 0,
            });
        }
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
            return Err(GridError::RaggedRows {
                row,
                len: r.len(),
                expected,
            });
        }
        Ok(Self {
            width: rows.len(),
            height: expected,
            cells: rows,
        })
    }

    /// Number of rows.
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Number of columns.
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells.
    pub const fn cell_count(&self) -> usize {
        self.width.saturating_mul(self.height)
    }

    /// Whether the cell at `(x, y)` is alive. Out-of-range cells read dead.
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.cells
            .get(x)
            .and_then(|row| row.get(y))
            .copied()
            .unwrap_or(false)
    }

    /// Set the cell at `(x, y)`. Out-of-range writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, alive: bool) {
        if let Some(cell) = self.cells.get_mut(x).and_then(|row| row.get_mut(y)) {
            *cell = alive;
        }
    }

    /// Flip the cell at `(x, y)` and return its new state.
    pub fn toggle(&mut self, x: usize, y: usize) -> bool {
        let alive = !self.get(x, y);
        self.set(x, y, alive);
        alive
    }

    /// Iterate over the rows (`x` order), each a slice of `height` cells.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.cells.iter().map(Vec::as_slice)
    }

    /// Number of live cells.
    pub fn live_cells(&self) -> usize {
        self.cells
            .iter()
            .map(|row| row.iter().filter(|alive| **alive).count())
            .sum()
    }

    /// Count the live cells among the eight toroidal neighbours of `(x, y)`.
    ///
    /// Each coordinate wraps independently, so on an axis of length 1 the
    /// cell itself is reached (and counted) through the wrap.
    pub fn neighbour_count(&self, x: usize, y: usize) -> u8 {
        NEIGHBOUR_OFFSETS
            .iter()
            .filter(|(dx, dy)| {
                self.get(
                    wrap_offset(x, *dx, self.width),
                    wrap_offset(y, *dy, self.height),
                )
            })
            .fold(0_u8, |count, _| count.saturating_add(1))
    }

    /// Compute the next generation under B3/S23.
    ///
    /// A cell is alive in the result iff it has exactly three live
    /// neighbours, or it is alive now and has exactly two.
    pub fn step(&self) -> Self {
        let cells = (0..self.width)
            .map(|x| {
                (0..self.height)
                    .map(|y| match self.neighbour_count(x, y) {
                        3 => true,
                        2 => self.get(x, y),
                        _ => false,
                    })
                    .collect()
            })
            .collect();
        Self {
            width: self.width,
            height: self.height,
            cells,
        }
    }

    /// A fresh all-dead grid with the same dimensions.
    pub fn cleared(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            cells: create_field(self.width, self.height),
        }
    }

    /// Set every cell alive or dead with independent 50% probability.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for cell in self.cells.iter_mut().flatten() {
            *cell = rng.random_bool(0.5);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    /// Build a grid from 0/1 rows.
    pub(crate) fn grid_of(rows: &[&[u8]]) -> Grid {
        Grid::from_rows(
            rows.iter()
                .map(|row| row.iter().map(|c| *c == 1).collect())
                .collect(),
        )
        .unwrap()
    }

    /// The 5x5 glider seed used as the golden case.
    pub(crate) fn glider() -> Grid {
        grid_of(&[
            &[0, 0, 0, 0, 0],
            &[0, 0, 1, 0, 0],
            &[0, 0, 0, 1, 0],
            &[0, 1, 1, 1, 0],
            &[0, 0, 0, 0, 0],
        ])
    }

    #[test]
    fn wrap_stays_in_range() {
        assert_eq!(wrap(5, 6), 5);
        assert_eq!(wrap(6, 6), 0);
        assert_eq!(wrap(-1, 6), 5);
        assert_eq!(wrap(-13, 6), 5);
        for v in -20..20 {
            let w = wrap(v, 7);
            assert!((0..7).contains(&w), "wrap({v}, 7) = {w}");
        }
    }

    #[test]
    fn wrap_offset_moves_across_edges() {
        assert_eq!(wrap_offset(0, -1, 3), 2);
        assert_eq!(wrap_offset(2, 1, 3), 0);
        assert_eq!(wrap_offset(0, 1, 1), 0);
    }

    #[test]
    fn create_field_shapes() {
        assert_eq!(create_field(1, 0), vec![Vec::<bool>::new()]);
        assert_eq!(create_field(2, 2), vec![vec![false, false], vec![false, false]]);
    }

    #[test]
    fn new_grid_is_dead() {
        let grid = Grid::new(2, 3).unwrap();
        assert_eq!(grid.width(), 2);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.live_cells(), 0);
        assert!(grid.rows().all(|row| row.len() == 3));
    }

    #[test]
    fn non_positive_dimensions_are_rejected() {
        assert_eq!(
            Grid::new(0, 4),
            Err(GridError::InvalidDimension { width: 0, height: 4 })
        );
        assert!(Grid::new(3, -1).is_err());
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = Grid::from_rows(vec![vec![false, false], vec![false]]).unwrap_err();
        assert_eq!(
            err,
            GridError::RaggedRows {
                row: 1,
                len: 1,
                expected: 2
            }
        );
    }

    #[test]
    fn glider_neighbour_counts() {
        let grid = glider();
        assert_eq!(grid.neighbour_count(0, 0), 0);
        assert_eq!(grid.neighbour_count(2, 2), 5);
        assert_eq!(grid.neighbour_count(2, 1), 3);
        assert_eq!(grid.neighbour_count(3, 3), 2);
    }

    #[test]
    fn glider_steps_to_golden_output() {
        let next = glider().step();
        let expected = grid_of(&[
            &[0, 0, 0, 0, 0],
            &[0, 0, 0, 0, 0],
            &[0, 1, 0, 1, 0],
            &[0, 0, 1, 1, 0],
            &[0, 0, 1, 0, 0],
        ]);
        assert_eq!(next, expected);
    }

    #[test]
    fn step_does_not_touch_its_input() {
        let grid = glider();
        let saved = grid.clone();
        let gen1 = grid.step();
        assert_eq!(grid, saved);

        let gen2 = gen1.step();
        assert_eq!(saved.step().step(), gen2);
    }

    #[test]
    fn neighbours_wrap_around_corners() {
        let mut grid = Grid::new(4, 4).unwrap();
        grid.set(3, 3, true);
        grid.set(0, 3, true);
        grid.set(3, 0, true);
        assert_eq!(grid.neighbour_count(0, 0), 3);
        // Corner cell is born from its wrapped neighbours.
        assert!(grid.step().get(0, 0));
    }

    #[test]
    fn single_cell_counts_itself() {
        let mut grid = Grid::new(1, 1).unwrap();
        grid.set(0, 0, true);
        assert_eq!(grid.neighbour_count(0, 0), 8);
        assert!(!grid.step().get(0, 0));
    }

    #[test]
    fn one_wide_axis_double_counts() {
        // 1x3: the row axis wraps onto itself, so each column neighbour
        // is seen three times.
        let grid = grid_of(&[&[1, 0, 0]]);
        assert_eq!(grid.neighbour_count(0, 1), 3);
        assert_eq!(grid.neighbour_count(0, 0), 2);
    }

    #[test]
    fn toggle_flips_one_cell() {
        let mut grid = Grid::new(3, 3).unwrap();
        assert!(grid.toggle(1, 2));
        assert_eq!(grid.live_cells(), 1);
        assert!(grid.get(1, 2));
        assert!(!grid.toggle(1, 2));
        assert_eq!(grid.live_cells(), 0);
    }

    #[test]
    fn out_of_range_access_is_harmless() {
        let mut grid = Grid::new(2, 2).unwrap();
        grid.set(5, 5, true);
        assert!(!grid.get(5, 5));
        assert_eq!(grid.live_cells(), 0);
    }

    #[test]
    fn randomize_then_clear() {
        let mut grid = Grid::new(8, 8).unwrap();
        let mut rng = SmallRng::seed_from_u64(42);
        grid.randomize(&mut rng);
        assert_ne!(grid.live_cells(), 0);
        assert_ne!(grid.live_cells(), 64);

        let cleared = grid.cleared();
        assert_eq!(cleared, Grid::new(8, 8).unwrap());
    }

    #[test]
    fn randomize_is_reproducible_with_a_seed() {
        let mut a = Grid::new(6, 6).unwrap();
        let mut b = Grid::new(6, 6).unwrap();
        a.randomize(&mut SmallRng::seed_from_u64(7));
        b.randomize(&mut SmallRng::seed_from_u64(7));
        assert_eq!(a, b);
    }
}
