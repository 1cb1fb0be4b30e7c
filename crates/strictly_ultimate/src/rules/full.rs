//! Full-grid detection.

use crate::types::Grid;

/// Returns true if no empty cell remains.
///
/// A full small board with no winner is closed: it can never be decided and
/// is never used as a forced target.
pub fn is_full(grid: &Grid) -> bool {
    grid.cells().iter().all(|cell| !cell.is_empty())
}
