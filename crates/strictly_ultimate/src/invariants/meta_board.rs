//! Meta-board consistency: each meta-cell agrees with its small board.

use super::Invariant;
use crate::coord::Coord;
use crate::rules::line_owners;
use crate::state::GameState;

/// Invariant: a meta-cell holds a mark exactly when its small board has a
/// line of that mark, and no small board has lines for both marks.
///
/// Play stops in a board as soon as it is decided, so the first line is the
/// only line.
pub struct MetaBoardConsistentInvariant;

impl Invariant<GameState> for MetaBoardConsistentInvariant {
    fn holds(state: &GameState) -> bool {
        Coord::ALL.into_iter().all(|board| {
            let owners = line_owners(state.board(board));
            match state.meta_board().get(board).mark() {
                Some(mark) => owners == [mark],
                None => owners.is_empty(),
            }
        })
    }

    fn description() -> &'static str {
        "Meta-board cells match their small boards' winners"
    }
}
