//! Forced-target invariant: the player is never sent to a closed board.

use super::Invariant;
use crate::rules::is_full;
use crate::state::GameState;

/// Invariant: a forced target always names an undecided board with room left.
pub struct ForcedTargetOpenInvariant;

impl Invariant<GameState> for ForcedTargetOpenInvariant {
    fn holds(state: &GameState) -> bool {
        state.forced_target().is_none_or(|target| {
            state.meta_board().is_empty(target) && !is_full(state.board(target))
        })
    }

    fn description() -> &'static str {
        "Forced target names an undecided, non-full board"
    }
}
