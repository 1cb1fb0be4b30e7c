//! Winner invariant: the game ends exactly when the meta-board is won.

use super::Invariant;
use crate::rules::line_owners;
use crate::state::GameState;

/// Invariant: `winner` is set iff `game_over`, and then it is the single
/// owner of a meta-board line. A running game has no meta-board line.
pub struct WinnerMatchesMetaBoardInvariant;

impl Invariant<GameState> for WinnerMatchesMetaBoardInvariant {
    fn holds(state: &GameState) -> bool {
        let owners = line_owners(state.meta_board());
        match (state.winner(), state.is_game_over()) {
            (Some(winner), true) => owners == [winner],
            (None, false) => owners.is_empty(),
            _ => false,
        }
    }

    fn description() -> &'static str {
        "Winner is set iff the game is over and owns a meta-board line"
    }
}
