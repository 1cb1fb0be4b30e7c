//! Heuristic move selection.
//!
//! Three tiers, first match wins: complete a line in a small board, block the
//! opponent from completing one, otherwise play a uniformly random legal
//! move. There is no look-ahead beyond the current small board.

use crate::action::Move;
use crate::rules::{check_line_winner, legal_moves};
use crate::state::GameState;
use crate::types::{Cell, Mark};
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, instrument};

/// Which tier of the heuristic produced a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Tier {
    /// The move wins a small board.
    Win,
    /// The move stops the opponent winning a small board.
    Block,
    /// No tactical move was found.
    Random,
}

/// Picks a move for `mark` on `state`, or `None` if no legal move exists.
///
/// `mark` is normally the side to move, but the tiers only look at the
/// boards, so any mark can be evaluated.
#[instrument(skip(state, rng))]
pub fn select_move<R: Rng + ?Sized>(state: &GameState, mark: Mark, rng: &mut R) -> Option<Move> {
    select_move_with_tier(state, mark, rng).map(|(mv, _)| mv)
}

/// Same as [`select_move`], also reporting which tier decided.
pub fn select_move_with_tier<R: Rng + ?Sized>(
    state: &GameState,
    mark: Mark,
    rng: &mut R,
) -> Option<(Move, Tier)> {
    let candidates = legal_moves(state);
    if candidates.is_empty() {
        debug!("No legal moves");
        return None;
    }

    let pick = first_completing(state, &candidates, mark)
        .map(|mv| (mv, Tier::Win))
        .or_else(|| first_completing(state, &candidates, mark.opponent()).map(|mv| (mv, Tier::Block)))
        .or_else(|| candidates.choose(rng).map(|&mv| (mv, Tier::Random)));

    if let Some((mv, tier)) = pick {
        debug!(%mv, %tier, candidates = candidates.len(), "Selected move");
    }
    pick
}

/// First candidate that would give `mark` a line in its small board.
///
/// Each placement is tried on a copy of the small board, so the state is
/// never written to.
fn first_completing(state: &GameState, candidates: &[Move], mark: Mark) -> Option<Move> {
    candidates.iter().copied().find(|mv| {
        let mut trial = *state.board(mv.board);
        trial.set(mv.cell, Cell::Marked(mark));
        check_line_winner(&trial) == Some(mark)
    })
}
