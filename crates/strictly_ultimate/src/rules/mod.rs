//! Rules of ultimate tic-tac-toe.
//!
//! Pure grid predicates live in [`win`] and [`full`]; this module composes
//! them into move validation, nested win detection and forced-board
//! targeting.

pub mod full;
pub mod win;

pub use full::is_full;
pub use win::{check_line_winner, line_owners};

use crate::action::{Move, MoveError, MoveOutcome};
use crate::coord::Coord;
use crate::invariants::{InvariantSet, UltimateInvariants};
use crate::state::GameState;
use crate::types::Cell;
use tracing::{debug, error, info, instrument, warn};

/// Checks every precondition of `mv` against `state` without touching it.
///
/// Checks run in a fixed order and stop at the first failure: game over,
/// wrong board, decided board, occupied cell.
pub fn validate_move(state: &GameState, mv: Move) -> Result<(), MoveError> {
    if state.is_game_over() {
        return Err(MoveError::GameOver);
    }
    if let Some(required) = state.forced_target()
        && mv.board != required
    {
        return Err(MoveError::WrongBoard { required });
    }
    if !state.meta_board().is_empty(mv.board) {
        return Err(MoveError::BoardDecided(mv.board));
    }
    if !state.board(mv.board).is_empty(mv.cell) {
        return Err(MoveError::CellOccupied {
            board: mv.board,
            cell: mv.cell,
        });
    }
    Ok(())
}

/// Plays `mv` for the mark whose turn it is.
///
/// On rejection the state is left exactly as it was. On success the cell is
/// marked, the small board and then the meta-board are re-scored, and either
/// the game ends or the turn passes with the next forced target set to the
/// cell just played (free choice if that board is already closed).
#[instrument(skip(state), fields(turn = %state.current_turn()))]
pub fn apply_move(state: &mut GameState, mv: Move) -> Result<MoveOutcome, MoveError> {
    if let Err(e) = validate_move(state, mv) {
        warn!(error = %e, "Move rejected");
        return Err(e);
    }

    let mark = state.current_turn();
    let board = state.board_mut(mv.board);
    board.set(mv.cell, Cell::Marked(mark));

    if let Some(small_winner) = check_line_winner(board) {
        debug!(board = %mv.board, winner = %small_winner, "Small board decided");
        state.meta_board_mut().set(mv.board, Cell::Marked(small_winner));
    }

    if let Some(winner) = check_line_winner(state.meta_board()) {
        state.declare_winner(winner);
        info!(winner = %winner, "Game won");
        check_invariants(state);
        return Ok(MoveOutcome::Won(winner));
    }

    let next = next_target(state, mv.cell);
    state.set_forced_target(next);
    state.end_turn();

    debug!(forced_target = ?next, next_turn = %state.current_turn(), "Move applied");
    check_invariants(state);
    Ok(MoveOutcome::Applied)
}

/// The board the opponent is sent to by playing `cell`, or free choice.
fn next_target(state: &GameState, cell: Coord) -> Option<Coord> {
    if state.is_board_closed(cell) {
        None
    } else {
        Some(cell)
    }
}

/// Every move the current player may make, in row-major order of board then
/// cell.
pub fn legal_moves(state: &GameState) -> Vec<Move> {
    if state.is_game_over() {
        return Vec::new();
    }

    Coord::ALL
        .into_iter()
        .filter(|&board| state.forced_target().is_none_or(|target| target == board))
        .filter(|&board| state.meta_board().is_empty(board))
        .flat_map(|board| {
            state
                .board(board)
                .empty_cells()
                .map(move |cell| Move::new(board, cell))
        })
        .collect()
}

/// Logs every invariant the state breaks after a move.
///
/// States pulled from a room are accepted even when broken, so a violation
/// here is reported rather than treated as fatal.
fn check_invariants(state: &GameState) {
    if let Err(violations) = UltimateInvariants::check_all(state) {
        for violation in &violations {
            error!(%violation, "Invariant violated after move");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::TurnDuration;
    use crate::types::Mark;
    use chrono::{DateTime, Utc};

    fn fresh() -> GameState {
        GameState::new(
            TurnDuration::default(),
            DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap(),
        )
    }

    fn c(row: u8, col: u8) -> Coord {
        Coord::new(row, col).unwrap()
    }

    #[test]
    fn test_first_move_sets_target_and_flips_turn() {
        let mut state = fresh();
        let outcome = apply_move(&mut state, Move::new(c(1, 1), c(0, 2)));
        assert_eq!(outcome, Ok(MoveOutcome::Applied));
        assert_eq!(state.board(c(1, 1)).get(c(0, 2)), Cell::Marked(Mark::X));
        assert_eq!(state.forced_target(), Some(c(0, 2)));
        assert_eq!(state.current_turn(), Mark::O);
    }

    #[test]
    fn test_wrong_board_rejected_without_change() {
        let mut state = fresh();
        apply_move(&mut state, Move::new(c(1, 1), c(0, 2))).unwrap();
        let before = state.clone();

        let result = apply_move(&mut state, Move::new(c(0, 0), c(0, 0)));
        assert_eq!(result, Err(MoveError::WrongBoard { required: c(0, 2) }));
        assert_eq!(state, before);
    }

    #[test]
    fn test_occupied_cell_rejected() {
        let mut state = fresh();
        // X: (1,1)/(1,1) sends O back to (1,1).
        apply_move(&mut state, Move::new(c(1, 1), c(1, 1))).unwrap();
        let before = state.clone();
        let result = apply_move(&mut state, Move::new(c(1, 1), c(1, 1)));
        assert_eq!(
            result,
            Err(MoveError::CellOccupied {
                board: c(1, 1),
                cell: c(1, 1)
            })
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_legal_moves_free_choice_and_forced() {
        let mut state = fresh();
        assert_eq!(legal_moves(&state).len(), 81);

        apply_move(&mut state, Move::new(c(0, 0), c(2, 2))).unwrap();
        let moves = legal_moves(&state);
        assert_eq!(moves.len(), 9);
        assert!(moves.iter().all(|m| m.board == c(2, 2)));
        assert_eq!(moves[0], Move::new(c(2, 2), c(0, 0)));
    }

    #[test]
    fn test_validate_order_reports_game_over_first() {
        let mut state = fresh();
        state.declare_winner(Mark::O);
        assert_eq!(
            validate_move(&state, Move::new(c(0, 0), c(0, 0))),
            Err(MoveError::GameOver)
        );
    }
}
