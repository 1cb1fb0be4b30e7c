//! Turn clock.
//!
//! The clock is sampled, not driven: callers pass `now` once per loop pass
//! and the clock decides whether the current turn has run out. When it has,
//! the side to move gets a heuristic move played for it, whether that side
//! is a person or the computer.

use crate::action::{Move, MoveOutcome};
use crate::ai::select_move;
use crate::rules::apply_move;
use crate::state::GameState;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// What happened when a turn ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// A move was played on behalf of the side to move.
    Forced {
        /// The move that was played.
        mv: Move,
        /// Its result.
        outcome: MoveOutcome,
    },
    /// Time ran out but no legal move exists.
    Stalemate,
}

/// Time left in the current turn, between zero and the turn duration.
///
/// A last-move timestamp in the future (another client's clock running
/// ahead) counts as a turn that has just started.
pub fn remaining(state: &GameState, now: DateTime<Utc>) -> Duration {
    let total = state.turn_duration().as_duration();
    let elapsed = (now - state.last_move_at()).to_std().unwrap_or(Duration::ZERO);
    total.saturating_sub(elapsed)
}

/// Returns true once the current turn has no time left.
pub fn is_expired(state: &GameState, now: DateTime<Utc>) -> bool {
    remaining(state, now).is_zero()
}

/// Forces a move if the current turn has run out.
///
/// Returns `None` while time remains or after the game is over. Otherwise
/// the clock restarts at `now` and a heuristic move for the side to move is
/// applied exactly as a normal move would be.
#[instrument(skip(state, rng), fields(turn = %state.current_turn()))]
pub fn expire<R: Rng + ?Sized>(
    state: &mut GameState,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Option<Expiry> {
    if state.is_game_over() || !is_expired(state, now) {
        return None;
    }

    let mark = state.current_turn();
    let Some(mv) = select_move(state, mark, rng) else {
        warn!("Turn expired with no legal move");
        state.touch(now);
        return Some(Expiry::Stalemate);
    };

    match apply_move(state, mv) {
        Ok(outcome) => {
            state.touch(now);
            info!(%mark, %mv, ?outcome, "Turn expired, move forced");
            Some(Expiry::Forced { mv, outcome })
        }
        Err(e) => {
            // select_move only yields legal moves; treat a rejection as no move.
            warn!(error = %e, "Forced move rejected");
            state.touch(now);
            Some(Expiry::Stalemate)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Coord, Mark, TurnDuration};
    use chrono::TimeDelta;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn start() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn fresh(secs: u32) -> GameState {
        GameState::new(TurnDuration::from_secs(secs).unwrap(), start())
    }

    #[test]
    fn test_remaining_counts_down_and_clamps() {
        let state = fresh(30);
        assert_eq!(remaining(&state, start()), Duration::from_secs(30));
        assert_eq!(
            remaining(&state, start() + TimeDelta::seconds(12)),
            Duration::from_secs(18)
        );
        assert_eq!(remaining(&state, start() + TimeDelta::seconds(45)), Duration::ZERO);
        assert_eq!(
            remaining(&state, start() - TimeDelta::seconds(5)),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn test_no_expiry_while_time_remains() {
        let mut state = fresh(10);
        let before = state.clone();
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(expire(&mut state, start() + TimeDelta::seconds(9), &mut rng), None);
        assert_eq!(state, before);
    }

    #[test]
    fn test_expiry_forces_move_for_side_to_move() {
        let mut state = fresh(10);
        let now = start() + TimeDelta::seconds(10);
        let mut rng = StdRng::seed_from_u64(3);

        let expiry = expire(&mut state, now, &mut rng);
        let Some(Expiry::Forced { mv, outcome }) = expiry else {
            panic!("expected a forced move, got {expiry:?}");
        };
        assert_eq!(outcome, MoveOutcome::Applied);
        assert_eq!(state.board(mv.board).get(mv.cell).mark(), Some(Mark::X));
        assert_eq!(state.current_turn(), Mark::O);
        assert_eq!(state.forced_target(), Some(mv.cell));
        assert_eq!(state.last_move_at(), now);
        assert_eq!(remaining(&state, now), Duration::from_secs(10));
    }

    #[test]
    fn test_no_expiry_after_game_over() {
        let mut state = fresh(10);
        state.declare_winner(Mark::O);
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(expire(&mut state, start() + TimeDelta::seconds(60), &mut rng), None);
        assert_eq!(state.last_move_at(), start());
        assert!(state.board(Coord::CENTER).empty_cells().count() == 9);
    }
}
