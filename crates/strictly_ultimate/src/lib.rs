//! Ultimate tic-tac-toe game logic.
//!
//! Nine 3x3 boards sit in a 3x3 meta-board. Winning a small board claims the
//! matching meta-cell; winning the meta-board wins the game. Each move also
//! decides where the opponent must play next.
//!
//! # Architecture
//!
//! - **State**: [`GameState`] holds the boards, meta-board, turn, forced target and clock fields
//! - **Rules**: [`apply_move`] validates and applies a move, scoring both levels
//! - **AI**: [`select_move`] picks a win, a block or a random legal move
//! - **Clock**: [`expire`] forces a move when the side to move runs out of time
//! - **Codec**: [`encode`] / [`decode`] for sharing state between clients
//!
//! # Example
//!
//! ```
//! use strictly_ultimate::{apply_move, Coord, GameState, Mark, Move, MoveOutcome, TurnDuration};
//!
//! let mut state = GameState::new(TurnDuration::default(), chrono::Utc::now());
//! let outcome = apply_move(&mut state, Move::new(Coord::CENTER, Coord::CENTER));
//! assert_eq!(outcome, Ok(MoveOutcome::Applied));
//! assert_eq!(state.forced_target(), Some(Coord::CENTER));
//! assert_eq!(state.current_turn(), Mark::O);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod ai;
mod clock;
mod codec;
mod coord;
pub mod invariants;
pub mod rules;
mod state;
mod types;

pub use action::{Move, MoveError, MoveOutcome};
pub use ai::{Tier, select_move, select_move_with_tier};
pub use clock::{Expiry, expire, is_expired, remaining};
pub use codec::{CodecError, decode, encode};
pub use coord::{Coord, CoordOutOfRange};
pub use invariants::{Invariant, InvariantSet, InvariantViolation, UltimateInvariants};
pub use rules::{apply_move, check_line_winner, is_full, legal_moves, validate_move};
pub use state::{GameState, TurnDuration, TurnDurationOutOfRange};
pub use types::{Cell, Grid, Mark, MetaBoard, SmallBoard};
