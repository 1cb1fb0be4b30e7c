//! Moves and their results.
//!
//! A move names a small board and a cell inside it; the mark comes from the
//! state being played on, never from the caller.

use crate::coord::Coord;
use crate::types::Mark;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A placement: which small board, and which cell inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// Coordinate of the small board on the meta-board.
    pub board: Coord,
    /// Coordinate of the cell inside that small board.
    pub cell: Coord,
}

impl Move {
    /// Creates a new move.
    #[instrument]
    pub fn new(board: Coord, cell: Coord) -> Self {
        Self { board, cell }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "board {} cell {}", self.board, self.cell)
    }
}

/// Result of an accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveOutcome {
    /// The move was applied and play continues.
    Applied,
    /// The move won the meta-board for this mark.
    Won(Mark),
}

/// Why a move was rejected. A rejected move never changes the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum MoveError {
    /// The game is already over.
    #[display("Game is already over")]
    GameOver,

    /// The player must play in a different board.
    #[display("Must play in board {}", required)]
    WrongBoard {
        /// Board the player was sent to.
        required: Coord,
    },

    /// The target small board has already been won.
    #[display("Board {} is already decided", _0)]
    BoardDecided(Coord),

    /// The target cell is taken.
    #[display("Cell {} of board {} is already occupied", cell, board)]
    CellOccupied {
        /// Board of the attempted move.
        board: Coord,
        /// Cell of the attempted move.
        cell: Coord,
    },
}

impl std::error::Error for MoveError {}
