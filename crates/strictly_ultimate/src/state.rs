//! Complete state of one ultimate tic-tac-toe game.

use crate::coord::Coord;
use crate::rules::{is_full, legal_moves};
use crate::types::{Grid, Mark, MetaBoard, SmallBoard};
use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::instrument;

/// Seconds a player has to move before the turn clock forces a move.
///
/// Fixed for the lifetime of a game; valid range is 10 to 60 seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct TurnDuration(u32);

/// A turn duration outside the accepted range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display(
    "Turn duration {}s is outside {}..={}s",
    _0,
    TurnDuration::MIN_SECS,
    TurnDuration::MAX_SECS
)]
pub struct TurnDurationOutOfRange(pub u32);

impl std::error::Error for TurnDurationOutOfRange {}

impl TurnDuration {
    /// Shortest accepted duration.
    pub const MIN_SECS: u32 = 10;
    /// Longest accepted duration.
    pub const MAX_SECS: u32 = 60;
    /// Duration used when nothing is configured.
    pub const DEFAULT_SECS: u32 = 30;

    /// Creates a turn duration, rejecting values outside 10..=60 seconds.
    pub fn from_secs(secs: u32) -> Result<Self, TurnDurationOutOfRange> {
        if (Self::MIN_SECS..=Self::MAX_SECS).contains(&secs) {
            Ok(Self(secs))
        } else {
            Err(TurnDurationOutOfRange(secs))
        }
    }

    /// Whole seconds.
    pub fn secs(self) -> u32 {
        self.0
    }

    /// As a std duration.
    pub fn as_duration(self) -> Duration {
        Duration::from_secs(u64::from(self.0))
    }
}

impl Default for TurnDuration {
    fn default() -> Self {
        Self(Self::DEFAULT_SECS)
    }
}

impl TryFrom<u32> for TurnDuration {
    type Error = TurnDurationOutOfRange;

    fn try_from(secs: u32) -> Result<Self, Self::Error> {
        Self::from_secs(secs)
    }
}

impl From<TurnDuration> for u32 {
    fn from(duration: TurnDuration) -> Self {
        duration.0
    }
}

/// Complete game state.
///
/// Nine small boards addressed by board coordinate, the meta-board of their
/// outcomes, whose turn it is, where that player must play, and the turn
/// clock fields. Only [`apply_move`](crate::apply_move) and the turn clock
/// mutate the board fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Small boards in row-major order of their board coordinate.
    boards: [SmallBoard; 9],
    /// Outcome of each small board.
    meta_board: MetaBoard,
    /// Mark to move.
    current_turn: Mark,
    /// Board the current player must play in; `None` is free choice.
    forced_target: Option<Coord>,
    /// Winner of the meta-board.
    winner: Option<Mark>,
    /// True once the meta-board is won.
    game_over: bool,
    /// When the last move was applied (or the game created).
    last_move_at: DateTime<Utc>,
    /// Time allowed per turn.
    turn_duration: TurnDuration,
}

impl GameState {
    /// Creates a fresh game with X to move anywhere.
    #[instrument]
    pub fn new(turn_duration: TurnDuration, now: DateTime<Utc>) -> Self {
        Self {
            boards: [Grid::new(); 9],
            meta_board: Grid::new(),
            current_turn: Mark::X,
            forced_target: None,
            winner: None,
            game_over: false,
            last_move_at: now,
            turn_duration,
        }
    }

    /// Returns the small board at `board`.
    pub fn board(&self, board: Coord) -> &SmallBoard {
        &self.boards[board.index()]
    }

    /// Returns the meta-board.
    pub fn meta_board(&self) -> &MetaBoard {
        &self.meta_board
    }

    /// Returns the mark to move.
    pub fn current_turn(&self) -> Mark {
        self.current_turn
    }

    /// Returns the board the current player must play in.
    pub fn forced_target(&self) -> Option<Coord> {
        self.forced_target
    }

    /// Returns the winner of the game.
    pub fn winner(&self) -> Option<Mark> {
        self.winner
    }

    /// Returns true once the meta-board has been won.
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Returns when the last move was applied.
    pub fn last_move_at(&self) -> DateTime<Utc> {
        self.last_move_at
    }

    /// Returns the time allowed per turn.
    pub fn turn_duration(&self) -> TurnDuration {
        self.turn_duration
    }

    /// A board is closed once it is decided or has no empty cell left.
    pub fn is_board_closed(&self, board: Coord) -> bool {
        !self.meta_board.is_empty(board) || is_full(self.board(board))
    }

    /// Whether the current player may play in `board` right now.
    pub fn is_board_active(&self, board: Coord) -> bool {
        !self.game_over
            && !self.is_board_closed(board)
            && self.forced_target.is_none_or(|target| target == board)
    }

    /// True when the game is not over but nobody can move.
    pub fn is_stalemate(&self) -> bool {
        !self.game_over && legal_moves(self).is_empty()
    }

    /// Restarts the turn clock.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_move_at = now;
    }

    pub(crate) fn board_mut(&mut self, board: Coord) -> &mut SmallBoard {
        &mut self.boards[board.index()]
    }

    pub(crate) fn meta_board_mut(&mut self) -> &mut MetaBoard {
        &mut self.meta_board
    }

    pub(crate) fn set_forced_target(&mut self, target: Option<Coord>) {
        self.forced_target = target;
    }

    pub(crate) fn end_turn(&mut self) {
        self.current_turn = self.current_turn.opponent();
    }

    /// Ends the game. Nobody is forced anywhere once it is over.
    pub(crate) fn declare_winner(&mut self, mark: Mark) {
        self.winner = Some(mark);
        self.game_over = true;
        self.forced_target = None;
    }
}
