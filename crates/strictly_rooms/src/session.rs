//! A game being played in one of the three modes.

use crate::store::DocumentStore;
use crate::sync::{Seat, SyncError, SyncManager};
use chrono::{DateTime, Utc};
use derive_new::new;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use strictly_ultimate::{
    Cell, Coord, Expiry, GameState, Mark, Move, MoveError, MoveOutcome, TurnDuration, apply_move,
    expire, remaining, select_move,
};
use tracing::{debug, info, instrument, warn};

/// Display names of both sides.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct PlayerNames {
    /// Name of the X player.
    pub x: String,
    /// Name of the O player.
    pub o: String,
}

impl PlayerNames {
    /// Name of whoever plays `mark`.
    pub fn of(&self, mark: Mark) -> &str {
        match mark {
            Mark::X => &self.x,
            Mark::O => &self.o,
        }
    }
}

/// How the two sides are played.
#[derive(Debug, Clone)]
pub enum GameMode {
    /// Both sides at the same keyboard.
    Local,
    /// One side is the computer.
    VersusAi {
        /// The computer's mark.
        ai: Mark,
    },
    /// Each side on its own client, sharing a room document.
    Online(SyncManager),
}

impl GameMode {
    /// Short human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            GameMode::Local => "Local (2 players)",
            GameMode::VersusAi { .. } => "Versus computer",
            GameMode::Online(_) => "Online",
        }
    }
}

/// Error from a session operation.
#[derive(Debug, derive_more::Display)]
pub enum SessionError {
    /// It is not this client's turn to act.
    #[display("Waiting for the other side")]
    Locked,

    /// The move broke the rules.
    #[display("{}", _0)]
    Move(MoveError),

    /// The room could not be joined.
    #[display("{}", _0)]
    Sync(SyncError),
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Locked => None,
            SessionError::Move(e) => Some(e),
            SessionError::Sync(e) => Some(e),
        }
    }
}

impl From<MoveError> for SessionError {
    fn from(e: MoveError) -> Self {
        SessionError::Move(e)
    }
}

impl From<SyncError> for SessionError {
    fn from(e: SyncError) -> Self {
        SessionError::Sync(e)
    }
}

/// What one loop pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// The turn clock ran out.
    pub expiry: Option<Expiry>,
    /// The computer moved.
    pub ai_move: Option<Move>,
    /// Local state was written to the room.
    pub pushed: bool,
}

/// One small board as shown to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardView {
    /// Position on the meta-board.
    pub coord: Coord,
    /// Cells in row-major order.
    pub cells: [Cell; 9],
    /// Who took this board, if anyone.
    pub winner: Option<Mark>,
    /// Whether the side to move may play here.
    pub active: bool,
}

/// Read-only picture of a session for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Small boards in row-major order.
    pub boards: [BoardView; 9],
    /// Side to move.
    pub current_turn: Mark,
    /// Board the side to move must play in, if constrained.
    pub forced_target: Option<Coord>,
    /// Winner of the game.
    pub winner: Option<Mark>,
    /// Whether the game has ended.
    pub game_over: bool,
    /// Nobody has won and nobody can move.
    pub stalemate: bool,
    /// Whole seconds left in the current turn.
    pub remaining_secs: u64,
    /// Mode name.
    pub mode: &'static str,
    /// Room key when online.
    pub room: Option<String>,
    /// Seat when online.
    pub seat: Option<Seat>,
    /// Whether input is currently refused.
    pub locked: bool,
    /// Display names.
    pub names: PlayerNames,
    /// The computer's mark in versus mode.
    pub ai: Option<Mark>,
    /// Latest notice for the player, e.g. an unreachable store.
    pub notice: Option<String>,
}

impl SessionSnapshot {
    /// Whose turn it is and where they may play.
    pub fn status_line(&self) -> String {
        let hint = if self.forced_target.is_some() {
            "play in the highlighted board"
        } else {
            "Free choice!"
        };
        format!(
            "Turn: {} ({}) | {}",
            self.names.of(self.current_turn),
            self.current_turn,
            hint
        )
    }

    /// Result announcement once the game is won or stuck.
    pub fn outcome_line(&self) -> Option<String> {
        if self.stalemate {
            return Some("No moves left: stalemate!".to_string());
        }
        let winner = self.winner?;
        Some(match self.ai {
            Some(ai) if ai == winner => "The computer won!".to_string(),
            Some(_) => "You won!".to_string(),
            None => format!("Winner: {}!", self.names.of(winner)),
        })
    }
}

/// One game plus the way it is being played.
#[derive(Debug)]
pub struct Session {
    state: GameState,
    mode: GameMode,
    names: PlayerNames,
    /// Online only: the room state as last pulled.
    baseline: Option<GameState>,
    notice: Option<String>,
    rng: StdRng,
    turn_duration: TurnDuration,
}

impl Session {
    fn with_mode(
        mode: GameMode,
        names: PlayerNames,
        state: GameState,
        baseline: Option<GameState>,
    ) -> Self {
        let turn_duration = state.turn_duration();
        Self {
            state,
            mode,
            names,
            baseline,
            notice: None,
            rng: StdRng::from_os_rng(),
            turn_duration,
        }
    }

    /// Two players sharing one client.
    #[instrument(skip(names))]
    pub fn local(names: PlayerNames, turn_duration: TurnDuration, now: DateTime<Utc>) -> Self {
        info!("Starting local game");
        Self::with_mode(GameMode::Local, names, GameState::new(turn_duration, now), None)
    }

    /// A player against the computer, which plays `ai`.
    #[instrument(skip(names))]
    pub fn versus_ai(
        names: PlayerNames,
        ai: Mark,
        turn_duration: TurnDuration,
        now: DateTime<Utc>,
    ) -> Self {
        info!(%ai, "Starting game against the computer");
        Self::with_mode(
            GameMode::VersusAi { ai },
            names,
            GameState::new(turn_duration, now),
            None,
        )
    }

    /// Joins or creates the room `room` in `store`.
    #[instrument(skip(store, turn_duration, now))]
    pub async fn online(
        store: Arc<dyn DocumentStore>,
        room: &str,
        name: &str,
        turn_duration: TurnDuration,
        now: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        let (sync, view) = SyncManager::join(store, room, name, turn_duration, now).await?;
        info!(seat = %sync.seat(), "Online game ready");
        let mut session = Self::with_mode(
            GameMode::Online(sync),
            view.names,
            view.state.clone(),
            Some(view.state),
        );
        session.turn_duration = turn_duration;
        Ok(session)
    }

    /// Replaces the random source, for reproducible play.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// The current game.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// The play mode.
    pub fn mode(&self) -> &GameMode {
        &self.mode
    }

    /// The latest notice, if any.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Whether player input is refused right now.
    pub fn is_locked(&self) -> bool {
        match &self.mode {
            GameMode::Local => false,
            GameMode::VersusAi { ai } => {
                !self.state.is_game_over() && self.state.current_turn() == *ai
            }
            GameMode::Online(sync) => sync.is_locked(&self.state),
        }
    }

    /// Plays a move for the side to move.
    ///
    /// Online, the move is pushed to the room straight away. If the store
    /// cannot be reached the move stays local and a notice is recorded.
    #[instrument(skip(self, now), fields(mode = self.mode.name()))]
    pub async fn play(&mut self, mv: Move, now: DateTime<Utc>) -> Result<MoveOutcome, SessionError> {
        if self.is_locked() {
            debug!(%mv, "Input while locked");
            return Err(SessionError::Locked);
        }
        let outcome = apply_move(&mut self.state, mv)?;
        self.state.touch(now);
        self.flush().await;
        Ok(outcome)
    }

    /// Runs one loop pass: sync, turn clock, computer move, sync.
    #[instrument(skip(self, now), fields(mode = self.mode.name()))]
    pub async fn tick(&mut self, now: DateTime<Utc>) -> TickReport {
        let mut report = TickReport {
            pushed: self.flush().await,
            ..TickReport::default()
        };
        self.refresh().await;

        let clock_runs = match &self.mode {
            GameMode::Online(sync) => !sync.is_locked(&self.state),
            _ => true,
        };
        if clock_runs {
            report.expiry = expire(&mut self.state, now, &mut self.rng);
        }

        if let GameMode::VersusAi { ai } = self.mode {
            if !self.state.is_game_over() && self.state.current_turn() == ai {
                report.ai_move = self.computer_move(ai, now);
            }
        }

        report.pushed |= self.flush().await;
        report
    }

    fn computer_move(&mut self, ai: Mark, now: DateTime<Utc>) -> Option<Move> {
        let mv = select_move(&self.state, ai, &mut self.rng)?;
        match apply_move(&mut self.state, mv) {
            Ok(outcome) => {
                self.state.touch(now);
                debug!(%mv, ?outcome, "Computer moved");
                Some(mv)
            }
            Err(e) => {
                warn!(error = %e, %mv, "Computer chose a rejected move");
                None
            }
        }
    }

    /// Replaces the local game with the room's copy. Does nothing offline.
    ///
    /// A local move that has not reached the room yet survives the refresh,
    /// notice included, as long as the room still holds the state it was
    /// played on. If the room moved on in the meantime the room wins and the
    /// notice says the move was dropped.
    ///
    /// Returns false if the room could not be read; the local game is kept
    /// and a notice explains why.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self) -> bool {
        let GameMode::Online(sync) = &self.mode else {
            return true;
        };
        match sync.pull().await {
            Ok(view) => {
                let unsent = self.has_unsent_move();
                self.names = view.names;
                if unsent && self.baseline.as_ref() == Some(&view.state) {
                    debug!("Room unchanged, keeping unsent local move");
                    return true;
                }
                self.notice = if unsent {
                    warn!("Room changed before the local move was sent; dropping it");
                    Some("Room changed before your move was sent; move dropped".to_string())
                } else {
                    None
                };
                self.state = view.state.clone();
                self.baseline = Some(view.state);
                true
            }
            Err(e) => {
                warn!(error = %e, "Refresh failed, playing on unsynced");
                self.notice = Some(format!("Offline: {}", e));
                false
            }
        }
    }

    /// Whether the local game holds a move of ours the room has not seen.
    fn has_unsent_move(&self) -> bool {
        match (&self.mode, &self.baseline) {
            (GameMode::Online(sync), Some(baseline)) => {
                self.state != *baseline && !sync.is_locked(baseline)
            }
            _ => false,
        }
    }

    /// Pushes local changes to the room. Returns true if a write happened.
    async fn flush(&mut self) -> bool {
        let (GameMode::Online(sync), Some(baseline)) = (&self.mode, &self.baseline) else {
            return false;
        };
        match sync.push_if_changed(baseline, &self.state).await {
            Ok(true) => {
                self.baseline = Some(self.state.clone());
                true
            }
            Ok(false) => false,
            Err(e) => {
                warn!(error = %e, "Push failed, keeping local move");
                self.notice = Some(format!("Offline: {}", e));
                false
            }
        }
    }

    /// Starts a new game. Online, this also leaves the room.
    #[instrument(skip(self, now))]
    pub fn reset(&mut self, now: DateTime<Utc>) {
        if let GameMode::Online(sync) = &self.mode {
            info!(room = %sync.room(), "Leaving room");
            self.notice = Some(format!("Left room '{}'", sync.room()));
            self.mode = GameMode::Local;
            self.baseline = None;
        } else {
            self.notice = None;
        }
        self.state = GameState::new(self.turn_duration, now);
        info!(mode = self.mode.name(), "New game");
    }

    /// A read-only picture of the session at `now`.
    pub fn snapshot(&self, now: DateTime<Utc>) -> SessionSnapshot {
        let state = &self.state;
        let boards = Coord::ALL.map(|coord| BoardView {
            coord,
            cells: *state.board(coord).cells(),
            winner: state.meta_board().get(coord).mark(),
            active: state.is_board_active(coord),
        });
        let (room, seat) = match &self.mode {
            GameMode::Online(sync) => (Some(sync.room().to_string()), Some(sync.seat())),
            _ => (None, None),
        };
        let ai = match self.mode {
            GameMode::VersusAi { ai } => Some(ai),
            _ => None,
        };

        SessionSnapshot {
            boards,
            current_turn: state.current_turn(),
            forced_target: state.forced_target(),
            winner: state.winner(),
            game_over: state.is_game_over(),
            stalemate: state.is_stalemate(),
            remaining_secs: remaining(state, now).as_secs(),
            mode: self.mode.name(),
            room,
            seat,
            locked: self.is_locked(),
            names: self.names.clone(),
            ai,
            notice: self.notice.clone(),
        }
    }
}
