//! Keeps a local game in step with the shared room document.
//!
//! The room document is authoritative. Each pass the client pulls it and
//! replaces its local state wholesale, lets the player act if it holds the
//! turn, and pushes the full state back when something changed. Nothing
//! arbitrates concurrent writers: the last push wins.

use crate::session::PlayerNames;
use crate::store::{DocumentPatch, DocumentStore, RoomDocument, StoreError, UNCLAIMED_NAME};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use strictly_ultimate::{
    CodecError, GameState, InvariantSet, Mark, TurnDuration, UltimateInvariants, decode, encode,
};
use tracing::{debug, info, instrument, warn};

/// Which side of a room this client sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Seat {
    /// Plays X; created the room.
    X,
    /// Plays O; joined an open room.
    O,
    /// Watches a full room.
    Spectator,
}

impl Seat {
    /// The mark this seat plays, if any.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Seat::X => Some(Mark::X),
            Seat::O => Some(Mark::O),
            Seat::Spectator => None,
        }
    }
}

/// The room as last read from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteView {
    /// Decoded game state.
    pub state: GameState,
    /// Names recorded in the document.
    pub names: PlayerNames,
}

impl RemoteView {
    fn from_document(doc: &RoomDocument) -> Result<Self, SyncError> {
        let state = decode(doc.data())?;
        if let Err(violations) = UltimateInvariants::check_all(&state) {
            for violation in &violations {
                warn!(%violation, "Remote state breaks an invariant; accepting it anyway");
            }
        }
        Ok(Self {
            state,
            names: PlayerNames::new(doc.player_x_name().clone(), doc.player_o_name().clone()),
        })
    }
}

/// Error synchronizing with the room document.
#[derive(Debug, derive_more::Display)]
pub enum SyncError {
    /// The store call failed.
    #[display("{}", _0)]
    Store(StoreError),

    /// The document's game data could not be decoded or encoded.
    #[display("{}", _0)]
    Codec(CodecError),

    /// The room document disappeared after joining.
    #[display("Room '{}' no longer exists", _0)]
    RoomVanished(String),
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::Store(e) => Some(e),
            SyncError::Codec(e) => Some(e),
            SyncError::RoomVanished(_) => None,
        }
    }
}

impl From<StoreError> for SyncError {
    fn from(e: StoreError) -> Self {
        SyncError::Store(e)
    }
}

impl From<CodecError> for SyncError {
    fn from(e: CodecError) -> Self {
        SyncError::Codec(e)
    }
}

/// One client's connection to a room.
#[derive(Clone)]
pub struct SyncManager {
    store: Arc<dyn DocumentStore>,
    room: String,
    seat: Seat,
}

impl std::fmt::Debug for SyncManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncManager")
            .field("room", &self.room)
            .field("seat", &self.seat)
            .finish_non_exhaustive()
    }
}

impl SyncManager {
    /// Joins `room`, creating it if it does not exist.
    ///
    /// The creator plays X, the next client to arrive plays O, and everyone
    /// after that watches. A fresh room starts a game at `now` with
    /// `turn_duration`; joining an existing room keeps its game as it is.
    #[instrument(skip_all, fields(room = %room, name = %name))]
    pub async fn join(
        store: Arc<dyn DocumentStore>,
        room: &str,
        name: &str,
        turn_duration: TurnDuration,
        now: DateTime<Utc>,
    ) -> Result<(Self, RemoteView), SyncError> {
        let (seat, doc) = match store.get(room).await? {
            None => {
                let state = GameState::new(turn_duration, now);
                let doc = RoomDocument::new(
                    encode(&state)?,
                    name.to_string(),
                    UNCLAIMED_NAME.to_string(),
                    true,
                    false,
                );
                store.set(room, doc.clone()).await?;
                info!(%name, "Created room, playing X");
                (Seat::X, doc)
            }
            Some(mut doc) if !doc.player_o_joined() => {
                let claim = DocumentPatch::claim_o(name.to_string());
                store.update(room, claim.clone()).await?;
                doc.apply(claim);
                info!(%name, "Joined room, playing O");
                (Seat::O, doc)
            }
            Some(doc) => {
                info!(%name, "Room is full, joining as spectator");
                (Seat::Spectator, doc)
            }
        };

        let view = RemoteView::from_document(&doc)?;
        let manager = Self {
            store,
            room: room.to_string(),
            seat,
        };
        Ok((manager, view))
    }

    /// The name to join `room` under when the player gave none.
    ///
    /// Whoever creates the room plays X and takes the configured X name;
    /// anyone joining an existing room takes the O name.
    #[instrument(skip(store, names))]
    pub async fn default_name(
        store: &dyn DocumentStore,
        room: &str,
        names: &PlayerNames,
    ) -> Result<String, StoreError> {
        let mark = match store.get(room).await? {
            None => Mark::X,
            Some(_) => Mark::O,
        };
        Ok(names.of(mark).to_string())
    }

    /// The room key.
    pub fn room(&self) -> &str {
        &self.room
    }

    /// This client's seat.
    pub fn seat(&self) -> Seat {
        self.seat
    }

    /// Reads the room document.
    #[instrument(skip(self), fields(room = %self.room))]
    pub async fn pull(&self) -> Result<RemoteView, SyncError> {
        let doc = self.store.get(&self.room).await?.ok_or_else(|| {
            warn!("Room document vanished");
            SyncError::RoomVanished(self.room.clone())
        })?;
        let view = RemoteView::from_document(&doc)?;
        debug!(turn = %view.state.current_turn(), "Pulled room state");
        Ok(view)
    }

    /// Whether this client must wait instead of moving in `state`.
    pub fn is_locked(&self, state: &GameState) -> bool {
        state.is_game_over() || self.seat.mark() != Some(state.current_turn())
    }

    /// Writes `local` to the room if it differs from `baseline`.
    ///
    /// `baseline` is the state as last pulled; the turn lock is judged on it,
    /// since `local` has usually already passed the turn on. Returns true if
    /// a write happened.
    #[instrument(skip_all, fields(room = %self.room, seat = %self.seat))]
    pub async fn push_if_changed(
        &self,
        baseline: &GameState,
        local: &GameState,
    ) -> Result<bool, SyncError> {
        if local == baseline {
            return Ok(false);
        }
        if self.is_locked(baseline) {
            debug!("Local state changed while locked; not pushing");
            return Ok(false);
        }

        let data = encode(local)?;
        self.store.update(&self.room, DocumentPatch::data(data)).await?;
        info!(turn = %local.current_turn(), "Pushed local state");
        Ok(true)
    }
}
