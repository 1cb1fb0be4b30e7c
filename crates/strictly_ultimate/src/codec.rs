//! Text encoding of a [`GameState`] for the shared room document.

use crate::state::GameState;
use derive_more::{Display, Error};
use tracing::instrument;

/// A room document whose game data could not be decoded.
#[derive(Debug, Display, Error)]
#[display("Invalid game data: {}", source)]
pub struct CodecError {
    /// Underlying JSON error.
    pub source: serde_json::Error,
}

/// Encodes the full state as JSON.
#[instrument(skip(state))]
pub fn encode(state: &GameState) -> Result<String, CodecError> {
    serde_json::to_string(state).map_err(|source| CodecError { source })
}

/// Decodes a state produced by [`encode`].
///
/// Out-of-range coordinates and turn durations are rejected here; game-level
/// consistency is left to the invariant checks.
#[instrument(skip(data), fields(len = data.len()))]
pub fn decode(data: &str) -> Result<GameState, CodecError> {
    serde_json::from_str(data).map_err(|source| CodecError { source })
}
