//! Remote document store holding one shared document per room.
//!
//! The store is a plain key/value service: it never looks inside the game
//! data and never validates moves. Clients read the whole document, write the
//! whole document, or patch individual fields.

mod http;
mod memory;
mod retry;

pub use http::HttpStore;
pub use memory::InMemoryStore;
pub use retry::{RetryPolicy, RetryingStore};

use async_trait::async_trait;
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};

/// Name written for the O seat until somebody claims it.
pub const UNCLAIMED_NAME: &str = "...";

/// The persisted document for one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct RoomDocument {
    /// Encoded game state.
    data: String,
    /// Display name of the X player.
    player_x_name: String,
    /// Display name of the O player.
    player_o_name: String,
    /// Whether the X seat is taken.
    player_x_joined: bool,
    /// Whether the O seat is taken.
    player_o_joined: bool,
}

impl RoomDocument {
    /// Overwrites every field that the patch carries.
    pub fn apply(&mut self, patch: DocumentPatch) {
        if let Some(data) = patch.data {
            self.data = data;
        }
        if let Some(name) = patch.player_x_name {
            self.player_x_name = name;
        }
        if let Some(name) = patch.player_o_name {
            self.player_o_name = name;
        }
        if let Some(joined) = patch.player_x_joined {
            self.player_x_joined = joined;
        }
        if let Some(joined) = patch.player_o_joined {
            self.player_o_joined = joined;
        }
    }
}

/// A partial update of a [`RoomDocument`]; absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentPatch {
    /// New encoded game state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// New X name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_x_name: Option<String>,
    /// New O name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_o_name: Option<String>,
    /// New X seat flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_x_joined: Option<bool>,
    /// New O seat flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_o_joined: Option<bool>,
}

impl DocumentPatch {
    /// Replaces only the game data.
    pub fn data(data: String) -> Self {
        Self {
            data: Some(data),
            ..Self::default()
        }
    }

    /// Takes the O seat under `name`.
    pub fn claim_o(name: String) -> Self {
        Self {
            player_o_name: Some(name),
            player_o_joined: Some(true),
            ..Self::default()
        }
    }
}

/// Error talking to the document store.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum StoreError {
    /// The store could not be reached or failed internally. Worth retrying.
    #[display("Store unavailable: {}", _0)]
    Unavailable(String),

    /// An update targeted a room that does not exist.
    #[display("Room '{}' not found", _0)]
    NotFound(String),

    /// The store answered but refused or garbled the request.
    #[display("Store rejected request: {}", _0)]
    Rejected(String),
}

impl StoreError {
    /// Whether retrying the same call might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl std::error::Error for StoreError {}

/// Key/value access to room documents.
///
/// Calls are awaited one at a time by their callers, so from the game's
/// point of view every call is synchronous. There is no compare-and-swap:
/// the last write wins.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetches the document for `key`, or `None` if the room does not exist.
    async fn get(&self, key: &str) -> Result<Option<RoomDocument>, StoreError>;

    /// Creates or replaces the document for `key`.
    async fn set(&self, key: &str, doc: RoomDocument) -> Result<(), StoreError>;

    /// Applies a partial update to an existing document.
    async fn update(&self, key: &str, patch: DocumentPatch) -> Result<(), StoreError>;
}
