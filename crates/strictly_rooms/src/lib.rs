//! Strictly Rooms - ultimate tic-tac-toe sessions
//!
//! Plays [`strictly_ultimate`] games in three modes: two players at one
//! keyboard, one player against the computer, or two clients sharing a room
//! document in a remote store.
//!
//! # Architecture
//!
//! - **Session**: one game plus its mode; `play` for input, `tick` once per loop pass
//! - **Sync**: joins rooms and reconciles local state with the room document
//! - **Store**: the document store trait, an in-memory store, an HTTP client and retries
//! - **Server**: serves an in-memory store over HTTP
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use strictly_rooms::{HttpStore, RetryPolicy, RetryingStore, Session};
//! use strictly_ultimate::TurnDuration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let store = RetryingStore::new(HttpStore::new("http://127.0.0.1:3000")?, RetryPolicy::default());
//! let mut session = Session::online(
//!     Arc::new(store),
//!     "friday-night",
//!     "Ann",
//!     TurnDuration::default(),
//!     chrono::Utc::now(),
//! )
//! .await?;
//! session.tick(chrono::Utc::now()).await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod server;
mod session;
mod store;
mod sync;
pub mod terminal;

// Crate-level exports - Configuration
pub use config::{ConfigError, RoomsConfig, STORE_URL_ENV};

// Crate-level exports - Store server
pub use server::{router, serve};

// Crate-level exports - Sessions
pub use session::{
    BoardView, GameMode, PlayerNames, Session, SessionError, SessionSnapshot, TickReport,
};

// Crate-level exports - Document store
pub use store::{
    DocumentPatch, DocumentStore, HttpStore, InMemoryStore, RetryPolicy, RetryingStore,
    RoomDocument, StoreError, UNCLAIMED_NAME,
};

// Crate-level exports - Synchronization
pub use sync::{RemoteView, Seat, SyncError, SyncManager};
