//! Process-local document store.

use super::{DocumentPatch, DocumentStore, RoomDocument, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

/// Documents held in memory, shared between clones.
///
/// Backs the HTTP store server and doubles as the store for tests and for
/// several sessions inside one process.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    docs: Arc<Mutex<HashMap<String, RoomDocument>>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating in-memory document store");
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, RoomDocument>>, StoreError> {
        self.docs.lock().map_err(|_| {
            warn!("Document store lock poisoned");
            StoreError::Unavailable("document store lock poisoned".to_string())
        })
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<RoomDocument>, StoreError> {
        let doc = self.lock()?.get(key).cloned();
        if doc.is_none() {
            debug!(room = key, "Room not found");
        }
        Ok(doc)
    }

    #[instrument(skip(self, doc))]
    async fn set(&self, key: &str, doc: RoomDocument) -> Result<(), StoreError> {
        self.lock()?.insert(key.to_string(), doc);
        debug!(room = key, "Document written");
        Ok(())
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, key: &str, patch: DocumentPatch) -> Result<(), StoreError> {
        let mut docs = self.lock()?;
        let doc = docs.get_mut(key).ok_or_else(|| {
            warn!(room = key, "Update for missing room");
            StoreError::NotFound(key.to_string())
        })?;
        doc.apply(patch);
        debug!(room = key, "Document updated");
        Ok(())
    }
}
