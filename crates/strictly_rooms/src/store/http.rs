//! Document store client over the store server's REST API.

use super::{DocumentPatch, DocumentStore, RoomDocument, StoreError};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use tracing::{debug, info, instrument, warn};

/// Talks to a document store server (`strictly_rooms serve`) over HTTP.
#[derive(Debug, Clone)]
pub struct HttpStore {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpStore {
    /// Creates a client for the server at `base_url`, e.g. `http://127.0.0.1:3000`.
    #[instrument]
    pub fn new(base_url: &str) -> Result<Self, StoreError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| StoreError::Rejected(format!("Invalid store URL '{}': {}", base_url, e)))?;
        info!(url = %base_url, "Creating HTTP document store client");
        Ok(Self {
            base_url,
            client: reqwest::Client::new(),
        })
    }

    /// URL of the room document, with the key percent-encoded as one segment.
    fn room_url(&self, key: &str) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Rejected(format!("Store URL '{}' cannot hold a path", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "rooms", key]);
        Ok(url)
    }
}

fn unavailable(e: reqwest::Error) -> StoreError {
    warn!(error = %e, "Store request failed");
    StoreError::Unavailable(e.to_string())
}

fn unexpected(status: StatusCode) -> StoreError {
    if status.is_server_error() {
        StoreError::Unavailable(format!("HTTP {}", status))
    } else {
        StoreError::Rejected(format!("HTTP {}", status))
    }
}

#[async_trait]
impl DocumentStore for HttpStore {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<RoomDocument>, StoreError> {
        let url = self.room_url(key)?;
        debug!(%url, "Fetching room document");
        let response = self.client.get(url).send().await.map_err(unavailable)?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let doc = response
                    .json::<RoomDocument>()
                    .await
                    .map_err(|e| StoreError::Rejected(format!("Malformed document: {}", e)))?;
                Ok(Some(doc))
            }
            status => Err(unexpected(status)),
        }
    }

    #[instrument(skip(self, doc))]
    async fn set(&self, key: &str, doc: RoomDocument) -> Result<(), StoreError> {
        let url = self.room_url(key)?;
        debug!(%url, "Writing room document");
        let response = self
            .client
            .put(url)
            .json(&doc)
            .send()
            .await
            .map_err(unavailable)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(unexpected(status))
        }
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, key: &str, patch: DocumentPatch) -> Result<(), StoreError> {
        let url = self.room_url(key)?;
        debug!(%url, "Patching room document");
        let response = self
            .client
            .patch(url)
            .json(&patch)
            .send()
            .await
            .map_err(unavailable)?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(key.to_string())),
            status if status.is_success() => Ok(()),
            status => Err(unexpected(status)),
        }
    }
}
