//! HTTP document store server.
//!
//! Serves an [`InMemoryStore`] over the room API that [`HttpStore`] talks to:
//!
//! | method | path | body | reply |
//! |---|---|---|---|
//! | `GET` | `/api/rooms/{key}` | | `200` + document, or `404` |
//! | `PUT` | `/api/rooms/{key}` | document | `204` |
//! | `PATCH` | `/api/rooms/{key}` | patch | `204`, or `404` |
//! | `GET` | `/health` | | `200 ok` |
//!
//! [`HttpStore`]: crate::store::HttpStore

use crate::store::{DocumentPatch, DocumentStore, InMemoryStore, RoomDocument, StoreError};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

/// Builds the store API around `store`.
pub fn router(store: InMemoryStore) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/rooms/{key}",
            get(get_room).put(put_room).patch(patch_room),
        )
        .with_state(store)
}

/// Serves the store API on `listener` until the process stops.
#[instrument(skip_all)]
pub async fn serve(listener: TcpListener, store: InMemoryStore) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Document store listening");
    }
    axum::serve(listener, router(store)).await
}

fn status_of(e: &StoreError) -> StatusCode {
    match e {
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::Rejected(_) => StatusCode::BAD_REQUEST,
        StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

async fn health() -> &'static str {
    "ok"
}

#[instrument(skip(store))]
async fn get_room(
    State(store): State<InMemoryStore>,
    Path(key): Path<String>,
) -> Result<Json<RoomDocument>, StatusCode> {
    match store.get(&key).await {
        Ok(Some(doc)) => Ok(Json(doc)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            warn!(error = %e, "Read failed");
            Err(status_of(&e))
        }
    }
}

#[instrument(skip(store, doc))]
async fn put_room(
    State(store): State<InMemoryStore>,
    Path(key): Path<String>,
    Json(doc): Json<RoomDocument>,
) -> StatusCode {
    match store.set(&key, doc).await {
        Ok(()) => {
            info!("Room written");
            StatusCode::NO_CONTENT
        }
        Err(e) => {
            warn!(error = %e, "Write failed");
            status_of(&e)
        }
    }
}

#[instrument(skip(store, patch))]
async fn patch_room(
    State(store): State<InMemoryStore>,
    Path(key): Path<String>,
    Json(patch): Json<DocumentPatch>,
) -> StatusCode {
    match store.update(&key, patch).await {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(e) => {
            warn!(error = %e, "Patch failed");
            status_of(&e)
        }
    }
}
