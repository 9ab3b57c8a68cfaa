//! Cached board reference data.

use std::sync::Arc;

use taskgate_core::{EntityKind, Snapshot, SnapshotKey};
use taskgate_fetch::FetchError;
use taskgate_store::ReferenceCache;

use crate::api::TrelloApi;

/// Read-through access to members, labels and lists of a board.
#[derive(Debug, Clone)]
pub struct BoardMetadata {
    api: TrelloApi,
    cache: Arc<ReferenceCache>,
}

impl BoardMetadata {
    /// Creates a reader over a shared cache.
    pub fn new(api: TrelloApi, cache: Arc<ReferenceCache>) -> Self {
        Self { api, cache }
    }

    /// Returns the snapshot for `(kind, board_id)`, fetching on miss or expiry.
    ///
    /// # Errors
    ///
    /// Returns the fetch error on a miss; nothing is cached then.
    pub async fn get(&self, kind: EntityKind, board_id: &str) -> Result<Snapshot, FetchError> {
        let api = &self.api;
        self.cache
            .get_or_fetch(SnapshotKey::new(kind, board_id), move || async move {
                let payload = api.board_collection(kind, board_id).await?;
                Ok(Snapshot::new(board_id, payload))
            })
            .await
    }

    /// Returns the board members.
    ///
    /// # Errors
    ///
    /// As [`get`](Self::get).
    pub async fn members(&self, board_id: &str) -> Result<Snapshot, FetchError> {
        self.get(EntityKind::Members, board_id).await
    }

    /// Returns the board labels.
    ///
    /// # Errors
    ///
    /// As [`get`](Self::get).
    pub async fn labels(&self, board_id: &str) -> Result<Snapshot, FetchError> {
        self.get(EntityKind::Labels, board_id).await
    }

    /// Returns the board lists.
    ///
    /// # Errors
    ///
    /// As [`get`](Self::get).
    pub async fn lists(&self, board_id: &str) -> Result<Snapshot, FetchError> {
        self.get(EntityKind::Lists, board_id).await
    }

    /// Drops one cached collection so the next read refetches it.
    pub fn invalidate(&self, kind: EntityKind, board_id: &str) {
        self.cache.invalidate(&SnapshotKey::new(kind, board_id));
    }

    /// Returns the underlying cache.
    pub fn cache(&self) -> &Arc<ReferenceCache> {
        &self.cache
    }
}
