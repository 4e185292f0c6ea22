//! Queue state persistence
//!
//! Saves are best-effort: a failed write is logged and dropped, and the
//! in-memory queue stays authoritative. Loads never fail: a missing,
//! unreadable or malformed record restores nothing.

use crate::queue::Queue;
use soul_core::storage::{QueueStateStore, DEFAULT_SESSION_KEY};
use soul_core::types::QueueSnapshot;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Durable snapshot/restore of one queue session
pub struct StatePersister {
    store: Arc<dyn QueueStateStore>,
    session_key: String,
    /// Revision of the newest snapshot handed to the store
    last_revision: Mutex<u64>,
}

impl StatePersister {
    /// Persister for the deployment's single session
    pub fn new(store: Arc<dyn QueueStateStore>) -> Self {
        Self::with_session_key(store, DEFAULT_SESSION_KEY)
    }

    pub fn with_session_key(store: Arc<dyn QueueStateStore>, session_key: impl Into<String>) -> Self {
        Self {
            store,
            session_key: session_key.into(),
            last_revision: Mutex::new(0),
        }
    }

    /// Upsert `snapshot`, logging and swallowing any failure
    ///
    /// Returns whether the write reached the store.
    pub async fn save(&self, snapshot: &QueueSnapshot) -> bool {
        let json = match serde_json::to_string(snapshot) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Failed to serialize queue snapshot: {}", e);
                return false;
            }
        };

        match self.store.write_queue_state(&self.session_key, &json).await {
            Ok(()) => {
                tracing::debug!(
                    "Saved queue snapshot ({} tracks, cursor {})",
                    snapshot.track_ids.len(),
                    snapshot.cursor
                );
                true
            }
            Err(e) => {
                tracing::warn!("Failed to save queue snapshot: {}", e);
                false
            }
        }
    }

    /// Save `snapshot` unless a newer revision has already been written
    ///
    /// Sessions save after releasing their state lock, so two saves can race;
    /// the revision keeps an older snapshot from overwriting a newer one.
    pub async fn save_revision(&self, revision: u64, snapshot: &QueueSnapshot) -> bool {
        let mut last = self.last_revision.lock().await;
        if revision <= *last {
            tracing::debug!(
                "Skipping stale queue snapshot (revision {} <= {})",
                revision,
                *last
            );
            return false;
        }
        *last = revision;
        self.save(snapshot).await
    }

    /// Load the persisted snapshot, if a valid one exists
    pub async fn load(&self) -> Option<QueueSnapshot> {
        let json = match self.store.read_queue_state(&self.session_key).await {
            Ok(Some(json)) => json,
            Ok(None) => {
                tracing::debug!("No persisted queue for session {}", self.session_key);
                return None;
            }
            Err(e) => {
                tracing::warn!("Failed to read queue snapshot: {}", e);
                return None;
            }
        };

        let snapshot: QueueSnapshot = match serde_json::from_str(&json) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("Ignoring malformed queue snapshot: {}", e);
                return None;
            }
        };

        // Invariant check only; the session rebuilds its own Queue from the snapshot.
        if let Err(e) = Queue::from_snapshot(snapshot.clone()) {
            tracing::warn!("Ignoring queue snapshot: {}", e);
            return None;
        }

        Some(snapshot)
    }
}
