//! Storage traits consumed by the queue core
//!
//! Both traits abstract over a backing store so the queue can run against the
//! local `SQLite` database or a test double.

use crate::error::Result;
use crate::types::{PlaybackContext, TrackId, TrackRecord};
use async_trait::async_trait;
use std::collections::HashSet;

/// Key of the single queue-state record of a deployment
pub const DEFAULT_SESSION_KEY: &str = "default";

/// Track metadata store backing the context resolver
#[async_trait]
pub trait TrackMetadataStore: Send + Sync {
    /// Resolve the eligible track ids of a context
    ///
    /// Must be cheap to call repeatedly. Smart playlists are evaluated live, so
    /// two calls may return different sets. A deleted or unknown context
    /// resolves to an empty set, not an error.
    async fn resolve_context(&self, context: &PlaybackContext) -> Result<HashSet<TrackId>>;

    /// Fetch metadata for `ids`
    ///
    /// With `preserve_order`, rows come back in the order of `ids`. Ids that no
    /// longer exist are omitted.
    async fn fetch_metadata(&self, ids: &[TrackId], preserve_order: bool)
        -> Result<Vec<TrackRecord>>;
}

/// Durable single-key store for the serialized queue snapshot
#[async_trait]
pub trait QueueStateStore: Send + Sync {
    /// Insert or replace the snapshot stored under `session_key`
    async fn write_queue_state(&self, session_key: &str, snapshot_json: &str) -> Result<()>;

    /// Read the raw snapshot stored under `session_key`, if any
    async fn read_queue_state(&self, session_key: &str) -> Result<Option<String>>;
}
