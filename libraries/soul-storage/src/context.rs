use crate::{builder_sessions, playlists, queue_state, smart_playlists, tracks};
use async_trait::async_trait;
use soul_core::{
    error::Result,
    storage::{QueueStateStore, TrackMetadataStore},
    types::*,
};
use sqlx::SqlitePool;
use std::collections::HashSet;

/// Local storage context using `SQLite`
#[derive(Clone)]
pub struct LocalStorageContext {
    pool: SqlitePool,
}

impl LocalStorageContext {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl TrackMetadataStore for LocalStorageContext {
    async fn resolve_context(&self, context: &PlaybackContext) -> Result<HashSet<TrackId>> {
        let ids = match context.kind {
            ContextKind::Playlist => playlists::get_track_ids(&self.pool, &context.id).await?,
            ContextKind::SmartPlaylist => smart_playlists::resolve(&self.pool, &context.id).await?,
            ContextKind::BuilderSession => {
                builder_sessions::get_track_ids(&self.pool, &context.id).await?
            }
        };

        Ok(ids.into_iter().collect())
    }

    async fn fetch_metadata(
        &self,
        ids: &[TrackId],
        preserve_order: bool,
    ) -> Result<Vec<TrackRecord>> {
        tracks::get_many(&self.pool, ids, preserve_order).await
    }
}

#[async_trait]
impl QueueStateStore for LocalStorageContext {
    async fn write_queue_state(&self, session_key: &str, snapshot_json: &str) -> Result<()> {
        queue_state::upsert(&self.pool, session_key, snapshot_json).await
    }

    async fn read_queue_state(&self, session_key: &str) -> Result<Option<String>> {
        queue_state::get(&self.pool, session_key).await
    }
}
