//! Test helpers and fixtures for storage integration tests
//!
//! These helpers create test databases using REAL SQLite files (NOT in-memory)
//! to match production behavior and properly test migrations, constraints, and indexes.

#![allow(dead_code)]

use soul_core::types::*;
use soul_storage::LocalStorageContext;
use sqlx::SqlitePool;
use tempfile::TempDir;

/// Test database wrapper that cleans up on drop
pub struct TestDb {
    pub pool: SqlitePool,
    _temp_dir: TempDir,
}

impl TestDb {
    /// Create a new test database with migrations applied
    pub async fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let pool = open(&temp_dir).await;

        Self {
            pool,
            _temp_dir: temp_dir,
        }
    }

    /// Get the pool reference
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn context(&self) -> LocalStorageContext {
        LocalStorageContext::new(self.pool.clone())
    }

    /// Close the pool and open the same file again, as a restarted process would
    pub async fn reopen(self) -> Self {
        let Self {
            pool,
            _temp_dir: temp_dir,
        } = self;
        pool.close().await;
        let pool = open(&temp_dir).await;
        Self {
            pool,
            _temp_dir: temp_dir,
        }
    }
}

async fn open(temp_dir: &TempDir) -> SqlitePool {
    let db_path = temp_dir.path().join("test.db");
    let db_url = format!("sqlite://{}", db_path.display());

    let pool = soul_storage::create_pool(&db_url)
        .await
        .expect("Failed to create pool");

    soul_storage::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// Test fixture: a track with only a title and track number
pub fn track(id: &str, track_number: i32) -> TrackRecord {
    TrackRecord {
        title: Some(format!("Track {}", id)),
        track_number: Some(track_number),
        ..TrackRecord::new(TrackId::new(id))
    }
}

/// Test fixture: insert `t001..=tNNN` and a playlist `playlist_id` holding them
pub async fn create_numbered_playlist(pool: &SqlitePool, playlist_id: &str, n: usize) -> Vec<TrackId> {
    let tracks: Vec<TrackRecord> = (1..=n)
        .map(|i| track(&format!("t{:03}", i), i as i32))
        .collect();
    soul_storage::tracks::upsert_many(pool, &tracks)
        .await
        .expect("Failed to insert tracks");

    let ids: Vec<TrackId> = tracks.into_iter().map(|t| t.id).collect();
    soul_storage::playlists::create(pool, playlist_id, "Test Playlist")
        .await
        .expect("Failed to create playlist");
    soul_storage::playlists::add_tracks(pool, playlist_id, &ids)
        .await
        .expect("Failed to add tracks");

    ids
}
