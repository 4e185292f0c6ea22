//! Playlists: named, ordered track lists

use crate::StorageError;
use serde::{Deserialize, Serialize};
use soul_core::{error::Result, types::TrackId};
use sqlx::{Row, SqlitePool};

/// Playlist summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub track_count: i64,
}

/// Create an empty playlist
pub async fn create(pool: &SqlitePool, id: &str, name: &str) -> Result<Playlist> {
    let now = chrono::Utc::now().timestamp();

    sqlx::query("INSERT INTO playlists (id, name, created_at) VALUES (?, ?, ?)")
        .bind(id)
        .bind(name)
        .bind(now)
        .execute(pool)
        .await?;

    tracing::debug!("Created playlist {}", id);

    Ok(Playlist {
        id: id.to_string(),
        name: name.to_string(),
        track_count: 0,
    })
}

/// Get a playlist by id
pub async fn get_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Playlist>> {
    let row = sqlx::query(
        r#"
        SELECT p.id, p.name, COUNT(pt.track_id) AS track_count
        FROM playlists p
        LEFT JOIN playlist_tracks pt ON pt.playlist_id = p.id
        WHERE p.id = ?
        GROUP BY p.id
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(Some(Playlist {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            track_count: row.try_get("track_count")?,
        })),
        None => Ok(None),
    }
}

/// Get all playlists, by name
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<Playlist>> {
    let rows = sqlx::query(
        r#"
        SELECT p.id, p.name, COUNT(pt.track_id) AS track_count
        FROM playlists p
        LEFT JOIN playlist_tracks pt ON pt.playlist_id = p.id
        GROUP BY p.id
        ORDER BY p.name
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut playlists = Vec::with_capacity(rows.len());
    for row in rows {
        playlists.push(Playlist {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            track_count: row.try_get("track_count")?,
        });
    }
    Ok(playlists)
}

/// Append tracks to the end of a playlist
///
/// Tracks already in the playlist keep their position. Returns how many were
/// added.
pub async fn add_tracks(pool: &SqlitePool, playlist_id: &str, track_ids: &[TrackId]) -> Result<usize> {
    let mut tx = pool.begin().await?;

    let exists: Option<String> = sqlx::query_scalar("SELECT id FROM playlists WHERE id = ?")
        .bind(playlist_id)
        .fetch_optional(&mut *tx)
        .await?;
    if exists.is_none() {
        return Err(StorageError::not_found("Playlist", playlist_id).into());
    }

    let mut position: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(position), -1) FROM playlist_tracks WHERE playlist_id = ?",
    )
    .bind(playlist_id)
    .fetch_one(&mut *tx)
    .await?;

    let mut added = 0;
    for track_id in track_ids {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO playlist_tracks (playlist_id, track_id, position) VALUES (?, ?, ?)",
        )
        .bind(playlist_id)
        .bind(track_id.as_str())
        .bind(position + 1)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() > 0 {
            position += 1;
            added += 1;
        }
    }

    tx.commit().await?;
    Ok(added)
}

/// Remove a track from a playlist
pub async fn remove_track(pool: &SqlitePool, playlist_id: &str, track_id: &TrackId) -> Result<bool> {
    let result = sqlx::query("DELETE FROM playlist_tracks WHERE playlist_id = ? AND track_id = ?")
        .bind(playlist_id)
        .bind(track_id.as_str())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Track ids of a playlist in playlist order
///
/// An unknown playlist has no tracks.
pub async fn get_track_ids(pool: &SqlitePool, playlist_id: &str) -> Result<Vec<TrackId>> {
    let ids: Vec<String> = sqlx::query_scalar(
        "SELECT track_id FROM playlist_tracks WHERE playlist_id = ? ORDER BY position",
    )
    .bind(playlist_id)
    .fetch_all(pool)
    .await?;

    Ok(ids.into_iter().map(TrackId::new).collect())
}

/// Delete a playlist and its memberships
pub async fn delete(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM playlists WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
