//! Playlist builder sessions
//!
//! A builder session is a scratch list of tracks the user is assembling; it
//! can be played as a context before it is saved as a playlist.

use serde::{Deserialize, Serialize};
use soul_core::{error::Result, types::TrackId, SoulError};
use sqlx::{Row, SqlitePool};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderSession {
    pub id: String,
    pub name: String,
    pub created_at: i64,
}

/// Start a new builder session with a generated id
pub async fn create(pool: &SqlitePool, name: &str) -> Result<BuilderSession> {
    let id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().timestamp();

    sqlx::query("INSERT INTO builder_sessions (id, name, created_at) VALUES (?, ?, ?)")
        .bind(&id)
        .bind(name)
        .bind(now)
        .execute(pool)
        .await?;

    tracing::debug!("Started builder session {} ({})", id, name);

    Ok(BuilderSession {
        id,
        name: name.to_string(),
        created_at: now,
    })
}

pub async fn get_by_id(pool: &SqlitePool, id: &str) -> Result<Option<BuilderSession>> {
    let row = sqlx::query("SELECT id, name, created_at FROM builder_sessions WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(Some(BuilderSession {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            created_at: row.try_get("created_at")?,
        })),
        None => Ok(None),
    }
}

/// Append a track; adding a track twice is a no-op
pub async fn add_track(pool: &SqlitePool, session_id: &str, track_id: &TrackId) -> Result<bool> {
    if get_by_id(pool, session_id).await?.is_none() {
        return Err(SoulError::not_found("Builder session", session_id));
    }

    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO builder_session_tracks (session_id, track_id, position)
        SELECT ?, ?, COALESCE(MAX(position), -1) + 1
        FROM builder_session_tracks WHERE session_id = ?
        "#,
    )
    .bind(session_id)
    .bind(track_id.as_str())
    .bind(session_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn remove_track(pool: &SqlitePool, session_id: &str, track_id: &TrackId) -> Result<bool> {
    let result =
        sqlx::query("DELETE FROM builder_session_tracks WHERE session_id = ? AND track_id = ?")
            .bind(session_id)
            .bind(track_id.as_str())
            .execute(pool)
            .await?;

    Ok(result.rows_affected() > 0)
}

/// Track ids of a session in insertion order
pub async fn get_track_ids(pool: &SqlitePool, session_id: &str) -> Result<Vec<TrackId>> {
    let ids: Vec<String> = sqlx::query_scalar(
        "SELECT track_id FROM builder_session_tracks WHERE session_id = ? ORDER BY position",
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    Ok(ids.into_iter().map(TrackId::new).collect())
}

/// Discard a session
pub async fn delete(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM builder_sessions WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
