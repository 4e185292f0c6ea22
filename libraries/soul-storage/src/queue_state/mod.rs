//! Persisted queue snapshot: one row per session key

use soul_core::error::Result;
use sqlx::SqlitePool;

/// Insert or replace the snapshot for `session_key`
pub async fn upsert(pool: &SqlitePool, session_key: &str, snapshot_json: &str) -> Result<()> {
    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        r#"
        INSERT INTO queue_state (session_key, snapshot_json, updated_at)
        VALUES (?, ?, ?)
        ON CONFLICT(session_key) DO UPDATE SET
            snapshot_json = excluded.snapshot_json,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(session_key)
    .bind(snapshot_json)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(())
}

/// Raw snapshot JSON for `session_key`, if one was saved
pub async fn get(pool: &SqlitePool, session_key: &str) -> Result<Option<String>> {
    let json: Option<String> =
        sqlx::query_scalar("SELECT snapshot_json FROM queue_state WHERE session_key = ?")
            .bind(session_key)
            .fetch_optional(pool)
            .await?;

    Ok(json)
}

/// Forget the snapshot for `session_key`
pub async fn clear(pool: &SqlitePool, session_key: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM queue_state WHERE session_key = ?")
        .bind(session_key)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
