//! Track metadata

use soul_core::{error::Result, types::*};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;

/// Ids per `IN (...)` query, well below SQLite's bound-parameter limit
const ID_CHUNK_SIZE: usize = 500;

const SELECT_COLUMNS: &str = "SELECT id, title, artist, album, year, bpm, musical_key, elo_rating, track_number
     FROM tracks";

fn from_row(row: &SqliteRow) -> Result<TrackRecord> {
    Ok(TrackRecord {
        id: TrackId::new(row.try_get::<String, _>("id")?),
        title: row.try_get("title")?,
        artist: row.try_get("artist")?,
        album: row.try_get("album")?,
        year: row.try_get("year")?,
        bpm: row.try_get("bpm")?,
        key: row.try_get("musical_key")?,
        elo_rating: row.try_get("elo_rating")?,
        track_number: row.try_get("track_number")?,
    })
}

/// Insert a track or replace its metadata
pub async fn upsert(pool: &SqlitePool, track: &TrackRecord) -> Result<()> {
    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        r#"
        INSERT INTO tracks
            (id, title, artist, album, year, bpm, musical_key, elo_rating, track_number,
             created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            title = excluded.title,
            artist = excluded.artist,
            album = excluded.album,
            year = excluded.year,
            bpm = excluded.bpm,
            musical_key = excluded.musical_key,
            elo_rating = excluded.elo_rating,
            track_number = excluded.track_number,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(track.id.as_str())
    .bind(&track.title)
    .bind(&track.artist)
    .bind(&track.album)
    .bind(track.year)
    .bind(track.bpm)
    .bind(&track.key)
    .bind(track.elo_rating)
    .bind(track.track_number)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(())
}

/// Upsert many tracks in one transaction
pub async fn upsert_many(pool: &SqlitePool, tracks: &[TrackRecord]) -> Result<usize> {
    let now = chrono::Utc::now().timestamp();
    let mut tx = pool.begin().await?;

    for track in tracks {
        sqlx::query(
            r#"
            INSERT INTO tracks
                (id, title, artist, album, year, bpm, musical_key, elo_rating, track_number,
                 created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                artist = excluded.artist,
                album = excluded.album,
                year = excluded.year,
                bpm = excluded.bpm,
                musical_key = excluded.musical_key,
                elo_rating = excluded.elo_rating,
                track_number = excluded.track_number,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(track.id.as_str())
        .bind(&track.title)
        .bind(&track.artist)
        .bind(&track.album)
        .bind(track.year)
        .bind(track.bpm)
        .bind(&track.key)
        .bind(track.elo_rating)
        .bind(track.track_number)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    tracing::debug!("Upserted {} tracks", tracks.len());
    Ok(tracks.len())
}

/// Get a track by id
pub async fn get_by_id(pool: &SqlitePool, id: &TrackId) -> Result<Option<TrackRecord>> {
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_COLUMNS))
        .bind(id.as_str())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(from_row).transpose()
}

/// Get metadata for `ids`
///
/// With `preserve_order` the result follows `ids`; otherwise rows come back in
/// storage order. Unknown ids are skipped.
pub async fn get_many(
    pool: &SqlitePool,
    ids: &[TrackId],
    preserve_order: bool,
) -> Result<Vec<TrackRecord>> {
    let mut found = Vec::with_capacity(ids.len());

    for chunk in ids.chunks(ID_CHUNK_SIZE) {
        let placeholders = vec!["?"; chunk.len()].join(", ");
        let sql = format!("{} WHERE id IN ({})", SELECT_COLUMNS, placeholders);

        let mut query = sqlx::query(&sql);
        for id in chunk {
            query = query.bind(id.as_str());
        }

        for row in query.fetch_all(pool).await? {
            found.push(from_row(&row)?);
        }
    }

    if !preserve_order {
        return Ok(found);
    }

    let by_id: HashMap<TrackId, TrackRecord> = found
        .into_iter()
        .map(|track| (track.id.clone(), track))
        .collect();
    Ok(ids.iter().filter_map(|id| by_id.get(id).cloned()).collect())
}

/// Delete a track; playlist and builder memberships go with it
pub async fn delete(pool: &SqlitePool, id: &TrackId) -> Result<bool> {
    let result = sqlx::query("DELETE FROM tracks WHERE id = ?")
        .bind(id.as_str())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Number of tracks in the library
pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tracks")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
