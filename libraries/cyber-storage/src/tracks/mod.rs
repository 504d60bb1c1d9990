//! Imported track storage
//!
//! Content is stored inline as a BLOB. Ordering follows insertion: oldest
//! import first.

use crate::error::{Result, StorageError};
use cyber_core::{NewTrack, StoredTrack, TrackId};
use sqlx::{Row, SqlitePool};

fn to_i64(value: u64, what: &str) -> Result<i64> {
    i64::try_from(value).map_err(|_| StorageError::OutOfRange(format!("{what} = {value}")))
}

fn to_u64(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

/// Insert a track if it fits under `limit_bytes`
///
/// The quota check and the insert run as a single statement, so concurrent
/// imports cannot both squeeze under the limit.
pub async fn insert_within_quota(
    pool: &SqlitePool,
    track: NewTrack,
    limit_bytes: u64,
) -> Result<StoredTrack> {
    let id = TrackId::generate_local();
    let size = track.size_bytes();
    let added_at_ms = chrono::Utc::now().timestamp_millis();

    let result = sqlx::query(
        "INSERT INTO tracks (id, title, content, size_bytes, extension, added_at)
         SELECT ?, ?, ?, ?, ?, ?
         WHERE (SELECT COALESCE(SUM(size_bytes), 0) FROM tracks) + ? <= ?",
    )
    .bind(id.as_str())
    .bind(track.title.as_str())
    .bind(track.content.as_slice())
    .bind(to_i64(size, "size_bytes")?)
    .bind(track.extension.as_deref())
    .bind(added_at_ms)
    .bind(to_i64(size, "size_bytes")?)
    .bind(to_i64(limit_bytes, "limit_bytes")?)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        let used = total_used_bytes(pool).await?;
        return Err(StorageError::QuotaExceeded {
            used,
            requested: size,
            limit: limit_bytes,
        });
    }

    Ok(StoredTrack {
        id,
        title: track.title,
        content: track.content,
        size_bytes: size,
        extension: track.extension,
        added_at_ms,
    })
}

/// All stored tracks, oldest import first
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<StoredTrack>> {
    let rows = sqlx::query(
        "SELECT id, title, content, size_bytes, extension, added_at
         FROM tracks
         ORDER BY added_at ASC, rowid ASC",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| -> Result<StoredTrack> {
            Ok(StoredTrack {
                id: TrackId::new(row.try_get::<String, _>("id")?),
                title: row.try_get("title")?,
                content: row.try_get("content")?,
                size_bytes: to_u64(row.try_get("size_bytes")?),
                extension: row.try_get("extension")?,
                added_at_ms: row.try_get("added_at")?,
            })
        })
        .collect()
}

/// Delete a track by id
pub async fn delete(pool: &SqlitePool, id: &TrackId) -> Result<()> {
    let result = sqlx::query("DELETE FROM tracks WHERE id = ?")
        .bind(id.as_str())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StorageError::not_found("Track", id.as_str()));
    }
    Ok(())
}

/// Sum of stored content sizes
pub async fn total_used_bytes(pool: &SqlitePool) -> Result<u64> {
    let used: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(size_bytes), 0) FROM tracks")
        .fetch_one(pool)
        .await?;
    Ok(to_u64(used))
}
