/// SQLite-backed store
use crate::{settings, tracks};
use async_trait::async_trait;
use cyber_core::{NewTrack, SettingsStore, StoreResult, StoredTrack, TrackId, TrackStore};
use sqlx::SqlitePool;

/// Track and settings store over a `SQLite` pool
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl TrackStore for SqliteStore {
    async fn put(&self, track: NewTrack, limit_bytes: u64) -> StoreResult<StoredTrack> {
        Ok(tracks::insert_within_quota(&self.pool, track, limit_bytes).await?)
    }

    async fn list_all(&self) -> StoreResult<Vec<StoredTrack>> {
        Ok(tracks::get_all(&self.pool).await?)
    }

    async fn remove(&self, id: &TrackId) -> StoreResult<()> {
        Ok(tracks::delete(&self.pool, id).await?)
    }

    async fn total_used_bytes(&self) -> StoreResult<u64> {
        Ok(tracks::total_used_bytes(&self.pool).await?)
    }
}

#[async_trait]
impl SettingsStore for SqliteStore {
    async fn get(&self, key: &str) -> StoreResult<Option<serde_json::Value>> {
        Ok(settings::get_setting(&self.pool, key).await?)
    }

    async fn set(&self, key: &str, value: serde_json::Value) -> StoreResult<()> {
        Ok(settings::set_setting(&self.pool, key, &value).await?)
    }
}
