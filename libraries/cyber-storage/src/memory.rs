//! In-memory store
//!
//! Same contract as [`SqliteStore`](crate::SqliteStore), nothing survives the
//! process. Can be switched into a failing mode to exercise fallback paths.

use async_trait::async_trait;
use chrono::Utc;
use cyber_core::{
    NewTrack, SettingsStore, StoreError, StoreResult, StoredTrack, TrackId, TrackStore,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct MemoryInner {
    tracks: Vec<StoredTrack>,
    settings: HashMap<String, serde_json::Value>,
}

/// Track and settings store held in process memory
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail with `StoreError::Failure` while set
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, MemoryInner>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::failure("memory store unavailable"));
        }
        Ok(self.inner.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

fn used_bytes(inner: &MemoryInner) -> u64 {
    inner.tracks.iter().map(|t| t.size_bytes).sum()
}

#[async_trait]
impl TrackStore for MemoryStore {
    async fn put(&self, track: NewTrack, limit_bytes: u64) -> StoreResult<StoredTrack> {
        let mut inner = self.lock()?;
        let used = used_bytes(&inner);
        let size = track.size_bytes();
        if used.saturating_add(size) > limit_bytes {
            return Err(StoreError::QuotaExceeded {
                used,
                requested: size,
                limit: limit_bytes,
            });
        }

        let stored = StoredTrack {
            id: TrackId::generate_local(),
            title: track.title,
            content: track.content,
            size_bytes: size,
            extension: track.extension,
            added_at_ms: Utc::now().timestamp_millis(),
        };
        inner.tracks.push(stored.clone());
        Ok(stored)
    }

    async fn list_all(&self) -> StoreResult<Vec<StoredTrack>> {
        Ok(self.lock()?.tracks.clone())
    }

    async fn remove(&self, id: &TrackId) -> StoreResult<()> {
        let mut inner = self.lock()?;
        let before = inner.tracks.len();
        inner.tracks.retain(|t| &t.id != id);
        if inner.tracks.len() == before {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }

    async fn total_used_bytes(&self) -> StoreResult<u64> {
        Ok(used_bytes(&*self.lock()?))
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<serde_json::Value>> {
        Ok(self.lock()?.settings.get(key).cloned())
    }

    async fn set(&self, key: &str, value: serde_json::Value) -> StoreResult<()> {
        self.lock()?.settings.insert(key.to_string(), value);
        Ok(())
    }
}
