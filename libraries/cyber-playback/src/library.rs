//! Imported track library
//!
//! Bridges the track store and the playlist: initial load, import under the
//! active tier quota, delete, and tier switching. Every outcome the user has
//! to see is queued as a `Notice`.

use crate::engine::AudioEngine;
use crate::error::Result;
use crate::events::Notice;
use crate::playlist::Playlist;
use cyber_core::{
    AudioContext, CatalogEntry, NewTrack, PlaybackDevice, StorageTier, StoreError, Track, TrackId,
    TrackStore,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

pub struct Library {
    store: Arc<dyn TrackStore>,
    tier: StorageTier,
    used_bytes: u64,
    notices: Vec<Notice>,
}

impl Library {
    pub fn new(store: Arc<dyn TrackStore>, tier: StorageTier) -> Self {
        Self {
            store,
            tier,
            used_bytes: 0,
            notices: Vec::new(),
        }
    }

    pub fn tier(&self) -> StorageTier {
        self.tier
    }

    pub fn used_bytes(&self) -> u64 {
        self.used_bytes
    }

    pub fn limit_bytes(&self) -> u64 {
        self.tier.limit_bytes()
    }

    /// Build the playlist from the catalog and stored tracks
    ///
    /// A failing store degrades to the catalog alone.
    pub async fn load(&mut self, catalog: &[CatalogEntry]) -> Playlist {
        let catalog_tracks: Vec<Track> = catalog
            .iter()
            .enumerate()
            .map(|(i, entry)| Track::from_catalog_entry(i, entry))
            .collect();

        let local = match self.store.list_all().await {
            Ok(stored) => stored.into_iter().map(|s| s.into_track()).collect(),
            Err(e) => {
                warn!("Failed to list stored tracks, using catalog only: {}", e);
                Vec::new()
            }
        };

        let playlist = Playlist::new(catalog_tracks, local);
        self.used_bytes = match self.store.total_used_bytes().await {
            Ok(used) => used,
            Err(e) => {
                warn!("Failed to read storage usage: {}", e);
                playlist.local_bytes()
            }
        };

        info!(
            "Library loaded: {} tracks, {} bytes stored",
            playlist.len(),
            self.used_bytes
        );
        playlist
    }

    /// Read a file and import it, titled by its file stem
    pub async fn import_file<D, X>(
        &mut self,
        engine: &mut AudioEngine<D, X>,
        path: &Path,
    ) -> Result<Option<TrackId>>
    where
        D: PlaybackDevice,
        X: AudioContext,
    {
        let content = tokio::fs::read(path).await?;
        let new_track = NewTrack::from_file_name(path, content);
        Ok(self.import(engine, new_track).await)
    }

    /// Persist a track and append it to the playlist
    ///
    /// Returns the new id, or `None` when the import was refused; the reason
    /// is queued as a notice.
    pub async fn import<D, X>(
        &mut self,
        engine: &mut AudioEngine<D, X>,
        new_track: NewTrack,
    ) -> Option<TrackId>
    where
        D: PlaybackDevice,
        X: AudioContext,
    {
        let limit = self.tier.limit_bytes();
        match self.store.put(new_track, limit).await {
            Ok(stored) => {
                let size = stored.size_bytes;
                let track = stored.into_track();
                let id = track.id.clone();
                info!("Imported {} ({} bytes)", track.title, size);

                engine.append_tracks(vec![track]);
                self.used_bytes += size;
                self.notices.push(Notice::StorageUsage {
                    used: self.used_bytes,
                    limit,
                });
                Some(id)
            }
            Err(StoreError::QuotaExceeded { .. }) => {
                warn!("Import refused, {} tier is full", self.tier);
                self.notices.push(Notice::QuotaExceeded {
                    tier: self.tier,
                    limit,
                });
                None
            }
            Err(e) => {
                warn!("Failed to save track: {}", e);
                self.notices.push(Notice::SaveFailed {
                    message: e.to_string(),
                });
                None
            }
        }
    }

    /// Delete the selected track
    ///
    /// Local tracks are removed from the store first; a store failure leaves
    /// the playlist untouched.
    pub async fn delete_current<D, X>(
        &mut self,
        engine: &mut AudioEngine<D, X>,
    ) -> Result<Option<Track>>
    where
        D: PlaybackDevice,
        X: AudioContext,
    {
        let Some(track) = engine.coordinator().current_track() else {
            return Ok(None);
        };
        let index = engine.coordinator().transport().current_index;
        let (id, is_local, size) = (track.id.clone(), track.is_local, track.size_bytes);

        if is_local {
            if let Err(e) = self.store.remove(&id).await {
                self.notices.push(Notice::SaveFailed {
                    message: e.to_string(),
                });
                return Err(e.into());
            }
            if let Some(size) = size {
                self.used_bytes = self.used_bytes.saturating_sub(size);
                self.notices.push(Notice::StorageUsage {
                    used: self.used_bytes,
                    limit: self.tier.limit_bytes(),
                });
            }
        }

        info!("Deleting track {}", id);
        Ok(engine.remove_at(index))
    }

    pub fn toggle_tier(&mut self) -> StorageTier {
        self.tier = self.tier.toggled();
        info!("Storage tier set to {}", self.tier);
        self.notices.push(Notice::TierChanged {
            tier: self.tier,
            limit: self.tier.limit_bytes(),
        });
        self.tier
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
