//! Seams between the coordinator and its collaborators

use crate::error::{AttachError, ContextError, PlaybackRejected, StoreResult};
use crate::types::{
    ContextState, EqualizerSettings, NewTrack, SourceRef, StoredTrack, TrackId, EQ_BAND_COUNT,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Settings key for the selected theme index
pub const SETTING_THEME_INDEX: &str = "ui.theme_index";

/// Settings key for the equalizer enabled flag
pub const SETTING_EQ_ENABLED: &str = "eq.enabled";

/// Settings key for the equalizer gain vector
pub const SETTING_EQ_GAINS: &str = "eq.gains";

/// In-place processing stage fed by a playback device
///
/// Buffers are interleaved stereo `f32`.
pub trait SignalProcessor: Send + Sync {
    fn process(&self, buffer: &mut [f32], sample_rate: u32);
}

/// The single platform playback element
///
/// Transport methods never fail loudly: load failures and mid-stream errors
/// are reported as `DeviceEvent::Error` on the device's event channel. Only
/// `play` returns a result, because the platform may refuse it outright.
pub trait PlaybackDevice: Send {
    /// Route rendered audio through `processor`
    ///
    /// A device accepts one processor for its whole lifetime.
    fn attach_processor(&mut self, processor: Arc<dyn SignalProcessor>) -> Result<(), AttachError>;

    /// Replace the loaded source; position resets to 0
    fn load(&mut self, source: &SourceRef);

    fn play(&mut self) -> Result<(), PlaybackRejected>;

    fn pause(&mut self);

    fn seek(&mut self, seconds: f64);

    /// Drop the loaded source and its handle
    fn unload(&mut self);

    fn current_time(&self) -> f64;

    /// Duration of the loaded source, once known and finite
    fn duration(&self) -> Option<f64>;

    /// Generation stamped on events of the current source
    ///
    /// Bumped by every `load` and `unload`.
    fn source_generation(&self) -> u64;
}

/// Audio processing context that may start suspended
pub trait AudioContext: Send {
    fn state(&self) -> ContextState;

    fn resume(&mut self) -> Result<(), ContextError>;

    /// Stop processing for good; later `resume` calls fail
    fn close(&mut self);
}

/// Persistent store for imported tracks
#[async_trait]
pub trait TrackStore: Send + Sync {
    /// Persist a track, failing with `QuotaExceeded` when
    /// `used + size > limit_bytes`. The check and write are atomic.
    async fn put(&self, track: NewTrack, limit_bytes: u64) -> StoreResult<StoredTrack>;

    /// All tracks, oldest import first
    async fn list_all(&self) -> StoreResult<Vec<StoredTrack>>;

    async fn remove(&self, id: &TrackId) -> StoreResult<()>;

    async fn total_used_bytes(&self) -> StoreResult<u64>;
}

/// Durable key/value settings
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, key: &str) -> StoreResult<Option<serde_json::Value>>;

    async fn set(&self, key: &str, value: serde_json::Value) -> StoreResult<()>;

    // ========================================================================
    // Typed helpers
    // ========================================================================

    /// Load equalizer settings, repairing malformed values
    async fn load_equalizer(&self) -> StoreResult<EqualizerSettings> {
        let enabled = self
            .get(SETTING_EQ_ENABLED)
            .await?
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        let gains: Vec<f32> = match self.get(SETTING_EQ_GAINS).await? {
            Some(value) => serde_json::from_value(value).unwrap_or_default(),
            None => vec![0.0; EQ_BAND_COUNT],
        };

        Ok(EqualizerSettings::sanitize(&gains, enabled))
    }

    async fn save_equalizer(&self, settings: &EqualizerSettings) -> StoreResult<()> {
        self.set(SETTING_EQ_ENABLED, serde_json::Value::Bool(settings.enabled))
            .await?;
        self.set(SETTING_EQ_GAINS, serde_json::to_value(settings.gains)?)
            .await
    }

    async fn load_theme_index(&self) -> StoreResult<usize> {
        Ok(self
            .get(SETTING_THEME_INDEX)
            .await?
            .and_then(|v| v.as_u64())
            .map_or(0, |i| i as usize))
    }

    async fn save_theme_index(&self, index: usize) -> StoreResult<()> {
        self.set(SETTING_THEME_INDEX, serde_json::Value::from(index as u64))
            .await
    }
}
