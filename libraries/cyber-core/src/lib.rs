//! Cyber Tunes Core
//!
//! Platform-agnostic core types, traits, and error handling for Cyber Tunes.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `SourceRef`, `EqualizerSettings`, storage records
//! - **Core Traits**: `PlaybackDevice`, `AudioContext`, `SignalProcessor`,
//!   `TrackStore`, `SettingsStore`
//! - **Error Handling**: `PlaybackRejected`, `DeviceError`, `StoreError`
//!
//! # Example
//!
//! ```rust
//! use cyber_core::types::{LocalBlob, Track, TrackId};
//!
//! let blob = LocalBlob::new(vec![0u8; 1024], Some("mp3".to_string()));
//! let track = Track::local(TrackId::new("local-1"), "Night Drive", blob);
//!
//! assert!(track.is_local);
//! assert_eq!(track.size_bytes, Some(1024));
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{
    AttachError, ContextError, CoreError, DeviceError, DeviceErrorKind, PlaybackRejected, RejectCause,
    Result, StoreError, StoreResult,
};
pub use traits::{
    AudioContext, PlaybackDevice, SettingsStore, SignalProcessor, TrackStore,
    SETTING_EQ_ENABLED, SETTING_EQ_GAINS, SETTING_THEME_INDEX,
};
pub use types::{
    CatalogEntry, ContextState, DeviceEvent, EqualizerSettings, LocalBlob, NewTrack, SourceEvent,
    SourceRef, StorageTier, StoredTrack, Track, TrackId, EQ_BAND_COUNT, EQ_FREQUENCIES,
    EQ_MAX_GAIN_DB, EQ_MIN_GAIN_DB, EQ_Q, MIB,
};
