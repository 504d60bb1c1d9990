//! Commands, actions, and events
//!
//! Data flows in one direction:
//! - `Action`s (user gestures) and `DeviceEvent`s go into the coordinator
//! - `Command`s come out and are applied to the device and audio context
//! - `PlayerEvent`s and `Notice`s are drained by the surface

use crate::types::{PlayMode, PlayRequestId};
use cyber_core::{DeviceError, RejectCause, SourceRef, StorageTier, TrackId};

/// Instruction for the playback device or audio context
///
/// Commands produced by one coordinator step must be executed in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Resume the audio context if it is suspended
    EnsureContextRunning,

    /// Replace the device source
    Load { track_id: TrackId, source: SourceRef },

    /// Start playback; the result is fed back with the same id
    Play(PlayRequestId),

    Pause,

    /// Move the device position (seconds)
    Seek(f64),

    /// Drop the device source
    Unload,
}

/// User gesture handled by the coordinator
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    TogglePlay,
    Next,
    Previous,
    Select(TrackId),
    SelectIndex(usize),
    Seek(f64),
    /// Relative seek clamped to `[0, duration]`
    SeekBy(f64),
    ToggleMode,
    ToggleVisualizer,
}

/// State change reported by the coordinator
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// Current selection moved
    TrackChanged {
        index: usize,
        track_id: TrackId,
    },

    /// Same track started again from 0
    TrackRestarted {
        track_id: TrackId,
    },

    PlayingChanged {
        is_playing: bool,
    },

    ModeChanged {
        mode: PlayMode,
    },

    VisualizerToggled {
        active: bool,
    },

    /// The device refused to play and playback stopped
    PlaybackRejected {
        cause: RejectCause,
    },

    /// The device reported a failure and playback stopped
    DeviceFailed(DeviceError),

    /// Device reported the loaded source's duration
    DurationKnown {
        track_id: TrackId,
        seconds: f64,
    },

    PlaylistChanged {
        len: usize,
    },
}

/// User-facing message the surface must show
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// Current usage against the active tier limit
    StorageUsage { used: u64, limit: u64 },

    /// Import refused; nothing was persisted
    QuotaExceeded { tier: StorageTier, limit: u64 },

    SaveFailed { message: String },

    TierChanged { tier: StorageTier, limit: u64 },
}

impl Notice {
    /// Whether the surface should block on this notice
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            Self::QuotaExceeded { .. } | Self::SaveFailed { .. } | Self::TierChanged { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_notices_do_not_block() {
        let usage = Notice::StorageUsage { used: 1, limit: 2 };
        assert!(!usage.is_blocking());

        let quota = Notice::QuotaExceeded {
            tier: StorageTier::Base,
            limit: StorageTier::Base.limit_bytes(),
        };
        assert!(quota.is_blocking());
    }
}
