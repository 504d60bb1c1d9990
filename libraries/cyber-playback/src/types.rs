//! Playback state types

use cyber_core::TrackId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order in which the playlist advances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayMode {
    /// Step through the playlist with wraparound
    #[default]
    Sequence,

    /// Uniformly random index, may repeat the current track
    Shuffle,

    /// Restart the current track when it ends naturally
    RepeatOne,
}

impl PlayMode {
    /// Next mode in `Sequence -> Shuffle -> RepeatOne -> Sequence` order
    pub fn cycle(self) -> Self {
        match self {
            Self::Sequence => Self::Shuffle,
            Self::Shuffle => Self::RepeatOne,
            Self::RepeatOne => Self::Sequence,
        }
    }
}

impl fmt::Display for PlayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Sequence => "sequence",
            Self::Shuffle => "shuffle",
            Self::RepeatOne => "repeat one",
        };
        f.write_str(s)
    }
}

/// Navigation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Coarse player status for the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerStatus {
    /// Library not loaded yet, or nothing to play
    Idle,

    /// A track is selected but not playing
    Ready,

    Playing,

    /// Source loaded, duration not yet reported
    Transitioning,
}

/// Transport state of the selected track
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransportState {
    pub current_index: usize,
    pub is_playing: bool,
    pub current_time_seconds: f64,

    /// Device-reported duration, once known
    pub duration_seconds: Option<f64>,

    /// Track whose source the device holds
    ///
    /// Set when a `Load` command is issued and cleared by `Unload`; never
    /// changed otherwise.
    pub loaded_track_id: Option<TrackId>,
}

/// Identifier of one issued play request
///
/// Ids increase monotonically, so a rejection carrying an older id belongs
/// to a superseded request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayRequestId(pub u64);

impl fmt::Display for PlayRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
