use super::ids::TrackId;
use super::track::{LocalBlob, Track};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const MIB: u64 = 1024 * 1024;

/// Storage quota level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageTier {
    /// 256 MiB
    #[default]
    Base,
    /// 1024 MiB
    Upgraded,
}

impl StorageTier {
    pub fn limit_bytes(self) -> u64 {
        match self {
            Self::Base => 256 * MIB,
            Self::Upgraded => 1024 * MIB,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Base => Self::Upgraded,
            Self::Upgraded => Self::Base,
        }
    }

    /// Limit as shown to the user
    pub fn label(self) -> &'static str {
        match self {
            Self::Base => "256MB",
            Self::Upgraded => "1GB",
        }
    }
}

impl fmt::Display for StorageTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base => write!(f, "base ({})", self.label()),
            Self::Upgraded => write!(f, "upgraded ({})", self.label()),
        }
    }
}

/// Track content to be imported
#[derive(Debug, Clone)]
pub struct NewTrack {
    pub title: String,
    pub content: Vec<u8>,
    pub extension: Option<String>,
}

impl NewTrack {
    pub fn new(title: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            title: title.into(),
            content,
            extension: None,
        }
    }

    /// Title is the file name without its extension
    pub fn from_file_name(path: &Path, content: Vec<u8>) -> Self {
        let title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("Untitled")
            .to_string();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        Self {
            title,
            content,
            extension,
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.content.len() as u64
    }
}

/// Track record as persisted by a track store
#[derive(Debug, Clone)]
pub struct StoredTrack {
    pub id: TrackId,
    pub title: String,
    pub content: Vec<u8>,
    pub size_bytes: u64,
    pub extension: Option<String>,
    /// Milliseconds since the Unix epoch
    pub added_at_ms: i64,
}

impl StoredTrack {
    /// Derive a fresh playable handle for the playlist
    pub fn into_track(self) -> Track {
        let blob = LocalBlob::new(self.content, self.extension);
        Track::local(self.id, self.title, blob)
    }
}
