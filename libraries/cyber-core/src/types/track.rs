use super::ids::TrackId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Artist label given to imported tracks
pub const LOCAL_TRACK_ARTIST: &str = "Local Track";

/// Reference-counted audio bytes for an imported track
///
/// This is the playable handle derived from stored content. Clones share the
/// same allocation; the bytes are freed when the last owner (playlist entry or
/// loaded device source) drops its handle.
#[derive(Clone)]
pub struct LocalBlob {
    bytes: Arc<[u8]>,
    extension: Option<String>,
}

impl LocalBlob {
    pub fn new(bytes: impl Into<Arc<[u8]>>, extension: Option<String>) -> Self {
        Self {
            bytes: bytes.into(),
            extension,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Shared buffer, for readers that need an owned handle
    pub fn shared(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    /// File extension hint for format probing
    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    /// Number of live handles to this buffer
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.bytes)
    }
}

impl fmt::Debug for LocalBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalBlob")
            .field("len", &self.bytes.len())
            .field("extension", &self.extension)
            .finish()
    }
}

impl PartialEq for LocalBlob {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.bytes, &other.bytes)
    }
}

/// Locator consumable by a playback device
#[derive(Debug, Clone, PartialEq)]
pub enum SourceRef {
    /// Catalog file on disk
    File(PathBuf),
    /// Imported bytes held in memory
    Local(LocalBlob),
}

impl SourceRef {
    /// Short human-readable description for logs
    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Local(blob) => format!("<local {} bytes>", blob.len()),
        }
    }

    /// Extension used as a probe hint
    pub fn format_hint(&self) -> Option<String> {
        match self {
            Self::File(path) => path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase),
            Self::Local(blob) => blob.extension().map(str::to_ascii_lowercase),
        }
    }
}

/// Catalog entry as it appears in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    pub artist: String,
    pub path: PathBuf,
    #[serde(default)]
    pub duration_seconds: f64,
}

/// Track descriptor in the playlist
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    /// Catalog duration, refined once the device reports a finite value
    pub duration_seconds: f64,
    pub source: SourceRef,
    pub is_local: bool,
    pub size_bytes: Option<u64>,
}

impl Track {
    /// Create a catalog track backed by a file
    pub fn catalog(
        id: impl Into<TrackId>,
        title: impl Into<String>,
        artist: impl Into<String>,
        path: impl Into<PathBuf>,
        duration_seconds: f64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            duration_seconds: sanitize_duration(duration_seconds),
            source: SourceRef::File(path.into()),
            is_local: false,
            size_bytes: None,
        }
    }

    /// Create an imported track; duration is unknown until loaded
    pub fn local(id: TrackId, title: impl Into<String>, blob: LocalBlob) -> Self {
        let size = blob.len() as u64;
        Self {
            id,
            title: title.into(),
            artist: LOCAL_TRACK_ARTIST.to_string(),
            duration_seconds: 0.0,
            source: SourceRef::Local(blob),
            is_local: true,
            size_bytes: Some(size),
        }
    }

    /// Build a catalog track from a configuration entry
    ///
    /// Entries without an explicit id use their position, so ids stay stable
    /// as long as the catalog order does.
    pub fn from_catalog_entry(position: usize, entry: &CatalogEntry) -> Self {
        let id = entry
            .id
            .clone()
            .unwrap_or_else(|| format!("catalog-{position}"));
        Self::catalog(
            id,
            entry.title.clone(),
            entry.artist.clone(),
            entry.path.clone(),
            entry.duration_seconds,
        )
    }
}

pub(crate) fn sanitize_duration(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}
