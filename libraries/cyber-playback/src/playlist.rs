//! Catalog plus locally imported tracks
//!
//! ```text
//! [ catalog 0 .. catalog n | local 0 .. local m ]
//!                            ^ storage insertion order
//! ```
//!
//! Ids are unique across the whole list. Every membership change bumps the
//! revision so the coordinator can tell two playlists apart even when their
//! lengths match.

use cyber_core::{Track, TrackId};
use std::collections::HashSet;
use thiserror::Error;
use tracing::warn;

/// A track with this id is already in the playlist
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Duplicate track id: {0}")]
pub struct DuplicateTrack(pub TrackId);

#[derive(Debug, Clone, Default)]
pub struct Playlist {
    tracks: Vec<Track>,
    ids: HashSet<TrackId>,
    revision: u64,
}

impl Playlist {
    /// Build from catalog tracks followed by local tracks
    ///
    /// Later duplicates of an id are dropped with a warning.
    pub fn new(catalog: Vec<Track>, local: Vec<Track>) -> Self {
        let mut playlist = Self::default();
        for track in catalog.into_iter().chain(local) {
            if let Err(DuplicateTrack(id)) = playlist.insert(track) {
                warn!("Dropping duplicate track {}", id);
            }
        }
        playlist
    }

    fn insert(&mut self, track: Track) -> Result<(), DuplicateTrack> {
        if !self.ids.insert(track.id.clone()) {
            return Err(DuplicateTrack(track.id));
        }
        self.tracks.push(track);
        Ok(())
    }

    /// Append a track at the end
    pub fn push(&mut self, track: Track) -> Result<(), DuplicateTrack> {
        self.insert(track)?;
        self.revision += 1;
        Ok(())
    }

    /// Remove the track at `index`
    pub fn remove(&mut self, index: usize) -> Option<Track> {
        if index >= self.tracks.len() {
            return None;
        }
        let track = self.tracks.remove(index);
        self.ids.remove(&track.id);
        self.revision += 1;
        Some(track)
    }

    pub fn position(&self, id: &TrackId) -> Option<usize> {
        if !self.ids.contains(id) {
            return None;
        }
        self.tracks.iter().position(|t| &t.id == id)
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Replace a track's duration with the device-reported one
    ///
    /// Not a membership change, so the revision stays.
    pub fn refine_duration(&mut self, id: &TrackId, seconds: f64) -> bool {
        if !seconds.is_finite() || seconds <= 0.0 {
            return false;
        }
        match self.tracks.iter_mut().find(|t| &t.id == id) {
            Some(track) => {
                track.duration_seconds = seconds;
                true
            }
            None => false,
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    /// Summed size of the local tracks
    pub fn local_bytes(&self) -> u64 {
        self.tracks
            .iter()
            .filter(|t| t.is_local)
            .filter_map(|t| t.size_bytes)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyber_core::LocalBlob;

    fn catalog(id: &str) -> Track {
        Track::catalog(id, id.to_uppercase(), "Artist", format!("{id}.mp3"), 100.0)
    }

    fn local(id: &str, size: usize) -> Track {
        Track::local(TrackId::new(id), id, LocalBlob::new(vec![0u8; size], None))
    }

    #[test]
    fn catalog_comes_before_local() {
        let playlist = Playlist::new(vec![catalog("a"), catalog("b")], vec![local("l1", 4)]);
        let ids: Vec<_> = playlist.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "l1"]);
        assert_eq!(playlist.local_bytes(), 4);
    }

    #[test]
    fn duplicates_are_dropped() {
        let playlist = Playlist::new(vec![catalog("a"), catalog("a")], vec![]);
        assert_eq!(playlist.len(), 1);

        let mut playlist = playlist;
        assert_eq!(
            playlist.push(catalog("a")),
            Err(DuplicateTrack(TrackId::new("a")))
        );
        assert_eq!(playlist.len(), 1);
    }

    #[test]
    fn membership_changes_bump_revision() {
        let mut playlist = Playlist::new(vec![catalog("a")], vec![]);
        let start = playlist.revision();

        playlist.push(catalog("b")).unwrap();
        assert_eq!(playlist.revision(), start + 1);

        playlist.remove(0).unwrap();
        assert_eq!(playlist.revision(), start + 2);
        assert_eq!(playlist.position(&TrackId::new("b")), Some(0));
        assert_eq!(playlist.position(&TrackId::new("a")), None);

        assert!(playlist.remove(5).is_none());
        assert_eq!(playlist.revision(), start + 2);
    }

    #[test]
    fn refine_duration_keeps_revision() {
        let mut playlist = Playlist::new(vec![], vec![local("l1", 1)]);
        let revision = playlist.revision();

        assert!(playlist.refine_duration(&TrackId::new("l1"), 42.5));
        assert_eq!(playlist.get(0).unwrap().duration_seconds, 42.5);
        assert_eq!(playlist.revision(), revision);

        assert!(!playlist.refine_duration(&TrackId::new("l1"), f64::INFINITY));
        assert!(!playlist.refine_duration(&TrackId::new("missing"), 10.0));
    }
}
