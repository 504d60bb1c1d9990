//! Playback coordinator
//!
//! A pure reducer: every operation takes the current state plus an action or
//! device event, updates the state, and returns the device commands needed
//! to bring the device in line. Nothing here touches a device directly.
//!
//! # Reconciliation
//!
//! After each operation the coordinator compares a snapshot of
//! `(playlist, current index, is_playing, library loaded)` with the one it
//! last reconciled. When anything changed it runs:
//!
//! 1. Library not loaded: nothing. Empty playlist or index out of range:
//!    `Unload` if something is loaded, clear the marker, stop playing.
//! 2. Loaded marker differs from the selected track: `Load`, set the marker,
//!    reset time and duration.
//! 3. Playing: `EnsureContextRunning` then `Play` with a fresh request id.
//! 4. Otherwise `Pause`.

use crate::events::{Action, Command, PlayerEvent};
use crate::navigation;
use crate::playlist::Playlist;
use crate::types::{Direction, PlayMode, PlayRequestId, PlayerStatus, TransportState};
use cyber_core::{DeviceEvent, PlaybackRejected, Track, TrackId};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Snapshot {
    generation: u64,
    revision: u64,
    index: usize,
    is_playing: bool,
    library_loaded: bool,
}

/// Playback state machine over the playlist and transport
pub struct Coordinator {
    playlist: Playlist,
    /// Bumped whenever the playlist is replaced wholesale
    generation: u64,
    transport: TransportState,
    mode: PlayMode,
    library_loaded: bool,
    visualizer_active: bool,
    rng: StdRng,
    next_request: u64,
    latest_request: Option<PlayRequestId>,
    last_reconciled: Option<Snapshot>,
    pending_events: Vec<PlayerEvent>,
}

impl Coordinator {
    /// Create an idle coordinator with an entropy-seeded shuffle
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create with a fixed shuffle seed
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            playlist: Playlist::default(),
            generation: 0,
            transport: TransportState::default(),
            mode: PlayMode::default(),
            library_loaded: false,
            visualizer_active: false,
            rng,
            next_request: 0,
            latest_request: None,
            last_reconciled: None,
            pending_events: Vec::new(),
        }
    }

    // ===== State Queries =====

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn transport(&self) -> &TransportState {
        &self.transport
    }

    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    pub fn is_library_loaded(&self) -> bool {
        self.library_loaded
    }

    pub fn is_visualizer_active(&self) -> bool {
        self.visualizer_active
    }

    /// Track at the current index
    pub fn current_track(&self) -> Option<&Track> {
        self.playlist.get(self.transport.current_index)
    }

    pub fn status(&self) -> PlayerStatus {
        if !self.library_loaded || self.playlist.is_empty() {
            PlayerStatus::Idle
        } else if self.transport.loaded_track_id.is_some()
            && self.transport.duration_seconds.is_none()
        {
            PlayerStatus::Transitioning
        } else if self.transport.is_playing {
            PlayerStatus::Playing
        } else {
            PlayerStatus::Ready
        }
    }

    /// Device-reported duration, else the catalog duration
    pub fn displayed_duration(&self) -> f64 {
        self.transport
            .duration_seconds
            .unwrap_or_else(|| self.current_track().map_or(0.0, |t| t.duration_seconds))
    }

    /// Whether the visualizer should read the analyser this frame
    pub fn should_poll_visualizer(&self) -> bool {
        self.visualizer_active && self.transport.is_playing
    }

    // ===== User Actions =====

    pub fn dispatch(&mut self, action: Action) -> Vec<Command> {
        match action {
            Action::TogglePlay => self.toggle_play(),
            Action::Next => self.advance(Direction::Forward, false),
            Action::Previous => self.advance(Direction::Backward, false),
            Action::Select(id) => self.select(&id),
            Action::SelectIndex(index) => self.select_index(index),
            Action::Seek(seconds) => self.seek(seconds),
            Action::SeekBy(delta) => self.seek_by(delta),
            Action::ToggleMode => {
                self.toggle_mode();
                Vec::new()
            }
            Action::ToggleVisualizer => self.toggle_visualizer(),
        }
    }

    pub fn toggle_play(&mut self) -> Vec<Command> {
        if self.playlist.is_empty() {
            return Vec::new();
        }
        let playing = !self.transport.is_playing;
        self.set_playing(playing);
        self.settle(vec![Command::EnsureContextRunning])
    }

    /// Move to the next or previous track
    ///
    /// `auto` marks natural end-of-track. Landing on the current index
    /// restarts the track instead of leaving the device at its end.
    pub fn advance(&mut self, direction: Direction, auto: bool) -> Vec<Command> {
        if self.playlist.is_empty() {
            return Vec::new();
        }
        if self.mode == PlayMode::RepeatOne && auto {
            return self.restart_current();
        }

        let current = self.transport.current_index;
        let Some(next) = navigation::next_index(
            self.mode,
            direction,
            current,
            self.playlist.len(),
            &mut self.rng,
        ) else {
            return Vec::new();
        };

        if next == current {
            return self.restart_current();
        }

        debug!("Advancing {:?} from {} to {}", direction, current, next);
        self.transport.current_index = next;
        self.transport.current_time_seconds = 0.0;
        self.settle(Vec::new())
    }

    /// Select a track by id and play it
    pub fn select(&mut self, id: &TrackId) -> Vec<Command> {
        match self.playlist.position(id) {
            Some(index) => self.select_index(index),
            None => {
                warn!("Cannot select unknown track {}", id);
                Vec::new()
            }
        }
    }

    /// Select a track by position and play it
    pub fn select_index(&mut self, index: usize) -> Vec<Command> {
        if index >= self.playlist.len() {
            warn!(
                "Track index {} out of range (playlist has {})",
                index,
                self.playlist.len()
            );
            return Vec::new();
        }

        if index != self.transport.current_index {
            self.transport.current_index = index;
            self.transport.current_time_seconds = 0.0;
        }
        self.set_playing(true);
        self.settle(vec![Command::EnsureContextRunning])
    }

    /// Seek the loaded track, updating the position immediately
    pub fn seek(&mut self, seconds: f64) -> Vec<Command> {
        if !seconds.is_finite() || self.transport.loaded_track_id.is_none() {
            return Vec::new();
        }
        let seconds = seconds.max(0.0);
        self.transport.current_time_seconds = seconds;
        vec![Command::Seek(seconds)]
    }

    /// Seek relative to the current position, clamped to `[0, duration]`
    pub fn seek_by(&mut self, delta: f64) -> Vec<Command> {
        let mut target = (self.transport.current_time_seconds + delta).max(0.0);
        let duration = self.displayed_duration();
        if duration > 0.0 {
            target = target.min(duration);
        }
        self.seek(target)
    }

    pub fn toggle_mode(&mut self) -> PlayMode {
        self.set_mode(self.mode.cycle());
        self.mode
    }

    pub fn set_mode(&mut self, mode: PlayMode) {
        if self.mode != mode {
            self.mode = mode;
            self.pending_events.push(PlayerEvent::ModeChanged { mode });
        }
    }

    /// Flip the visualizer; turning it on is an audible gesture
    pub fn toggle_visualizer(&mut self) -> Vec<Command> {
        self.visualizer_active = !self.visualizer_active;
        self.pending_events.push(PlayerEvent::VisualizerToggled {
            active: self.visualizer_active,
        });
        if self.visualizer_active {
            vec![Command::EnsureContextRunning]
        } else {
            Vec::new()
        }
    }

    // ===== Playlist Management =====

    /// Install a freshly loaded playlist and mark the library loaded
    pub fn replace_playlist(&mut self, playlist: Playlist) -> Vec<Command> {
        self.playlist = playlist;
        self.generation += 1;
        self.library_loaded = true;
        if self.transport.current_index >= self.playlist.len() {
            self.transport.current_index = 0;
        }
        self.pending_events.push(PlayerEvent::PlaylistChanged {
            len: self.playlist.len(),
        });
        self.settle(Vec::new())
    }

    /// Append tracks, skipping ids already present
    pub fn append_tracks(&mut self, tracks: Vec<Track>) -> Vec<Command> {
        let before = self.playlist.len();
        for track in tracks {
            if let Err(duplicate) = self.playlist.push(track) {
                warn!("{}", duplicate);
            }
        }
        if self.playlist.len() != before {
            self.pending_events.push(PlayerEvent::PlaylistChanged {
                len: self.playlist.len(),
            });
        }
        self.settle(Vec::new())
    }

    /// Remove the track at `index`, keeping the selection stable
    ///
    /// Removing below the current index shifts it down so the same track
    /// stays selected. Removing the current track selects its successor, or
    /// the new last track when it was last.
    pub fn remove_at(&mut self, index: usize) -> (Option<Track>, Vec<Command>) {
        let Some(track) = self.playlist.remove(index) else {
            return (None, Vec::new());
        };

        let len = self.playlist.len();
        let current = self.transport.current_index;
        if len == 0 {
            self.transport.current_index = 0;
            self.set_playing(false);
        } else if index < current {
            self.transport.current_index = current - 1;
        } else if current >= len {
            self.transport.current_index = len - 1;
        }

        info!("Removed track {} from playlist", track.id);
        self.pending_events
            .push(PlayerEvent::PlaylistChanged { len });
        let commands = self.settle(Vec::new());
        (Some(track), commands)
    }

    // ===== Device Feedback =====

    pub fn handle_device_event(&mut self, event: DeviceEvent) -> Vec<Command> {
        match event {
            DeviceEvent::TimeUpdate(seconds) => {
                if seconds.is_finite() {
                    self.transport.current_time_seconds = seconds.max(0.0);
                }
                Vec::new()
            }
            DeviceEvent::DurationAvailable(seconds) => {
                if seconds.is_finite() && seconds > 0.0 {
                    self.transport.duration_seconds = Some(seconds);
                    if let Some(id) = self.transport.loaded_track_id.clone() {
                        self.playlist.refine_duration(&id, seconds);
                        self.pending_events.push(PlayerEvent::DurationKnown {
                            track_id: id,
                            seconds,
                        });
                    }
                }
                Vec::new()
            }
            DeviceEvent::Ended => self.advance(Direction::Forward, true),
            DeviceEvent::Error(err) => {
                error!("Playback device error: {}", err);
                self.pending_events.push(PlayerEvent::DeviceFailed(err));
                self.set_playing(false);
                self.settle(Vec::new())
            }
        }
    }

    /// Feed back the outcome of a `Play` command
    ///
    /// Rejections of superseded requests and `Aborted` are swallowed;
    /// `NotAllowed` and `NotSupported` stop playback and are surfaced.
    pub fn handle_play_result(
        &mut self,
        id: PlayRequestId,
        result: Result<(), PlaybackRejected>,
    ) -> Vec<Command> {
        let Err(rejected) = result else {
            return Vec::new();
        };

        if self.latest_request != Some(id) {
            debug!("Ignoring rejection of superseded play request {}", id);
            return Vec::new();
        }

        if rejected.cause.forces_stop() {
            warn!("Play request {} rejected: {}", id, rejected);
            self.pending_events.push(PlayerEvent::PlaybackRejected {
                cause: rejected.cause,
            });
            self.set_playing(false);
            self.settle(Vec::new())
        } else {
            // Aborted means a newer command already took over
            debug!("Play request {} not honoured: {}", id, rejected);
            Vec::new()
        }
    }

    // ===== Events =====

    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ===== Reconciliation =====

    /// Run reconciliation regardless of whether state changed
    pub fn reconcile(&mut self) -> Vec<Command> {
        let mut commands = Vec::new();
        self.reconcile_into(&mut commands);
        commands
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            generation: self.generation,
            revision: self.playlist.revision(),
            index: self.transport.current_index,
            is_playing: self.transport.is_playing,
            library_loaded: self.library_loaded,
        }
    }

    fn settle(&mut self, mut commands: Vec<Command>) -> Vec<Command> {
        if self.last_reconciled != Some(self.snapshot()) {
            self.reconcile_into(&mut commands);
        }
        commands
    }

    fn reconcile_into(&mut self, commands: &mut Vec<Command>) {
        if !self.library_loaded {
            self.last_reconciled = Some(self.snapshot());
            return;
        }

        let index = self.transport.current_index;
        let Some((track_id, source)) = self
            .playlist
            .get(index)
            .map(|t| (t.id.clone(), t.source.clone()))
        else {
            if self.transport.loaded_track_id.take().is_some() {
                debug!("Nothing to play, unloading device");
                commands.push(Command::Unload);
            }
            self.transport.current_time_seconds = 0.0;
            self.transport.duration_seconds = None;
            self.set_playing(false);
            self.last_reconciled = Some(self.snapshot());
            return;
        };

        if self.transport.loaded_track_id.as_ref() != Some(&track_id) {
            info!("Loading track {} from {}", track_id, source.describe());
            self.transport.loaded_track_id = Some(track_id.clone());
            self.transport.current_time_seconds = 0.0;
            self.transport.duration_seconds = None;
            self.pending_events.push(PlayerEvent::TrackChanged {
                index,
                track_id: track_id.clone(),
            });
            commands.push(Command::Load { track_id, source });
        }

        if self.transport.is_playing {
            if !commands.contains(&Command::EnsureContextRunning) {
                commands.push(Command::EnsureContextRunning);
            }
            let id = self.next_request_id();
            debug!("Requesting play {}", id);
            commands.push(Command::Play(id));
        } else {
            commands.push(Command::Pause);
        }

        self.last_reconciled = Some(self.snapshot());
    }

    /// Rewind the current track and play it again if playing
    fn restart_current(&mut self) -> Vec<Command> {
        let Some(track_id) = self.current_track().map(|t| t.id.clone()) else {
            return Vec::new();
        };
        if self.transport.loaded_track_id.as_ref() != Some(&track_id) {
            return self.reconcile();
        }

        debug!("Restarting track {}", track_id);
        self.transport.current_time_seconds = 0.0;
        let mut commands = vec![Command::Seek(0.0)];
        if self.transport.is_playing {
            let id = self.next_request_id();
            commands.push(Command::Play(id));
        }
        self.pending_events
            .push(PlayerEvent::TrackRestarted { track_id });
        commands
    }

    fn next_request_id(&mut self) -> PlayRequestId {
        self.next_request += 1;
        let id = PlayRequestId(self.next_request);
        self.latest_request = Some(id);
        id
    }

    fn set_playing(&mut self, is_playing: bool) {
        if self.transport.is_playing != is_playing {
            self.transport.is_playing = is_playing;
            self.pending_events
                .push(PlayerEvent::PlayingChanged { is_playing });
        }
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyber_core::{RejectCause, SourceRef};

    fn track(id: &str, secs: f64) -> Track {
        Track::catalog(id, id, "Artist", format!("{id}.mp3"), secs)
    }

    fn loaded(ids: &[&str]) -> Coordinator {
        let mut coordinator = Coordinator::with_seed(3);
        let tracks = ids.iter().map(|id| track(id, 100.0)).collect();
        coordinator.replace_playlist(Playlist::new(tracks, vec![]));
        coordinator
    }

    #[test]
    fn idle_until_library_loaded() {
        let mut coordinator = Coordinator::with_seed(1);
        assert_eq!(coordinator.status(), PlayerStatus::Idle);
        assert!(coordinator.toggle_play().is_empty());
        assert!(coordinator.reconcile().is_empty());
    }

    #[test]
    fn loading_library_loads_first_track_paused() {
        let mut coordinator = Coordinator::with_seed(1);
        let commands = coordinator.replace_playlist(Playlist::new(vec![track("a", 10.0)], vec![]));

        assert_eq!(
            commands,
            vec![
                Command::Load {
                    track_id: TrackId::new("a"),
                    source: SourceRef::File("a.mp3".into()),
                },
                Command::Pause,
            ]
        );
        assert_eq!(coordinator.status(), PlayerStatus::Transitioning);
        assert_eq!(
            coordinator.transport().loaded_track_id,
            Some(TrackId::new("a"))
        );
    }

    #[test]
    fn unchanged_state_issues_nothing() {
        let mut coordinator = loaded(&["a", "b"]);
        coordinator.drain_events();
        let commands = coordinator.append_tracks(vec![track("a", 1.0)]);
        assert!(commands.is_empty());
        assert!(coordinator.drain_events().is_empty());
    }

    #[test]
    fn toggle_play_resumes_context_once() {
        let mut coordinator = loaded(&["a"]);
        let commands = coordinator.toggle_play();
        assert_eq!(
            commands,
            vec![Command::EnsureContextRunning, Command::Play(PlayRequestId(1))]
        );

        let commands = coordinator.toggle_play();
        assert_eq!(commands, vec![Command::EnsureContextRunning, Command::Pause]);
    }

    #[test]
    fn stale_rejection_is_ignored() {
        let mut coordinator = loaded(&["a", "b"]);
        coordinator.toggle_play();
        coordinator.advance(Direction::Forward, false);

        let first = PlayRequestId(1);
        let rejected = Err(PlaybackRejected::new(RejectCause::NotAllowed));
        assert!(coordinator.handle_play_result(first, rejected).is_empty());
        assert!(coordinator.transport().is_playing);
    }

    #[test]
    fn not_allowed_stops_playback() {
        let mut coordinator = loaded(&["a"]);
        coordinator.toggle_play();
        coordinator.drain_events();

        let commands = coordinator.handle_play_result(
            PlayRequestId(1),
            Err(PlaybackRejected::new(RejectCause::NotAllowed)),
        );
        assert_eq!(commands, vec![Command::Pause]);
        assert!(!coordinator.transport().is_playing);
        assert!(coordinator
            .drain_events()
            .contains(&PlayerEvent::PlaybackRejected {
                cause: RejectCause::NotAllowed
            }));
    }

    #[test]
    fn aborted_and_other_keep_playing() {
        let mut coordinator = loaded(&["a"]);
        coordinator.toggle_play();

        for cause in [RejectCause::Aborted, RejectCause::Other] {
            let commands = coordinator
                .handle_play_result(PlayRequestId(1), Err(PlaybackRejected::new(cause)));
            assert!(commands.is_empty());
            assert!(coordinator.transport().is_playing);
        }
    }

    #[test]
    fn duration_refines_track() {
        let mut coordinator = loaded(&["a"]);
        coordinator.handle_device_event(DeviceEvent::DurationAvailable(87.5));

        assert_eq!(coordinator.transport().duration_seconds, Some(87.5));
        assert_eq!(coordinator.current_track().unwrap().duration_seconds, 87.5);
        assert_eq!(coordinator.status(), PlayerStatus::Ready);

        coordinator.handle_device_event(DeviceEvent::DurationAvailable(f64::INFINITY));
        assert_eq!(coordinator.transport().duration_seconds, Some(87.5));
    }

    #[test]
    fn seek_by_clamps_to_duration() {
        let mut coordinator = loaded(&["a"]);
        coordinator.handle_device_event(DeviceEvent::DurationAvailable(20.0));
        coordinator.handle_device_event(DeviceEvent::TimeUpdate(18.0));

        assert_eq!(coordinator.seek_by(5.0), vec![Command::Seek(20.0)]);
        assert_eq!(coordinator.transport().current_time_seconds, 20.0);

        coordinator.seek(2.0);
        assert_eq!(coordinator.seek_by(-5.0), vec![Command::Seek(0.0)]);
    }

    #[test]
    fn visualizer_polls_only_while_playing() {
        let mut coordinator = loaded(&["a"]);
        assert_eq!(
            coordinator.toggle_visualizer(),
            vec![Command::EnsureContextRunning]
        );
        assert!(!coordinator.should_poll_visualizer());

        coordinator.toggle_play();
        assert!(coordinator.should_poll_visualizer());

        assert!(coordinator.toggle_visualizer().is_empty());
        assert!(!coordinator.should_poll_visualizer());
    }

    #[test]
    fn device_error_stops_playback() {
        let mut coordinator = loaded(&["a"]);
        coordinator.toggle_play();

        let err = cyber_core::DeviceError::new(cyber_core::DeviceErrorKind::DecodeFailure, "bad");
        let commands = coordinator.handle_device_event(DeviceEvent::Error(err));
        assert_eq!(commands, vec![Command::Pause]);
        assert!(!coordinator.transport().is_playing);
    }
}
