//! Interactive player state
//!
//! `App` turns parsed input and device events into engine calls and renders
//! what the user should see as plain lines. It never prints; the caller
//! decides where the lines go.

use crate::input::{Input, HELP};
use crate::visualizer::VisualizerStyle;
use cyber_core::{
    AudioContext, PlaybackDevice, SettingsStore, SourceEvent, StorageTier, TrackStore, MIB,
};
use cyber_playback::{
    action_for, Action, AudioEngine, Library, Notice, PlayerError, PlayerEvent, PlayerStatus,
    Playlist,
};
use std::sync::Arc;
use tracing::warn;

/// Columns used by the visualizer
const VISUALIZER_WIDTH: usize = 64;

/// Lines to show plus whether to exit
#[derive(Debug, Default, PartialEq)]
pub struct Response {
    pub lines: Vec<String>,
    pub quit: bool,
}

impl Response {
    fn line(line: impl Into<String>) -> Self {
        Self {
            lines: vec![line.into()],
            quit: false,
        }
    }
}

pub struct App<D, X>
where
    D: PlaybackDevice,
    X: AudioContext,
{
    engine: AudioEngine<D, X>,
    library: Library,
    settings: Arc<dyn SettingsStore>,
    theme_index: usize,
    theme_count: usize,
    visualizer_style: VisualizerStyle,
}

impl<D, X> App<D, X>
where
    D: PlaybackDevice,
    X: AudioContext,
{
    pub fn new(
        engine: AudioEngine<D, X>,
        library: Library,
        settings: Arc<dyn SettingsStore>,
        theme_index: usize,
        theme_count: usize,
    ) -> Self {
        let theme_count = theme_count.max(1);
        Self {
            engine,
            library,
            settings,
            theme_index: theme_index % theme_count,
            theme_count,
            visualizer_style: VisualizerStyle::default(),
        }
    }

    /// Load the library and install the playlist
    pub async fn start(
        mut engine: AudioEngine<D, X>,
        tracks: Arc<dyn TrackStore>,
        settings: Arc<dyn SettingsStore>,
        tier: StorageTier,
        catalog: &[cyber_core::CatalogEntry],
        theme_count: usize,
    ) -> Self {
        let mut library = Library::new(tracks, tier);
        let playlist: Playlist = library.load(catalog).await;
        engine.replace_playlist(playlist);
        engine.drain_events();

        let theme_index = match settings.load_theme_index().await {
            Ok(index) => index,
            Err(e) => {
                warn!("Failed to load theme index: {}", e);
                0
            }
        };
        Self::new(engine, library, settings, theme_index, theme_count)
    }

    pub fn engine(&self) -> &AudioEngine<D, X> {
        &self.engine
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn theme_index(&self) -> usize {
        self.theme_index
    }

    pub fn visualizer_style(&self) -> VisualizerStyle {
        self.visualizer_style
    }

    pub fn set_visualizer_style(&mut self, style: VisualizerStyle) {
        self.visualizer_style = style;
    }

    /// Apply one user command
    ///
    /// Failures are rendered as `!!` lines; none of them end the session.
    pub async fn handle(&mut self, input: Input) -> Response {
        let mut response = match input {
            Input::Key(key) => {
                self.engine.dispatch(action_for(key));
                Response::default()
            }
            Input::Play => {
                if !self.engine.coordinator().transport().is_playing {
                    self.engine.dispatch(Action::TogglePlay);
                }
                Response::default()
            }
            Input::Pause => {
                if self.engine.coordinator().transport().is_playing {
                    self.engine.dispatch(Action::TogglePlay);
                }
                Response::default()
            }
            Input::Next => {
                self.engine.dispatch(Action::Next);
                Response::default()
            }
            Input::Prev => {
                self.engine.dispatch(Action::Previous);
                Response::default()
            }
            Input::Mode => {
                self.engine.dispatch(Action::ToggleMode);
                Response::default()
            }
            Input::Select(position) => match position.checked_sub(1) {
                Some(index) => {
                    self.engine.dispatch(Action::SelectIndex(index));
                    Response::default()
                }
                None => Response::line("tracks are numbered from 1"),
            },
            Input::Seek(seconds) => {
                self.engine.dispatch(Action::Seek(seconds));
                Response::default()
            }
            Input::EqSet { band, gain } => match self.engine.set_eq_gain(band, gain).await {
                Ok(()) => Response::line(self.eq_line()),
                Err(e) => Response::line(render_eq_error(&e)),
            },
            Input::EqEnable(enabled) => match self.engine.set_eq_enabled(enabled).await {
                Ok(()) => Response::line(self.eq_line()),
                Err(e) => Response::line(render_eq_error(&e)),
            },
            Input::EqPreset(preset) => match self.engine.apply_named_preset(preset).await {
                Ok(()) => Response::line(format!("preset {} {}", preset.name(), self.eq_line())),
                Err(e) => Response::line(render_eq_error(&e)),
            },
            Input::Import(path) => {
                match self.library.import_file(&mut self.engine, &path).await {
                    Ok(Some(_)) => Response::line(format!("imported {}", path.display())),
                    Ok(None) => Response::default(),
                    Err(e) => Response::line(format!("!! Cannot read {}: {e}", path.display())),
                }
            }
            Input::Delete => match self.library.delete_current(&mut self.engine).await {
                Ok(Some(track)) => Response::line(format!("deleted {}", track.title)),
                Ok(None) => Response::line("playlist is empty"),
                Err(e) => Response::line(format!("!! Delete failed: {e}")),
            },
            Input::Tier => {
                self.library.toggle_tier();
                Response::default()
            }
            Input::Visualizer => {
                self.engine.dispatch(Action::ToggleVisualizer);
                Response::default()
            }
            Input::VisualizerStyle => {
                self.visualizer_style = self.visualizer_style.next();
                Response::line(format!("visualizer style {}", self.visualizer_style))
            }
            Input::Volume(level) => {
                self.engine.set_volume(level);
                Response::line(format!("volume {level}%"))
            }
            Input::Mute => {
                self.engine.toggle_mute();
                let state = if self.engine.volume().is_muted() {
                    "muted"
                } else {
                    "unmuted"
                };
                Response::line(state)
            }
            Input::Theme => {
                let next = (self.theme_index + 1) % self.theme_count;
                match self.settings.save_theme_index(next).await {
                    Ok(()) => {
                        self.theme_index = next;
                        Response::line(format!("theme {}/{}", next + 1, self.theme_count))
                    }
                    Err(e) => {
                        warn!("Failed to save theme index: {}", e);
                        Response::line(format!(
                            "!! Failed to save theme, keeping theme {}: {e}",
                            self.theme_index + 1
                        ))
                    }
                }
            }
            Input::List => Response {
                lines: self.playlist_lines(),
                quit: false,
            },
            Input::Status => Response::line(self.status_line()),
            Input::Help => Response::line(HELP),
            Input::Quit => Response {
                lines: Vec::new(),
                quit: true,
            },
        };

        response.lines.extend(self.drain_messages());
        response
    }

    /// Feed one queued device event through the engine
    ///
    /// Events left over from a source that has since been replaced are
    /// dropped by the engine and produce no lines.
    pub fn handle_device_event(&mut self, event: SourceEvent) -> Vec<String> {
        if !self.engine.handle_source_event(event) {
            return Vec::new();
        }
        self.drain_messages()
    }

    /// Visualizer line in the selected style while active and playing
    pub fn visualizer_frame(&self) -> Option<String> {
        if !self.engine.coordinator().should_poll_visualizer() {
            return None;
        }
        let analyser = self.engine.analyser()?;
        Some(self.visualizer_style.render(&analyser, VISUALIZER_WIDTH))
    }

    /// Stop playback and close the audio output
    pub fn shutdown(&mut self) {
        self.engine.shutdown();
    }

    pub fn status_line(&self) -> String {
        let coordinator = self.engine.coordinator();
        let transport = coordinator.transport();
        let status = match coordinator.status() {
            PlayerStatus::Idle => "IDLE",
            PlayerStatus::Ready => "READY",
            PlayerStatus::Playing => "PLAYING",
            PlayerStatus::Transitioning => "LOADING",
        };
        let eq = if self.engine.equalizer().is_enabled() {
            "on"
        } else {
            "off"
        };

        let track = coordinator.current_track().map_or_else(
            || "-".to_string(),
            |t| {
                format!(
                    "{}/{} {} - {}",
                    transport.current_index + 1,
                    coordinator.playlist().len(),
                    t.title,
                    t.artist
                )
            },
        );

        format!(
            "[{status}] {track} {}/{} mode:{} eq:{eq} storage:{} theme:{}",
            format_time(transport.current_time_seconds),
            format_time(coordinator.displayed_duration()),
            coordinator.mode(),
            usage(self.library.used_bytes(), self.library.tier()),
            self.theme_index + 1,
        )
    }

    fn playlist_lines(&self) -> Vec<String> {
        let coordinator = self.engine.coordinator();
        let current = coordinator.transport().current_index;
        coordinator
            .playlist()
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let marker = if i == current { '>' } else { ' ' };
                let kind = if t.is_local { " [local]" } else { "" };
                format!(
                    "{marker}{:>3}. {} - {} ({}){kind}",
                    i + 1,
                    t.title,
                    t.artist,
                    format_time(t.duration_seconds)
                )
            })
            .collect()
    }

    fn eq_line(&self) -> String {
        let eq = self.engine.equalizer();
        let gains: Vec<String> = eq.gains().iter().map(|g| format!("{g:+.1}")).collect();
        format!(
            "eq {} [{}]",
            if eq.is_enabled() { "on" } else { "off" },
            gains.join(" ")
        )
    }

    fn drain_messages(&mut self) -> Vec<String> {
        let mut lines: Vec<String> = Vec::new();
        for event in self.engine.drain_events() {
            if let Some(line) = self.render_event(&event) {
                lines.push(line);
            }
        }
        lines.extend(self.library.drain_notices().iter().map(render_notice));
        lines
    }

    fn render_event(&self, event: &PlayerEvent) -> Option<String> {
        match event {
            PlayerEvent::TrackChanged { index, .. } => {
                let track = self.engine.coordinator().playlist().get(*index)?;
                Some(format!("now: {} - {}", track.title, track.artist))
            }
            PlayerEvent::ModeChanged { mode } => Some(format!("mode: {mode}")),
            PlayerEvent::VisualizerToggled { active } => {
                Some(format!("visualizer {}", if *active { "on" } else { "off" }))
            }
            PlayerEvent::PlaybackRejected { cause } => {
                Some(format!("playback blocked ({cause})"))
            }
            PlayerEvent::DeviceFailed(_) => Some("playback stopped".to_string()),
            PlayerEvent::TrackRestarted { .. }
            | PlayerEvent::PlayingChanged { .. }
            | PlayerEvent::DurationKnown { .. }
            | PlayerEvent::PlaylistChanged { .. } => None,
        }
    }
}

fn render_eq_error(error: &PlayerError) -> String {
    match error {
        PlayerError::Store(e) => format!("!! Failed to save equalizer, settings unchanged: {e}"),
        other => format!("!! {other}"),
    }
}

fn render_notice(notice: &Notice) -> String {
    match notice {
        Notice::StorageUsage { used, limit } => {
            format!("storage: {:.1} MB / {:.0} MB", mib(*used), mib(*limit))
        }
        Notice::QuotaExceeded { tier, .. } => match tier {
            StorageTier::Base => format!(
                "!! Storage full ({}). Upgrade with 'tier' or delete some tracks.",
                tier.label()
            ),
            StorageTier::Upgraded => {
                format!("!! Storage full ({}). Delete some tracks.", tier.label())
            }
        },
        Notice::SaveFailed { message } => format!("!! Failed to save file: {message}"),
        Notice::TierChanged { tier, .. } => format!(">>> Storage tier: {}", tier.label()),
    }
}

fn mib(bytes: u64) -> f64 {
    bytes as f64 / MIB as f64
}

fn usage(used: u64, tier: StorageTier) -> String {
    format!("{:.1}MB/{}", mib(used), tier.label())
}

/// `m:ss`
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_formatting() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(65.9), "1:05");
        assert_eq!(format_time(f64::NAN), "0:00");
    }

    #[test]
    fn equalizer_store_error_says_nothing_changed() {
        let line = render_eq_error(&PlayerError::Store(cyber_core::StoreError::failure("disk")));
        assert!(line.starts_with("!! Failed to save equalizer, settings unchanged"), "{line}");

        let line = render_eq_error(&PlayerError::equalizer("band 10 out of range (0-9)"));
        assert_eq!(line, "!! Invalid equalizer input: band 10 out of range (0-9)");
    }

    #[test]
    fn quota_notice_names_the_tier() {
        let line = render_notice(&Notice::QuotaExceeded {
            tier: StorageTier::Base,
            limit: StorageTier::Base.limit_bytes(),
        });
        assert!(line.contains("256MB"));
    }
}
