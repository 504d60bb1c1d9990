//! End-to-end tests of the interactive player against real decoding

use cyber_audio::EqPreset;
use cyber_audio_desktop::{DecodedDevice, NullOutput};
use cyber_core::{AudioContext, CatalogEntry, ContextState, PlaybackDevice, SettingsStore, SourceEvent};
use cyber_storage::MemoryStore;
use cyber_tunes::app::App;
use cyber_tunes::input::{self, Input};
use cyber_tunes::visualizer::VisualizerStyle;
use cyber_tunes::{build_app, AppConfig};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;

const RATE: u32 = 8000;

// ===== Test Helpers =====

fn write_wav(path: &Path, seconds: f32) {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..(RATE as f32 * seconds) as usize {
            let s: i16 = if i % 8 < 4 { 8000 } else { -8000 };
            writer.write_sample(s).unwrap();
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }
    std::fs::write(path, cursor.into_inner()).unwrap();
}

fn catalog_entry(dir: &Path, file: &str, title: &str) -> CatalogEntry {
    let path = dir.join(file);
    write_wav(&path, 1.0);
    CatalogEntry {
        id: None,
        title: title.to_string(),
        artist: "Grid Runner".to_string(),
        path,
        duration_seconds: 1.0,
    }
}

struct Harness {
    app: App<DecodedDevice, NullOutput>,
    events: UnboundedReceiver<SourceEvent>,
    store: Arc<MemoryStore>,
    dir: TempDir,
}

impl Harness {
    async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.storage.in_memory = true;
        config.catalog = vec![
            catalog_entry(dir.path(), "neon_rain.wav", "Neon Rain"),
            catalog_entry(dir.path(), "low_orbit.wav", "Low Orbit"),
        ];

        let store = Arc::new(MemoryStore::new());
        let stores = cyber_tunes::Stores {
            tracks: store.clone(),
            settings: store.clone(),
        };
        let (app, events) = build_app(&config, stores, RATE, |renderer| {
            Ok(NullOutput::new(renderer, true)?)
        })
        .await
        .unwrap();

        let mut harness = Self {
            app,
            events,
            store,
            dir,
        };
        harness.pump();
        harness
    }

    /// Deliver queued device events
    fn pump(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            lines.extend(self.app.handle_device_event(event));
        }
        lines
    }

    async fn send(&mut self, line: &str) -> Vec<String> {
        let input = input::parse(line).unwrap().unwrap();
        let response = self.app.handle(input).await;
        let mut lines = response.lines;
        lines.extend(self.pump());
        lines
    }

    fn wav(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        write_wav(&path, 0.5);
        path
    }
}

// ===== Startup =====

#[tokio::test]
async fn startup_loads_catalog_and_first_track() {
    let h = Harness::new().await;

    let status = h.app.status_line();
    assert!(status.starts_with("[READY]"), "{status}");
    assert!(status.contains("1/2 Neon Rain - Grid Runner"), "{status}");
    assert!(status.contains("storage:0.0MB/256MB"), "{status}");

    assert_eq!(h.app.engine().context().state(), ContextState::Suspended);
    assert!(!h.app.engine().device().is_playing());
}

#[tokio::test]
async fn list_marks_current_track() {
    let mut h = Harness::new().await;
    let lines = h.send("list").await;

    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with('>'));
    assert!(lines[0].contains("Neon Rain"));
    assert!(lines[1].starts_with(' '));
    assert!(lines[1].contains("Low Orbit"));
}

// ===== Transport =====

#[tokio::test]
async fn play_resumes_output_and_pause_stops() {
    let mut h = Harness::new().await;

    h.send("play").await;
    assert_eq!(h.app.engine().context().state(), ContextState::Running);
    assert!(h.app.engine().device().is_playing());

    // A second play is not a toggle
    h.send("play").await;
    assert!(h.app.engine().device().is_playing());

    h.send("pause").await;
    assert!(!h.app.engine().device().is_playing());
    assert!(h.app.status_line().starts_with("[READY]"));
}

#[tokio::test]
async fn select_announces_and_plays_track() {
    let mut h = Harness::new().await;
    let lines = h.send("select 2").await;

    assert!(lines.iter().any(|l| l == "now: Low Orbit - Grid Runner"), "{lines:?}");
    assert_eq!(h.app.engine().coordinator().transport().current_index, 1);
    assert!(h.app.engine().device().is_playing());
}

#[tokio::test]
async fn out_of_range_select_changes_nothing() {
    let mut h = Harness::new().await;
    h.send("select 9").await;

    assert_eq!(h.app.engine().coordinator().transport().current_index, 0);
    assert!(!h.app.engine().device().is_playing());
}

#[tokio::test]
async fn visualizer_frames_only_while_playing() {
    let mut h = Harness::new().await;
    assert!(h.app.visualizer_frame().is_none());

    let lines = h.send("vis").await;
    assert!(lines.contains(&"visualizer on".to_string()));
    assert!(h.app.visualizer_frame().is_none());

    h.send("play").await;
    let frame = h.app.visualizer_frame().unwrap();
    assert!(frame.starts_with('|') && frame.ends_with('|'));
}

#[tokio::test]
async fn visualizer_style_switches_to_waveform() {
    let mut h = Harness::new().await;
    assert_eq!(h.app.visualizer_style(), VisualizerStyle::Spectrum);
    h.send("vis").await;
    h.send("play").await;

    let lines = h.send("vis style").await;
    assert_eq!(lines, vec!["visualizer style waveform".to_string()]);

    let frame = h.app.visualizer_frame().unwrap();
    let body = frame.trim_matches('|');
    assert_eq!(body.chars().count(), 64);
    assert!(body.chars().all(|c| "_.-'\"".contains(c)), "{frame}");

    h.send("vis style").await;
    assert_eq!(h.app.visualizer_style(), VisualizerStyle::Spectrum);
}

#[tokio::test]
async fn end_of_replaced_track_does_not_skip_again() {
    let mut h = Harness::new().await;
    h.send("play").await;

    // Render past the end of the first track without delivering its events
    let mut buffer = vec![0.0; 2 * (RATE as usize + 1024)];
    h.app.engine().device().renderer().render(&mut buffer);
    assert!(!h.app.engine().device().is_playing());

    // Skipping delivers the queued time updates and end-of-track afterwards
    let lines = h.send("next").await;

    assert_eq!(lines, vec!["now: Low Orbit - Grid Runner".to_string()]);
    assert_eq!(h.app.engine().coordinator().transport().current_index, 1);
    assert!(h.app.engine().device().is_playing());
    assert!(h.app.status_line().contains("2/2 Low Orbit"));
}

// ===== Library =====

#[tokio::test]
async fn import_then_delete_local_track() {
    let mut h = Harness::new().await;
    let path = h.wav("night_drive.wav");

    let lines = h.send(&format!("import {}", path.display())).await;
    assert!(lines[0].starts_with("imported"), "{lines:?}");
    assert!(lines.iter().any(|l| l.starts_with("storage:")));
    assert_eq!(h.app.engine().coordinator().playlist().len(), 3);
    assert!(h.app.library().used_bytes() > 0);

    h.send("select 3").await;
    let lines = h.send("delete").await;
    assert_eq!(lines[0], "deleted night_drive");
    assert_eq!(h.app.engine().coordinator().playlist().len(), 2);
    assert_eq!(h.app.library().used_bytes(), 0);
}

#[tokio::test]
async fn import_of_missing_file_reports_error() {
    let mut h = Harness::new().await;
    let lines = h.send("import /nonexistent/track.mp3").await;

    assert!(lines[0].starts_with("!! Cannot read"), "{lines:?}");
    assert_eq!(h.app.engine().coordinator().playlist().len(), 2);
}

#[tokio::test]
async fn tier_toggle_is_announced() {
    let mut h = Harness::new().await;
    let lines = h.send("tier").await;

    assert_eq!(lines, vec![">>> Storage tier: 1GB".to_string()]);
    assert!(h.app.status_line().contains("/1GB"));
}

// ===== Settings =====

#[tokio::test]
async fn eq_preset_is_persisted() {
    let mut h = Harness::new().await;
    let lines = h.send("eq preset bass++").await;
    assert!(lines[0].starts_with("preset BASS++ eq off"), "{lines:?}");

    let saved = h.store.load_equalizer().await.unwrap();
    assert_eq!(saved.gains, EqPreset::BassBoost.gains());
    assert!(!saved.enabled);

    h.send("eq on").await;
    assert!(h.store.load_equalizer().await.unwrap().enabled);
}

#[tokio::test]
async fn invalid_eq_band_is_reported() {
    let mut h = Harness::new().await;
    let response = h
        .app
        .handle(Input::EqSet {
            band: 10,
            gain: 3.0,
        })
        .await;
    assert!(response.lines[0].starts_with("!!"));
}

#[tokio::test]
async fn theme_cycles_and_persists() {
    let mut h = Harness::new().await;
    h.send("theme").await;
    let lines = h.send("theme").await;

    assert_eq!(lines, vec!["theme 3/8".to_string()]);
    assert_eq!(h.app.theme_index(), 2);
    assert_eq!(h.store.load_theme_index().await.unwrap(), 2);
}

#[tokio::test]
async fn settings_write_failures_keep_session_alive() {
    let mut h = Harness::new().await;
    h.store.set_unavailable(true);

    let lines = h.send("eq on").await;
    assert!(lines[0].starts_with("!! Failed to save equalizer"), "{lines:?}");
    assert!(!h.app.engine().equalizer().is_enabled());

    let lines = h.send("eq preset cyber").await;
    assert!(lines[0].starts_with("!! Failed to save equalizer"), "{lines:?}");
    assert_eq!(h.app.engine().equalizer().gains(), [0.0; 10]);

    let lines = h.send("theme").await;
    assert!(lines[0].starts_with("!! Failed to save theme"), "{lines:?}");
    assert_eq!(h.app.theme_index(), 0);

    // Once the store is back the same commands succeed
    h.store.set_unavailable(false);
    assert!(h.send("eq on").await[0].starts_with("eq on"));
    assert_eq!(h.send("theme").await, vec!["theme 2/8".to_string()]);
}

#[tokio::test]
async fn volume_and_mute() {
    let mut h = Harness::new().await;
    assert_eq!(h.send("volume 40").await, vec!["volume 40%".to_string()]);
    assert_eq!(h.app.engine().volume().level(), 40);

    assert_eq!(h.send("mute").await, vec!["muted".to_string()]);
    assert_eq!(h.send("mute").await, vec!["unmuted".to_string()]);
}

#[tokio::test]
async fn shutdown_closes_the_output() {
    let mut h = Harness::new().await;
    h.send("play").await;

    h.app.shutdown();

    assert_eq!(h.app.engine().context().state(), ContextState::Closed);
    assert!(!h.app.engine().device().is_playing());
    assert_eq!(h.app.engine().device().duration(), None);
}

#[tokio::test]
async fn quit_ends_session() {
    let mut h = Harness::new().await;
    let response = h.app.handle(Input::Quit).await;
    assert!(response.quit);
}
