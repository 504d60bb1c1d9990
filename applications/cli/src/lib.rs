//! Cyber Tunes terminal player
//!
//! Wires storage, the decoding device and an audio output into an
//! [`App`] and drives it from stdin.

pub mod app;
pub mod config;
pub mod error;
pub mod input;
pub mod visualizer;

pub use app::{App, Response};
pub use config::AppConfig;
pub use error::{AppError, Result};

use cyber_audio_desktop::DecodedDevice;
use cyber_core::{AudioContext, SettingsStore, SourceEvent, TrackStore};
use cyber_playback::{AudioEngine, Coordinator, EqualizerState};
use cyber_storage::{MemoryStore, SqliteStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};

/// How often the visualizer line is redrawn
const VISUALIZER_PERIOD: Duration = Duration::from_millis(250);

/// Track and settings stores selected by configuration
pub struct Stores {
    pub tracks: Arc<dyn TrackStore>,
    pub settings: Arc<dyn SettingsStore>,
}

/// Open the configured stores, running migrations for SQLite
pub async fn open_stores(config: &AppConfig) -> Result<Stores> {
    if config.storage.in_memory {
        info!("Using in-memory storage");
        let store = Arc::new(MemoryStore::new());
        return Ok(Stores {
            tracks: store.clone(),
            settings: store,
        });
    }

    if let Some(parent) = sqlite_parent_dir(&config.storage.database_url) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let pool = cyber_storage::create_pool(&config.storage.database_url).await?;
    cyber_storage::run_migrations(&pool).await?;
    info!(url = %config.storage.database_url, "Database ready");

    let store = Arc::new(SqliteStore::new(pool));
    Ok(Stores {
        tracks: store.clone(),
        settings: store,
    })
}

fn sqlite_parent_dir(url: &str) -> Option<&std::path::Path> {
    let path = url.strip_prefix("sqlite://").or_else(|| url.strip_prefix("sqlite:"))?;
    if path.contains(":memory:") {
        return None;
    }
    let path = path.split('?').next()?;
    std::path::Path::new(path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
}

/// Build the player around a decoding device and the given output
pub async fn build_app<X, F>(
    config: &AppConfig,
    stores: Stores,
    output_rate: u32,
    make_output: F,
) -> Result<(App<DecodedDevice, X>, UnboundedReceiver<SourceEvent>)>
where
    X: AudioContext,
    F: FnOnce(cyber_audio_desktop::DeviceRenderer) -> Result<X>,
{
    let (device, events) = DecodedDevice::new(output_rate);
    let output = make_output(device.renderer())?;
    let equalizer = EqualizerState::load(stores.settings.clone()).await;
    let engine = AudioEngine::new(device, output, Coordinator::new(), equalizer);

    let mut app = App::start(
        engine,
        stores.tracks,
        stores.settings,
        config.initial_tier(),
        &config.catalog,
        config.ui.theme_count,
    )
    .await;
    app.set_visualizer_style(config.ui.visualizer_style);
    info!(
        tracks = app.engine().coordinator().playlist().len(),
        tier = %app.library().tier(),
        "Player ready"
    );
    Ok((app, events))
}

/// Run the interactive player until `quit` or end of input
pub async fn run(config: AppConfig) -> Result<()> {
    let stores = open_stores(&config).await?;

    #[cfg(feature = "cpal-output")]
    let (app, events) = {
        let rate = cyber_audio_desktop::CpalOutput::default_sample_rate()?;
        let start_suspended = config.audio.start_suspended;
        build_app(&config, stores, rate, |renderer| {
            Ok(cyber_audio_desktop::CpalOutput::new(renderer, start_suspended)?)
        })
        .await?
    };

    #[cfg(not(feature = "cpal-output"))]
    let (app, events) = {
        let start_suspended = config.audio.start_suspended;
        build_app(&config, stores, config.audio.output_sample_rate, |renderer| {
            Ok(cyber_audio_desktop::NullOutput::new(renderer, start_suspended)?)
        })
        .await?
    };

    drive(app, events).await
}

/// Run the session, then stop the output whichever way it ended
async fn drive<X: AudioContext>(
    mut app: App<DecodedDevice, X>,
    mut events: UnboundedReceiver<SourceEvent>,
) -> Result<()> {
    let outcome = session(&mut app, &mut events).await;
    info!("Shutting down");
    app.shutdown();
    outcome
}

async fn session<X: AudioContext>(
    app: &mut App<DecodedDevice, X>,
    events: &mut UnboundedReceiver<SourceEvent>,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(VISUALIZER_PERIOD);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    println!("{}", app.status_line());
    println!("type 'help' for commands");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("Input closed");
                    break;
                };
                match input::parse(&line) {
                    Ok(Some(command)) => {
                        let response = app.handle(command).await;
                        print_lines(&response.lines);
                        if response.quit {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => println!("{e}"),
                }
            }
            event = events.recv() => {
                let Some(event) = event else {
                    warn!("Device event stream closed");
                    break;
                };
                print_lines(&app.handle_device_event(event));
            }
            _ = ticker.tick() => {
                if let Some(frame) = app.visualizer_frame() {
                    println!("{frame}");
                }
            }
        }
    }
    Ok(())
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}
