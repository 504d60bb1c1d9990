//! Cyber Tunes - Playback Coordination
//!
//! This crate provides:
//! - `Coordinator`: pure reducer from user actions and device events to
//!   device commands (play modes, navigation, seek, reconciliation)
//! - `Playlist`: static catalog followed by imported tracks, unique ids
//! - `EqualizerState`: persisted 10-band gains with bypass
//! - `AudioEngine`: owns device, context, signal chain and coordinator, and
//!   executes commands in order
//! - `Library`: import and delete against the track store with tier quotas
//! - Keyboard bindings and master volume
//!
//! # Architecture
//!
//! `cyber-playback` never talks to an output directly. The device and audio
//! context come in through the `PlaybackDevice` and `AudioContext` traits from
//! `cyber-core`, and storage through `TrackStore` / `SettingsStore`.
//!
//! # Example: Navigation
//!
//! ```rust
//! use cyber_core::Track;
//! use cyber_playback::{Command, Coordinator, Direction, Playlist};
//!
//! let mut coordinator = Coordinator::with_seed(42);
//! let playlist = Playlist::new(
//!     vec![
//!         Track::catalog("a", "Neon Rain", "Grid", "neon.mp3", 120.0),
//!         Track::catalog("b", "Low Orbit", "Grid", "orbit.mp3", 90.0),
//!     ],
//!     vec![],
//! );
//!
//! // Loading the library loads the first track, paused
//! let commands = coordinator.replace_playlist(playlist);
//! assert!(matches!(commands[0], Command::Load { .. }));
//!
//! coordinator.advance(Direction::Forward, false);
//! assert_eq!(coordinator.transport().current_index, 1);
//! ```
//!
//! # Example: Play modes
//!
//! ```rust
//! use cyber_playback::PlayMode;
//!
//! let mode = PlayMode::Sequence.cycle();
//! assert_eq!(mode, PlayMode::Shuffle);
//! assert_eq!(mode.cycle(), PlayMode::RepeatOne);
//! ```

pub mod coordinator;
pub mod engine;
pub mod equalizer;
pub mod error;
pub mod events;
pub mod keyboard;
pub mod library;
pub mod navigation;
pub mod playlist;
pub mod types;
pub mod volume;

pub use coordinator::Coordinator;
pub use engine::AudioEngine;
pub use equalizer::EqualizerState;
pub use error::{PlayerError, Result};
pub use events::{Action, Command, Notice, PlayerEvent};
pub use keyboard::{action_for, Key, SEEK_STEP_SECONDS};
pub use library::Library;
pub use playlist::{DuplicateTrack, Playlist};
pub use types::{Direction, PlayMode, PlayRequestId, PlayerStatus, TransportState};
pub use volume::Volume;
