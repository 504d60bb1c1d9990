//! The owned audio engine
//!
//! One value holds the device, the audio context, the signal chain, the
//! coordinator and the equalizer. It is built once at startup; the chain is
//! bound to the device in the constructor and never rebuilt.
//!
//! ```text
//! Action ──> Coordinator ──> [Command] ──> execute ──> Device / Context
//!                 ^                              │
//!                 └──── play result ─────────────┘
//! SourceEvent ──> generation check ──> Coordinator ──> [Command] ──> execute
//! ```
//!
//! Events from the device channel arrive stamped with the load they belong
//! to. Anything stamped with an older generation describes a source the
//! device has already dropped and is discarded before the coordinator sees
//! it.

use crate::coordinator::Coordinator;
use crate::equalizer::EqualizerState;
use crate::error::Result;
use crate::events::{Action, Command, PlayerEvent};
use crate::playlist::Playlist;
use crate::volume::Volume;
use cyber_audio::{AnalyserHandle, EqPreset, SignalChain};
use cyber_core::{
    AudioContext, ContextState, DeviceEvent, PlaybackDevice, SourceEvent, Track, EQ_BAND_COUNT,
};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

pub struct AudioEngine<D, X>
where
    D: PlaybackDevice,
    X: AudioContext,
{
    device: D,
    context: X,
    chain: SignalChain,
    coordinator: Coordinator,
    equalizer: EqualizerState,
    volume: Volume,
}

impl<D, X> AudioEngine<D, X>
where
    D: PlaybackDevice,
    X: AudioContext,
{
    /// Bind a fresh signal chain to `device` and apply the equalizer
    pub fn new(mut device: D, context: X, coordinator: Coordinator, equalizer: EqualizerState) -> Self {
        let chain = SignalChain::build(&mut device);
        equalizer.sync(&chain);

        let volume = Volume::default();
        chain.set_master_gain(volume.gain());

        Self {
            device,
            context,
            chain,
            coordinator,
            equalizer,
            volume,
        }
    }

    // ===== Accessors =====

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn context(&self) -> &X {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut X {
        &mut self.context
    }

    pub fn chain(&self) -> &SignalChain {
        &self.chain
    }

    pub fn equalizer(&self) -> &EqualizerState {
        &self.equalizer
    }

    pub fn volume(&self) -> Volume {
        self.volume
    }

    /// Visualizer view, `None` when the chain could not be bound
    pub fn analyser(&self) -> Option<AnalyserHandle> {
        self.chain.analyser()
    }

    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        self.coordinator.drain_events()
    }

    // ===== Transport =====

    pub fn dispatch(&mut self, action: Action) {
        let commands = self.coordinator.dispatch(action);
        self.execute(commands);
    }

    pub fn handle_device_event(&mut self, event: DeviceEvent) {
        let commands = self.coordinator.handle_device_event(event);
        self.execute(commands);
    }

    /// Deliver a queued device event unless its source was replaced
    ///
    /// Returns whether the event reached the coordinator.
    pub fn handle_source_event(&mut self, event: SourceEvent) -> bool {
        let current = self.device.source_generation();
        if event.generation != current {
            debug!(
                event_generation = event.generation,
                current_generation = current,
                "Dropping stale device event {:?}",
                event.event
            );
            return false;
        }
        self.handle_device_event(event.event);
        true
    }

    pub fn replace_playlist(&mut self, playlist: Playlist) {
        let commands = self.coordinator.replace_playlist(playlist);
        self.execute(commands);
    }

    pub fn append_tracks(&mut self, tracks: Vec<Track>) {
        let commands = self.coordinator.append_tracks(tracks);
        self.execute(commands);
    }

    /// Remove a track; its local blob is released once the device lets go
    pub fn remove_at(&mut self, index: usize) -> Option<Track> {
        let (track, commands) = self.coordinator.remove_at(index);
        self.execute(commands);
        track
    }

    /// Apply commands in order, feeding play results back
    pub fn execute(&mut self, commands: Vec<Command>) {
        let mut queue: VecDeque<Command> = commands.into();
        while let Some(command) = queue.pop_front() {
            match command {
                Command::EnsureContextRunning => self.ensure_context_running(),
                Command::Load { track_id, source } => {
                    debug!("Device load {}", track_id);
                    self.chain.reset();
                    self.device.load(&source);
                }
                Command::Play(id) => {
                    let result = self.device.play();
                    let follow_up = self.coordinator.handle_play_result(id, result);
                    for command in follow_up.into_iter().rev() {
                        queue.push_front(command);
                    }
                }
                Command::Pause => self.device.pause(),
                Command::Seek(seconds) => self.device.seek(seconds),
                Command::Unload => self.device.unload(),
            }
        }
    }

    /// Stop the device and close the audio context
    ///
    /// The engine stays usable for reads; transport commands after this
    /// leave the context closed.
    pub fn shutdown(&mut self) {
        self.device.pause();
        self.device.unload();
        self.context.close();
        info!("Audio engine shut down");
    }

    fn ensure_context_running(&mut self) {
        match self.context.state() {
            ContextState::Running => {}
            ContextState::Suspended => {
                debug!("Resuming suspended audio context");
                if let Err(e) = self.context.resume() {
                    warn!("Failed to resume audio context: {}", e);
                }
            }
            ContextState::Closed => warn!("Audio context is closed"),
        }
    }

    // ===== Equalizer =====

    pub async fn set_eq_gain(&mut self, band: usize, value: f32) -> Result<()> {
        self.equalizer.set_gain(&self.chain, band, value).await
    }

    pub async fn set_eq_enabled(&mut self, enabled: bool) -> Result<()> {
        self.equalizer.set_enabled(&self.chain, enabled).await
    }

    pub async fn apply_eq_preset(&mut self, gains: [f32; EQ_BAND_COUNT]) -> Result<()> {
        self.equalizer.apply_preset(&self.chain, gains).await
    }

    pub async fn apply_named_preset(&mut self, preset: EqPreset) -> Result<()> {
        self.equalizer.apply_named_preset(&self.chain, preset).await
    }

    // ===== Volume =====

    pub fn set_volume(&mut self, level: u8) {
        self.volume.set_level(level);
        self.chain.set_master_gain(self.volume.gain());
    }

    pub fn toggle_mute(&mut self) {
        self.volume.toggle_mute();
        self.chain.set_master_gain(self.volume.gain());
    }
}
