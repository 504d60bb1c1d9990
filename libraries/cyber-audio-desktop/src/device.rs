//! In-memory playback device
//!
//! `load` decodes the whole source on the calling thread, so a `play` issued
//! right after always sees the finished load. The output driver pulls frames
//! through a [`DeviceRenderer`], which also feeds the attached signal chain.

use cyber_audio::{decode_source, DecodedAudio};
use cyber_core::{
    AttachError, DeviceError, DeviceEvent, PlaybackDevice, PlaybackRejected, RejectCause,
    SignalProcessor, SourceEvent, SourceRef,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info};

/// Seconds of rendered audio between `TimeUpdate` events
pub const TIME_UPDATE_INTERVAL_SECS: f64 = 0.25;

struct LoadedSource {
    /// Keeps the playable handle alive until unload
    source: SourceRef,
    /// `None` when decoding failed
    audio: Option<Arc<DecodedAudio>>,
}

struct DeviceShared {
    processor: Option<Arc<dyn SignalProcessor>>,
    loaded: Option<LoadedSource>,
    playing: bool,
    position_frames: usize,
    frames_since_update: usize,
    output_rate: u32,
    generation: u64,
    events: UnboundedSender<SourceEvent>,
}

impl DeviceShared {
    fn emit(&self, event: DeviceEvent) {
        // Receiver gone means nobody is listening anymore
        let _ = self.events.send(SourceEvent {
            generation: self.generation,
            event,
        });
    }

    fn audio(&self) -> Option<&Arc<DecodedAudio>> {
        self.loaded.as_ref().and_then(|l| l.audio.as_ref())
    }

    fn total_frames(&self) -> usize {
        self.audio().map_or(0, |a| a.frames())
    }

    fn current_time(&self) -> f64 {
        if self.output_rate == 0 {
            return 0.0;
        }
        self.position_frames as f64 / f64::from(self.output_rate)
    }

    fn render(&mut self, out: &mut [f32]) {
        out.fill(0.0);

        if self.playing {
            if let Some(audio) = self.audio().cloned() {
                let start = self.position_frames * 2;
                let available = audio.samples.len().saturating_sub(start);
                let count = available.min(out.len() - out.len() % 2);
                out[..count].copy_from_slice(&audio.samples[start..start + count]);

                let frames = count / 2;
                self.position_frames += frames;
                self.frames_since_update += frames;

                let interval = (TIME_UPDATE_INTERVAL_SECS * f64::from(self.output_rate)) as usize;
                if self.frames_since_update >= interval.max(1) {
                    self.frames_since_update = 0;
                    self.emit(DeviceEvent::TimeUpdate(self.current_time()));
                }

                if self.position_frames >= audio.frames() {
                    self.playing = false;
                    self.frames_since_update = 0;
                    self.emit(DeviceEvent::TimeUpdate(self.current_time()));
                    self.emit(DeviceEvent::Ended);
                }
            }
        }

        if let Some(processor) = &self.processor {
            processor.process(out, self.output_rate);
        }
    }
}

/// Pull side of a [`DecodedDevice`], handed to the output driver
#[derive(Clone)]
pub struct DeviceRenderer {
    shared: Arc<Mutex<DeviceShared>>,
}

impl DeviceRenderer {
    /// Fill `out` (interleaved stereo) with the next frames
    ///
    /// Produces silence while paused or unloaded. The attached processor runs
    /// either way so analysers and ramps keep moving.
    pub fn render(&self, out: &mut [f32]) {
        self.shared
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .render(out);
    }

    pub fn sample_rate(&self) -> u32 {
        self.shared
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .output_rate
    }
}

/// Playback device that decodes sources into memory
pub struct DecodedDevice {
    shared: Arc<Mutex<DeviceShared>>,
}

impl DecodedDevice {
    /// Create a device rendering at `output_rate`, plus its event stream
    pub fn new(output_rate: u32) -> (Self, UnboundedReceiver<SourceEvent>) {
        let (events, rx) = unbounded_channel();
        let shared = DeviceShared {
            processor: None,
            loaded: None,
            playing: false,
            position_frames: 0,
            frames_since_update: 0,
            output_rate,
            generation: 0,
            events,
        };
        (
            Self {
                shared: Arc::new(Mutex::new(shared)),
            },
            rx,
        )
    }

    pub fn renderer(&self) -> DeviceRenderer {
        DeviceRenderer {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.lock().playing
    }

    fn lock(&self) -> MutexGuard<'_, DeviceShared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PlaybackDevice for DecodedDevice {
    fn attach_processor(&mut self, processor: Arc<dyn SignalProcessor>) -> Result<(), AttachError> {
        let mut shared = self.lock();
        if shared.processor.is_some() {
            return Err(AttachError::AlreadyAttached);
        }
        shared.processor = Some(processor);
        Ok(())
    }

    fn load(&mut self, source: &SourceRef) {
        let output_rate = self.lock().output_rate;

        // Decode outside the lock so rendering is not blocked
        let result = decode_source(source, output_rate);

        let mut shared = self.lock();
        shared.generation += 1;
        shared.playing = false;
        shared.position_frames = 0;
        shared.frames_since_update = 0;

        match result {
            Ok(audio) => {
                let duration = audio.duration_seconds();
                info!(
                    source = %source.describe(),
                    duration_secs = ?duration,
                    "Loaded source"
                );
                shared.loaded = Some(LoadedSource {
                    source: source.clone(),
                    audio: Some(Arc::new(audio)),
                });
                if let Some(d) = duration.filter(|d| d.is_finite()) {
                    shared.emit(DeviceEvent::DurationAvailable(d));
                }
            }
            Err(e) => {
                error!(source = %source.describe(), "Failed to load source: {e}");
                shared.loaded = Some(LoadedSource {
                    source: source.clone(),
                    audio: None,
                });
                shared.emit(DeviceEvent::Error(DeviceError::new(
                    e.device_kind(),
                    e.to_string(),
                )));
            }
        }
    }

    fn play(&mut self) -> Result<(), PlaybackRejected> {
        let mut shared = self.lock();
        let total = match &shared.loaded {
            None => return Err(PlaybackRejected::new(RejectCause::Other)),
            Some(LoadedSource { audio: None, .. }) => {
                return Err(PlaybackRejected::new(RejectCause::NotSupported))
            }
            Some(LoadedSource {
                audio: Some(audio), ..
            }) => audio.frames(),
        };

        // Playing a finished source starts it over
        if shared.position_frames >= total {
            shared.position_frames = 0;
        }
        shared.playing = true;
        debug!(position = shared.current_time(), "Device playing");
        Ok(())
    }

    fn pause(&mut self) {
        self.lock().playing = false;
    }

    fn seek(&mut self, seconds: f64) {
        let mut shared = self.lock();
        if shared.audio().is_none() || !seconds.is_finite() {
            return;
        }
        let total = shared.total_frames();
        let target = (seconds.max(0.0) * f64::from(shared.output_rate)) as usize;
        shared.position_frames = target.min(total);
        shared.frames_since_update = 0;
        let time = shared.current_time();
        shared.emit(DeviceEvent::TimeUpdate(time));
    }

    fn unload(&mut self) {
        let mut shared = self.lock();
        if let Some(loaded) = shared.loaded.take() {
            debug!(source = %loaded.source.describe(), "Unloaded source");
        }
        shared.generation += 1;
        shared.playing = false;
        shared.position_frames = 0;
        shared.frames_since_update = 0;
    }

    fn current_time(&self) -> f64 {
        self.lock().current_time()
    }

    fn duration(&self) -> Option<f64> {
        self.lock()
            .audio()
            .and_then(|a| a.duration_seconds())
            .filter(|d| d.is_finite())
    }

    fn source_generation(&self) -> u64 {
        self.lock().generation
    }
}
