//! The fixed processing graph
//!
//! `source -> band[0..9] -> analyser -> gain -> output`
//!
//! The chain is built once and bound to exactly one playback device. Control
//! methods only move ramp targets; the audio path applies them block by
//! block.

use crate::analyser::{AnalyserHandle, AnalyserNode};
use crate::effects::{AudioEffect, MasterGain, PeakingEq};
use cyber_core::{AttachError, PlaybackDevice, SignalProcessor, EQ_BAND_COUNT};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

struct ChainGraph {
    eq: PeakingEq,
    analyser: AnalyserNode,
    gain: MasterGain,
}

impl ChainGraph {
    fn new() -> Self {
        Self {
            eq: PeakingEq::new(),
            analyser: AnalyserNode::new(),
            gain: MasterGain::default(),
        }
    }

    fn stages(&mut self) -> [&mut dyn AudioEffect; 3] {
        [&mut self.eq, &mut self.analyser, &mut self.gain]
    }
}

/// Processor handed to the playback device
struct ChainProcessor {
    graph: Arc<Mutex<ChainGraph>>,
}

impl SignalProcessor for ChainProcessor {
    fn process(&self, buffer: &mut [f32], sample_rate: u32) {
        let mut graph = self.graph.lock().unwrap_or_else(PoisonError::into_inner);
        for stage in graph.stages() {
            stage.process(buffer, sample_rate);
        }
    }
}

/// Equalizer, analyser, and master gain bound to one device
pub struct SignalChain {
    graph: Arc<Mutex<ChainGraph>>,
    analyser: AnalyserHandle,
    connected: bool,
}

impl SignalChain {
    /// Create a detached chain
    pub fn new() -> Self {
        let graph = ChainGraph::new();
        let analyser = graph.analyser.handle();
        Self {
            graph: Arc::new(Mutex::new(graph)),
            analyser,
            connected: false,
        }
    }

    /// Build the chain and bind it to `device`
    ///
    /// A device that already carries a processor leaves the chain detached
    /// with a warning; playback still works, just without the chain.
    pub fn build(device: &mut dyn PlaybackDevice) -> Self {
        let mut chain = Self::new();
        chain.connect(device);
        chain
    }

    /// Bind to `device`; returns whether the chain is now connected
    pub fn connect(&mut self, device: &mut dyn PlaybackDevice) -> bool {
        if self.connected {
            warn!("Signal chain already connected, ignoring rebind");
            return true;
        }

        match device.attach_processor(self.processor()) {
            Ok(()) => {
                debug!("Signal chain attached to playback device");
                self.connected = true;
            }
            Err(AttachError::AlreadyAttached) => {
                warn!("Playback device already has a signal chain, leaving this one detached");
            }
        }
        self.connected
    }

    /// Processor view of the chain, for devices and tests
    pub fn processor(&self) -> Arc<dyn SignalProcessor> {
        Arc::new(ChainProcessor {
            graph: Arc::clone(&self.graph),
        })
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    fn graph(&self) -> MutexGuard<'_, ChainGraph> {
        self.graph.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ramp every band toward `gains` (dB)
    pub fn set_band_gains(&self, gains: [f32; EQ_BAND_COUNT]) {
        self.graph().eq.set_targets(gains);
    }

    /// Ramp one band toward `gain_db`
    pub fn set_band_gain(&self, band: usize, gain_db: f32) -> bool {
        self.graph().eq.set_band_target(band, gain_db)
    }

    /// Gains the bands are ramping toward
    pub fn band_target_gains(&self) -> [f32; EQ_BAND_COUNT] {
        self.graph().eq.target_gains()
    }

    /// Gains currently applied
    pub fn band_current_gains(&self) -> [f32; EQ_BAND_COUNT] {
        self.graph().eq.current_gains()
    }

    /// Ramp the master gain toward a linear multiplier
    pub fn set_master_gain(&self, gain: f32) {
        self.graph().gain.set_target(gain);
    }

    pub fn master_gain(&self) -> f32 {
        self.graph().gain.target()
    }

    /// Whether every ramp has reached its target
    pub fn is_settled(&self) -> bool {
        self.graph().eq.is_settled()
    }

    /// Clear filter history, e.g. after a new source is loaded
    pub fn reset(&self) {
        let mut graph = self.graph();
        for stage in graph.stages() {
            stage.reset();
        }
    }

    /// Visualizer view; `None` while the chain is detached
    pub fn analyser(&self) -> Option<AnalyserHandle> {
        self.connected.then(|| self.analyser.clone())
    }
}

impl Default for SignalChain {
    fn default() -> Self {
        Self::new()
    }
}
