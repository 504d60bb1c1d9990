//! Spectrum and waveform analyser
//!
//! The analyser stage copies a mono mix of everything that passes through it
//! into a ring buffer. Visualizers read byte-scaled snapshots through an
//! [`AnalyserHandle`] without touching the audio path.

use crate::effects::AudioEffect;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::{Arc, Mutex, PoisonError};

/// Analysis window in samples
pub const FFT_SIZE: usize = 256;

/// Number of frequency bins (and time-domain bytes) exposed
pub const BIN_COUNT: usize = FFT_SIZE / 2;

/// Weight of the previous spectrum when smoothing
pub const SMOOTHING: f32 = 0.8;

/// dB mapped to byte 0
pub const MIN_DECIBELS: f32 = -100.0;

/// dB mapped to byte 255
pub const MAX_DECIBELS: f32 = -30.0;

struct AnalyserState {
    ring: Vec<f32>,
    write_pos: usize,
    smoothed: Vec<f32>,
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl AnalyserState {
    fn new() -> Self {
        let fft = FftPlanner::<f32>::new().plan_fft_forward(FFT_SIZE);
        Self {
            ring: vec![0.0; FFT_SIZE],
            write_pos: 0,
            smoothed: vec![0.0; BIN_COUNT],
            window: blackman_window(FFT_SIZE),
            fft,
            scratch: vec![Complex::new(0.0, 0.0); FFT_SIZE],
        }
    }

    fn push(&mut self, sample: f32) {
        self.ring[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % FFT_SIZE;
    }

    /// Sample `i` of the window, oldest first
    fn ordered(&self, i: usize) -> f32 {
        self.ring[(self.write_pos + i) % FFT_SIZE]
    }

    fn frequency_bytes(&mut self) -> [u8; BIN_COUNT] {
        for i in 0..FFT_SIZE {
            self.scratch[i] = Complex::new(self.ordered(i) * self.window[i], 0.0);
        }
        self.fft.process(&mut self.scratch);

        let mut out = [0u8; BIN_COUNT];
        let range = MAX_DECIBELS - MIN_DECIBELS;
        for (k, byte) in out.iter_mut().enumerate() {
            let magnitude = self.scratch[k].norm() / FFT_SIZE as f32;
            let smoothed = SMOOTHING * self.smoothed[k] + (1.0 - SMOOTHING) * magnitude;
            self.smoothed[k] = smoothed;

            if smoothed <= 0.0 {
                continue;
            }
            let db = 20.0 * smoothed.log10();
            let scaled = 255.0 * (db - MIN_DECIBELS) / range;
            *byte = scaled.clamp(0.0, 255.0) as u8;
        }
        out
    }

    fn time_domain_bytes(&self) -> [u8; BIN_COUNT] {
        let mut out = [0u8; BIN_COUNT];
        let offset = FFT_SIZE - BIN_COUNT;
        for (i, byte) in out.iter_mut().enumerate() {
            let x = self.ordered(offset + i);
            *byte = (128.0 * (1.0 + x)).clamp(0.0, 255.0) as u8;
        }
        out
    }
}

fn blackman_window(size: usize) -> Vec<f32> {
    const A0: f32 = 0.42;
    const A1: f32 = 0.5;
    const A2: f32 = 0.08;
    (0..size)
        .map(|n| {
            let x = n as f32 / size as f32;
            A0 - A1 * (2.0 * PI * x).cos() + A2 * (4.0 * PI * x).cos()
        })
        .collect()
}

/// Analyser stage placed between the equalizer and the master gain
pub struct AnalyserNode {
    shared: Arc<Mutex<AnalyserState>>,
}

impl AnalyserNode {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Mutex::new(AnalyserState::new())),
        }
    }

    /// Read-only view for visualizers
    pub fn handle(&self) -> AnalyserHandle {
        AnalyserHandle {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl Default for AnalyserNode {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioEffect for AnalyserNode {
    fn process(&mut self, buffer: &mut [f32], _sample_rate: u32) {
        let mut state = self.shared.lock().unwrap_or_else(PoisonError::into_inner);
        for frame in buffer.chunks_exact(2) {
            state.push(0.5 * (frame[0] + frame[1]));
        }
    }

    fn reset(&mut self) {
        let mut state = self.shared.lock().unwrap_or_else(PoisonError::into_inner);
        state.ring.fill(0.0);
        state.smoothed.fill(0.0);
    }

    fn name(&self) -> &str {
        "Analyser"
    }
}

/// Shared read access to the analyser buffers
#[derive(Clone)]
pub struct AnalyserHandle {
    shared: Arc<Mutex<AnalyserState>>,
}

impl AnalyserHandle {
    /// Smoothed spectrum, -100..-30 dB mapped onto 0..255
    ///
    /// Each call folds the current window into the smoothed spectrum, so
    /// polling once per frame matches the intended decay.
    pub fn frequency_bytes(&self) -> [u8; BIN_COUNT] {
        self.shared
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .frequency_bytes()
    }

    /// Latest 128 samples, `128 * (1 + x)` clamped to a byte
    pub fn time_domain_bytes(&self) -> [u8; BIN_COUNT] {
        self.shared
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .time_domain_bytes()
    }
}

impl std::fmt::Debug for AnalyserHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyserHandle").finish_non_exhaustive()
    }
}
