//! Ten-band peaking equalizer
//!
//! Each band is an RBJ peaking biquad at a fixed center frequency. Gain
//! changes never jump: every band ramps toward its target and refreshes its
//! coefficients once per block while moving.

use super::ramp::{GainRamp, RAMP_BLOCK_FRAMES};
use super::AudioEffect;
use cyber_core::{EQ_BAND_COUNT, EQ_FREQUENCIES, EQ_MAX_GAIN_DB, EQ_MIN_GAIN_DB, EQ_Q};
use std::f32::consts::PI;

/// Snap distance for band gain ramps, in dB
const GAIN_EPSILON_DB: f32 = 1e-3;

/// Gains below this are treated as flat
const FLAT_THRESHOLD_DB: f32 = 0.01;

/// Named equalizer presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EqPreset {
    /// All bands at 0 dB
    #[default]
    Flat,
    Cyber,
    BassBoost,
    Vocal,
}

impl EqPreset {
    pub const ALL: [EqPreset; 4] = [Self::Flat, Self::Cyber, Self::BassBoost, Self::Vocal];

    /// Gain values for this preset
    pub fn gains(&self) -> [f32; EQ_BAND_COUNT] {
        match self {
            Self::Flat => [0.0; EQ_BAND_COUNT],
            Self::Cyber => [4.0, 3.0, 2.0, 0.0, -1.0, -1.0, 0.0, 2.0, 4.0, 5.0],
            Self::BassBoost => [6.0, 5.0, 4.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            Self::Vocal => [-2.0, -2.0, -1.0, 1.0, 4.0, 4.0, 2.0, 1.0, 0.0, -1.0],
        }
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Flat => "FLAT",
            Self::Cyber => "CYBER",
            Self::BassBoost => "BASS++",
            Self::Vocal => "VOCAL",
        }
    }

    /// Look up a preset by display name, ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
            .or_else(|| match name.to_ascii_lowercase().as_str() {
                "bass" | "bassboost" | "bass-boost" => Some(Self::BassBoost),
                _ => None,
            })
    }
}

/// Normalized biquad coefficients
#[derive(Debug, Clone, Copy, PartialEq)]
struct Coefficients {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
}

impl Coefficients {
    const IDENTITY: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    fn peaking(frequency: f32, q: f32, gain_db: f32, sample_rate: f32) -> Self {
        if sample_rate < 1.0 || gain_db.abs() < FLAT_THRESHOLD_DB {
            return Self::IDENTITY;
        }

        let a = 10.0_f32.powf(gain_db / 40.0);
        // Keep the center well below Nyquist for low output rates
        let clamped_freq = frequency.min(sample_rate * 0.45);
        let omega = 2.0 * PI * clamped_freq / sample_rate;
        let sin_omega = omega.sin();
        let cos_omega = omega.cos();
        let alpha = sin_omega / (2.0 * q);

        let b0 = 1.0 + alpha * a;
        let b1 = -2.0 * cos_omega;
        let b2 = 1.0 - alpha * a;
        let a0 = 1.0 + alpha / a;
        let a1 = -2.0 * cos_omega;
        let a2 = 1.0 - alpha / a;

        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ChannelState {
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl ChannelState {
    #[inline]
    fn tick(&mut self, c: &Coefficients, input: f32) -> f32 {
        let mut out =
            c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2;

        // Flush denormals
        if out.abs() < 1e-15 {
            out = 0.0;
        }

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = out;
        out
    }
}

/// One peaking filter band with a smoothed gain
#[derive(Debug, Clone)]
pub struct PeakingBand {
    frequency: f32,
    q: f32,
    ramp: GainRamp,
    coeffs: Coefficients,
    left: ChannelState,
    right: ChannelState,
    sample_rate: u32,
    needs_update: bool,
}

impl PeakingBand {
    pub fn new(frequency: f32, q: f32) -> Self {
        Self {
            frequency,
            q,
            ramp: GainRamp::new(0.0, GAIN_EPSILON_DB),
            coeffs: Coefficients::IDENTITY,
            left: ChannelState::default(),
            right: ChannelState::default(),
            sample_rate: 0,
            needs_update: true,
        }
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Set the gain this band ramps toward, clamped to [-12, 12] dB
    ///
    /// Non-finite values are ignored.
    pub fn set_target_gain(&mut self, gain_db: f32) {
        if gain_db.is_finite() {
            self.ramp
                .set_target(gain_db.clamp(EQ_MIN_GAIN_DB, EQ_MAX_GAIN_DB));
        }
    }

    pub fn target_gain(&self) -> f32 {
        self.ramp.target()
    }

    /// Gain currently applied to the signal
    pub fn current_gain(&self) -> f32 {
        self.ramp.current()
    }

    pub fn is_settled(&self) -> bool {
        self.ramp.is_settled()
    }

    fn refresh(&mut self) {
        self.coeffs = Coefficients::peaking(
            self.frequency,
            self.q,
            self.ramp.current(),
            self.sample_rate as f32,
        );
        self.needs_update = false;
    }

    fn process_block(&mut self, block: &mut [f32]) {
        let frames = block.len() / 2;
        if self.ramp.advance(frames, self.sample_rate) || self.needs_update {
            self.refresh();
        }

        let c = self.coeffs;
        for frame in block.chunks_exact_mut(2) {
            frame[0] = self.left.tick(&c, frame[0]);
            frame[1] = self.right.tick(&c, frame[1]);
        }
    }
}

impl AudioEffect for PeakingBand {
    fn process(&mut self, buffer: &mut [f32], sample_rate: u32) {
        if self.sample_rate != sample_rate {
            self.sample_rate = sample_rate;
            self.reset();
            self.needs_update = true;
        }

        for block in buffer.chunks_mut(RAMP_BLOCK_FRAMES * 2) {
            self.process_block(block);
        }
    }

    fn reset(&mut self) {
        self.left = ChannelState::default();
        self.right = ChannelState::default();
    }

    fn name(&self) -> &str {
        "Peaking Band"
    }
}

/// The fixed bank of ten bands, processed in series
#[derive(Debug, Clone)]
pub struct PeakingEq {
    bands: Vec<PeakingBand>,
}

impl PeakingEq {
    pub fn new() -> Self {
        Self {
            bands: EQ_FREQUENCIES
                .iter()
                .map(|&freq| PeakingBand::new(freq, EQ_Q))
                .collect(),
        }
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    pub fn band(&self, index: usize) -> Option<&PeakingBand> {
        self.bands.get(index)
    }

    /// Ramp a single band toward `gain_db`
    ///
    /// Returns `false` if the band does not exist.
    pub fn set_band_target(&mut self, index: usize, gain_db: f32) -> bool {
        match self.bands.get_mut(index) {
            Some(band) => {
                band.set_target_gain(gain_db);
                true
            }
            None => false,
        }
    }

    /// Ramp every band toward the given gains
    pub fn set_targets(&mut self, gains: [f32; EQ_BAND_COUNT]) {
        for (band, gain) in self.bands.iter_mut().zip(gains) {
            band.set_target_gain(gain);
        }
    }

    pub fn target_gains(&self) -> [f32; EQ_BAND_COUNT] {
        let mut gains = [0.0; EQ_BAND_COUNT];
        for (slot, band) in gains.iter_mut().zip(&self.bands) {
            *slot = band.target_gain();
        }
        gains
    }

    pub fn current_gains(&self) -> [f32; EQ_BAND_COUNT] {
        let mut gains = [0.0; EQ_BAND_COUNT];
        for (slot, band) in gains.iter_mut().zip(&self.bands) {
            *slot = band.current_gain();
        }
        gains
    }

    pub fn is_settled(&self) -> bool {
        self.bands.iter().all(PeakingBand::is_settled)
    }
}

impl Default for PeakingEq {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioEffect for PeakingEq {
    fn process(&mut self, buffer: &mut [f32], sample_rate: u32) {
        for band in &mut self.bands {
            band.process(buffer, sample_rate);
        }
    }

    fn reset(&mut self) {
        for band in &mut self.bands {
            band.reset();
        }
    }

    fn name(&self) -> &str {
        "10-Band Peaking EQ"
    }
}
