//! Master gain stage

use super::ramp::{GainRamp, RAMP_BLOCK_FRAMES};
use super::AudioEffect;

const GAIN_EPSILON: f32 = 1e-4;

/// Linear output gain with a smoothed ramp
///
/// Within each block the multiplier is interpolated linearly between the
/// ramp values at the block edges.
#[derive(Debug, Clone)]
pub struct MasterGain {
    ramp: GainRamp,
}

impl MasterGain {
    pub fn new(gain: f32) -> Self {
        Self {
            ramp: GainRamp::new(gain.max(0.0), GAIN_EPSILON),
        }
    }

    /// Ramp toward a new linear gain; negative values clamp to 0
    pub fn set_target(&mut self, gain: f32) {
        if gain.is_finite() {
            self.ramp.set_target(gain.max(0.0));
        }
    }

    pub fn target(&self) -> f32 {
        self.ramp.target()
    }

    pub fn current(&self) -> f32 {
        self.ramp.current()
    }
}

impl Default for MasterGain {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl AudioEffect for MasterGain {
    fn process(&mut self, buffer: &mut [f32], sample_rate: u32) {
        for block in buffer.chunks_mut(RAMP_BLOCK_FRAMES * 2) {
            let start = self.ramp.current();
            let frames = block.len() / 2;
            self.ramp.advance(frames, sample_rate);
            let end = self.ramp.current();

            if start == end {
                if end != 1.0 {
                    for sample in block.iter_mut() {
                        *sample *= end;
                    }
                }
                continue;
            }

            let step = (end - start) / frames.max(1) as f32;
            for (i, frame) in block.chunks_exact_mut(2).enumerate() {
                let g = start + step * (i + 1) as f32;
                frame[0] *= g;
                frame[1] *= g;
            }
        }
    }

    fn reset(&mut self) {}

    fn name(&self) -> &str {
        "Master Gain"
    }
}
