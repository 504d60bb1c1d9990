//! Signal chain stages
//!
//! Every stage operates in place on interleaved stereo f32 samples.

mod gain;
mod peaking_eq;
mod ramp;

pub use gain::MasterGain;
pub use peaking_eq::{EqPreset, PeakingBand, PeakingEq};
pub use ramp::{GainRamp, RAMP_BLOCK_FRAMES, RAMP_TIME_CONSTANT_SECS};

/// A stage in the signal chain
///
/// # Real-Time Constraints
/// - No allocations in `process()`
/// - No blocking operations
pub trait AudioEffect: Send {
    /// Process an interleaved stereo buffer in place
    fn process(&mut self, buffer: &mut [f32], sample_rate: u32);

    /// Clear filter history (e.g. when the source changes)
    fn reset(&mut self);

    /// Stage name (for debugging)
    fn name(&self) -> &str;
}
