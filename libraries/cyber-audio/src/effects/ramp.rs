//! Exponential parameter smoothing

/// Time constant of the exponential approach, in seconds
pub const RAMP_TIME_CONSTANT_SECS: f32 = 0.1;

/// Frames between coefficient refreshes while a ramp is moving
pub const RAMP_BLOCK_FRAMES: usize = 64;

/// A value that approaches its target exponentially
///
/// After `t` seconds the remaining distance is `e^(-t / 0.1)` of the initial
/// one. Once closer than `epsilon` the value snaps onto the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainRamp {
    current: f32,
    target: f32,
    epsilon: f32,
}

impl GainRamp {
    pub fn new(value: f32, epsilon: f32) -> Self {
        Self {
            current: value,
            target: value,
            epsilon,
        }
    }

    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Move immediately, skipping the ramp
    pub fn jump_to(&mut self, value: f32) {
        self.current = value;
        self.target = value;
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_settled(&self) -> bool {
        self.current == self.target
    }

    /// Advance the ramp by `frames` at `sample_rate`
    ///
    /// Returns `true` if the current value moved.
    pub fn advance(&mut self, frames: usize, sample_rate: u32) -> bool {
        if self.is_settled() || sample_rate == 0 || frames == 0 {
            return false;
        }

        let elapsed = frames as f32 / sample_rate as f32;
        let k = 1.0 - (-elapsed / RAMP_TIME_CONSTANT_SECS).exp();
        self.current += (self.target - self.current) * k;

        if (self.target - self.current).abs() < self.epsilon {
            self.current = self.target;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reaches_63_percent_after_one_time_constant() {
        let mut ramp = GainRamp::new(0.0, 1e-3);
        ramp.set_target(10.0);
        ramp.advance(4410, 44100);
        assert!((ramp.current() - 6.32).abs() < 0.01);
    }

    #[test]
    fn converges_and_snaps() {
        let mut ramp = GainRamp::new(0.0, 1e-3);
        ramp.set_target(12.0);
        for _ in 0..1000 {
            ramp.advance(RAMP_BLOCK_FRAMES, 44100);
        }
        assert!(ramp.is_settled());
        assert_eq!(ramp.current(), 12.0);
    }

    #[test]
    fn never_overshoots() {
        let mut ramp = GainRamp::new(-12.0, 1e-3);
        ramp.set_target(12.0);
        let mut last = ramp.current();
        while !ramp.is_settled() {
            ramp.advance(RAMP_BLOCK_FRAMES, 48000);
            assert!(ramp.current() >= last);
            assert!(ramp.current() <= 12.0);
            last = ramp.current();
        }
    }

    #[test]
    fn settled_ramp_does_not_move() {
        let mut ramp = GainRamp::new(3.0, 1e-3);
        assert!(!ramp.advance(64, 44100));
        ramp.jump_to(5.0);
        assert!(ramp.is_settled());
        assert_eq!(ramp.current(), 5.0);
    }
}
