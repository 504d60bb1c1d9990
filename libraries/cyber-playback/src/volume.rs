//! Master volume with perceptual scaling
//!
//! Levels 1-100 map onto -60..0 dB; level 0 and mute are silence. The
//! resulting linear gain drives the signal chain's master gain ramp.

/// Lowest audible level in dB
const MIN_DB: f32 = -60.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volume {
    level: u8,
    muted: bool,
}

impl Volume {
    /// Create at `level` percent (clamped to 100)
    pub fn new(level: u8) -> Self {
        Self {
            level: level.min(100),
            muted: false,
        }
    }

    pub fn set_level(&mut self, level: u8) {
        self.level = level.min(100);
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn mute(&mut self) {
        self.muted = true;
    }

    pub fn unmute(&mut self) {
        self.muted = false;
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Linear multiplier for the master gain
    pub fn gain(&self) -> f32 {
        if self.muted || self.level == 0 {
            return 0.0;
        }
        let db = (f32::from(self.level) - 100.0) * (-MIN_DB / 100.0);
        10.0_f32.powf(db / 20.0)
    }

    pub fn to_db(&self) -> f32 {
        if self.muted || self.level == 0 {
            MIN_DB
        } else {
            20.0 * self.gain().log10()
        }
    }
}

impl Default for Volume {
    /// Unity gain, so the chain starts transparent
    fn default() -> Self {
        Self::new(100)
    }
}
