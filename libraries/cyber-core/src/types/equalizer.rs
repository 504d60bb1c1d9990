use serde::{Deserialize, Serialize};

/// Number of equalizer bands
pub const EQ_BAND_COUNT: usize = 10;

/// Band center frequencies in Hz
pub const EQ_FREQUENCIES: [f32; EQ_BAND_COUNT] = [
    32.0, 64.0, 125.0, 250.0, 500.0, 1000.0, 2000.0, 4000.0, 8000.0, 16000.0,
];

/// Bandwidth factor shared by every band
pub const EQ_Q: f32 = 1.4;

pub const EQ_MIN_GAIN_DB: f32 = -12.0;
pub const EQ_MAX_GAIN_DB: f32 = 12.0;

/// Persisted equalizer settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EqualizerSettings {
    pub gains: [f32; EQ_BAND_COUNT],
    pub enabled: bool,
}

impl Default for EqualizerSettings {
    fn default() -> Self {
        Self {
            gains: [0.0; EQ_BAND_COUNT],
            enabled: false,
        }
    }
}

impl EqualizerSettings {
    /// Clamp a gain to the supported range
    ///
    /// Returns `None` for non-finite input.
    pub fn clamp_gain(value: f32) -> Option<f32> {
        value
            .is_finite()
            .then(|| value.clamp(EQ_MIN_GAIN_DB, EQ_MAX_GAIN_DB))
    }

    /// Rebuild settings from loosely typed persisted values
    ///
    /// A gain vector of the wrong length falls back to flat; individual values
    /// are clamped and non-finite entries become 0.
    pub fn sanitize(gains: &[f32], enabled: bool) -> Self {
        let mut out = Self {
            enabled,
            ..Self::default()
        };
        if gains.len() == EQ_BAND_COUNT {
            for (slot, value) in out.gains.iter_mut().zip(gains) {
                *slot = Self::clamp_gain(*value).unwrap_or(0.0);
            }
        }
        out
    }

    /// Gains actually applied to the signal chain
    pub fn effective_gains(&self) -> [f32; EQ_BAND_COUNT] {
        if self.enabled {
            self.gains
        } else {
            [0.0; EQ_BAND_COUNT]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_flat_and_bypassed() {
        let eq = EqualizerSettings::default();
        assert!(!eq.enabled);
        assert!(eq.gains.iter().all(|g| *g == 0.0));
    }

    #[test]
    fn sanitize_clamps_and_rejects_bad_lengths() {
        let eq = EqualizerSettings::sanitize(
            &[20.0, -20.0, f32::NAN, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 3.0],
            true,
        );
        assert_eq!(eq.gains[0], 12.0);
        assert_eq!(eq.gains[1], -12.0);
        assert_eq!(eq.gains[2], 0.0);
        assert_eq!(eq.gains[9], 3.0);

        let short = EqualizerSettings::sanitize(&[5.0, 5.0], true);
        assert_eq!(short.gains, [0.0; EQ_BAND_COUNT]);
        assert!(short.enabled);
    }

    #[test]
    fn effective_gains_follow_enabled_flag() {
        let mut eq = EqualizerSettings {
            gains: [6.0, 5.0, 4.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            enabled: false,
        };
        assert_eq!(eq.effective_gains(), [0.0; EQ_BAND_COUNT]);
        eq.enabled = true;
        assert_eq!(eq.effective_gains(), eq.gains);
    }
}
