//! Persisted equalizer state
//!
//! Every mutation does two things: it ramps the signal chain toward the new
//! effective gains, then writes `{gains, enabled}` to the settings store.
//! Disabling never touches the stored gains; the chain just ramps to flat.
//! A failed write restores the previous settings and ramps the chain back,
//! so what is heard always matches what is stored.

use crate::error::{PlayerError, Result};
use cyber_audio::{EqPreset, SignalChain};
use cyber_core::{EqualizerSettings, SettingsStore, EQ_BAND_COUNT};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct EqualizerState {
    settings: EqualizerSettings,
    store: Arc<dyn SettingsStore>,
}

impl EqualizerState {
    pub fn new(settings: EqualizerSettings, store: Arc<dyn SettingsStore>) -> Self {
        Self { settings, store }
    }

    /// Load persisted settings, falling back to flat and disabled
    pub async fn load(store: Arc<dyn SettingsStore>) -> Self {
        let settings = match store.load_equalizer().await {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Failed to load equalizer settings, using defaults: {}", e);
                EqualizerSettings::default()
            }
        };
        Self::new(settings, store)
    }

    pub fn settings(&self) -> &EqualizerSettings {
        &self.settings
    }

    /// Stored gains, independent of the enabled flag
    pub fn gains(&self) -> [f32; EQ_BAND_COUNT] {
        self.settings.gains
    }

    pub fn is_enabled(&self) -> bool {
        self.settings.enabled
    }

    pub fn effective_gains(&self) -> [f32; EQ_BAND_COUNT] {
        self.settings.effective_gains()
    }

    /// Set one band, clamped to [-12, 12] dB
    pub async fn set_gain(&mut self, chain: &SignalChain, band: usize, value: f32) -> Result<()> {
        if band >= EQ_BAND_COUNT {
            return Err(PlayerError::equalizer(format!(
                "band {band} out of range (0-{})",
                EQ_BAND_COUNT - 1
            )));
        }
        let Some(gain) = EqualizerSettings::clamp_gain(value) else {
            return Err(PlayerError::equalizer(format!("gain {value} is not finite")));
        };

        let mut next = self.settings;
        next.gains[band] = gain;
        self.commit(chain, next).await
    }

    pub async fn set_enabled(&mut self, chain: &SignalChain, enabled: bool) -> Result<()> {
        let next = EqualizerSettings {
            enabled,
            ..self.settings
        };
        self.commit(chain, next).await
    }

    /// Replace all ten gains at once
    pub async fn apply_preset(
        &mut self,
        chain: &SignalChain,
        gains: [f32; EQ_BAND_COUNT],
    ) -> Result<()> {
        let mut clamped = [0.0; EQ_BAND_COUNT];
        for (slot, value) in clamped.iter_mut().zip(gains) {
            *slot = EqualizerSettings::clamp_gain(value)
                .ok_or_else(|| PlayerError::equalizer(format!("gain {value} is not finite")))?;
        }

        let next = EqualizerSettings {
            gains: clamped,
            ..self.settings
        };
        self.commit(chain, next).await
    }

    pub async fn apply_named_preset(&mut self, chain: &SignalChain, preset: EqPreset) -> Result<()> {
        debug!("Applying equalizer preset {}", preset.name());
        self.apply_preset(chain, preset.gains()).await
    }

    /// Push the effective gains to the chain without persisting
    pub fn sync(&self, chain: &SignalChain) {
        chain.set_band_gains(self.effective_gains());
    }

    async fn commit(&mut self, chain: &SignalChain, next: EqualizerSettings) -> Result<()> {
        let previous = std::mem::replace(&mut self.settings, next);
        self.sync(chain);
        if let Err(e) = self.store.save_equalizer(&self.settings).await {
            warn!("Failed to save equalizer settings, reverting: {}", e);
            self.settings = previous;
            self.sync(chain);
            return Err(e.into());
        }
        Ok(())
    }
}

impl std::fmt::Debug for EqualizerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EqualizerState")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
