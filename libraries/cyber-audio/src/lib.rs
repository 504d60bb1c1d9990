//! Cyber Tunes Audio
//!
//! DSP and decoding for the playback engine.
//!
//! This crate provides:
//! - The fixed signal chain: ten peaking bands, an analyser, and a master gain
//! - Smoothed gain ramps so equalizer changes never click
//! - A read-only `AnalyserHandle` for visualizers
//! - Full-file decoding via Symphonia with Rubato resampling
//!
//! # Example: Driving the Signal Chain
//!
//! ```rust
//! use cyber_audio::{EqPreset, SignalChain};
//! use cyber_core::SignalProcessor;
//!
//! let chain = SignalChain::new();
//! chain.set_band_gains(EqPreset::BassBoost.gains());
//!
//! let processor = chain.processor();
//! let mut buffer = vec![0.0_f32; 1024]; // Interleaved stereo
//! processor.process(&mut buffer, 44100);
//! ```

pub mod analyser;
mod decoder;
pub mod effects;
mod error;
pub mod resampling;
mod signal_chain;

pub use analyser::{AnalyserHandle, BIN_COUNT, FFT_SIZE};
pub use decoder::{decode_source, DecodedAudio};
pub use effects::{AudioEffect, EqPreset, GainRamp, MasterGain, PeakingBand, PeakingEq};
pub use error::{AudioError, Result};
pub use signal_chain::SignalChain;
