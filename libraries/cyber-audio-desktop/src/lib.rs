//! Cyber Tunes Desktop Audio
//!
//! The playback device used on desktop, plus the outputs that pull audio
//! from it.
//!
//! - [`DecodedDevice`] decodes a whole source up front and plays it from
//!   memory, reporting progress on a channel
//! - [`NullOutput`] is a clock-driven output that renders and discards audio;
//!   it is the default and needs no sound hardware
//! - `CpalOutput` (feature `cpal-output`) plays through the system device

mod device;
mod error;
mod null_output;

#[cfg(feature = "cpal-output")]
mod cpal_output;

pub use device::{DecodedDevice, DeviceRenderer, TIME_UPDATE_INTERVAL_SECS};
pub use error::{OutputError, Result};
pub use null_output::NullOutput;

#[cfg(feature = "cpal-output")]
pub use cpal_output::CpalOutput;
