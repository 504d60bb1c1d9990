/// Audio-specific errors
use cyber_core::DeviceErrorKind;
use thiserror::Error;

/// Result type alias using `AudioError`
pub type Result<T> = std::result::Result<T, AudioError>;

/// Audio error types
#[derive(Error, Debug)]
pub enum AudioError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Unsupported format or codec
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Decoding error
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// Resampler construction or processing failed
    #[error("Resampling error: {0}")]
    Resampling(String),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AudioError {
    /// Classification reported through the device error event
    pub fn device_kind(&self) -> DeviceErrorKind {
        match self {
            Self::FileNotFound(_) | Self::UnsupportedFormat(_) => {
                DeviceErrorKind::SourceUnsupported
            }
            Self::DecodeError(_) => DeviceErrorKind::DecodeFailure,
            Self::Io(e) if e.kind() == std::io::ErrorKind::Interrupted => DeviceErrorKind::Aborted,
            Self::Io(_) => DeviceErrorKind::NetworkFailure,
            Self::Resampling(_) => DeviceErrorKind::Unknown,
        }
    }
}
