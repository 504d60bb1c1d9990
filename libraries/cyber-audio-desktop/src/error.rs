/// Audio output errors
use cyber_core::ContextError;
use thiserror::Error;

/// Result type alias using `OutputError`
pub type Result<T> = std::result::Result<T, OutputError>;

#[derive(Error, Debug)]
pub enum OutputError {
    /// No output device available
    #[error("No audio output device found")]
    DeviceNotFound,

    /// Stream creation failed
    #[error("Failed to build output stream: {0}")]
    StreamBuild(String),

    /// The clock needs a Tokio runtime to run on
    #[error("No Tokio runtime available for the output clock")]
    NoRuntime,

    /// Output was shut down
    #[error("Audio output is closed")]
    Closed,
}

impl From<OutputError> for ContextError {
    fn from(err: OutputError) -> Self {
        match err {
            OutputError::Closed => ContextError::Closed,
            other => ContextError::Output(other.to_string()),
        }
    }
}
