//! Error types for playback coordination

use cyber_core::StoreError;
use thiserror::Error;

/// Player errors
#[derive(Debug, Error)]
pub enum PlayerError {
    /// Storage collaborator failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Rejected equalizer input
    #[error("Invalid equalizer input: {0}")]
    Equalizer(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlayerError {
    pub fn equalizer(msg: impl Into<String>) -> Self {
        Self::Equalizer(msg.into())
    }
}

/// Result type for player operations
pub type Result<T> = std::result::Result<T, PlayerError>;
