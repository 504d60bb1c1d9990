/// Core error types for Cyber Tunes
use crate::types::TrackId;
use std::fmt;
use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Result type for track and settings stores
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Why a play request was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectCause {
    /// Superseded by a newer command
    Aborted,
    /// Blocked by platform policy
    NotAllowed,
    /// The loaded source cannot be played
    NotSupported,
    Other,
}

impl RejectCause {
    /// Causes that stop playback and are shown to the user
    pub fn forces_stop(self) -> bool {
        matches!(self, Self::NotAllowed | Self::NotSupported)
    }
}

impl fmt::Display for RejectCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Aborted => "aborted",
            Self::NotAllowed => "not allowed",
            Self::NotSupported => "not supported",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

/// A play request was refused by the device
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Playback rejected: {cause}")]
pub struct PlaybackRejected {
    pub cause: RejectCause,
}

impl PlaybackRejected {
    pub fn new(cause: RejectCause) -> Self {
        Self { cause }
    }
}

/// Device failure classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceErrorKind {
    Aborted,
    NetworkFailure,
    DecodeFailure,
    SourceUnsupported,
    Unknown,
}

impl fmt::Display for DeviceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Aborted => "aborted",
            Self::NetworkFailure => "network failure",
            Self::DecodeFailure => "decode failure",
            Self::SourceUnsupported => "source unsupported",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Error reported by a playback device through its event channel
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Device error ({kind}): {message}")]
pub struct DeviceError {
    pub kind: DeviceErrorKind,
    pub message: String,
}

impl DeviceError {
    pub fn new(kind: DeviceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// A processor is already attached to this device
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachError {
    #[error("Device already has a signal processor attached")]
    AlreadyAttached,
}

/// Audio context state transition failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("Audio context is closed")]
    Closed,

    #[error("Audio output error: {0}")]
    Output(String),
}

/// Storage collaborator errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Projected usage would exceed the limit; nothing was written
    #[error("Storage quota exceeded: {used} + {requested} bytes exceeds limit of {limit} bytes")]
    QuotaExceeded { used: u64, requested: u64, limit: u64 },

    #[error("Track not found: {0}")]
    NotFound(TrackId),

    /// Generic persistence failure
    #[error("Storage failure: {0}")]
    Failure(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn failure(msg: impl Into<String>) -> Self {
        Self::Failure(msg.into())
    }

    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }
}

/// Umbrella error for core operations
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Rejected(#[from] PlaybackRejected),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CoreError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
