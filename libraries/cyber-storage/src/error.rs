/// Storage-specific errors
use cyber_core::{StoreError, TrackId};
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Insert rejected by the quota check
    #[error("Quota exceeded: {used} + {requested} > {limit}")]
    QuotaExceeded { used: u64, requested: u64, limit: u64 },

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Value does not fit the column type
    #[error("Value out of range: {0}")]
    OutOfRange(String),

    /// Database error from `SQLx`
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StorageError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StorageError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::Migration(err.to_string())
    }
}

impl From<StorageError> for StoreError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::QuotaExceeded {
                used,
                requested,
                limit,
            } => StoreError::QuotaExceeded {
                used,
                requested,
                limit,
            },
            StorageError::NotFound { id, .. } => StoreError::NotFound(TrackId::new(id)),
            other => StoreError::Failure(other.to_string()),
        }
    }
}
