/// Application error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Audio output error: {0}")]
    Output(#[from] cyber_audio_desktop::OutputError),

    #[error(transparent)]
    Player(#[from] cyber_playback::PlayerError),

    #[error(transparent)]
    Store(#[from] cyber_core::StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
