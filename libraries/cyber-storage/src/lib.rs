//! Cyber Tunes Storage
//!
//! Persistence for imported tracks and user preferences.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: `tracks` and `settings` own their queries
//! - **Quota Enforcement**: the usage check and the insert are one statement,
//!   so a rejected import never leaves a partial row behind
//! - **Two Backends**: [`SqliteStore`] for real use, [`MemoryStore`] for tests
//!   and `storage.in_memory` runs
//!
//! # Example
//!
//! ```rust,no_run
//! use cyber_core::{NewTrack, StorageTier, TrackStore};
//! use cyber_storage::{create_pool, run_migrations, SqliteStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://cyber_tunes.db").await?;
//! run_migrations(&pool).await?;
//! let store = SqliteStore::new(pool);
//!
//! let track = NewTrack::new("Night Drive", std::fs::read("night_drive.mp3")?);
//! store.put(track, StorageTier::Base.limit_bytes()).await?;
//! # Ok(())
//! # }
//! ```

mod context;
mod error;
mod memory;

// Vertical slices
pub mod settings;
pub mod tracks;

pub use context::SqliteStore;
pub use error::{Result, StorageError};
pub use memory::MemoryStore;

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// Call once at startup, before handing the pool to a store.
pub async fn run_migrations(pool: &SqlitePool) -> std::result::Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Create a new `SQLite` pool
///
/// In-memory URLs get a single connection that never expires, since every
/// connection would otherwise see its own empty database.
pub async fn create_pool(database_url: &str) -> std::result::Result<SqlitePool, sqlx::Error> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    tracing::debug!(url = database_url, "Creating SQLite pool");

    let in_memory = database_url.contains(":memory:");
    let mut options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .busy_timeout(std::time::Duration::from_secs(30));
    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<std::time::Duration>)
            .max_lifetime(None::<std::time::Duration>)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };

    pool_options.connect_with(options).await
}
