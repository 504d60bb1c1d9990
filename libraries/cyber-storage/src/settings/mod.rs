//! User settings management
//!
//! Settings are key-value pairs with JSON-serialized values. Keys used by
//! the player live in `cyber_core` (`ui.theme_index`, `eq.enabled`,
//! `eq.gains`).
//!
//! # Example
//!
//! ```rust,no_run
//! use cyber_storage::settings;
//! # async fn example(pool: &sqlx::SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
//! settings::set_setting(pool, cyber_core::SETTING_THEME_INDEX, &serde_json::json!(3)).await?;
//! let theme = settings::get_setting(pool, cyber_core::SETTING_THEME_INDEX).await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{Result, StorageError};
use sqlx::{Row, SqlitePool};

/// Get a single setting value
///
/// Returns `Ok(None)` if the key has never been written.
pub async fn get_setting(pool: &SqlitePool, key: &str) -> Result<Option<serde_json::Value>> {
    let row = sqlx::query("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => {
            let raw: String = row.try_get("value")?;
            let value = serde_json::from_str(&raw)
                .map_err(|e| StorageError::SerializationError(e.to_string()))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Insert or replace a setting value
pub async fn set_setting(pool: &SqlitePool, key: &str, value: &serde_json::Value) -> Result<()> {
    let value_str =
        serde_json::to_string(value).map_err(|e| StorageError::SerializationError(e.to_string()))?;
    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        "INSERT INTO settings (key, value, updated_at)
         VALUES (?, ?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
    )
    .bind(key)
    .bind(value_str)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(())
}
