/// Player configuration
use crate::error::{AppError, Result};
use crate::visualizer::VisualizerStyle;
use cyber_core::{CatalogEntry, StorageTier};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file read when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "cyber-tunes.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub audio: AudioSettings,

    #[serde(default)]
    pub ui: UiSettings,

    /// Built-in tracks shown before imported ones
    #[serde(default)]
    pub catalog: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Keep everything in memory instead of SQLite
    #[serde(default)]
    pub in_memory: bool,

    /// Start on the 1 GB tier
    #[serde(default)]
    pub upgraded_tier: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AudioSettings {
    #[serde(default = "default_output_sample_rate")]
    pub output_sample_rate: u32,

    /// Hold the output until the first play gesture
    #[serde(default = "default_start_suspended")]
    pub start_suspended: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UiSettings {
    #[serde(default = "default_theme_count")]
    pub theme_count: usize,

    /// View shown when the visualizer starts
    #[serde(default)]
    pub visualizer_style: VisualizerStyle,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            in_memory: false,
            upgraded_tier: false,
        }
    }
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            output_sample_rate: default_output_sample_rate(),
            start_suspended: default_start_suspended(),
        }
    }
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            theme_count: default_theme_count(),
            visualizer_style: VisualizerStyle::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; the default file is optional.
    /// Environment overrides use the `CYBER_` prefix with `__` between
    /// sections, e.g. `CYBER_STORAGE__IN_MEMORY=true`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()).required(true));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("CYBER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document, without environment overrides
    pub fn from_toml(source: &str) -> Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.audio.output_sample_rate == 0 {
            return Err(AppError::InvalidConfig(
                "audio.output_sample_rate must be positive".to_string(),
            ));
        }
        if self.ui.theme_count == 0 {
            return Err(AppError::InvalidConfig(
                "ui.theme_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn initial_tier(&self) -> StorageTier {
        if self.storage.upgraded_tier {
            StorageTier::Upgraded
        } else {
            StorageTier::Base
        }
    }
}

// Default values
fn default_database_url() -> String {
    "sqlite://./data/cyber_tunes.db".to_string()
}

fn default_output_sample_rate() -> u32 {
    44_100
}

fn default_start_suspended() -> bool {
    true
}

fn default_theme_count() -> usize {
    8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.storage.database_url, "sqlite://./data/cyber_tunes.db");
        assert!(!config.storage.in_memory);
        assert_eq!(config.audio.output_sample_rate, 44_100);
        assert!(config.audio.start_suspended);
        assert_eq!(config.ui.theme_count, 8);
        assert_eq!(config.ui.visualizer_style, VisualizerStyle::Spectrum);
        assert!(config.catalog.is_empty());
        assert_eq!(config.initial_tier(), StorageTier::Base);
    }

    #[test]
    fn catalog_entries_parse() {
        let config = AppConfig::from_toml(
            r#"
            [storage]
            in_memory = true
            upgraded_tier = true

            [[catalog]]
            title = "Neon Rain"
            artist = "Grid Runner"
            path = "music/neon_rain.mp3"
            duration_seconds = 201.5

            [[catalog]]
            id = "orbit"
            title = "Low Orbit"
            artist = "Grid Runner"
            path = "music/low_orbit.flac"
            "#,
        )
        .unwrap();

        assert!(config.storage.in_memory);
        assert_eq!(config.initial_tier(), StorageTier::Upgraded);
        assert_eq!(config.catalog.len(), 2);
        assert_eq!(config.catalog[0].duration_seconds, 201.5);
        assert_eq!(config.catalog[1].id.as_deref(), Some("orbit"));
        assert_eq!(config.catalog[1].duration_seconds, 0.0);
    }

    #[test]
    fn visualizer_style_parses_lowercase() {
        let config = AppConfig::from_toml("[ui]\nvisualizer_style = \"waveform\"").unwrap();
        assert_eq!(config.ui.visualizer_style, VisualizerStyle::Waveform);
        assert!(AppConfig::from_toml("[ui]\nvisualizer_style = \"bars\"").is_err());
    }

    #[test]
    fn zero_theme_count_is_rejected() {
        let err = AppConfig::from_toml("[ui]\ntheme_count = 0").unwrap_err();
        assert!(matches!(err, AppError::InvalidConfig(_)));
    }

    #[test]
    fn explicit_missing_file_fails() {
        let result = AppConfig::load(Some(Path::new("/nonexistent/cyber-tunes.toml")));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
