//! TOML configuration
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration. Alert thresholds are fixed and not configurable.

use crate::error::ConfigError;
use crate::timer::DEFAULT_TICK_INTERVAL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub timer: TimerConfig,
}

/// Where the history is persisted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,
}

/// Export defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportConfig {
    #[serde(default = "default_export_file")]
    pub default_file: PathBuf,
}

/// Elapsed-time display settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimerConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

fn default_history_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nascertime")
        .join("history.json")
}

fn default_export_file() -> PathBuf {
    PathBuf::from("nascertime-history.json")
}

fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL.as_millis() as u64
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            history_path: default_history_path(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_file: default_export_file(),
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl TimerConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Config {
    /// Load and validate configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadError` if the file cannot be read,
    /// `ConfigError::TomlError` if it is not valid TOML for this schema, and
    /// `ConfigError::ValidationError` if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timer.tick_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "timer.tick_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.storage.history_path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "storage.history_path must not be empty".to_string(),
            ));
        }
        if self.export.default_file.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "export.default_file must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.timer.tick_interval(), Duration::from_millis(200));
        assert!(config.storage.history_path.ends_with("nascertime/history.json"));
        assert_eq!(
            config.export.default_file,
            PathBuf::from("nascertime-history.json")
        );
    }

    #[test]
    fn test_partial_config() {
        let config = Config::from_toml_str(
            r#"
            [storage]
            history_path = "/tmp/contractions.json"

            [timer]
            tick_interval_ms = 500
            "#,
        )
        .unwrap();
        assert_eq!(
            config.storage.history_path,
            PathBuf::from("/tmp/contractions.json")
        );
        assert_eq!(config.timer.tick_interval_ms, 500);
        assert_eq!(config.export, ExportConfig::default());
    }

    #[test]
    fn test_zero_tick_interval_is_rejected() {
        let result = Config::from_toml_str("[timer]\ntick_interval_ms = 0\n");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        let result = Config::from_toml_str("[timer]\ntick_interval_ms = \"fast\"\n");
        assert!(matches!(result, Err(ConfigError::TomlError(_))));
    }

    #[test]
    fn test_from_file() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "[export]\ndefault_file = \"out.json\"\n").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.export.default_file, PathBuf::from("out.json"));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let result = Config::from_file(Path::new("/nonexistent/nascertime.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError(_))));
    }
}
