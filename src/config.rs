//! Configuration for the trace recorder.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default name of the directory trace files are written to.
pub const DEFAULT_RECORD_DIR: &str = "dglab-record";

/// Main configuration for the recorder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root under which the record directory lives
    pub storage_root: PathBuf,

    /// Name of the record directory below `storage_root`
    pub record_dir: String,

    /// Where transparency counters are persisted (none to disable)
    pub transparency_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ble-trace-recorder");

        Self {
            transparency_file: Some(data_dir.join("transparency.json")),
            storage_root: data_dir,
            record_dir: DEFAULT_RECORD_DIR.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(e.to_string()))?;
            Self::from_json(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from JSON. Missing fields take their defaults.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(&config_path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ble-trace-recorder")
            .join("config.json")
    }

    /// Directory trace files are written to.
    pub fn record_path(&self) -> PathBuf {
        self.storage_root.join(&self.record_dir)
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.record_dir, "dglab-record");
        assert!(config.record_path().ends_with("ble-trace-recorder/dglab-record"));
        assert!(config.transparency_file.is_some());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = Config::from_json(r#"{ "storage_root": "/sdcard/app" }"#).unwrap();
        assert_eq!(config.record_path(), PathBuf::from("/sdcard/app/dglab-record"));
        assert_eq!(config.record_dir, DEFAULT_RECORD_DIR);
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        assert!(matches!(
            Config::from_json("{ nope"),
            Err(ConfigError::ParseError(_))
        ));
    }
}
