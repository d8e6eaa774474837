//! Configuration for the core crate
//!
//! This module provides configuration options for the engine: naming
//! conventions for keys and titles, and logging.

use serde::{Serialize, Deserialize};

use crate::error::Error;
use crate::utils::Naming;

/// Naming convention configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingConfig {
    /// Whether keys and titles are derived from column names
    pub enabled: bool,

    /// Words always written in upper case, e.g. `ID`
    pub uppercase_words: Vec<String>,
}

impl Default for NamingConfig {
    fn default() -> Self {
        NamingConfig {
            enabled: true,
            uppercase_words: vec!["ID".to_string()],
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Naming convention configuration
    pub naming: NamingConfig,

    /// Log level
    pub log_level: String,

    /// Raise logging to at least `debug`, so statements are logged
    pub debug_mode: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            naming: NamingConfig::default(),
            log_level: "info".to_string(),
            debug_mode: false,
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the naming converter described by this configuration
    pub fn naming(&self) -> Naming {
        Naming::new(&self.naming)
    }

    /// Log filter handed to the logger
    ///
    /// Debug mode raises `log_level` to `debug` unless it is already
    /// `debug` or `trace`.
    pub fn log_filter(&self) -> &str {
        match self.log_level.to_ascii_lowercase().as_str() {
            "debug" | "trace" => self.log_level.as_str(),
            _ if self.debug_mode => "debug",
            _ => self.log_level.as_str(),
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: &str) -> Result<Self, Error> {
        let file = std::fs::File::open(path).map_err(Error::Io)?;

        let config = serde_json::from_reader(file).map_err(Error::Json)?;

        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file(&self, path: &str) -> Result<(), Error> {
        let file = std::fs::File::create(path).map_err(Error::Io)?;

        serde_json::to_writer_pretty(file, self).map_err(Error::Json)?;

        Ok(())
    }

    /// Create a development configuration
    pub fn development() -> Self {
        let mut config = Self::default();
        config.debug_mode = true;
        config.log_level = "debug".to_string();
        config
    }

    /// Create a production configuration
    pub fn production() -> Self {
        let mut config = Self::default();
        config.debug_mode = false;
        config.log_level = "info".to_string();
        config
    }

    /// Create a testing configuration
    pub fn testing() -> Self {
        let mut config = Self::default();
        config.debug_mode = true;
        config.log_level = "debug".to_string();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();

        assert!(config.naming.enabled);
        assert_eq!(config.naming.uppercase_words, vec!["ID".to_string()]);
        assert_eq!(config.log_level, "info");
        assert!(!config.debug_mode);
    }

    #[test]
    fn test_presets() {
        let config = EngineConfig::development();
        assert!(config.debug_mode);
        assert_eq!(config.log_level, "debug");

        let config = EngineConfig::production();
        assert!(!config.debug_mode);
        assert_eq!(config.log_level, "info");

        let config = EngineConfig::testing();
        assert!(config.debug_mode);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_debug_mode_raises_log_filter() {
        let mut config = EngineConfig::production();
        assert_eq!(config.log_filter(), "info");

        config.debug_mode = true;
        assert_eq!(config.log_filter(), "debug");

        config.log_level = "trace".to_string();
        assert_eq!(config.log_filter(), "trace");

        config.debug_mode = false;
        config.log_level = "warn".to_string();
        assert_eq!(config.log_filter(), "warn");
    }

    #[test]
    fn test_naming_from_config() {
        let mut config = EngineConfig::default();
        assert_eq!(config.naming().key("user_id"), "userID");

        config.naming.enabled = false;
        assert_eq!(config.naming().key("user_id"), "user_id");
    }

    #[test]
    fn test_config_file_io() {
        let mut config = EngineConfig::default();
        config.naming.uppercase_words.push("URL".to_string());

        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();

        config.to_file(path).unwrap();
        let loaded = EngineConfig::from_file(path).unwrap();

        assert_eq!(loaded.naming, config.naming);
        assert_eq!(loaded.log_level, config.log_level);
        assert_eq!(loaded.debug_mode, config.debug_mode);
    }

    #[test]
    fn test_missing_file() {
        match EngineConfig::from_file("/nonexistent/tablemap.json") {
            Err(Error::Io(_)) => {}
            other => panic!("Expected Io error, got {:?}", other),
        }
    }
}
