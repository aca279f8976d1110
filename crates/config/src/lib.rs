//! phpmanager configuration
//!
//! Settings for the php.ini tools themselves: which php.ini to manage, how to
//! log, how to list and search, and the wording of user-facing messages.
//!
//! # Architecture
//!
//! - **Sections**: each part of the file is a type implementing `ConfigSection`
//! - **Graceful degradation**: invalid values load with warnings; saves are validated
//! - **Atomic writes**: files are never left half-written, and a `.backup` is kept
//! - **Overrides**: defaults < file < `PHPMANAGER_*` environment variables
//!
//! # Example
//!
//! ```rust
//! use phpmanager_config::{Config, ConfigManager};
//!
//! let manager = ConfigManager::new().expect("Failed to initialize config");
//! let config = manager.load().unwrap_or_else(|e| {
//!     eprintln!("Config error: {}, using defaults", e);
//!     Config::default()
//! });
//!
//! println!("Log level: {}", config.app.log_level);
//! ```

mod error;
mod manager;
mod persistence;
mod validation;

pub mod app_config;
mod display_config;
mod messages;

pub use error::{ConfigError, ConfigResult, ValidationError};
pub use manager::ConfigManager;
pub use persistence::{backup_path, write_atomic};
pub use validation::{ConfigSection, Validator};

pub use app_config::{AppConfig, LogLevel};
pub use display_config::DisplayConfig;
pub use messages::{MessageTable, NAME_PLACEHOLDER, PATH_PLACEHOLDER};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Current config file format version
pub const CONFIG_VERSION: u32 = 1;

/// Environment variable overriding `app.log_level`
pub const ENV_LOG_LEVEL: &str = "PHPMANAGER_APP_LOG_LEVEL";

/// Environment variable overriding `app.php_ini_path`
pub const ENV_PHP_INI_PATH: &str = "PHPMANAGER_APP_PHP_INI_PATH";

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Config file format version
    pub version: u32,

    /// Application-level settings
    pub app: AppConfig,

    /// Listing and search defaults
    pub display: DisplayConfig,

    /// User-facing message table
    pub messages: MessageTable,
}

impl Config {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the entire configuration
    ///
    /// Returns all validation errors found across all sections.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(mut e) = self.app.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.display.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.messages.validate() {
            errors.append(&mut e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Merges this config with another, preferring values from `other`
    pub fn merge(&mut self, other: Config) {
        self.app.merge(other.app);
        self.display.merge(other.display);
        self.messages.merge(other.messages);
    }

    /// Applies overrides read through `lookup`
    ///
    /// Recognises [`ENV_LOG_LEVEL`] and [`ENV_PHP_INI_PATH`]. Unparseable
    /// values are logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            match level.parse::<LogLevel>() {
                Ok(level) => self.app.log_level = level,
                Err(e) => log::warn!("Ignoring {}: {}", ENV_LOG_LEVEL, e),
            }
        }

        if let Some(path) = lookup(ENV_PHP_INI_PATH) {
            if path.trim().is_empty() {
                log::warn!("Ignoring empty {}", ENV_PHP_INI_PATH);
            } else {
                self.app.php_ini_path = Some(PathBuf::from(path));
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            app: AppConfig::default(),
            display: DisplayConfig::default(),
            messages: MessageTable::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.version, CONFIG_VERSION);
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        let mut override_config = Config::default();
        override_config.display.group_by_section = false;

        base.merge(override_config);
        assert!(!base.display.group_by_section);
    }

    #[test]
    fn test_errors_from_all_sections_are_collected() {
        let mut config = Config::default();
        config.app.php_ini_path = Some(PathBuf::from("php.cfg"));
        config.messages.not_found = String::new();

        assert_eq!(config.validate().unwrap_err().len(), 2);
    }

    #[test]
    fn test_apply_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_LOG_LEVEL, "debug"),
            (ENV_PHP_INI_PATH, "/opt/php/php.ini"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.app.log_level, LogLevel::Debug);
        assert_eq!(config.app.php_ini_path, Some(PathBuf::from("/opt/php/php.ini")));
    }

    #[test]
    fn test_bad_override_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|key| (key == ENV_LOG_LEVEL).then(|| "chatty".to_string()));
        assert_eq!(config.app.log_level, AppConfig::default().log_level);
    }
}
