//! Application-level configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Log level for application logging
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Filter to hand to the logger backend
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// Application-level settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Log level for application output
    pub log_level: LogLevel,

    /// php.ini to manage when none is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub php_ini_path: Option<PathBuf>,

    /// Keep a `.backup` copy of php.ini before every write
    pub backup_on_save: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Warn,
            php_ini_path: None,
            backup_on_save: true,
        }
    }
}

impl ConfigSection for AppConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut results = Vec::new();

        if let Some(ref path) = self.php_ini_path {
            if path.as_os_str().is_empty() {
                results.push(Err(ValidationError::new(
                    "app.php_ini_path",
                    "must not be empty when set",
                )));
            } else {
                results.push(Validator::has_extension(path, "ini", "app.php_ini_path"));
            }
        }

        Validator::collect_errors(results)
    }

    fn merge(&mut self, other: Self) {
        self.log_level = other.log_level;
        if other.php_ini_path.is_some() {
            self.php_ini_path = other.php_ini_path;
        }
        self.backup_on_save = other.backup_on_save;
    }

    fn section_name(&self) -> &'static str {
        "app"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.backup_on_save);
        assert!(config.php_ini_path.is_none());
    }

    #[test]
    fn test_php_ini_path_must_end_in_ini() {
        let mut config = AppConfig::default();
        config.php_ini_path = Some(PathBuf::from("/etc/php/8.3/cli/php.ini"));
        assert!(config.validate().is_ok());

        config.php_ini_path = Some(PathBuf::from("/etc/php/8.3/cli/php.conf"));
        let errors = config.validate().unwrap_err();
        assert_eq!(errors[0].field, "app.php_ini_path");

        config.php_ini_path = Some(PathBuf::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_merge_keeps_path_when_other_has_none() {
        let mut base = AppConfig::default();
        base.php_ini_path = Some(PathBuf::from("php.ini"));

        let mut other = AppConfig::default();
        other.log_level = LogLevel::Debug;
        other.backup_on_save = false;

        base.merge(other);
        assert_eq!(base.log_level, LogLevel::Debug);
        assert!(!base.backup_on_save);
        assert_eq!(base.php_ini_path, Some(PathBuf::from("php.ini")));
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!("INFO".parse::<LogLevel>(), Ok(LogLevel::Info));
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_log_level_display_and_filter() {
        assert_eq!(LogLevel::Error.to_string(), "error");
        assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
    }
}
