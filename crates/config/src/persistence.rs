//! File system persistence
//!
//! Config files and php.ini share one write path: content goes to a temporary
//! file in the target directory and is renamed over the target, so a crash
//! never leaves a half-written file. The previous content can be kept next to
//! the target with a `.backup` suffix.

use crate::error::join_errors;
use crate::{Config, ConfigError, ConfigResult, CONFIG_VERSION};
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Path of the backup kept for `path` (`php.ini` becomes `php.ini.backup`)
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".backup");
    path.with_file_name(name)
}

/// Atomically replaces `path` with `contents`
///
/// Missing parent directories are created. When `keep_backup` is set and
/// the target already exists it is copied to [`backup_path`] first; the
/// backup location is returned in that case.
pub fn write_atomic(path: &Path, contents: &str, keep_backup: bool) -> ConfigResult<Option<PathBuf>> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        Some(_) => PathBuf::from("."),
        None => {
            return Err(ConfigError::PathResolutionError {
                reason: format!("{} has no parent directory", path.display()),
            })
        }
    };
    ensure_directory_exists(&dir)?;

    let backup = if keep_backup && path.exists() {
        let backup = backup_path(path);
        fs::copy(path, &backup).map_err(|e| ConfigError::BackupError {
            path: path.to_path_buf(),
            source: e,
        })?;
        log::debug!("Backed up {} to {}", path.display(), backup.display());
        Some(backup)
    } else {
        None
    };

    let mut temp_file = NamedTempFile::new_in(&dir).map_err(ConfigError::IoError)?;
    temp_file
        .write_all(contents.as_bytes())
        .map_err(ConfigError::IoError)?;
    temp_file.flush().map_err(ConfigError::IoError)?;
    temp_file
        .persist(path)
        .map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e.error,
        })?;

    Ok(backup)
}

/// Ensures a directory exists, creating it if necessary
fn ensure_directory_exists(path: &Path) -> ConfigResult<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| ConfigError::DirectoryCreationError {
            path: path.to_path_buf(),
            source: e,
        })?;
        log::info!("Created directory: {}", path.display());
    }
    Ok(())
}

/// Handles configuration file persistence
pub struct ConfigPersistence {
    config_path: PathBuf,
}

impl ConfigPersistence {
    /// Creates a new persistence handler for the given config file path
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Loads configuration from file
    ///
    /// If the file doesn't exist, returns the default config.
    /// If the file is empty or corrupted, returns an error.
    /// Validation problems are logged, not returned.
    pub fn load(&self) -> ConfigResult<Config> {
        if !self.config_path.exists() {
            log::info!(
                "Config file not found at {}, using defaults",
                self.config_path.display()
            );
            return Ok(Config::default());
        }

        let contents =
            fs::read_to_string(&self.config_path).map_err(|e| ConfigError::ReadError {
                path: self.config_path.clone(),
                source: e,
            })?;

        // An empty file is treated as corrupted rather than as defaults
        if contents.trim().is_empty() {
            return Err(ConfigError::ReadError {
                path: self.config_path.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "Config file is empty or contains only whitespace",
                ),
            });
        }

        let config: Config = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: self.config_path.clone(),
            source: e,
        })?;

        if config.version > CONFIG_VERSION {
            log::warn!(
                "Config version {} is newer than supported version {}, using it as-is",
                config.version,
                CONFIG_VERSION
            );
        }

        if let Err(errors) = config.validate() {
            log::warn!("Config validation warnings: {}", join_errors(&errors));
        }

        Ok(config)
    }

    /// Validates and saves configuration atomically, keeping a backup
    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        if let Err(errors) = config.validate() {
            return Err(ConfigError::ValidationError(join_errors(&errors)));
        }

        let toml_string = toml::to_string_pretty(config).map_err(ConfigError::SerializeError)?;
        write_atomic(&self.config_path, &toml_string, true)?;

        log::info!("Config saved to {}", self.config_path.display());
        Ok(())
    }
}
