//! User-facing message table
//!
//! Messages live in config so they can be reworded or translated without a
//! rebuild. Callers receive the table explicitly; there is no global lookup.

use crate::validation::{ConfigSection, ValidationError, Validator};
use phpmanager_core::{ErrorKind, IniError};
use serde::{Deserialize, Serialize};

/// Placeholder replaced by a setting name
pub const NAME_PLACEHOLDER: &str = "{name}";

/// Placeholder replaced by a file path
pub const PATH_PLACEHOLDER: &str = "{path}";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MessageTable {
    /// Shown when the php.ini file cannot be written
    pub read_only: String,

    /// Asked before a setting is removed; may contain `{name}`
    pub confirm_delete: String,

    /// Shown when php.ini does not exist; must contain `{path}`
    pub missing_ini: String,

    /// Prefix for failures reported by the configuration service
    pub remote_failure: String,

    /// Prefix for references to settings that no longer exist
    pub not_found: String,

    /// Prefix for settings rejected before any write
    pub invalid_setting: String,

    /// Prefix for php.ini content that cannot be loaded
    pub invalid_data: String,
}

impl MessageTable {
    /// Delete confirmation for the named setting
    pub fn confirm_delete_for(&self, name: &str) -> String {
        self.confirm_delete.replace(NAME_PLACEHOLDER, name)
    }

    /// Missing-file notice for the given path
    pub fn missing_ini_for(&self, path: &str) -> String {
        self.missing_ini.replace(PATH_PLACEHOLDER, path)
    }

    /// Message prefix for an error classification
    pub fn for_kind(&self, kind: ErrorKind) -> &str {
        match kind {
            ErrorKind::InvalidConfigData => &self.invalid_data,
            ErrorKind::InvalidSetting => &self.invalid_setting,
            ErrorKind::RemoteOperationFailed => &self.remote_failure,
            ErrorKind::NotFound => &self.not_found,
        }
    }

    /// Full user-facing text for an error: the table's prefix plus detail
    pub fn describe(&self, error: &IniError) -> String {
        format!("{} ({})", self.for_kind(error.kind()), error)
    }
}

impl Default for MessageTable {
    fn default() -> Self {
        Self {
            read_only: "The php.ini file is read-only; settings can be viewed but not changed."
                .to_string(),
            confirm_delete: "Are you sure you want to remove the setting {name}?".to_string(),
            missing_ini: "The php.ini file {path} does not exist.".to_string(),
            remote_failure: "The configuration service could not complete the request."
                .to_string(),
            not_found: "The setting no longer exists. Refresh and try again.".to_string(),
            invalid_setting: "The setting is not valid.".to_string(),
            invalid_data: "The php.ini file could not be read.".to_string(),
        }
    }
}

impl ConfigSection for MessageTable {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let results = vec![
            Validator::not_empty(&self.read_only, "messages.read_only"),
            Validator::not_empty(&self.confirm_delete, "messages.confirm_delete"),
            Validator::contains_placeholder(
                &self.missing_ini,
                PATH_PLACEHOLDER,
                "messages.missing_ini",
            ),
            Validator::not_empty(&self.remote_failure, "messages.remote_failure"),
            Validator::not_empty(&self.not_found, "messages.not_found"),
            Validator::not_empty(&self.invalid_setting, "messages.invalid_setting"),
            Validator::not_empty(&self.invalid_data, "messages.invalid_data"),
        ];
        Validator::collect_errors(results)
    }

    fn merge(&mut self, other: Self) {
        *self = other;
    }

    fn section_name(&self) -> &'static str {
        "messages"
    }
}
