//! Setting value objects
//!
//! A [`Setting`] is a plain `name`/`value`/`section` triple. Once a setting
//! belongs to an [`crate::IniFile`] it is wrapped in an [`Entry`], which adds
//! the [`SettingId`] that identifies that particular instance even when other
//! entries share its name.

use crate::error::{IniError, IniResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single php.ini directive
///
/// Values are always strings at this layer; `"On"`, `"128M"` and `"30"` are
/// stored exactly as written.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Setting {
    pub name: String,
    pub value: String,
    /// Enclosing `[section]`, empty for directives before the first header
    #[serde(default)]
    pub section: String,
}

impl Setting {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        section: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            section: section.into(),
        }
    }

    /// Whether the setting sits under a `[section]` header
    pub fn has_section(&self) -> bool {
        !self.section.is_empty()
    }

    /// Checks that the setting can be written back to a php.ini file
    ///
    /// Runs before any remote call is attempted.
    pub fn validate(&self) -> IniResult<()> {
        let name = self.name.as_str();
        if name.trim().is_empty() {
            return Err(IniError::invalid_setting(name, "name must not be empty"));
        }
        if name.trim() != name {
            return Err(IniError::invalid_setting(
                name,
                "name must not have surrounding whitespace",
            ));
        }
        if name.contains('=') {
            return Err(IniError::invalid_setting(name, "name must not contain '='"));
        }
        if name.starts_with([';', '#', '[']) {
            return Err(IniError::invalid_setting(
                name,
                "name must not start with a comment or section marker",
            ));
        }
        if self.value.trim() != self.value {
            return Err(IniError::invalid_setting(
                name,
                "value must not have surrounding whitespace",
            ));
        }
        if self.section.contains(['[', ']']) || self.section.trim() != self.section {
            return Err(IniError::invalid_setting(
                name,
                format!("section '{}' is not a valid section name", self.section),
            ));
        }
        for (field, text) in [
            ("name", name),
            ("value", self.value.as_str()),
            ("section", self.section.as_str()),
        ] {
            if text.contains(['\n', '\r']) {
                return Err(IniError::invalid_setting(
                    name,
                    format!("{} must be a single line", field),
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.value)?;
        if self.has_section() {
            write!(f, " [{}]", self.section)?;
        }
        Ok(())
    }
}

/// A setting as delivered by the configuration service
///
/// Every field is optional on the wire so that a malformed payload can be
/// reported precisely instead of failing deserialization wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSetting {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

impl RawSetting {
    pub fn new(name: &str, value: &str, section: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            value: Some(value.to_string()),
            section: Some(section.to_string()),
        }
    }

    /// Converts into a [`Setting`], `index` being the position in the payload
    pub fn into_setting(self, index: usize) -> IniResult<Setting> {
        let name = self
            .name
            .ok_or_else(|| IniError::InvalidConfigData(format!("entry {}: missing name", index)))?;
        if name.trim().is_empty() {
            return Err(IniError::InvalidConfigData(format!(
                "entry {}: name is empty",
                index
            )));
        }
        let value = self.value.ok_or_else(|| {
            IniError::InvalidConfigData(format!("entry {}: missing value for '{}'", index, name))
        })?;

        Ok(Setting {
            name,
            value,
            section: self.section.unwrap_or_default(),
        })
    }
}

impl From<&Setting> for RawSetting {
    fn from(setting: &Setting) -> Self {
        Self {
            name: Some(setting.name.clone()),
            value: Some(setting.value.clone()),
            section: Some(setting.section.clone()),
        }
    }
}

/// Identity of one entry inside one [`crate::IniFile`]
///
/// Ids are assigned in load order and never reused within a file, so a
/// removed entry's id can not silently start pointing at its duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SettingId(pub(crate) u64);

impl fmt::Display for SettingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A setting located inside a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    id: SettingId,
    setting: Setting,
}

impl Entry {
    pub(crate) fn new(id: SettingId, setting: Setting) -> Self {
        Self { id, setting }
    }

    pub fn id(&self) -> SettingId {
        self.id
    }

    pub fn setting(&self) -> &Setting {
        &self.setting
    }

    pub fn name(&self) -> &str {
        &self.setting.name
    }

    pub fn value(&self) -> &str {
        &self.setting.value
    }

    pub fn section(&self) -> &str {
        &self.setting.section
    }

    pub(crate) fn set_value(&mut self, value: &str) {
        self.setting.value = value.to_string();
    }
}

/// Identifies one directive for removal on the service side
///
/// `setting` is what the caller saw; `occurrence` counts the earlier entries
/// carrying the same name, value and section. Inserts never reorder entries
/// with equal content, so the pair names the same line on both sides no
/// matter where new settings were placed. A service must refuse the removal
/// when no such line exists any more.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalTarget {
    pub setting: Setting,
    pub occurrence: usize,
}

impl fmt::Display for RemovalTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (occurrence {})", self.setting, self.occurrence + 1)
    }
}
