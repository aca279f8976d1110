//! Runtime limits: a typed view over six well-known settings
//!
//! The projection reads values by name from an [`IniFile`] and writes them
//! back as one six-setting batch. Settings outside the list are never read
//! or written here.

use crate::engine::SettingsEngine;
use crate::error::{IniError, IniResult};
use crate::file::IniFile;
use crate::service::ConfigService;
use crate::setting::Setting;
use std::fmt;

/// Section every runtime limit is written to
pub const RUNTIME_LIMITS_SECTION: &str = "PHP";

/// The six runtime limits, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuntimeLimit {
    MaxExecutionTime,
    MaxInputTime,
    MemoryLimit,
    PostMaxSize,
    UploadMaxFilesize,
    MaxFileUploads,
}

/// How a runtime limit value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    Seconds,
    Bytes,
    Count,
}

/// A parsed runtime limit value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitValue {
    /// `-1`
    Unlimited,
    Seconds(u64),
    Bytes(u64),
    Count(u64),
}

impl RuntimeLimit {
    pub const ALL: [RuntimeLimit; 6] = [
        Self::MaxExecutionTime,
        Self::MaxInputTime,
        Self::MemoryLimit,
        Self::PostMaxSize,
        Self::UploadMaxFilesize,
        Self::MaxFileUploads,
    ];

    /// Canonical php.ini directive name
    pub fn name(&self) -> &'static str {
        match self {
            Self::MaxExecutionTime => "max_execution_time",
            Self::MaxInputTime => "max_input_time",
            Self::MemoryLimit => "memory_limit",
            Self::PostMaxSize => "post_max_size",
            Self::UploadMaxFilesize => "upload_max_filesize",
            Self::MaxFileUploads => "max_file_uploads",
        }
    }

    /// Slot of this limit in [`RuntimeLimit::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|limit| limit.name() == name)
    }

    pub fn kind(&self) -> LimitKind {
        match self {
            Self::MaxExecutionTime | Self::MaxInputTime => LimitKind::Seconds,
            Self::MemoryLimit | Self::PostMaxSize | Self::UploadMaxFilesize => LimitKind::Bytes,
            Self::MaxFileUploads => LimitKind::Count,
        }
    }

    /// Parses a value the way PHP reads this directive
    ///
    /// Byte sizes accept the `K`, `M` and `G` shorthand suffixes
    /// (case-insensitive, powers of 1024). `-1` means unlimited.
    pub fn parse_value(&self, value: &str) -> IniResult<LimitValue> {
        let text = value.trim();
        if text.is_empty() {
            return Err(IniError::invalid_setting(self.name(), "value must not be empty"));
        }
        if text == "-1" {
            return Ok(LimitValue::Unlimited);
        }

        let (digits, multiplier) = match self.kind() {
            LimitKind::Bytes => match text.char_indices().last() {
                Some((at, suffix)) if suffix.is_ascii_alphabetic() => {
                    let multiplier = match suffix.to_ascii_uppercase() {
                        'K' => 1u64 << 10,
                        'M' => 1 << 20,
                        'G' => 1 << 30,
                        other => {
                            return Err(IniError::invalid_setting(
                                self.name(),
                                format!("unknown size suffix '{}'", other),
                            ))
                        }
                    };
                    (&text[..at], multiplier)
                }
                _ => (text, 1),
            },
            LimitKind::Seconds | LimitKind::Count => (text, 1),
        };

        let number: u64 = digits.parse().map_err(|_| {
            IniError::invalid_setting(
                self.name(),
                format!("'{}' is not a non-negative whole number", value),
            )
        })?;
        let number = number.checked_mul(multiplier).ok_or_else(|| {
            IniError::invalid_setting(self.name(), format!("'{}' is too large", value))
        })?;

        Ok(match self.kind() {
            LimitKind::Seconds => LimitValue::Seconds(number),
            LimitKind::Bytes => LimitValue::Bytes(number),
            LimitKind::Count => LimitValue::Count(number),
        })
    }
}

impl fmt::Display for RuntimeLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Positional value slots for the six runtime limits
///
/// A slot is `None` when the file has no such setting; it is never filled
/// with a default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeLimits {
    slots: [Option<String>; 6],
}

impl RuntimeLimits {
    /// Reads each limit by exact name, first match in file order
    pub fn load(file: &IniFile) -> Self {
        let mut limits = Self::default();
        for limit in RuntimeLimit::ALL {
            limits.slots[limit.index()] = file
                .find_by_name(limit.name())
                .map(|entry| entry.value().to_string());
        }
        limits
    }

    pub fn get(&self, limit: RuntimeLimit) -> Option<&str> {
        self.slots[limit.index()].as_deref()
    }

    pub fn set(&mut self, limit: RuntimeLimit, value: Option<String>) {
        self.slots[limit.index()] = value;
    }

    pub fn slots(&self) -> &[Option<String>; 6] {
        &self.slots
    }

    pub fn iter(&self) -> impl Iterator<Item = (RuntimeLimit, Option<&str>)> + '_ {
        RuntimeLimit::ALL
            .into_iter()
            .map(move |limit| (limit, self.get(limit)))
    }

    /// Parsed value of a limit, `None` when the slot is unset
    pub fn parsed(&self, limit: RuntimeLimit) -> Option<IniResult<LimitValue>> {
        self.get(limit).map(|value| limit.parse_value(value))
    }

    /// Limits without a value, in fixed order
    pub fn unset(&self) -> impl Iterator<Item = RuntimeLimit> + '_ {
        self.iter()
            .filter(|(_, value)| value.is_none())
            .map(|(limit, _)| limit)
    }

    /// The six-setting batch that stores these values
    ///
    /// Always contains all six limits in [`RUNTIME_LIMITS_SECTION`]; an unset
    /// slot is written with an empty value. PHP reads an empty time or size
    /// limit as 0, which for `max_execution_time`, `max_input_time` and
    /// `post_max_size` means no limit at all. [`RuntimeLimits::unset`] lists
    /// the slots that will be written that way.
    pub fn to_batch(&self) -> Vec<Setting> {
        self.iter()
            .map(|(limit, value)| {
                Setting::new(
                    limit.name(),
                    value.unwrap_or_default(),
                    RUNTIME_LIMITS_SECTION,
                )
            })
            .collect()
    }
}

/// Editing state for the runtime limits
///
/// Edits go to a draft; the committed values only move forward when a save
/// succeeds, so a failed save keeps the draft for another attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeLimitsEditor {
    committed: RuntimeLimits,
    draft: RuntimeLimits,
}

impl RuntimeLimitsEditor {
    pub fn new(limits: RuntimeLimits) -> Self {
        Self {
            draft: limits.clone(),
            committed: limits,
        }
    }

    pub fn load(file: &IniFile) -> Self {
        Self::new(RuntimeLimits::load(file))
    }

    pub fn committed(&self) -> &RuntimeLimits {
        &self.committed
    }

    pub fn draft(&self) -> &RuntimeLimits {
        &self.draft
    }

    pub fn is_dirty(&self) -> bool {
        self.committed != self.draft
    }

    /// Sets a draft value after checking it parses for that limit
    pub fn set(&mut self, limit: RuntimeLimit, value: &str) -> IniResult<()> {
        limit.parse_value(value)?;
        self.draft.set(limit, Some(value.trim().to_string()));
        Ok(())
    }

    pub fn discard_changes(&mut self) {
        self.draft = self.committed.clone();
    }

    /// Marks the draft as saved
    pub fn commit(&mut self) {
        self.committed = self.draft.clone();
    }

    /// Saves the draft through the engine as one six-setting batch
    pub fn save<S: ConfigService>(&mut self, engine: &mut SettingsEngine<S>) -> IniResult<()> {
        engine.add_or_update_batch(&self.draft.to_batch())?;
        self.commit();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_in_order() {
        let names: Vec<_> = RuntimeLimit::ALL.iter().map(RuntimeLimit::name).collect();
        assert_eq!(
            names,
            vec![
                "max_execution_time",
                "max_input_time",
                "memory_limit",
                "post_max_size",
                "upload_max_filesize",
                "max_file_uploads",
            ]
        );
        for (i, limit) in RuntimeLimit::ALL.iter().enumerate() {
            assert_eq!(limit.index(), i);
            assert_eq!(RuntimeLimit::from_name(limit.name()), Some(*limit));
        }
    }

    #[test]
    fn test_parse_bytes() {
        let limit = RuntimeLimit::MemoryLimit;
        assert_eq!(limit.parse_value("128M").ok(), Some(LimitValue::Bytes(128 << 20)));
        assert_eq!(limit.parse_value("2g").ok(), Some(LimitValue::Bytes(2 << 30)));
        assert_eq!(limit.parse_value("512K").ok(), Some(LimitValue::Bytes(512 << 10)));
        assert_eq!(limit.parse_value("1024").ok(), Some(LimitValue::Bytes(1024)));
        assert_eq!(limit.parse_value("-1").ok(), Some(LimitValue::Unlimited));
        assert!(limit.parse_value("12X").is_err());
        assert!(limit.parse_value("M").is_err());
        assert!(limit.parse_value("").is_err());
    }

    #[test]
    fn test_parse_seconds_and_counts() {
        assert_eq!(
            RuntimeLimit::MaxExecutionTime.parse_value("30").ok(),
            Some(LimitValue::Seconds(30))
        );
        assert!(RuntimeLimit::MaxExecutionTime.parse_value("30M").is_err());
        assert!(RuntimeLimit::MaxExecutionTime.parse_value("-5").is_err());
        assert_eq!(
            RuntimeLimit::MaxFileUploads.parse_value("20").ok(),
            Some(LimitValue::Count(20))
        );
    }

    #[test]
    fn test_batch_always_six_in_php_section() {
        let mut limits = RuntimeLimits::default();
        limits.set(RuntimeLimit::MemoryLimit, Some("256M".into()));

        let batch = limits.to_batch();
        assert_eq!(batch.len(), 6);
        assert!(batch.iter().all(|s| s.section == RUNTIME_LIMITS_SECTION));
        assert_eq!(batch[2], Setting::new("memory_limit", "256M", "PHP"));
        assert_eq!(batch[0].value, "");

        let unset: Vec<_> = limits.unset().collect();
        assert_eq!(unset.len(), 5);
        assert!(!unset.contains(&RuntimeLimit::MemoryLimit));
        assert_eq!(unset[0], RuntimeLimit::MaxExecutionTime);
    }

    #[test]
    fn test_editor_rejects_bad_value() {
        let mut editor = RuntimeLimitsEditor::default();
        assert!(editor.set(RuntimeLimit::PostMaxSize, "lots").is_err());
        assert!(!editor.is_dirty());

        editor.set(RuntimeLimit::PostMaxSize, "8M").expect("valid");
        assert!(editor.is_dirty());
        editor.discard_changes();
        assert!(!editor.is_dirty());
    }
}
