//! In-memory php.ini model
//!
//! [`IniFile`] keeps settings in exactly the order the configuration service
//! delivered them. Order matters twice: it is the order a human reads the file
//! in, and it is the tie-break whenever a name occurs more than once.

use crate::error::{IniError, IniResult};
use crate::search::{SearchFilter, SearchState};
use crate::setting::{Entry, RawSetting, RemovalTarget, Setting, SettingId};

/// Ordered collection of php.ini settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniFile {
    entries: Vec<Entry>,
    next_id: u64,
}

impl IniFile {
    /// Creates an empty file
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a file from raw service data
    ///
    /// Any malformed entry fails the whole load; nothing is partially
    /// populated.
    pub fn from_raw<I>(raw: I) -> IniResult<Self>
    where
        I: IntoIterator<Item = RawSetting>,
    {
        let settings = raw
            .into_iter()
            .enumerate()
            .map(|(index, raw)| raw.into_setting(index))
            .collect::<IniResult<Vec<_>>>()?;

        log::debug!("Loaded {} php.ini settings", settings.len());
        Ok(Self::from_settings(settings))
    }

    /// Builds a file from a JSON array of raw settings
    pub fn from_json(payload: &str) -> IniResult<Self> {
        let raw: Vec<RawSetting> = serde_json::from_str(payload).map_err(|e| {
            IniError::InvalidConfigData(format!("payload is not a list of settings: {}", e))
        })?;
        Self::from_raw(raw)
    }

    /// Builds a file from already validated settings
    pub fn from_settings<I>(settings: I) -> Self
    where
        I: IntoIterator<Item = Setting>,
    {
        let mut file = Self::new();
        for setting in settings {
            file.push(setting);
        }
        file
    }

    /// Serializes back to raw service data, preserving order
    pub fn to_raw(&self) -> Vec<RawSetting> {
        self.settings().map(RawSetting::from).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in file order
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// All settings in file order
    pub fn settings(&self) -> impl Iterator<Item = &Setting> + '_ {
        self.entries.iter().map(Entry::setting)
    }

    pub fn get(&self, id: SettingId) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    /// Position of an entry in file order
    pub fn position(&self, id: SettingId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id() == id)
    }

    /// Finds "the" setting with the given name
    ///
    /// The name is compared case-sensitively. When several entries share the
    /// name, the earliest one in file order wins; later duplicates are
    /// shadowed. Absence is `None`, never an error.
    pub fn find_by_name(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.name() == name)
    }

    /// Every entry with the given name, earliest first
    pub fn find_all_by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Entry> + 'a {
        self.entries.iter().filter(move |entry| entry.name() == name)
    }

    /// Whether an earlier entry with the same name hides this one from
    /// [`IniFile::find_by_name`]
    pub fn is_shadowed(&self, id: SettingId) -> bool {
        match self.get(id) {
            Some(entry) => self
                .find_by_name(entry.name())
                .is_some_and(|first| first.id() != id),
            None => false,
        }
    }

    /// Lazily yields entries matching a search filter
    pub fn filter<'a>(&'a self, filter: &'a SearchFilter) -> impl Iterator<Item = &'a Entry> + 'a {
        self.entries
            .iter()
            .filter(move |entry| filter.matches(entry.setting()))
    }

    /// Entries admitted by the current search state, in file order
    pub fn visible<'a>(&'a self, state: &'a SearchState) -> impl Iterator<Item = &'a Entry> + 'a {
        self.entries
            .iter()
            .filter(move |entry| state.admits(entry.setting()))
    }

    /// Distinct non-empty section names, first-seen order, case-sensitive
    pub fn sections(&self) -> Vec<&str> {
        let mut sections: Vec<&str> = Vec::new();
        for entry in &self.entries {
            let section = entry.section();
            if !section.is_empty() && !sections.contains(&section) {
                sections.push(section);
            }
        }
        sections
    }

    /// Describes an entry so the service can remove exactly that instance
    pub fn removal_target(&self, id: SettingId) -> IniResult<RemovalTarget> {
        let position = self
            .position(id)
            .ok_or_else(|| IniError::NotFound(format!("setting {}", id)))?;
        let setting = self.entries[position].setting();
        let occurrence = self.entries[..position]
            .iter()
            .filter(|entry| entry.setting() == setting)
            .count();
        Ok(RemovalTarget {
            setting: setting.clone(),
            occurrence,
        })
    }

    /// Applies an add-or-update batch to this snapshot only
    ///
    /// Existing names (earliest match) get their value replaced in place, with
    /// position and section untouched; unknown names are appended with the
    /// section they carry. Callers are expected to have pushed the batch to
    /// the configuration service first.
    pub fn apply_batch(&mut self, batch: &[Setting]) {
        for setting in batch {
            match self
                .entries
                .iter_mut()
                .find(|entry| entry.name() == setting.name)
            {
                Some(entry) => entry.set_value(&setting.value),
                None => {
                    self.push(setting.clone());
                }
            }
        }
        log::debug!("Applied batch of {} settings", batch.len());
    }

    /// Removes one entry from this snapshot only
    pub fn remove(&mut self, id: SettingId) -> IniResult<Entry> {
        let position = self
            .position(id)
            .ok_or_else(|| IniError::NotFound(format!("setting {}", id)))?;
        Ok(self.entries.remove(position))
    }

    fn push(&mut self, setting: Setting) -> SettingId {
        let id = SettingId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry::new(id, setting));
        id
    }
}
