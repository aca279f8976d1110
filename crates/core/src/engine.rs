//! Lookup/update engine
//!
//! [`SettingsEngine`] pairs an [`IniFile`] snapshot with the service it came
//! from. Every mutation is validated locally, sent to the service, and only
//! applied to the snapshot once the service accepted it. A failed call leaves
//! the snapshot untouched.

use crate::error::{IniError, IniResult, RemoteOperation};
use crate::file::IniFile;
use crate::service::ConfigService;
use crate::setting::{Entry, Setting, SettingId};

/// Validates every setting of a batch, stopping at the first failure
pub fn validate_batch(batch: &[Setting]) -> IniResult<()> {
    batch.iter().try_for_each(Setting::validate)
}

/// Fetches and parses the service's current settings
pub fn fetch_file<S: ConfigService + ?Sized>(service: &S) -> IniResult<IniFile> {
    let raw = service
        .fetch_settings()
        .map_err(|e| IniError::remote(RemoteOperation::Fetch, e))?;
    IniFile::from_raw(raw)
}

/// Single-writer engine over one loaded php.ini snapshot
pub struct SettingsEngine<S> {
    service: S,
    file: IniFile,
}

impl<S: ConfigService> SettingsEngine<S> {
    /// Fetches the current settings and builds an engine around them
    pub fn load(service: S) -> IniResult<Self> {
        let file = fetch_file(&service)?;
        Ok(Self { service, file })
    }

    /// Wraps an already loaded snapshot
    pub fn with_file(service: S, file: IniFile) -> Self {
        Self { service, file }
    }

    pub fn file(&self) -> &IniFile {
        &self.file
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn into_parts(self) -> (S, IniFile) {
        (self.service, self.file)
    }

    /// Replaces the snapshot with a fresh fetch
    ///
    /// On failure the previous snapshot is kept.
    pub fn refresh(&mut self) -> IniResult<()> {
        self.file = fetch_file(&self.service)?;
        Ok(())
    }

    /// See [`IniFile::find_by_name`] for the duplicate tie-break
    pub fn find_by_name(&self, name: &str) -> Option<&Entry> {
        self.file.find_by_name(name)
    }

    /// Adds or updates a batch of settings as one unit
    ///
    /// Validation failures are reported before the service is contacted.
    /// The snapshot only changes after the service acknowledged the batch.
    pub fn add_or_update_batch(&mut self, batch: &[Setting]) -> IniResult<()> {
        validate_batch(batch)?;
        if batch.is_empty() {
            return Ok(());
        }

        self.service
            .push_settings(batch)
            .map_err(|e| IniError::remote(RemoteOperation::Push, e))?;

        self.file.apply_batch(batch);
        log::info!("Pushed {} php.ini settings", batch.len());
        Ok(())
    }

    pub fn add_or_update(&mut self, setting: Setting) -> IniResult<()> {
        self.add_or_update_batch(std::slice::from_ref(&setting))
    }

    /// Changes the value of one existing entry
    ///
    /// Only the effective entry for a name can be edited: updates are keyed
    /// by name, so editing a shadowed duplicate would silently change the
    /// earlier one instead.
    pub fn edit(&mut self, id: SettingId, value: impl Into<String>) -> IniResult<()> {
        let setting = edit_request(&self.file, id, value.into())?;
        self.add_or_update(setting)
    }

    /// Removes exactly one entry
    pub fn remove(&mut self, id: SettingId) -> IniResult<Setting> {
        let target = self.file.removal_target(id)?;

        self.service
            .remove_setting(&target)
            .map_err(|e| IniError::remote(RemoteOperation::Remove, e))?;

        let removed = self.file.remove(id)?;
        log::info!("Removed php.ini setting {}", removed.setting());
        Ok(target.setting)
    }

    /// Where the service keeps php.ini, if it says
    pub fn physical_path(&self) -> IniResult<Option<String>> {
        self.service
            .physical_path()
            .map_err(|e| IniError::remote(RemoteOperation::PhysicalPath, e))
    }
}

/// Builds the single-setting update that edits entry `id`
pub fn edit_request(file: &IniFile, id: SettingId, value: String) -> IniResult<Setting> {
    let entry = file
        .get(id)
        .ok_or_else(|| IniError::NotFound(format!("setting {}", id)))?;
    if file.is_shadowed(id) {
        return Err(IniError::invalid_setting(
            entry.name(),
            "an earlier directive with the same name takes precedence; remove this duplicate instead",
        ));
    }
    Ok(Setting::new(entry.name(), value, entry.section()))
}
