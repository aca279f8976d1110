// FILE: crates/cli/src/store.rs

use anyhow::{bail, Context, Result};
use phpmanager_config::{write_atomic, MessageTable};
use phpmanager_core::MemoryService;
use phpmanager_session::{SessionError, SettingsSession};
use std::path::{Path, PathBuf};

/// A php.ini on the local disk, served through an in-memory service
///
/// Every command loads the file, works on a session over a
/// [`MemoryService`], and writes the service's text back atomically.
pub struct IniStore {
    path: PathBuf,
    keep_backup: bool,
}

impl IniStore {
    pub fn new(path: impl Into<PathBuf>, keep_backup: bool) -> Self {
        Self {
            path: path.into(),
            keep_backup,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Whether the file exists but cannot be written
    pub fn is_read_only(&self) -> bool {
        std::fs::metadata(&self.path)
            .map(|meta| meta.permissions().readonly())
            .unwrap_or(false)
    }

    /// Loads the file into a service; missing files are reported with `messages`
    pub fn load(&self, messages: &MessageTable) -> Result<MemoryService> {
        if !self.exists() {
            bail!(messages.missing_ini_for(&self.path.display().to_string()));
        }
        let text = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        log::debug!("Loaded {} bytes from {}", text.len(), self.path.display());

        Ok(MemoryService::from_text(&text).with_physical_path(self.path.display().to_string()))
    }

    /// Opens a session over the file's current content
    pub async fn open_session(
        &self,
        messages: &MessageTable,
    ) -> Result<SettingsSession<MemoryService>> {
        let service = self.load(messages)?;
        SettingsSession::open(service)
            .await
            .map_err(|e| explain(messages, e))
    }

    /// Like [`IniStore::open_session`], but refuses files that cannot be written
    pub async fn open_for_write(
        &self,
        messages: &MessageTable,
    ) -> Result<SettingsSession<MemoryService>> {
        if self.is_read_only() {
            bail!(messages.read_only.clone());
        }
        self.open_session(messages).await
    }

    /// Writes the session's text back to disk
    pub fn persist(&self, session: &SettingsSession<MemoryService>) -> Result<Option<PathBuf>> {
        let text = session.service().text();
        let backup = write_atomic(&self.path, &text, self.keep_backup)
            .with_context(|| format!("Failed to save {}", self.path.display()))?;
        log::info!("Saved {}", self.path.display());
        Ok(backup)
    }
}

/// Turns a session failure into the configured user-facing message
pub fn explain(messages: &MessageTable, err: SessionError) -> anyhow::Error {
    match err.as_ini() {
        Some(ini) => anyhow::anyhow!(messages.describe(ini)),
        None => anyhow::Error::new(err),
    }
}
