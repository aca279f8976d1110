//! In-process configuration service backed by an [`IniDocument`]

use crate::document::IniDocument;
use crate::error::{RemoteOperation, ServiceError};
use crate::service::ConfigService;
use crate::setting::{RawSetting, RemovalTarget, Setting};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

/// A [`ConfigService`] that edits php.ini text held in memory
///
/// Failures can be injected per operation with [`MemoryService::fail_next`];
/// each injected failure fires once.
#[derive(Debug, Default)]
pub struct MemoryService {
    document: Mutex<IniDocument>,
    physical_path: Option<String>,
    failures: Mutex<HashSet<RemoteOperation>>,
    calls: Mutex<HashMap<RemoteOperation, usize>>,
}

impl MemoryService {
    pub fn new(document: IniDocument) -> Self {
        Self {
            document: Mutex::new(document),
            ..Self::default()
        }
    }

    pub fn from_text(text: &str) -> Self {
        Self::new(IniDocument::parse(text))
    }

    pub fn with_physical_path(mut self, path: impl Into<String>) -> Self {
        self.physical_path = Some(path.into());
        self
    }

    /// Makes the next call of `operation` fail
    pub fn fail_next(&self, operation: RemoteOperation) {
        lock(&self.failures).insert(operation);
    }

    /// Number of calls received for `operation`, failed ones included
    pub fn calls(&self, operation: RemoteOperation) -> usize {
        lock(&self.calls).get(&operation).copied().unwrap_or(0)
    }

    /// Current php.ini text
    pub fn text(&self) -> String {
        lock(&self.document).to_string()
    }

    pub fn document(&self) -> IniDocument {
        lock(&self.document).clone()
    }

    fn begin(&self, operation: RemoteOperation) -> Result<(), ServiceError> {
        *lock(&self.calls).entry(operation).or_insert(0) += 1;
        if lock(&self.failures).remove(&operation) {
            return Err(format!("injected failure during {}", operation).into());
        }
        Ok(())
    }
}

impl ConfigService for MemoryService {
    fn fetch_settings(&self) -> Result<Vec<RawSetting>, ServiceError> {
        self.begin(RemoteOperation::Fetch)?;
        Ok(lock(&self.document).to_raw_settings())
    }

    fn push_settings(&self, batch: &[Setting]) -> Result<(), ServiceError> {
        self.begin(RemoteOperation::Push)?;
        lock(&self.document).upsert(batch);
        Ok(())
    }

    fn remove_setting(&self, target: &RemovalTarget) -> Result<(), ServiceError> {
        self.begin(RemoteOperation::Remove)?;
        lock(&self.document).remove(target)?;
        Ok(())
    }

    fn physical_path(&self) -> Result<Option<String>, ServiceError> {
        self.begin(RemoteOperation::PhysicalPath)?;
        Ok(self.physical_path.clone())
    }
}

// A panic while holding one of these locks can not leave the data half
// written, so a poisoned lock is still usable.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
