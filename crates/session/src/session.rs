//! Async orchestration over a synchronous configuration service

use crate::error::{SessionError, SessionResult};
use phpmanager_core::{
    edit_request, fetch_file, validate_batch, ConfigService, IniError, IniFile, IniResult,
    RemoteOperation, RuntimeLimitsEditor, Setting, SettingId,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Token tying a fetch result to the moment the fetch started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// One loaded php.ini, shared between readers and a single writer
///
/// Readers take an `Arc` of the current snapshot and are never blocked by a
/// mutation in flight. Mutations run one at a time; each swaps in a new
/// snapshot only after the service acknowledged it.
///
/// Every fetch, mutation and [`SettingsSession::invalidate`] advances the
/// generation. A fetch result is applied only if no newer generation started
/// in the meantime.
pub struct SettingsSession<S> {
    service: Arc<S>,
    snapshot: RwLock<Arc<IniFile>>,
    generation: AtomicU64,
    mutation: tokio::sync::Mutex<()>,
}

impl<S> SettingsSession<S>
where
    S: ConfigService + 'static,
{
    /// Creates a session with an empty snapshot
    pub fn new(service: S) -> Self {
        Self::from_arc(Arc::new(service))
    }

    pub fn from_arc(service: Arc<S>) -> Self {
        Self {
            service,
            snapshot: RwLock::new(Arc::new(IniFile::new())),
            generation: AtomicU64::new(0),
            mutation: tokio::sync::Mutex::new(()),
        }
    }

    /// Creates a session and loads the current settings
    pub async fn open(service: S) -> SessionResult<Self> {
        let session = Self::new(service);
        session.refresh().await?;
        Ok(session)
    }

    pub fn service(&self) -> &Arc<S> {
        &self.service
    }

    /// Last known good snapshot
    pub fn snapshot(&self) -> Arc<IniFile> {
        // the lock only ever guards a whole Arc swap, so poisoning can not
        // expose a partial update
        let guard = self
            .snapshot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&*guard)
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Starts a new generation; results of older fetches will be discarded
    pub fn invalidate(&self) {
        let generation = self.advance();
        log::debug!("Session invalidated, now at generation {}", generation);
    }

    /// Marks the start of a fetch
    pub fn begin_fetch(&self) -> FetchTicket {
        FetchTicket {
            generation: self.advance(),
        }
    }

    /// Applies a fetch result if its ticket is still current
    pub fn complete_fetch(
        &self,
        ticket: FetchTicket,
        result: IniResult<IniFile>,
    ) -> SessionResult<Arc<IniFile>> {
        let file = result?;
        let mut guard = self
            .snapshot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let current = self.generation();
        if ticket.generation != current {
            log::warn!(
                "Discarding fetch from generation {} (current {})",
                ticket.generation,
                current
            );
            return Err(SessionError::Superseded {
                ticket: ticket.generation,
                current,
            });
        }

        let file = Arc::new(file);
        *guard = Arc::clone(&file);
        log::debug!(
            "Snapshot replaced with {} settings at generation {}",
            file.len(),
            current
        );
        Ok(file)
    }

    /// Fetches the service's settings and replaces the snapshot
    pub async fn refresh(&self) -> SessionResult<Arc<IniFile>> {
        let ticket = self.begin_fetch();
        let result = self.call(|service| fetch_file(service)).await?;
        self.complete_fetch(ticket, result)
    }

    /// Adds or updates a batch; see [`phpmanager_core::SettingsEngine::add_or_update_batch`]
    pub async fn add_or_update_batch(&self, batch: Vec<Setting>) -> SessionResult<Arc<IniFile>> {
        validate_batch(&batch)?;
        let _writer = self.mutation.lock().await;
        if batch.is_empty() {
            return Ok(self.snapshot());
        }

        let pushed = batch.clone();
        self.call(move |service| {
            service
                .push_settings(&pushed)
                .map_err(|e| IniError::remote(RemoteOperation::Push, e))
        })
        .await??;

        let updated = self.swap(|file| {
            file.apply_batch(&batch);
            Ok(())
        })?;
        log::info!("Pushed {} php.ini settings", batch.len());
        Ok(updated)
    }

    /// Changes the value of the entry `id` in the current snapshot
    pub async fn edit(&self, id: SettingId, value: impl Into<String>) -> SessionResult<Arc<IniFile>> {
        let setting = edit_request(&self.snapshot(), id, value.into())?;
        self.add_or_update_batch(vec![setting]).await
    }

    /// Removes exactly the entry `id`
    pub async fn remove(&self, id: SettingId) -> SessionResult<Setting> {
        let _writer = self.mutation.lock().await;
        let target = self.snapshot().removal_target(id)?;

        let sent = target.clone();
        self.call(move |service| {
            service
                .remove_setting(&sent)
                .map_err(|e| IniError::remote(RemoteOperation::Remove, e))
        })
        .await??;

        self.swap(|file| file.remove(id).map(|_| ()))?;
        log::info!("Removed php.ini setting {}", target.setting);
        Ok(target.setting)
    }

    /// Editor for the runtime limits of the current snapshot
    pub fn runtime_limits(&self) -> RuntimeLimitsEditor {
        RuntimeLimitsEditor::load(&self.snapshot())
    }

    /// Saves the editor's draft as one six-setting batch
    ///
    /// The draft is committed only when the push succeeds.
    pub async fn save_runtime_limits(&self, editor: &mut RuntimeLimitsEditor) -> SessionResult<()> {
        self.add_or_update_batch(editor.draft().to_batch()).await?;
        editor.commit();
        Ok(())
    }

    /// Location of php.ini on the server, if the service knows it
    pub async fn physical_path(&self) -> SessionResult<Option<String>> {
        let path = self
            .call(|service| {
                service
                    .physical_path()
                    .map_err(|e| IniError::remote(RemoteOperation::PhysicalPath, e))
            })
            .await??;
        Ok(path)
    }

    fn advance(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Builds the next snapshot from a copy of the current one and swaps it in
    fn swap<F>(&self, change: F) -> SessionResult<Arc<IniFile>>
    where
        F: FnOnce(&mut IniFile) -> IniResult<()>,
    {
        let mut guard = self
            .snapshot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut next = IniFile::clone(&guard);
        change(&mut next)?;

        let next = Arc::new(next);
        *guard = Arc::clone(&next);
        // fetches started before this mutation would overwrite it
        self.advance();
        Ok(next)
    }

    /// Runs a blocking service call off the async executor
    async fn call<T, F>(&self, f: F) -> SessionResult<T>
    where
        F: FnOnce(&S) -> T + Send + 'static,
        T: Send + 'static,
    {
        let service = Arc::clone(&self.service);
        tokio::task::spawn_blocking(move || f(&service))
            .await
            .map_err(|e| SessionError::TaskFailed(e.to_string()))
    }
}
