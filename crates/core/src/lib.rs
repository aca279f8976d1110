//! php.ini configuration model and settings engine
//!
//! This crate turns the settings of a `php.ini` file into an ordered,
//! searchable model and reconciles edits with the service that owns the
//! file.
//!
//! # Architecture
//!
//! - **[`Setting`] / [`Entry`]**: name, value and section of one directive; an
//!   entry additionally carries the id of that instance inside a file
//! - **[`IniFile`]**: settings in service order, duplicate names allowed,
//!   earliest match wins on lookup
//! - **[`SettingsEngine`]**: validates, pushes to a [`ConfigService`], and only
//!   then updates the local snapshot
//! - **[`RuntimeLimits`]**: typed projection of six well-known limits
//! - **[`IniDocument`]**: lossless php.ini text codec used on the service side
//!
//! The crate performs no I/O of its own and never blocks on anything but the
//! service it is handed.
//!
//! # Example
//!
//! ```rust
//! use phpmanager_core::{MemoryService, RuntimeLimit, RuntimeLimitsEditor, SettingsEngine};
//!
//! let service = MemoryService::from_text("[PHP]\nmemory_limit = 128M\n");
//! let mut engine = SettingsEngine::load(service).expect("service is reachable");
//!
//! let mut limits = RuntimeLimitsEditor::load(engine.file());
//! assert_eq!(limits.draft().get(RuntimeLimit::MemoryLimit), Some("128M"));
//!
//! limits.set(RuntimeLimit::MemoryLimit, "256M").expect("valid size");
//! limits.save(&mut engine).expect("push accepted");
//! assert!(engine.service().text().contains("memory_limit = 256M"));
//! ```

mod document;
mod engine;
mod error;
mod file;
mod grouping;
mod limits;
mod memory;
mod search;
mod service;
mod setting;

pub use document::IniDocument;
pub use engine::{edit_request, fetch_file, validate_batch, SettingsEngine};
pub use error::{ErrorKind, ErrorSeverity, IniError, IniResult, RemoteOperation, ServiceError};
pub use file::IniFile;
pub use grouping::{group_entries, GroupBy, Grouped, SettingGroup};
pub use limits::{
    LimitKind, LimitValue, RuntimeLimit, RuntimeLimits, RuntimeLimitsEditor,
    RUNTIME_LIMITS_SECTION,
};
pub use memory::MemoryService;
pub use search::{SearchField, SearchFilter, SearchRequest, SearchState};
pub use service::ConfigService;
pub use setting::{Entry, RawSetting, RemovalTarget, Setting, SettingId};
