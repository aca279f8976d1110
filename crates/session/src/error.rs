//! Error types for session operations

use phpmanager_core::IniError;
use thiserror::Error;

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors that can occur while driving a settings session
#[derive(Debug, Error)]
pub enum SessionError {
    /// The model or the configuration service rejected the operation
    #[error(transparent)]
    Ini(#[from] IniError),

    /// A fetch finished after a newer fetch, mutation or invalidation
    #[error("Fetch result from generation {ticket} discarded, session is at generation {current}")]
    Superseded { ticket: u64, current: u64 },

    /// The blocking task running a service call panicked or was cancelled
    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

impl SessionError {
    /// The model error behind this failure, if any
    pub fn as_ini(&self) -> Option<&IniError> {
        match self {
            Self::Ini(err) => Some(err),
            _ => None,
        }
    }
}
