//! Error types for the php.ini model and engine
//!
//! Errors fall into four families:
//! - **InvalidConfigData**: raw settings delivered by the service are malformed
//! - **InvalidSetting**: a caller-supplied setting fails local validation
//! - **RemoteOperationFailed**: the configuration service rejected or failed a call
//! - **NotFound**: a setting referenced by id or position is no longer present
//!
//! Every failing mutation leaves the in-memory model exactly as it was.

use std::fmt;
use thiserror::Error;

/// Boxed error returned by [`crate::ConfigService`] implementations
pub type ServiceError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for model and engine operations
pub type IniResult<T> = Result<T, IniError>;

/// Remote call that produced a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOperation {
    Fetch,
    Push,
    Remove,
    PhysicalPath,
}

impl fmt::Display for RemoteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch => write!(f, "fetch settings"),
            Self::Push => write!(f, "push settings"),
            Self::Remove => write!(f, "remove setting"),
            Self::PhysicalPath => write!(f, "get physical path"),
        }
    }
}

/// Broad classification used to pick a user-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidConfigData,
    InvalidSetting,
    RemoteOperationFailed,
    NotFound,
}

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// The same call may succeed if issued again
    Recoverable,
    /// The caller must change its input or reload before retrying
    UserIntervention,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recoverable => write!(f, "Recoverable"),
            Self::UserIntervention => write!(f, "UserIntervention"),
        }
    }
}

/// Main error type for php.ini operations
#[derive(Error, Debug)]
pub enum IniError {
    /// Raw settings data is malformed; the whole load is rejected
    #[error("Invalid configuration data: {0}")]
    InvalidConfigData(String),

    /// A setting failed local validation before any remote call
    #[error("Invalid setting '{name}': {reason}")]
    InvalidSetting { name: String, reason: String },

    /// The configuration service failed to complete a call
    #[error("Remote operation '{operation}' failed: {source}")]
    RemoteOperationFailed {
        operation: RemoteOperation,
        #[source]
        source: ServiceError,
    },

    /// A referenced setting is not in the current snapshot
    #[error("Setting not found: {0}")]
    NotFound(String),
}

impl IniError {
    /// Creates an `InvalidSetting` error
    pub fn invalid_setting(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Wraps a service failure for the given operation
    pub fn remote(operation: RemoteOperation, source: ServiceError) -> Self {
        Self::RemoteOperationFailed { operation, source }
    }

    /// Returns the classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidConfigData(_) => ErrorKind::InvalidConfigData,
            Self::InvalidSetting { .. } => ErrorKind::InvalidSetting,
            Self::RemoteOperationFailed { .. } => ErrorKind::RemoteOperationFailed,
            Self::NotFound(_) => ErrorKind::NotFound,
        }
    }

    /// Returns the severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::RemoteOperationFailed { .. } => ErrorSeverity::Recoverable,
            _ => ErrorSeverity::UserIntervention,
        }
    }

    /// Whether resubmitting the identical request could succeed
    ///
    /// The engine never retries on its own; callers layer their own policy.
    pub fn is_retryable(&self) -> bool {
        self.severity() == ErrorSeverity::Recoverable
    }
}
