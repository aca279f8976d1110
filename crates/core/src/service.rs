//! Boundary to the configuration service that owns the php.ini file

use crate::error::ServiceError;
use crate::setting::{RawSetting, RemovalTarget, Setting};
use std::sync::Arc;

/// Request/response boundary to wherever php.ini actually lives
///
/// Calls are blocking. Implementations report any transport or server-side
/// failure as an error; they must not partially apply a batch.
pub trait ConfigService: Send + Sync {
    /// Returns every setting in file order
    fn fetch_settings(&self) -> Result<Vec<RawSetting>, ServiceError>;

    /// Adds or updates a batch of settings
    ///
    /// Must be idempotent: pushing the same batch twice leaves the same file.
    fn push_settings(&self, batch: &[Setting]) -> Result<(), ServiceError>;

    /// Removes exactly the directive described by `target`
    fn remove_setting(&self, target: &RemovalTarget) -> Result<(), ServiceError>;

    /// Location of php.ini on the server, if known
    fn physical_path(&self) -> Result<Option<String>, ServiceError> {
        Ok(None)
    }
}

impl<S: ConfigService + ?Sized> ConfigService for Arc<S> {
    fn fetch_settings(&self) -> Result<Vec<RawSetting>, ServiceError> {
        (**self).fetch_settings()
    }

    fn push_settings(&self, batch: &[Setting]) -> Result<(), ServiceError> {
        (**self).push_settings(batch)
    }

    fn remove_setting(&self, target: &RemovalTarget) -> Result<(), ServiceError> {
        (**self).remove_setting(target)
    }

    fn physical_path(&self) -> Result<Option<String>, ServiceError> {
        (**self).physical_path()
    }
}

impl<S: ConfigService + ?Sized> ConfigService for &S {
    fn fetch_settings(&self) -> Result<Vec<RawSetting>, ServiceError> {
        (**self).fetch_settings()
    }

    fn push_settings(&self, batch: &[Setting]) -> Result<(), ServiceError> {
        (**self).push_settings(batch)
    }

    fn remove_setting(&self, target: &RemovalTarget) -> Result<(), ServiceError> {
        (**self).remove_setting(target)
    }

    fn physical_path(&self) -> Result<Option<String>, ServiceError> {
        (**self).physical_path()
    }
}
