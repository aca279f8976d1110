//! Validation system for configuration values
//!
//! Each config section implements [`ConfigSection`] and reports every problem
//! it finds rather than stopping at the first.

pub use crate::error::ValidationError;
use std::path::Path;

/// Trait for configuration sections that can validate themselves
pub trait ConfigSection: Default {
    /// Validates the configuration section
    ///
    /// Returns a list of validation errors. Empty list means valid.
    fn validate(&self) -> Result<(), Vec<ValidationError>>;

    /// Merges another config section into this one
    ///
    /// Values from `other` take precedence. This is used for override chains.
    fn merge(&mut self, other: Self);

    /// Returns the section name for error reporting
    fn section_name(&self) -> &'static str;
}

/// Common validators for config values
pub struct Validator;

impl Validator {
    /// Validates that a string is not empty
    pub fn not_empty(value: &str, field: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            Err(ValidationError::new(field, "must not be empty"))
        } else {
            Ok(())
        }
    }

    /// Validates that a path ends in the given extension (case-insensitive)
    pub fn has_extension(path: &Path, extension: &str, field: &str) -> Result<(), ValidationError> {
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if matches {
            Ok(())
        } else {
            Err(ValidationError::with_value(
                field,
                format!("must end in .{}", extension),
                path.display(),
            ))
        }
    }

    /// Validates that a template contains a placeholder such as `{name}`
    pub fn contains_placeholder(
        value: &str,
        placeholder: &str,
        field: &str,
    ) -> Result<(), ValidationError> {
        if value.contains(placeholder) {
            Ok(())
        } else {
            Err(ValidationError::with_value(
                field,
                format!("must contain {}", placeholder),
                value,
            ))
        }
    }

    /// Collects multiple validation results into a single result
    pub fn collect_errors(
        results: Vec<Result<(), ValidationError>>,
    ) -> Result<(), Vec<ValidationError>> {
        let errors: Vec<ValidationError> = results.into_iter().filter_map(|r| r.err()).collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
