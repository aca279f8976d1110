//! Listing and search defaults

use crate::validation::{ConfigSection, ValidationError};
use phpmanager_core::{GroupBy, SearchField};
use serde::{Deserialize, Serialize};

/// How settings are presented when no flag says otherwise
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Group listings under their `[section]` headers
    pub group_by_section: bool,

    /// Field searched when no `--field` is given
    pub search_field: SearchField,
}

impl DisplayConfig {
    pub fn group_by(&self) -> GroupBy {
        if self.group_by_section {
            GroupBy::Section
        } else {
            GroupBy::None
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            group_by_section: true,
            search_field: SearchField::Name,
        }
    }
}

impl ConfigSection for DisplayConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Ok(())
    }

    fn merge(&mut self, other: Self) {
        self.group_by_section = other.group_by_section;
        self.search_field = other.search_field;
    }

    fn section_name(&self) -> &'static str {
        "display"
    }
}
