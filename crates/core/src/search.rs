//! Single-field search over settings

use crate::setting::Setting;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Field a search is performed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    Name,
    Value,
    Section,
}

impl SearchField {
    pub const ALL: [SearchField; 3] = [Self::Name, Self::Value, Self::Section];

    fn select<'a>(&self, setting: &'a Setting) -> &'a str {
        match self {
            Self::Name => &setting.name,
            Self::Value => &setting.value,
            Self::Section => &setting.section,
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Value => write!(f, "value"),
            Self::Section => write!(f, "section"),
        }
    }
}

impl FromStr for SearchField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "value" => Ok(Self::Value),
            "section" => Ok(Self::Section),
            other => Err(format!(
                "unknown search field '{}', expected name, value or section",
                other
            )),
        }
    }
}

/// Case-insensitive substring match on one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    pub field: SearchField,
    pub text: String,
}

impl SearchFilter {
    pub fn new(field: SearchField, text: impl Into<String>) -> Self {
        Self {
            field,
            text: text.into(),
        }
    }

    /// An empty text matches every setting
    pub fn matches(&self, setting: &Setting) -> bool {
        self.field
            .select(setting)
            .to_lowercase()
            .contains(&self.text.to_lowercase())
    }
}

/// What the presentation layer asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchRequest {
    ShowAll,
    Filter(SearchFilter),
}

/// Current search state of a settings view
///
/// A new filter always replaces the previous one; filters never combine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SearchState {
    #[default]
    Unfiltered,
    Filtered(SearchFilter),
}

impl SearchState {
    pub fn apply(&mut self, request: SearchRequest) {
        *self = match request {
            SearchRequest::ShowAll => Self::Unfiltered,
            SearchRequest::Filter(filter) => Self::Filtered(filter),
        };
    }

    pub fn clear(&mut self) {
        *self = Self::Unfiltered;
    }

    pub fn filter(&self) -> Option<&SearchFilter> {
        match self {
            Self::Unfiltered => None,
            Self::Filtered(filter) => Some(filter),
        }
    }

    pub fn is_filtered(&self) -> bool {
        matches!(self, Self::Filtered(_))
    }

    pub fn admits(&self, setting: &Setting) -> bool {
        self.filter().is_none_or(|filter| filter.matches(setting))
    }
}
