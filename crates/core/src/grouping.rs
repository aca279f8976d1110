//! Grouping of settings for display
//!
//! Groups are always computed from the entries handed in, so they can never
//! drift from the underlying sequence.

use crate::setting::Entry;
use serde::{Deserialize, Serialize};

/// Available grouping keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    None,
    #[default]
    Section,
}

/// Entries sharing one section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingGroup<'a> {
    pub name: &'a str,
    pub entries: Vec<&'a Entry>,
}

/// Result of grouping a sequence of entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grouped<'a> {
    /// Groups in first-seen order
    pub groups: Vec<SettingGroup<'a>>,
    /// Entries without a section, in their original order
    pub ungrouped: Vec<&'a Entry>,
}

impl Grouped<'_> {
    pub fn group(&self, name: &str) -> Option<&SettingGroup<'_>> {
        self.groups.iter().find(|group| group.name == name)
    }
}

/// Partitions entries according to `group_by`
///
/// With [`GroupBy::None`] everything lands in `ungrouped`.
pub fn group_entries<'a, I>(entries: I, group_by: GroupBy) -> Grouped<'a>
where
    I: IntoIterator<Item = &'a Entry>,
{
    let mut grouped = Grouped::default();
    for entry in entries {
        let section = entry.section();
        if group_by == GroupBy::None || section.is_empty() {
            grouped.ungrouped.push(entry);
            continue;
        }
        match grouped.groups.iter_mut().find(|group| group.name == section) {
            Some(group) => group.entries.push(entry),
            None => grouped.groups.push(SettingGroup {
                name: section,
                entries: vec![entry],
            }),
        }
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{SearchField, SearchFilter, SearchRequest, SearchState};
    use crate::{IniFile, Setting};

    fn sample() -> IniFile {
        IniFile::from_settings(vec![
            Setting::new("display_errors", "On", ""),
            Setting::new("engine", "On", "PHP"),
            Setting::new("session.name", "PHPSESSID", "Session"),
            Setting::new("memory_limit", "128M", "PHP"),
        ])
    }

    #[test]
    fn test_group_by_section() {
        let file = sample();
        let grouped = group_entries(file.entries(), GroupBy::Section);

        let names: Vec<_> = grouped.groups.iter().map(|g| g.name).collect();
        assert_eq!(names, vec!["PHP", "Session"]);
        assert_eq!(grouped.group("PHP").map(|g| g.entries.len()), Some(2));
        assert_eq!(grouped.ungrouped.len(), 1);
        assert_eq!(grouped.ungrouped[0].name(), "display_errors");
    }

    #[test]
    fn test_group_none() {
        let file = sample();
        let grouped = group_entries(file.entries(), GroupBy::None);
        assert!(grouped.groups.is_empty());
        assert_eq!(grouped.ungrouped.len(), 4);
    }

    #[test]
    fn test_groups_follow_filter_and_edits() {
        let mut file = sample();
        let mut search = SearchState::default();
        search.apply(SearchRequest::Filter(SearchFilter::new(
            SearchField::Value,
            "on",
        )));

        let grouped = group_entries(file.visible(&search), GroupBy::Section);
        assert_eq!(grouped.groups.len(), 1);

        file.apply_batch(&[Setting::new("session.use_cookies", "On", "Session")]);
        let grouped = group_entries(file.visible(&search), GroupBy::Section);
        assert_eq!(grouped.groups.len(), 2);
    }
}
