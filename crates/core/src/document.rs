//! Lossless php.ini text codec
//!
//! [`IniDocument`] keeps every line of the original text, so serializing an
//! unmodified document reproduces the input byte for byte. Edits touch only
//! the lines they have to: an update rewrites one directive line, an insert
//! adds one line (plus a header when the section is new), a removal drops one
//! line.
//!
//! Recognized lines:
//! - blank lines
//! - comments starting with `;` or `#` (this includes commented-out
//!   directives such as `;extension=gd`)
//! - section headers `[name]`, optionally followed by a comment
//! - directives `name = value`, split at the first `=`
//!
//! Anything else is kept verbatim and otherwise ignored.

use crate::error::{IniError, IniResult};
use crate::setting::{RawSetting, RemovalTarget, Setting};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum LineKind {
    Blank,
    Comment,
    Section(String),
    Directive { name: String, value: String },
    Unparsed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Line {
    /// Text without the `\n`; a `\r` from CRLF input stays here
    raw: String,
    kind: LineKind,
}

impl Line {
    fn parse(raw: &str) -> Self {
        let text = raw.trim();
        let kind = if text.is_empty() {
            LineKind::Blank
        } else if text.starts_with([';', '#']) {
            LineKind::Comment
        } else if let Some(rest) = text.strip_prefix('[') {
            match rest.find(']') {
                Some(end) => LineKind::Section(rest[..end].trim().to_string()),
                None => LineKind::Unparsed,
            }
        } else if let Some((name, value)) = text.split_once('=') {
            let name = name.trim();
            if name.is_empty() {
                LineKind::Unparsed
            } else {
                LineKind::Directive {
                    name: name.to_string(),
                    value: value.trim().to_string(),
                }
            }
        } else {
            LineKind::Unparsed
        };

        Self {
            raw: raw.to_string(),
            kind,
        }
    }

    fn directive(name: &str, value: &str, crlf: bool) -> Self {
        Self {
            raw: format!("{} = {}{}", name, value, if crlf { "\r" } else { "" }),
            kind: LineKind::Directive {
                name: name.to_string(),
                value: value.to_string(),
            },
        }
    }

    fn section(name: &str, crlf: bool) -> Self {
        Self {
            raw: format!("[{}]{}", name, if crlf { "\r" } else { "" }),
            kind: LineKind::Section(name.to_string()),
        }
    }

    fn blank(crlf: bool) -> Self {
        Self {
            raw: if crlf { "\r".to_string() } else { String::new() },
            kind: LineKind::Blank,
        }
    }

    fn directive_name(&self) -> Option<&str> {
        match &self.kind {
            LineKind::Directive { name, .. } => Some(name),
            _ => None,
        }
    }

    fn section_name(&self) -> Option<&str> {
        match &self.kind {
            LineKind::Section(name) => Some(name),
            _ => None,
        }
    }
}

/// A php.ini file as text, line by line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    lines: Vec<Line>,
    trailing_newline: bool,
    crlf: bool,
}

impl IniDocument {
    /// Parses php.ini text; never fails
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Self::default();
        }

        let trailing_newline = text.ends_with('\n');
        let body = if trailing_newline {
            &text[..text.len() - 1]
        } else {
            text
        };
        let lines: Vec<Line> = body.split('\n').map(Line::parse).collect();
        let crlf = lines.first().is_some_and(|line| line.raw.ends_with('\r'));

        Self {
            lines,
            trailing_newline,
            crlf,
        }
    }

    /// Number of text lines
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Active directives with their enclosing section, in file order
    pub fn settings(&self) -> Vec<Setting> {
        let mut section = "";
        let mut settings = Vec::new();
        for line in &self.lines {
            match &line.kind {
                LineKind::Section(name) => section = name.as_str(),
                LineKind::Directive { name, value } => {
                    settings.push(Setting::new(name.as_str(), value.as_str(), section))
                }
                _ => {}
            }
        }
        settings
    }

    pub fn to_raw_settings(&self) -> Vec<RawSetting> {
        self.settings().iter().map(RawSetting::from).collect()
    }

    /// Applies an add-or-update batch
    ///
    /// The first directive with a name has its line rewritten; its section
    /// stays whatever it was. New names are placed in their section, see
    /// [`IniDocument::insert`].
    pub fn upsert(&mut self, batch: &[Setting]) {
        for setting in batch {
            let existing = self
                .lines
                .iter()
                .position(|line| line.directive_name() == Some(setting.name.as_str()));
            match existing {
                Some(index) => {
                    self.lines[index] = Line::directive(&setting.name, &setting.value, self.crlf)
                }
                None => self.insert(setting),
            }
        }
    }

    /// Inserts a new directive line for `setting`
    ///
    /// - empty section: after the last directive preceding the first header
    /// - known section: after the last directive of its first occurrence, or
    ///   right below the header when it has none
    /// - unknown section: a new `[section]` block at the end of the file
    fn insert(&mut self, setting: &Setting) {
        let line = Line::directive(&setting.name, &setting.value, self.crlf);

        if setting.section.is_empty() {
            let first_header = self
                .lines
                .iter()
                .position(|line| line.section_name().is_some())
                .unwrap_or(self.lines.len());
            let at = self.last_directive_in(0, first_header).map_or(first_header, |i| i + 1);
            self.lines.insert(at, line);
            return;
        }

        let header = self
            .lines
            .iter()
            .position(|line| line.section_name() == Some(setting.section.as_str()));
        match header {
            Some(header) => {
                let end = self.lines[header + 1..]
                    .iter()
                    .position(|line| line.section_name().is_some())
                    .map_or(self.lines.len(), |offset| header + 1 + offset);
                let at = self.last_directive_in(header + 1, end).unwrap_or(header) + 1;
                self.lines.insert(at, line);
            }
            None => {
                if self
                    .lines
                    .last()
                    .is_some_and(|last| last.kind != LineKind::Blank)
                {
                    self.lines.push(Line::blank(self.crlf));
                }
                self.lines.push(Line::section(&setting.section, self.crlf));
                self.lines.push(line);
            }
        }
    }

    fn last_directive_in(&self, start: usize, end: usize) -> Option<usize> {
        (start..end)
            .rev()
            .find(|&i| self.lines[i].directive_name().is_some())
    }

    /// Removes the directive `target` names
    ///
    /// Directives are matched by name, value and enclosing section; the
    /// `target.occurrence`-th match (counting from zero in file order) is
    /// dropped. Fails with `NotFound` when there are not that many matches,
    /// which is what a caller with a stale view of the file runs into.
    pub fn remove(&mut self, target: &RemovalTarget) -> IniResult<()> {
        let mut section = "";
        let mut seen = 0;
        let mut found = None;
        for (index, line) in self.lines.iter().enumerate() {
            match &line.kind {
                LineKind::Section(name) => section = name.as_str(),
                LineKind::Directive { name, value } => {
                    let wanted = &target.setting;
                    if *name == wanted.name && *value == wanted.value && section == wanted.section {
                        if seen == target.occurrence {
                            found = Some(index);
                            break;
                        }
                        seen += 1;
                    }
                }
                _ => {}
            }
        }

        let index = found.ok_or_else(|| IniError::NotFound(target.to_string()))?;
        self.lines.remove(index);
        Ok(())
    }
}

impl fmt::Display for IniDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, line) in self.lines.iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            f.write_str(&line.raw)?;
        }
        if self.trailing_newline && !self.lines.is_empty() {
            f.write_str("\n")?;
        }
        Ok(())
    }
}
