//! Caller-owned view state: which groups are expanded.
//!
//! The engine only reads this. Toggling returns a new state that the caller
//! persists (or drops) on its own.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which list a group belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Time,
    Money,
    Output,
    Project,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Time => "time",
            Section::Money => "money",
            Section::Output => "output",
            Section::Project => "project",
        }
    }

    /// Expanded flag a group gets when the caller has no stored preference.
    pub fn default_expanded(&self) -> bool {
        !matches!(self, Section::Project)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "time" => Ok(Section::Time),
            "money" => Ok(Section::Money),
            "output" => Ok(Section::Output),
            "project" | "projects" => Ok(Section::Project),
            other => Err(format!("unknown section: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    /// "<section>:<group key>" -> expanded
    #[serde(default)]
    expanded: BTreeMap<String, bool>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(section: Section, key: &str) -> String {
        format!("{}:{}", section.as_str(), key)
    }

    /// Stored flag for a group, or the section default.
    pub fn is_expanded(&self, section: Section, key: &str) -> bool {
        self.expanded
            .get(&Self::slot(section, key))
            .copied()
            .unwrap_or_else(|| section.default_expanded())
    }

    pub fn with(mut self, section: Section, key: &str, expanded: bool) -> Self {
        self.expanded.insert(Self::slot(section, key), expanded);
        self
    }

    /// New state with the group's flag flipped.
    pub fn toggled(&self, section: Section, key: &str) -> Self {
        let current = self.is_expanded(section, key);
        self.clone().with(section, key, !current)
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }
}
