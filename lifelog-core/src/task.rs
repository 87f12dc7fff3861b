//! Task metadata carried by time records, and the status shared with project metadata.

use serde::{Deserialize, Deserializer, Serialize};

/// Doing/done status of a task or a project.
///
/// Variant order is the project list order: `Doing` sorts before `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Doing,
    Done,
}

impl TaskStatus {
    pub fn toggled(self) -> Self {
        match self {
            TaskStatus::Doing => TaskStatus::Done,
            TaskStatus::Done => TaskStatus::Doing,
        }
    }

    /// Parse a stored status tag; anything but "done" is treated as doing.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag.map(|t| t.trim().to_lowercase()) {
            Some(t) if t == "done" => TaskStatus::Done,
            _ => TaskStatus::Doing,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Doing => "doing",
            TaskStatus::Done => "done",
        }
    }
}

/// Deserialize a status tag the way [`TaskStatus::from_tag`] reads it, so a
/// stray value never fails a whole metadata file.
pub fn deserialize_status_lenient<'de, D>(d: D) -> Result<TaskStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let tag: Option<String> = Option::deserialize(d)?;
    Ok(TaskStatus::from_tag(tag.as_deref()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Priority {
    P1 = 1,
    #[default]
    P2 = 2,
    P3 = 3,
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Priority::P1),
            2 => Ok(Priority::P2),
            3 => Ok(Priority::P3),
            other => Err(format!("priority must be 1, 2 or 3, got {other}")),
        }
    }
}

impl From<Priority> for u8 {
    fn from(p: Priority) -> Self {
        p as u8
    }
}

/// Per-record task details for time entries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskInfo {
    pub priority: Priority,
    pub status: TaskStatus,
    /// Marks the entry as part of a long-running project.
    pub is_continuous: bool,
}

impl TaskInfo {
    pub fn new(priority: Priority) -> Self {
        Self {
            priority,
            ..Self::default()
        }
    }

    pub fn continuous(mut self) -> Self {
        self.is_continuous = true;
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }
}
