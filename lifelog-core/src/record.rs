//! Normalized log records: one user-logged event of time, money or output.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::task::TaskInfo;
use crate::time;

/// The three record kinds that partition a dataset
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Time,
    Money,
    Output,
}

impl Category {
    /// Map a stored record-type tag; missing or unknown tags are time records.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag.map(str::trim) {
            Some("money") => Category::Money,
            Some("output") => Category::Output,
            _ => Category::Time,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Time => "time",
            Category::Money => "money",
            Category::Output => "output",
        }
    }
}

/// Creative output details
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputInfo {
    /// Free-form kind tag ("code", "writing", ...)
    pub kind: String,
    /// 1-5
    pub satisfaction: u8,
    pub link: String,
}

impl Default for OutputInfo {
    fn default() -> Self {
        Self {
            kind: "code".to_string(),
            satisfaction: 3,
            link: String::new(),
        }
    }
}

/// Category-specific part of a record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum RecordPayload {
    Time {
        /// Minutes
        duration: Option<f64>,
        task: Option<TaskInfo>,
    },
    Money {
        amount: Option<f64>,
    },
    Output {
        output: Option<OutputInfo>,
    },
}

/// A normalized record. Immutable once built by the normalizer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogRecord {
    pub id: String,
    /// Scoping key; isolation is enforced before records reach the engine.
    pub owner_id: Option<String>,
    pub created_at: DateTime<Utc>,
    /// `MM-DD HH:MM` in the display timezone
    pub date_label: String,
    pub activity: String,
    pub note: Option<String>,
    #[serde(flatten)]
    pub payload: RecordPayload,
    /// Opaque external file reference
    pub attachment: Option<String>,
}

impl LogRecord {
    /// Create a record, deriving its display label in `tz`.
    pub fn new(
        id: impl Into<String>,
        created_at: DateTime<Utc>,
        activity: impl Into<String>,
        payload: RecordPayload,
        tz: Tz,
    ) -> Self {
        Self {
            id: id.into(),
            owner_id: None,
            created_at,
            date_label: time::short_label(created_at, tz),
            activity: activity.into(),
            note: None,
            payload,
            attachment: None,
        }
    }

    pub fn time(
        id: impl Into<String>,
        created_at: DateTime<Utc>,
        activity: impl Into<String>,
        duration: f64,
        tz: Tz,
    ) -> Self {
        let payload = RecordPayload::Time {
            duration: Some(duration),
            task: Some(TaskInfo::default()),
        };
        Self::new(id, created_at, activity, payload, tz)
    }

    pub fn money(
        id: impl Into<String>,
        created_at: DateTime<Utc>,
        activity: impl Into<String>,
        amount: f64,
        tz: Tz,
    ) -> Self {
        let payload = RecordPayload::Money {
            amount: Some(amount),
        };
        Self::new(id, created_at, activity, payload, tz)
    }

    pub fn output(
        id: impl Into<String>,
        created_at: DateTime<Utc>,
        activity: impl Into<String>,
        tz: Tz,
    ) -> Self {
        let payload = RecordPayload::Output {
            output: Some(OutputInfo::default()),
        };
        Self::new(id, created_at, activity, payload, tz)
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_task(mut self, info: TaskInfo) -> Self {
        if let RecordPayload::Time { task, .. } = &mut self.payload {
            *task = Some(info);
        }
        self
    }

    pub fn category(&self) -> Category {
        match self.payload {
            RecordPayload::Time { .. } => Category::Time,
            RecordPayload::Money { .. } => Category::Money,
            RecordPayload::Output { .. } => Category::Output,
        }
    }

    /// Spent amount, 0 when absent or not a money record.
    pub fn amount(&self) -> f64 {
        match self.payload {
            RecordPayload::Money { amount } => amount.unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// Duration in minutes, 0 when absent or not a time record.
    pub fn duration(&self) -> f64 {
        match self.payload {
            RecordPayload::Time { duration, .. } => duration.unwrap_or(0.0),
            _ => 0.0,
        }
    }

    pub fn task(&self) -> Option<&TaskInfo> {
        match &self.payload {
            RecordPayload::Time { task, .. } => task.as_ref(),
            _ => None,
        }
    }

    pub fn output_info(&self) -> Option<&OutputInfo> {
        match &self.payload {
            RecordPayload::Output { output } => output.as_ref(),
            _ => None,
        }
    }
}
