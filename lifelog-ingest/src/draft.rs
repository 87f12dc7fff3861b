//! New entries: validate user input and build the stored document.

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;
use lifelog_core::record::RecordPayload;
use lifelog_core::task::{Priority, TaskStatus};
use lifelog_core::{time, Category};
use serde_json::Value;

use crate::error::DraftError;
use crate::normalize::normalize;
use crate::types::{RawOutputData, RawRecord, RawTaskInfo};

/// Category-specific form input
#[derive(Debug, Clone, PartialEq)]
pub enum DraftKind {
    Time {
        duration: Option<f64>,
        priority: Priority,
        continuous: bool,
    },
    Money {
        amount: Option<f64>,
    },
    Output {
        kind: String,
        satisfaction: u8,
        link: String,
    },
}

impl DraftKind {
    pub fn category(&self) -> Category {
        match self {
            DraftKind::Time { .. } => Category::Time,
            DraftKind::Money { .. } => Category::Money,
            DraftKind::Output { .. } => Category::Output,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordDraft {
    pub activity: String,
    pub note: Option<String>,
    /// Chosen calendar day; the entry gets the current wall-clock time on it
    pub date: Option<NaiveDate>,
    pub attachment: Option<String>,
    pub kind: DraftKind,
}

impl RecordDraft {
    pub fn new(activity: impl Into<String>, kind: DraftKind) -> Self {
        Self {
            activity: activity.into(),
            note: None,
            date: None,
            attachment: None,
            kind,
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn validate(&self) -> Result<(), DraftError> {
        if self.activity.trim().is_empty() {
            return Err(DraftError::EmptyActivity);
        }
        match &self.kind {
            DraftKind::Time { duration: None, .. } => Err(DraftError::MissingDuration),
            DraftKind::Money { amount: None } => Err(DraftError::MissingAmount),
            DraftKind::Output { satisfaction, .. } if !(1..=5).contains(satisfaction) => {
                Err(DraftError::InvalidSatisfaction(*satisfaction))
            }
            _ => Ok(()),
        }
    }

    /// Timestamp the entry: the chosen day at the current local time of
    /// day, or `now` itself when no day was chosen.
    pub fn timestamp(&self, now: DateTime<Utc>, tz: Tz) -> Result<DateTime<Utc>, DraftError> {
        let Some(date) = self.date else {
            return Ok(now);
        };
        let clock = time::local_naive(now, tz).time().with_nanosecond(0).unwrap_or_default();
        time::local_to_utc(date.and_time(clock), tz).ok_or(DraftError::InvalidDate(date))
    }

    /// Prefill a draft from a stored record so it can be edited. The date is
    /// left unset, which keeps the stored timestamp on [`Self::into_update`].
    pub fn from_raw(raw: &RawRecord, tz: Tz) -> lifelog_core::Result<Self> {
        let record = normalize(raw, tz)?;
        let kind = match &record.payload {
            RecordPayload::Time { duration, task } => DraftKind::Time {
                duration: *duration,
                priority: task.as_ref().map(|t| t.priority).unwrap_or_default(),
                continuous: task.as_ref().is_some_and(|t| t.is_continuous),
            },
            RecordPayload::Money { amount } => DraftKind::Money { amount: *amount },
            RecordPayload::Output { output } => {
                let info = output.clone().unwrap_or_default();
                DraftKind::Output {
                    kind: info.kind,
                    satisfaction: info.satisfaction,
                    link: info.link,
                }
            }
        };
        Ok(Self {
            activity: record.activity,
            note: record.note,
            date: None,
            attachment: record.attachment,
            kind,
        })
    }

    /// Validate and rebuild `existing` from this draft. The id, the owner and
    /// the task status carry over; so does the timestamp unless a new day
    /// was chosen.
    pub fn into_update(self, existing: &RawRecord, now: DateTime<Utc>, tz: Tz) -> Result<RawRecord, DraftError> {
        let keep_time = self.date.is_none();
        let mut raw = self.into_raw(existing.id.clone(), existing.owner_id.clone(), now, tz)?;
        if keep_time {
            raw.create_time = existing.create_time.clone();
        }
        let status = existing.task_info.as_ref().and_then(|t| t.status.clone());
        if let (Some(info), Some(status)) = (raw.task_info.as_mut(), status) {
            info.status = Some(status);
        }
        Ok(raw)
    }

    /// Validate and convert into the stored document shape.
    pub fn into_raw(
        self,
        id: impl Into<String>,
        owner: Option<String>,
        now: DateTime<Utc>,
        tz: Tz,
    ) -> Result<RawRecord, DraftError> {
        self.validate()?;
        let created_at = self.timestamp(now, tz)?;

        let mut raw = RawRecord {
            id: id.into(),
            owner_id: owner,
            record_type: Some(self.kind.category().as_str().to_string()),
            create_time: Some(Value::String(created_at.to_rfc3339())),
            activity: Some(self.activity.trim().to_string()),
            note: self.note,
            file_id: self.attachment,
            ..RawRecord::default()
        };

        match self.kind {
            DraftKind::Time {
                duration,
                priority,
                continuous,
            } => {
                raw.duration = duration.map(Value::from);
                raw.task_info = Some(RawTaskInfo {
                    priority: Some(Value::from(u8::from(priority))),
                    status: Some(TaskStatus::Doing.as_str().to_string()),
                    is_continuous: Some(continuous),
                });
            }
            DraftKind::Money { amount } => raw.amount = amount.map(Value::from),
            DraftKind::Output {
                kind,
                satisfaction,
                link,
            } => {
                raw.output_data = Some(RawOutputData {
                    kind: Some(kind),
                    satisfaction: Some(Value::from(satisfaction)),
                    link: Some(link),
                });
            }
        }
        Ok(raw)
    }
}
