//! Project aggregator: roll time records up by activity title and merge the
//! persisted doing/done status.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::record::LogRecord;
use crate::task::TaskStatus;
use crate::time;
use crate::view::{Section, ViewState};

/// Persisted per-project status, joined to time records by title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMeta {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "crate::task::deserialize_status_lenient")]
    pub status: TaskStatus,
}

impl ProjectMeta {
    pub fn new(id: impl Into<String>, title: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status,
        }
    }
}

/// Per-title summary of time records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectRollup {
    pub title: String,
    pub total_duration: f64,
    pub count: usize,
    /// Latest `created_at` among items
    pub last_update: DateTime<Utc>,
    /// `MM-DD` of `last_update`
    pub last_update_label: String,
    /// History in input order
    pub items: Vec<LogRecord>,
    pub status: TaskStatus,
    pub meta_id: Option<String>,
    pub expanded: bool,
}

impl ProjectRollup {
    fn start(record: &LogRecord, meta: Option<&ProjectMeta>, expanded: bool) -> Self {
        Self {
            title: record.activity.clone(),
            total_duration: 0.0,
            count: 0,
            last_update: record.created_at,
            last_update_label: String::new(),
            items: Vec::new(),
            status: meta.map(|m| m.status).unwrap_or_default(),
            meta_id: meta.map(|m| m.id.clone()),
            expanded,
        }
    }

    fn add(&mut self, record: &LogRecord) {
        self.total_duration += record.duration();
        self.count += 1;
        if record.created_at > self.last_update {
            self.last_update = record.created_at;
        }
        self.items.push(record.clone());
    }
}

fn meta_lookup(metas: &[ProjectMeta]) -> HashMap<&str, &ProjectMeta> {
    let mut lookup = HashMap::with_capacity(metas.len());
    for meta in metas {
        if lookup.insert(meta.title.as_str(), meta).is_some() {
            tracing::warn!(title = %meta.title, id = %meta.id, "duplicate project meta, later entry wins");
        }
    }
    lookup
}

/// Fold time records into project rollups.
///
/// Order: `doing` before `done`, then most recent `last_update` first. The
/// sort is stable, so remaining ties keep first-seen title order.
pub fn aggregate_projects(
    time_records: &[LogRecord],
    metas: &[ProjectMeta],
    tz: Tz,
    view: &ViewState,
) -> Vec<ProjectRollup> {
    let lookup = meta_lookup(metas);
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut rollups: Vec<ProjectRollup> = Vec::new();

    for record in time_records {
        let title = record.activity.as_str();
        let slot = match index.get(title) {
            Some(&i) => i,
            None => {
                let expanded = view.is_expanded(Section::Project, title);
                rollups.push(ProjectRollup::start(record, lookup.get(title).copied(), expanded));
                index.insert(title, rollups.len() - 1);
                rollups.len() - 1
            }
        };
        rollups[slot].add(record);
    }

    rollups.sort_by(|a, b| {
        a.status
            .cmp(&b.status)
            .then_with(|| b.last_update.cmp(&a.last_update))
    });
    for rollup in &mut rollups {
        rollup.last_update_label = time::month_day_label(rollup.last_update, tz);
    }

    tracing::debug!(
        records = time_records.len(),
        metas = metas.len(),
        projects = rollups.len(),
        "aggregated projects"
    );
    rollups
}

/// Distinct titles of time records flagged continuous, most recent first.
pub fn recent_continuous_titles(time_records: &[LogRecord], limit: usize) -> Vec<String> {
    let mut flagged: Vec<&LogRecord> = time_records
        .iter()
        .filter(|r| r.task().is_some_and(|t| t.is_continuous))
        .collect();
    flagged.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut seen = HashSet::new();
    flagged
        .into_iter()
        .filter(|r| seen.insert(r.activity.as_str()))
        .take(limit)
        .map(|r| r.activity.clone())
        .collect()
}

/// A proposed project status flip. Applying it yields a new meta list; the
/// caller persists that list and re-aggregates, or discards it on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    pub title: String,
    /// `None` when the project has no stored meta yet
    pub meta_id: Option<String>,
    pub from: TaskStatus,
    pub to: TaskStatus,
}

impl StatusChange {
    /// Flip the status of `title`. A title without meta is implicitly doing,
    /// so its change creates a `done` entry.
    pub fn toggle_project(metas: &[ProjectMeta], title: &str) -> Self {
        let current = metas.iter().rev().find(|m| m.title == title);
        let from = current.map(|m| m.status).unwrap_or_default();
        Self {
            title: title.to_string(),
            meta_id: current.map(|m| m.id.clone()),
            from,
            to: from.toggled(),
        }
    }

    /// Return a new meta list with this change applied. `new_id` names the
    /// meta created when none existed.
    pub fn apply_to(&self, metas: &[ProjectMeta], new_id: impl FnOnce() -> String) -> Vec<ProjectMeta> {
        let mut out = metas.to_vec();
        match &self.meta_id {
            Some(id) => {
                for meta in out.iter_mut().filter(|m| &m.id == id) {
                    meta.status = self.to;
                }
            }
            None => out.push(ProjectMeta::new(new_id(), self.title.clone(), self.to)),
        }
        out
    }
}

/// A proposed flip of one time record's task status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskToggle {
    pub record_id: String,
    pub from: TaskStatus,
    pub to: TaskStatus,
}

impl TaskToggle {
    pub fn for_record(records: &[LogRecord], id: &str) -> Result<Self> {
        let record = records
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::UnknownRecord(id.to_string()))?;
        let from = record.task().map(|t| t.status).unwrap_or_default();
        Ok(Self {
            record_id: id.to_string(),
            from,
            to: from.toggled(),
        })
    }

    /// New record list with the toggle applied; everything else is cloned as-is.
    pub fn apply_to(&self, records: &[LogRecord]) -> Vec<LogRecord> {
        records
            .iter()
            .map(|r| {
                if r.id != self.record_id {
                    return r.clone();
                }
                let info = r.task().cloned().unwrap_or_default().with_status(self.to);
                r.clone().with_task(info)
            })
            .collect()
    }
}
