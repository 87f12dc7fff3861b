//! lifelog-core: the reporting and aggregation engine for activity logs.
//!
//! Everything here is a pure function of an in-memory snapshot. Callers
//! fetch records, pick an evaluation instant and a display timezone, and
//! hand them in.

pub mod budget;
pub mod classify;
pub mod error;
pub mod format;
pub mod grouping;
pub mod logging;
pub mod projects;
pub mod record;
pub mod report;
pub mod streak;
pub mod task;
pub mod time;
pub mod view;

pub use budget::{compute_budget_stats, BudgetCeiling, BudgetStats, DEFAULT_MONTHLY_BUDGET};
pub use classify::{classify, ClassifiedLogs};
pub use error::{Error, Result};
pub use grouping::{group_records, GroupKey, GroupMode, TemporalGroup};
pub use projects::{
    aggregate_projects, recent_continuous_titles, ProjectMeta, ProjectRollup, StatusChange,
    TaskToggle,
};
pub use record::{Category, LogRecord, OutputInfo, RecordPayload};
pub use report::{build_report, Report, ReportOptions, StreamCounts};
pub use streak::compute_streak;
pub use task::{Priority, TaskInfo, TaskStatus};
pub use view::{Section, ViewState};
