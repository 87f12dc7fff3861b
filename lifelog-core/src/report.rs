//! One aggregation pass over a snapshot: classify, then group, roll up and score.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::budget::{compute_budget_stats, BudgetStats, DEFAULT_MONTHLY_BUDGET};
use crate::classify::classify;
use crate::grouping::{group_records, GroupMode, TemporalGroup};
use crate::projects::{aggregate_projects, ProjectMeta, ProjectRollup};
use crate::record::LogRecord;
use crate::streak::compute_streak;
use crate::time;
use crate::view::{Section, ViewState};

/// Inputs that are not part of the data snapshot
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub time_mode: GroupMode,
    pub money_mode: GroupMode,
    pub output_mode: GroupMode,
    pub budget_ceiling: f64,
    /// Evaluation instant for the streak and the budget month
    pub now: DateTime<Utc>,
    pub tz: Tz,
}

impl ReportOptions {
    pub fn new(now: DateTime<Utc>, tz: Tz) -> Self {
        Self {
            time_mode: GroupMode::Week,
            money_mode: GroupMode::Month,
            output_mode: GroupMode::Month,
            budget_ceiling: DEFAULT_MONTHLY_BUDGET,
            now,
            tz,
        }
    }

    pub fn with_modes(mut self, time: GroupMode, money: GroupMode, output: GroupMode) -> Self {
        self.time_mode = time;
        self.money_mode = money;
        self.output_mode = output;
        self
    }

    pub fn with_budget(mut self, ceiling: f64) -> Self {
        self.budget_ceiling = ceiling;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreamCounts {
    pub time: usize,
    pub money: usize,
    pub output: usize,
}

/// Everything the views need, derived from one snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub today: String,
    pub counts: StreamCounts,
    pub time_groups: Vec<TemporalGroup>,
    pub project_groups: Vec<ProjectRollup>,
    pub money_groups: Vec<TemporalGroup>,
    pub output_groups: Vec<TemporalGroup>,
    pub streak: u32,
    pub budget_ceiling: f64,
    pub budget: BudgetStats,
}

/// Run the whole pipeline. Deterministic for a fixed snapshot and `options.now`.
pub fn build_report(
    records: &[LogRecord],
    metas: &[ProjectMeta],
    options: &ReportOptions,
    view: &ViewState,
) -> Report {
    let tz = options.tz;
    let logs = classify(records);

    let report = Report {
        generated_at: options.now,
        today: time::local_date(options.now, tz).to_string(),
        counts: StreamCounts {
            time: logs.time.len(),
            money: logs.money.len(),
            output: logs.output.len(),
        },
        time_groups: group_records(&logs.time, options.time_mode, tz, Section::Time, view),
        project_groups: aggregate_projects(&logs.time, metas, tz, view),
        money_groups: group_records(&logs.money, options.money_mode, tz, Section::Money, view),
        output_groups: group_records(&logs.output, options.output_mode, tz, Section::Output, view),
        streak: compute_streak(&logs.output, options.now, tz),
        budget_ceiling: options.budget_ceiling,
        budget: compute_budget_stats(&logs.money, options.budget_ceiling, options.now, tz),
    };

    tracing::debug!(
        records = records.len(),
        projects = report.project_groups.len(),
        streak = report.streak,
        spent = report.budget.total_spent,
        "built report"
    );
    report
}
