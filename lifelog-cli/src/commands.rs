use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use lifelog_core::{
    build_report, classify, recent_continuous_titles, BudgetCeiling, Category, GroupMode, LogRecord,
    Priority, Report, ReportOptions, Section, StatusChange, TaskToggle,
};
use lifelog_ingest::snapshot::{load_projects, load_records, projects_path, records_path, write_list};
use lifelog_ingest::{normalize_all, DraftKind, RawRecord, RecordDraft, Snapshot};

use crate::config::{load_config, save_config, Config, TimeView};
use crate::render::render_report;
use crate::state::{read_view, write_view};

/// Overrides from the command line; `None` falls back to config.toml
#[derive(Debug, Clone, Default)]
pub struct ReportArgs {
    pub time: Option<TimeView>,
    pub money: Option<GroupMode>,
    pub output: Option<GroupMode>,
    pub now: Option<DateTime<Utc>>,
}

fn load_normalized(dir: &Path, cfg: &Config) -> Result<(Vec<RawRecord>, Vec<LogRecord>)> {
    let tz = cfg.timezone()?;
    let raws = load_records(&records_path(dir)).context("loading records")?;
    let normalized = normalize_all(&raws, tz);
    if !normalized.rejected.is_empty() {
        tracing::warn!(skipped = normalized.rejected.len(), "some records could not be read");
    }
    Ok((raws, normalized.records))
}

pub fn build(dir: &Path, args: &ReportArgs) -> Result<(Report, TimeView)> {
    let cfg = load_config(dir)?;
    let tz = cfg.timezone()?;
    let snapshot = Snapshot::load(dir).context("loading snapshot")?;
    let normalized = normalize_all(&snapshot.records, tz);

    let time_view = args.time.unwrap_or(cfg.view.time);
    let options = ReportOptions::new(args.now.unwrap_or_else(Utc::now), tz)
        .with_modes(
            time_view.group_mode(),
            args.money.unwrap_or(cfg.view.money),
            args.output.unwrap_or(cfg.view.output),
        )
        .with_budget(cfg.budget.monthly.value());
    let view = read_view(dir)?;

    Ok((build_report(&normalized.records, &snapshot.projects, &options, &view), time_view))
}

pub fn report(dir: &Path, args: &ReportArgs, json: bool) -> Result<()> {
    let (report, time_view) = build(dir, args)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_report(&report, time_view));
    }
    Ok(())
}

/// `lifelog add` input before it becomes a draft
#[derive(Debug, Clone, Default)]
pub struct AddArgs {
    pub activity: String,
    pub duration: Option<f64>,
    pub amount: Option<f64>,
    pub date: Option<NaiveDate>,
    pub priority: u8,
    pub continuous: bool,
    pub kind: String,
    pub satisfaction: u8,
    pub link: String,
    pub note: Option<String>,
    pub attachment: Option<String>,
}

pub fn draft_for(category: Category, args: AddArgs) -> Result<RecordDraft> {
    let kind = match category {
        Category::Time => DraftKind::Time {
            duration: args.duration,
            priority: Priority::try_from(args.priority).map_err(|e| anyhow!(e))?,
            continuous: args.continuous,
        },
        Category::Money => DraftKind::Money { amount: args.amount },
        Category::Output => DraftKind::Output {
            kind: args.kind,
            satisfaction: args.satisfaction,
            link: args.link,
        },
    };
    let mut draft = RecordDraft::new(args.activity, kind);
    draft.note = args.note.filter(|n| !n.trim().is_empty());
    draft.date = args.date;
    draft.attachment = args.attachment;
    Ok(draft)
}

/// Append a new record to records.json. Returns its id.
pub fn add(dir: &Path, draft: RecordDraft, now: DateTime<Utc>) -> Result<String> {
    let cfg = load_config(dir)?;
    let tz = cfg.timezone()?;
    let id = uuid::Uuid::new_v4().to_string();
    let raw = draft.into_raw(id.clone(), None, now, tz)?;

    let path = records_path(dir);
    let mut raws = load_records(&path).context("loading records")?;
    raws.push(raw);
    write_list(&path, &raws).context("saving records")?;
    tracing::debug!(%id, total = raws.len(), "record added");
    Ok(id)
}

/// `lifelog edit` overrides. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct RecordEdit {
    pub activity: Option<String>,
    pub duration: Option<f64>,
    pub amount: Option<f64>,
    pub date: Option<NaiveDate>,
    pub priority: Option<u8>,
    pub continuous: Option<bool>,
    pub kind: Option<String>,
    pub satisfaction: Option<u8>,
    pub link: Option<String>,
    /// An empty note clears it
    pub note: Option<String>,
    pub attachment: Option<String>,
}

impl RecordEdit {
    fn apply(self, mut draft: RecordDraft) -> Result<RecordDraft> {
        if let Some(activity) = self.activity {
            draft.activity = activity;
        }
        if let Some(note) = self.note {
            draft.note = Some(note).filter(|n| !n.trim().is_empty());
        }
        if self.date.is_some() {
            draft.date = self.date;
        }
        if self.attachment.is_some() {
            draft.attachment = self.attachment;
        }

        let category = draft.kind.category();
        match &mut draft.kind {
            DraftKind::Time {
                duration,
                priority,
                continuous,
            } => {
                if self.amount.is_some() || self.kind.is_some() || self.satisfaction.is_some() || self.link.is_some() {
                    bail!("only --duration, --priority and --continuous apply to {} records", category.as_str());
                }
                if self.duration.is_some() {
                    *duration = self.duration;
                }
                if let Some(p) = self.priority {
                    *priority = Priority::try_from(p).map_err(|e| anyhow!(e))?;
                }
                if let Some(c) = self.continuous {
                    *continuous = c;
                }
            }
            DraftKind::Money { amount } => {
                if self.duration.is_some()
                    || self.priority.is_some()
                    || self.continuous.is_some()
                    || self.kind.is_some()
                    || self.satisfaction.is_some()
                    || self.link.is_some()
                {
                    bail!("only --amount applies to {} records", category.as_str());
                }
                if self.amount.is_some() {
                    *amount = self.amount;
                }
            }
            DraftKind::Output {
                kind,
                satisfaction,
                link,
            } => {
                if self.duration.is_some() || self.priority.is_some() || self.continuous.is_some() || self.amount.is_some() {
                    bail!("only --kind, --satisfaction and --link apply to {} records", category.as_str());
                }
                if let Some(k) = self.kind {
                    *kind = k;
                }
                if let Some(s) = self.satisfaction {
                    *satisfaction = s;
                }
                if let Some(l) = self.link {
                    *link = l;
                }
            }
        }
        Ok(draft)
    }
}

/// Rewrite a stored record in place. Category, id and owner never change.
pub fn edit(dir: &Path, id: &str, changes: RecordEdit, now: DateTime<Utc>) -> Result<()> {
    let cfg = load_config(dir)?;
    let tz = cfg.timezone()?;
    let path = records_path(dir);
    let mut raws = load_records(&path).context("loading records")?;

    let Some(pos) = raws.iter().position(|r| r.id == id) else {
        bail!("no record with id {id}");
    };
    let draft = RecordDraft::from_raw(&raws[pos], tz).with_context(|| format!("record {id} cannot be read"))?;
    let draft = changes.apply(draft)?;
    raws[pos] = draft.into_update(&raws[pos], now, tz)?;

    write_list(&path, &raws).context("saving records")?;
    tracing::debug!(%id, "record updated");
    Ok(())
}

pub fn budget_show(dir: &Path, now: DateTime<Utc>) -> Result<()> {
    let args = ReportArgs {
        now: Some(now),
        ..ReportArgs::default()
    };
    let (report, _) = build(dir, &args)?;
    println!(
        "Spent {} of {} this month ({}%)",
        report.budget.total_spent_label(),
        lifelog_core::format::money(report.budget_ceiling),
        report.budget.percent_used_label()
    );
    Ok(())
}

pub fn budget_set(dir: &Path, amount: f64) -> Result<BudgetCeiling> {
    let ceiling = BudgetCeiling::new(amount)?;
    let mut cfg = load_config(dir)?;
    cfg.budget.monthly = ceiling;
    save_config(dir, &cfg)?;
    Ok(ceiling)
}

/// Flip a project's status and persist projects.json.
pub fn project_toggle(dir: &Path, title: &str) -> Result<StatusChange> {
    let cfg = load_config(dir)?;
    let path = projects_path(dir);
    let metas = load_projects(&path);

    let known = metas.iter().any(|m| m.title == title) || {
        let (_, records) = load_normalized(dir, &cfg)?;
        records
            .iter()
            .any(|r| r.category() == Category::Time && r.activity == title)
    };
    if !known {
        bail!("no project named {title:?}");
    }

    let change = StatusChange::toggle_project(&metas, title);
    let updated = change.apply_to(&metas, || uuid::Uuid::new_v4().to_string());
    write_list(&path, &updated).context("saving project metadata")?;
    Ok(change)
}

/// Flip one time record's task status in records.json.
pub fn task_toggle(dir: &Path, id: &str) -> Result<TaskToggle> {
    let cfg = load_config(dir)?;
    let (mut raws, records) = load_normalized(dir, &cfg)?;

    let toggle = TaskToggle::for_record(&records, id)?;
    if records.iter().any(|r| r.id == id && r.category() != Category::Time) {
        bail!("record {id} is not a time record");
    }

    let applied = toggle.apply_to(&records);
    let status = applied
        .iter()
        .find(|r| r.id == id)
        .and_then(LogRecord::task)
        .map(|t| t.status)
        .with_context(|| format!("record {id} has no task after toggling"))?;

    let raw = raws
        .iter_mut()
        .find(|r| r.id == id)
        .with_context(|| format!("record {id} vanished from records.json"))?;
    let info = raw.task_info.get_or_insert_with(Default::default);
    info.status = Some(status.as_str().to_string());

    write_list(&records_path(dir), &raws).context("saving records")?;
    Ok(toggle)
}

/// Flip a group's expanded flag; returns the new flag.
pub fn expand(dir: &Path, section: Section, key: &str) -> Result<bool> {
    let view = read_view(dir)?.toggled(section, key);
    write_view(dir, &view)?;
    Ok(view.is_expanded(section, key))
}

pub fn recent(dir: &Path, limit: usize) -> Result<Vec<String>> {
    let cfg = load_config(dir)?;
    let (_, records) = load_normalized(dir, &cfg)?;
    let logs = classify(&records);
    Ok(recent_continuous_titles(&logs.time, limit))
}
