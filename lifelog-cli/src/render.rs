//! Plain-text rendering of a report.

use std::fmt::Write;

use lifelog_core::format;
use lifelog_core::{Category, LogRecord, ProjectRollup, Report, TemporalGroup};

use crate::config::TimeView;

fn item_line(out: &mut String, record: &LogRecord, value: &str) {
    let _ = writeln!(out, "    {}  {:<24} {}", record.date_label, record.activity, value);
}

fn push_groups(out: &mut String, heading: &str, groups: &[TemporalGroup], total: impl Fn(&TemporalGroup) -> String) {
    let _ = writeln!(out, "{heading}");
    if groups.is_empty() {
        out.push_str("  (none)\n");
    }
    for g in groups {
        let marker = if g.expanded { "-" } else { "+" };
        let _ = writeln!(
            out,
            "  {marker} {}  [{}]  {} item(s)  ({})",
            g.title,
            total(g),
            g.items.len(),
            g.key
        );
        if !g.expanded {
            continue;
        }
        for r in &g.items {
            let value = match r.category() {
                Category::Time => format::minutes(r.duration()),
                Category::Money => format::money(r.amount()),
                Category::Output => r
                    .output_info()
                    .map(|o| format!("{} {}/5", o.kind, o.satisfaction))
                    .unwrap_or_default(),
            };
            item_line(out, r, &value);
        }
    }
}

fn push_projects(out: &mut String, projects: &[ProjectRollup]) {
    out.push_str("Projects\n");
    if projects.is_empty() {
        out.push_str("  (none)\n");
    }
    for p in projects {
        let marker = if p.expanded { "-" } else { "+" };
        let _ = writeln!(
            out,
            "  {marker} [{}] {}  {}  {} session(s), last {}",
            p.status.as_str(),
            p.title,
            format::minutes(p.total_duration),
            p.count,
            p.last_update_label
        );
        if p.expanded {
            for r in &p.items {
                item_line(out, r, &format::minutes(r.duration()));
            }
        }
    }
}

pub fn render_report(report: &Report, time_view: TimeView) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Today {}  |  {} time, {} money, {} output record(s)\n",
        report.today, report.counts.time, report.counts.money, report.counts.output
    );

    match time_view {
        TimeView::Project => push_projects(&mut out, &report.project_groups),
        TimeView::Week | TimeView::Month => {
            push_groups(&mut out, "Time", &report.time_groups, |g| format::minutes(g.total_duration))
        }
    }
    out.push('\n');

    push_groups(&mut out, "Money", &report.money_groups, |g| g.total_amount_label());
    let _ = writeln!(
        out,
        "  Budget: {} / {} ({}%)\n",
        report.budget.total_spent_label(),
        format::money(report.budget_ceiling),
        report.budget.percent_used_label()
    );

    push_groups(&mut out, "Output", &report.output_groups, |g| format!("{} item(s)", g.items.len()));
    let _ = writeln!(out, "  Streak: {} day(s)", report.streak);
    out
}
