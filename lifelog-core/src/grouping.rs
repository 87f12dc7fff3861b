//! Temporal grouper: bucket a stream of records into ISO weeks or calendar
//! months, most recent bucket first.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize, Serializer};

use crate::format;
use crate::record::LogRecord;
use crate::time;
use crate::view::{Section, ViewState};

/// Bucketing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupMode {
    Week,
    Month,
}

impl FromStr for GroupMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "week" => Ok(GroupMode::Week),
            "month" => Ok(GroupMode::Month),
            other => Err(format!("unknown group mode: {other}")),
        }
    }
}

/// Sortable bucket identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupKey {
    /// Epoch milliseconds of the week's Monday 00:00 in the display timezone
    Week { start_millis: i64 },
    Month { year: i32, month: u32 },
}

impl GroupKey {
    /// Bucket that `date` falls in.
    pub fn for_date(date: NaiveDate, mode: GroupMode, tz: Tz) -> Self {
        match mode {
            GroupMode::Week => GroupKey::Week {
                start_millis: time::local_midnight(week_start(date), tz).timestamp_millis(),
            },
            GroupMode::Month => GroupKey::Month {
                year: date.year(),
                month: date.month(),
            },
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Week { start_millis } => write!(f, "WEEK-{start_millis}"),
            GroupKey::Month { year, month } => write!(f, "{year}-{month:02}"),
        }
    }
}

impl Serialize for GroupKey {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

/// Monday of the week containing `date`. Sunday counts as day 7, so it
/// closes the week that started six days earlier. The first partial week of
/// chrono's calendar starts at `NaiveDate::MIN`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().number_from_monday() - 1;
    date.checked_sub_days(Days::new(u64::from(offset)))
        .unwrap_or(NaiveDate::MIN)
}

fn group_title(date: NaiveDate, mode: GroupMode) -> String {
    match mode {
        GroupMode::Week => {
            let monday = week_start(date);
            let sunday = monday.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX);
            format!("{} - {}", monday.format("%Y.%m.%d"), sunday.format("%m.%d"))
        }
        GroupMode::Month => format!("{}年 {}月", date.year(), date.month()),
    }
}

/// One week or month bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemporalGroup {
    pub key: GroupKey,
    pub title: String,
    /// Input order
    pub items: Vec<LogRecord>,
    #[serde(serialize_with = "format::serialize_2dp")]
    pub total_amount: f64,
    pub total_duration: f64,
    pub expanded: bool,
}

impl TemporalGroup {
    fn new(key: GroupKey, title: String, expanded: bool) -> Self {
        Self {
            key,
            title,
            items: Vec::new(),
            total_amount: 0.0,
            total_duration: 0.0,
            expanded,
        }
    }

    fn push(&mut self, record: &LogRecord) {
        self.total_amount += record.amount();
        self.total_duration += record.duration();
        self.items.push(record.clone());
    }

    /// Amount total rendered to two decimals
    pub fn total_amount_label(&self) -> String {
        format::money(self.total_amount)
    }
}

/// Bucket `records` by `mode` in `tz`. Buckets come back in descending key
/// order; the expanded flag is read from `view` for `section`.
pub fn group_records(
    records: &[LogRecord],
    mode: GroupMode,
    tz: Tz,
    section: Section,
    view: &ViewState,
) -> Vec<TemporalGroup> {
    let mut buckets: BTreeMap<GroupKey, TemporalGroup> = BTreeMap::new();

    for record in records {
        let date = time::local_date(record.created_at, tz);
        let key = GroupKey::for_date(date, mode, tz);
        buckets
            .entry(key)
            .or_insert_with(|| {
                let expanded = view.is_expanded(section, &key.to_string());
                TemporalGroup::new(key, group_title(date, mode), expanded)
            })
            .push(record);
    }

    tracing::debug!(
        section = %section,
        mode = ?mode,
        records = records.len(),
        buckets = buckets.len(),
        "grouped records"
    );

    buckets.into_values().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    const TZ: Tz = chrono_tz::Asia::Shanghai;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        TZ.with_ymd_and_hms(y, m, d, h, min, 0).unwrap().with_timezone(&Utc)
    }

    fn group(records: &[LogRecord], mode: GroupMode) -> Vec<TemporalGroup> {
        group_records(records, mode, TZ, Section::Time, &ViewState::new())
    }

    #[test]
    fn test_monday_and_sunday_share_a_week() {
        let records = vec![
            LogRecord::time("mon", at(2025, 3, 3, 9, 0), "Write Paper", 30.0, TZ),
            LogRecord::time("sun", at(2025, 3, 9, 23, 0), "Write Paper", 45.0, TZ),
        ];
        let groups = group(&records, GroupMode::Week);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].title, "2025.03.03 - 03.09");
        assert_eq!(groups[0].total_duration, 75.0);
        assert_eq!(
            groups[0].key,
            GroupKey::Week {
                start_millis: at(2025, 3, 3, 0, 0).timestamp_millis()
            }
        );
    }

    #[test]
    fn test_sunday_does_not_start_next_week() {
        let sun = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        let next_mon = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        assert_eq!(week_start(sun), NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
        assert_eq!(week_start(next_mon), next_mon);
    }

    #[test]
    fn test_calendar_edges_group_without_overflow() {
        assert_eq!(week_start(NaiveDate::MIN), NaiveDate::MIN);
        assert!(group_title(NaiveDate::MAX, GroupMode::Week).ends_with(&NaiveDate::MAX.format("%m.%d").to_string()));

        let records = vec![
            LogRecord::output("late", DateTime::<Utc>::MAX_UTC, "Far", TZ),
            LogRecord::output("early", DateTime::<Utc>::MIN_UTC, "Far", TZ),
            LogRecord::output("now", at(2025, 3, 3, 9, 0), "Sketch", TZ),
        ];
        for mode in [GroupMode::Week, GroupMode::Month] {
            let groups = group(&records, mode);
            assert_eq!(groups.len(), 3);
            assert_eq!(groups[0].items[0].id, "late");
            assert_eq!(groups[2].items[0].id, "early");
        }
    }

    #[test]
    fn test_week_label_spans_month_and_year() {
        let records = vec![LogRecord::money("m", at(2025, 1, 1, 12, 0), "Gift", 10.0, TZ)];
        let groups = group(&records, GroupMode::Week);
        assert_eq!(groups[0].title, "2024.12.30 - 01.05");
    }

    #[test]
    fn test_months_never_share_a_bucket() {
        let records = vec![
            LogRecord::money("feb", at(2025, 2, 28, 23, 59), "Rent", 1500.0, TZ),
            LogRecord::money("mar", at(2025, 3, 1, 0, 1), "Lunch", 20.0, TZ),
        ];
        let groups = group(&records, GroupMode::Month);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].title, "2025年 3月");
        assert_eq!(groups[0].key.to_string(), "2025-03");
        assert_eq!(groups[1].title, "2025年 2月");
        assert_eq!(groups[1].items[0].id, "feb");
    }

    #[test]
    fn test_month_uses_display_timezone() {
        // 2025-02-28 17:00 UTC is already March 1st in Shanghai
        let utc = Utc.with_ymd_and_hms(2025, 2, 28, 17, 0, 0).unwrap();
        let records = vec![LogRecord::output("o", utc, "Poem", TZ)];
        let groups = group(&records, GroupMode::Month);
        assert_eq!(groups[0].key.to_string(), "2025-03");
    }

    #[test]
    fn test_groups_strictly_descending() {
        let records = vec![
            LogRecord::time("a", at(2025, 1, 6, 8, 0), "Read", 10.0, TZ),
            LogRecord::time("b", at(2025, 3, 12, 8, 0), "Read", 10.0, TZ),
            LogRecord::time("c", at(2025, 2, 3, 8, 0), "Read", 10.0, TZ),
            LogRecord::time("d", at(2025, 3, 11, 8, 0), "Read", 10.0, TZ),
        ];
        for mode in [GroupMode::Week, GroupMode::Month] {
            let groups = group(&records, mode);
            for w in groups.windows(2) {
                assert!(w[0].key > w[1].key, "{:?} not descending", mode);
            }
        }
    }

    #[test]
    fn test_totals_and_item_order() {
        let records = vec![
            LogRecord::money("m1", at(2025, 3, 4, 9, 0), "Lunch", 32.5, TZ),
            LogRecord::time("t1", at(2025, 3, 5, 9, 0), "Gym", 50.0, TZ),
            LogRecord::money("m2", at(2025, 3, 3, 9, 0), "Coffee", 0.125, TZ),
        ];
        let groups = group(&records, GroupMode::Month);
        let g = &groups[0];
        let ids: Vec<_> = g.items.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "t1", "m2"]);
        assert_eq!(g.total_amount, 32.625);
        assert_eq!(g.total_duration, 50.0);
        assert_eq!(g.total_amount_label(), "32.63");

        let sum_amount: f64 = g.items.iter().map(|r| r.amount()).sum();
        assert_eq!(g.total_amount, sum_amount);
    }

    #[test]
    fn test_empty_input_yields_no_groups() {
        assert!(group(&[], GroupMode::Week).is_empty());
    }

    #[test]
    fn test_expanded_flag_from_view() {
        let records = vec![LogRecord::money("m", at(2025, 3, 4, 9, 0), "Lunch", 20.0, TZ)];
        let view = ViewState::new().with(Section::Money, "2025-03", false);
        let groups = group_records(&records, GroupMode::Month, TZ, Section::Money, &view);
        assert!(!groups[0].expanded);
        let other = group_records(&records, GroupMode::Month, TZ, Section::Output, &view);
        assert!(other[0].expanded);
    }

    #[test]
    fn test_group_json_rounds_amount() {
        let records = vec![LogRecord::money("m", at(2025, 3, 4, 9, 0), "Tea", 10.005_1, TZ)];
        let groups = group(&records, GroupMode::Month);
        let json = serde_json::to_value(&groups[0]).unwrap();
        assert_eq!(json["key"], "2025-03");
        assert_eq!(json["total_amount"], 10.01);
    }
}
