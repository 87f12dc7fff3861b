//! Month-to-date spending against a monthly budget ceiling

use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::format;
use crate::record::LogRecord;
use crate::time;

/// Ceiling used when the user has not set one
pub const DEFAULT_MONTHLY_BUDGET: f64 = 2000.0;

/// A validated, user-entered monthly ceiling
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct BudgetCeiling(f64);

impl BudgetCeiling {
    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(Error::InvalidBudget(value))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for BudgetCeiling {
    fn default() -> Self {
        Self(DEFAULT_MONTHLY_BUDGET)
    }
}

impl TryFrom<f64> for BudgetCeiling {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<BudgetCeiling> for f64 {
    fn from(c: BudgetCeiling) -> Self {
        c.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BudgetStats {
    /// Full-precision month-to-date total, never clamped
    #[serde(serialize_with = "format::serialize_2dp")]
    pub total_spent: f64,
    /// Share of the ceiling, capped at 100
    #[serde(serialize_with = "format::serialize_1dp")]
    pub percent_used: f64,
}

impl BudgetStats {
    pub fn total_spent_label(&self) -> String {
        format::money(self.total_spent)
    }

    pub fn percent_used_label(&self) -> String {
        format::percent(self.percent_used)
    }
}

/// Sum money records in the calendar month of `now` (in `tz`) and compare
/// with `ceiling`. A non-positive ceiling reports 0%.
pub fn compute_budget_stats(
    money_records: &[LogRecord],
    ceiling: f64,
    now: DateTime<Utc>,
    tz: Tz,
) -> BudgetStats {
    let today = time::local_date(now, tz);

    let total_spent: f64 = money_records
        .iter()
        .filter(|r| {
            let d = time::local_date(r.created_at, tz);
            d.year() == today.year() && d.month() == today.month()
        })
        .map(LogRecord::amount)
        .sum();

    let percent_used = if ceiling > 0.0 {
        (total_spent / ceiling * 100.0).min(100.0)
    } else {
        0.0
    };

    BudgetStats {
        total_spent,
        percent_used,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const TZ: Tz = chrono_tz::Asia::Shanghai;

    fn at(m: u32, d: u32) -> DateTime<Utc> {
        TZ.with_ymd_and_hms(2025, m, d, 12, 0, 0).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_percent_is_clamped_total_is_not() {
        let records = vec![
            LogRecord::money("a", at(3, 2), "Rent", 2000.0, TZ),
            LogRecord::money("b", at(3, 5), "Laptop", 500.0, TZ),
        ];
        let stats = compute_budget_stats(&records, 2000.0, at(3, 20), TZ);
        assert_eq!(stats.total_spent, 2500.0);
        assert_eq!(stats.percent_used, 100.0);
        assert_eq!(stats.percent_used_label(), "100.0");
        assert_eq!(stats.total_spent_label(), "2500.00");
    }

    #[test]
    fn test_previous_month_is_excluded() {
        // Feb 25 is within 30 days of Mar 10 but in another month
        let records = vec![
            LogRecord::money("feb", at(2, 25), "Shoes", 300.0, TZ),
            LogRecord::money("mar", at(3, 1), "Lunch", 50.0, TZ),
        ];
        let stats = compute_budget_stats(&records, 1000.0, at(3, 10), TZ);
        assert_eq!(stats.total_spent, 50.0);
        assert_eq!(stats.percent_used, 5.0);
    }

    #[test]
    fn test_same_month_other_year_is_excluded() {
        let last_year = TZ.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap().with_timezone(&Utc);
        let records = vec![LogRecord::money("old", last_year, "Bike", 400.0, TZ)];
        let stats = compute_budget_stats(&records, 1000.0, at(3, 10), TZ);
        assert_eq!(stats.total_spent, 0.0);
    }

    #[test]
    fn test_non_positive_ceiling_reports_zero() {
        let records = vec![LogRecord::money("a", at(3, 2), "Rent", 900.0, TZ)];
        assert_eq!(compute_budget_stats(&records, 0.0, at(3, 20), TZ).percent_used, 0.0);
        assert_eq!(compute_budget_stats(&records, -5.0, at(3, 20), TZ).percent_used, 0.0);
        assert_eq!(compute_budget_stats(&records, 0.0, at(3, 20), TZ).total_spent, 900.0);
    }

    #[test]
    fn test_json_rounds_for_presentation() {
        let records = vec![LogRecord::money("a", at(3, 2), "Tea", 33.333, TZ)];
        let stats = compute_budget_stats(&records, 300.0, at(3, 20), TZ);
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["total_spent"], 33.33);
        assert_eq!(json["percent_used"], 11.1);
    }

    #[test]
    fn test_ceiling_validation() {
        assert_eq!(BudgetCeiling::new(1500.0).unwrap().value(), 1500.0);
        assert_eq!(BudgetCeiling::new(0.0), Err(Error::InvalidBudget(0.0)));
        assert!(BudgetCeiling::new(f64::NAN).is_err());
        assert_eq!(BudgetCeiling::default().value(), DEFAULT_MONTHLY_BUDGET);
        assert!(serde_json::from_str::<BudgetCeiling>("-3").is_err());
    }
}
