//! Daily output streak.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::record::LogRecord;
use crate::time;

/// Count consecutive calendar days, ending today or yesterday, that have at
/// least one output record. Days are compared as `NaiveDate`s in `tz`, so
/// DST shifts and late-night entries never skew the gap.
pub fn compute_streak(output_records: &[LogRecord], now: DateTime<Utc>, tz: Tz) -> u32 {
    let days: BTreeSet<NaiveDate> = output_records
        .iter()
        .map(|r| time::local_date(r.created_at, tz))
        .collect();

    let mut walk = days.iter().rev();
    let Some(&latest) = walk.next() else {
        return 0;
    };

    let today = time::local_date(now, tz);
    let alive = latest == today || today.pred_opt() == Some(latest);
    if !alive {
        tracing::debug!(%latest, %today, "streak broken");
        return 0;
    }

    let mut streak = 1;
    let mut current = latest;
    for &day in walk {
        if (current - day).num_days() != 1 {
            break;
        }
        streak += 1;
        current = day;
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const TZ: Tz = chrono_tz::Asia::Shanghai;

    fn at(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        TZ.with_ymd_and_hms(2025, 3, d, h, m, 0).unwrap().with_timezone(&Utc)
    }

    fn out(id: &str, when: DateTime<Utc>) -> LogRecord {
        LogRecord::output(id, when, "Sketch", TZ)
    }

    #[test]
    fn test_three_consecutive_days() {
        let now = at(12, 20, 0);
        let records = vec![out("a", at(12, 8, 0)), out("b", at(11, 8, 0)), out("c", at(10, 8, 0))];
        assert_eq!(compute_streak(&records, now, TZ), 3);
    }

    #[test]
    fn test_gap_stops_the_walk() {
        let now = at(12, 20, 0);
        let records = vec![out("a", at(12, 8, 0)), out("b", at(11, 8, 0)), out("c", at(9, 8, 0))];
        assert_eq!(compute_streak(&records, now, TZ), 2);
    }

    #[test]
    fn test_ending_yesterday_still_counts() {
        let now = at(12, 20, 0);
        let records = vec![out("a", at(11, 8, 0)), out("b", at(10, 8, 0))];
        assert_eq!(compute_streak(&records, now, TZ), 2);
    }

    #[test]
    fn test_nothing_recent_is_zero() {
        let now = at(12, 20, 0);
        let records = vec![out("a", at(10, 8, 0)), out("b", at(9, 8, 0))];
        assert_eq!(compute_streak(&records, now, TZ), 0);
        assert_eq!(compute_streak(&[], now, TZ), 0);
    }

    #[test]
    fn test_order_does_not_matter() {
        let now = at(12, 20, 0);
        let mut records = vec![
            out("a", at(10, 8, 0)),
            out("b", at(12, 8, 0)),
            out("c", at(11, 23, 0)),
            out("d", at(12, 1, 0)),
            out("e", at(8, 8, 0)),
        ];
        let expected = compute_streak(&records, now, TZ);
        assert_eq!(expected, 3);
        records.reverse();
        assert_eq!(compute_streak(&records, now, TZ), expected);
        records.swap(0, 3);
        assert_eq!(compute_streak(&records, now, TZ), expected);
    }

    #[test]
    fn test_minutes_across_midnight_are_one_day_apart() {
        // 23:59 and 00:00 the next day
        let now = at(12, 0, 30);
        let records = vec![out("a", at(11, 23, 59)), out("b", at(12, 0, 0))];
        assert_eq!(compute_streak(&records, now, TZ), 2);
    }

    #[test]
    fn test_dst_transition_day_gap() {
        // Chicago springs forward on 2025-03-09; the 23-hour day is still one day
        let chicago = chrono_tz::America::Chicago;
        let t = |d: u32, h: u32| chicago.with_ymd_and_hms(2025, 3, d, h, 0, 0).unwrap().with_timezone(&Utc);
        let records = vec![
            LogRecord::output("a", t(8, 23), "Sketch", chicago),
            LogRecord::output("b", t(9, 23), "Sketch", chicago),
            LogRecord::output("c", t(10, 1), "Sketch", chicago),
        ];
        assert_eq!(compute_streak(&records, t(10, 12), chicago), 3);
    }
}
