//! Record normalizer: stored documents → `LogRecord`.
//!
//! Timestamps must resolve to a concrete instant. A record whose timestamp
//! cannot be resolved is rejected, never stamped with "now".

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use lifelog_core::record::{Category, LogRecord, OutputInfo, RecordPayload};
use lifelog_core::task::{Priority, TaskInfo, TaskStatus};
use lifelog_core::{time, Error, Result};
use serde_json::Value;

use crate::types::{RawOutputData, RawRecord, RawTaskInfo};

const LOCAL_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// Resolve a stored timestamp. Wall-clock strings without an offset are read
/// in `tz`; bare numbers are epoch milliseconds. Instants outside
/// [`time::SUPPORTED_YEARS`] are rejected.
pub fn resolve_timestamp(value: &Value, tz: Tz) -> std::result::Result<DateTime<Utc>, String> {
    let instant = resolve_instant(value, tz)?;
    if !time::in_supported_range(instant) {
        return Err(format!("{instant} is outside the supported years"));
    }
    Ok(instant)
}

fn resolve_instant(value: &Value, tz: Tz) -> std::result::Result<DateTime<Utc>, String> {
    match value {
        Value::String(s) => parse_timestamp_str(s, tz),
        Value::Number(n) => {
            let millis = n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
                .ok_or_else(|| format!("unusable epoch value {n}"))?;
            DateTime::from_timestamp_millis(millis).ok_or_else(|| format!("epoch {millis} out of range"))
        }
        Value::Object(map) => match map.get("$date") {
            Some(inner) => resolve_instant(inner, tz),
            None => Err("date object without $date".to_string()),
        },
        Value::Null => Err("missing timestamp".to_string()),
        other => Err(format!("unsupported timestamp {other}")),
    }
}

fn parse_timestamp_str(s: &str, tz: Tz) -> std::result::Result<DateTime<Utc>, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty timestamp".to_string());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if s.bytes().all(|b| b.is_ascii_digit()) {
        let millis: i64 = s.parse().map_err(|e| format!("invalid epoch '{s}': {e}"))?;
        return DateTime::from_timestamp_millis(millis).ok_or_else(|| format!("epoch {millis} out of range"));
    }

    let local = LOCAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
        .ok_or_else(|| format!("unrecognized timestamp '{s}'"))?;

    time::local_to_utc(local, tz).ok_or_else(|| format!("'{s}' does not exist in {tz}"))
}

/// Numbers or numeric strings; anything else is treated as absent.
fn coerce_number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|f| f.is_finite())
}

fn task_info(raw: &RawTaskInfo) -> TaskInfo {
    let priority = coerce_number(raw.priority.as_ref())
        .and_then(|p| Priority::try_from(p as u8).ok())
        .unwrap_or_default();
    TaskInfo {
        priority,
        status: TaskStatus::from_tag(raw.status.as_deref()),
        is_continuous: raw.is_continuous.unwrap_or(false),
    }
}

fn output_info(raw: &RawOutputData) -> OutputInfo {
    let defaults = OutputInfo::default();
    OutputInfo {
        kind: raw
            .kind
            .clone()
            .filter(|k| !k.trim().is_empty())
            .unwrap_or(defaults.kind),
        satisfaction: coerce_number(raw.satisfaction.as_ref())
            .map(|s| s.round().clamp(1.0, 5.0) as u8)
            .unwrap_or(defaults.satisfaction),
        link: raw.link.clone().unwrap_or_default(),
    }
}

fn non_empty(s: &Option<String>) -> Option<String> {
    s.as_ref().filter(|v| !v.is_empty()).cloned()
}

/// Normalize one stored record.
pub fn normalize(raw: &RawRecord, tz: Tz) -> Result<LogRecord> {
    let created_at = match &raw.create_time {
        Some(v) => resolve_timestamp(v, tz).map_err(|reason| Error::malformed(&raw.id, reason))?,
        None => return Err(Error::malformed(&raw.id, "missing timestamp")),
    };

    let payload = match Category::from_tag(raw.record_type.as_deref()) {
        Category::Time => RecordPayload::Time {
            duration: coerce_number(raw.duration.as_ref()),
            task: raw.task_info.as_ref().map(task_info),
        },
        Category::Money => RecordPayload::Money {
            amount: coerce_number(raw.amount.as_ref()),
        },
        Category::Output => RecordPayload::Output {
            output: raw.output_data.as_ref().map(output_info),
        },
    };

    let mut record = LogRecord::new(
        raw.id.clone(),
        created_at,
        raw.activity.clone().unwrap_or_default(),
        payload,
        tz,
    );
    record.owner_id = raw.owner_id.clone();
    record.note = non_empty(&raw.note);
    record.attachment = non_empty(&raw.file_id);
    Ok(record)
}

/// A record that failed normalization
#[derive(Debug, Clone, PartialEq)]
pub struct Rejected {
    pub id: String,
    pub error: Error,
}

/// Output of a skip-and-continue pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    /// Good records, input order
    pub records: Vec<LogRecord>,
    pub rejected: Vec<Rejected>,
}

/// Normalize a batch, skipping malformed records instead of aborting.
pub fn normalize_all(raws: &[RawRecord], tz: Tz) -> Normalized {
    let mut out = Normalized::default();

    for raw in raws {
        match normalize(raw, tz) {
            Ok(record) => out.records.push(record),
            Err(error) => {
                tracing::warn!(id = %raw.id, %error, "skipping record");
                out.rejected.push(Rejected {
                    id: raw.id.clone(),
                    error,
                });
            }
        }
    }

    tracing::debug!(
        accepted = out.records.len(),
        rejected = out.rejected.len(),
        "normalized records"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    const TZ: Tz = chrono_tz::Asia::Shanghai;

    fn raw(value: Value) -> RawRecord {
        serde_json::from_value(value).unwrap()
    }

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        TZ.with_ymd_and_hms(y, m, d, h, min, 0).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_timestamp_forms() {
        let expected = local(2025, 3, 3, 9, 0);
        let forms = [
            json!("2025-03-03T09:00:00+08:00"),
            json!("2025-03-03T01:00:00Z"),
            json!("2025-03-03 09:00:00"),
            json!("2025-03-03 09:00"),
            json!("2025/03/03 09:00"),
            json!(expected.timestamp_millis()),
            json!(expected.timestamp_millis().to_string()),
            json!({"$date": expected.timestamp_millis()}),
            json!({"$date": "2025-03-03T01:00:00.000Z"}),
        ];
        for form in forms {
            assert_eq!(resolve_timestamp(&form, TZ), Ok(expected), "form {form}");
        }
        assert_eq!(resolve_timestamp(&json!("2025-03-03"), TZ), Ok(local(2025, 3, 3, 0, 0)));
    }

    #[test]
    fn test_bad_timestamps_are_rejected() {
        for bad in [json!(null), json!(""), json!("yesterday"), json!(true), json!({"seconds": 1})] {
            assert!(resolve_timestamp(&bad, TZ).is_err(), "accepted {bad}");
        }
        // Spring-forward gap in Chicago
        assert!(resolve_timestamp(&json!("2026-03-08 02:30"), chrono_tz::America::Chicago).is_err());
    }

    #[test]
    fn test_out_of_range_epochs_are_rejected() {
        let extremes = [
            json!(8_210_266_876_799_999_i64),
            json!(-8_334_601_228_800_000_i64),
            json!("8210266876799999"),
            json!({"$date": 253_402_300_800_000_i64}),
            json!("0000-06-01T00:00:00Z"),
        ];
        for value in extremes {
            assert!(resolve_timestamp(&value, TZ).is_err(), "accepted {value}");
        }
        // Last millisecond of year 9999 UTC is still a date
        assert!(resolve_timestamp(&json!(253_402_300_799_999_i64), TZ).is_ok());
    }

    #[test]
    fn test_normalize_time_record() {
        let r = normalize(
            &raw(json!({
                "_id": "t1",
                "recordType": "time",
                "activity": "Write Paper",
                "createTime": "2025-03-03 09:05",
                "duration": "45",
                "task_info": {"priority": "1", "status": "done", "is_continuous": true},
                "note": "",
                "fileID": "cloud://img.jpg"
            })),
            TZ,
        )
        .unwrap();
        assert_eq!(r.category(), Category::Time);
        assert_eq!(r.date_label, "03-03 09:05");
        assert_eq!(r.duration(), 45.0);
        let task = r.task().unwrap();
        assert_eq!(task.priority, Priority::P1);
        assert_eq!(task.status, TaskStatus::Done);
        assert!(task.is_continuous);
        assert_eq!(r.note, None);
        assert_eq!(r.attachment.as_deref(), Some("cloud://img.jpg"));
    }

    #[test]
    fn test_missing_tag_defaults_to_time() {
        let r = normalize(
            &raw(json!({"_id": "legacy", "activity": "Read", "createTime": "2025-03-03 09:00"})),
            TZ,
        )
        .unwrap();
        assert_eq!(r.category(), Category::Time);
        assert_eq!(r.duration(), 0.0);
        assert!(r.task().is_none());
    }

    #[test]
    fn test_normalize_money_and_output() {
        let money = normalize(
            &raw(json!({"_id": "m", "recordType": "money", "activity": "Lunch",
                        "createTime": "2025-03-03 12:00", "amount": "abc"})),
            TZ,
        )
        .unwrap();
        assert_eq!(money.amount(), 0.0);

        let out = normalize(
            &raw(json!({"_id": "o", "recordType": "output", "activity": "Poem",
                        "createTime": "2025-03-03 12:00",
                        "output_data": {"type": "", "satisfaction": 9, "link": "https://x.y"}})),
            TZ,
        )
        .unwrap();
        let info = out.output_info().unwrap();
        assert_eq!(info.kind, "code");
        assert_eq!(info.satisfaction, 5);
        assert_eq!(info.link, "https://x.y");
    }

    #[test]
    fn test_bad_priority_falls_back() {
        let r = normalize(
            &raw(json!({"_id": "t", "createTime": "2025-03-03 12:00",
                        "task_info": {"priority": 7}})),
            TZ,
        )
        .unwrap();
        assert_eq!(r.task().unwrap().priority, Priority::P2);
    }

    #[test]
    fn test_normalize_all_skips_and_continues() {
        let raws = vec![
            raw(json!({"_id": "a", "createTime": "2025-03-03 09:00", "activity": "A"})),
            raw(json!({"_id": "b", "activity": "B"})),
            raw(json!({"_id": "c", "createTime": "not a date", "activity": "C"})),
            raw(json!({"_id": "d", "createTime": "2025-03-04 09:00", "activity": "D"})),
        ];
        let out = normalize_all(&raws, TZ);
        let ids: Vec<_> = out.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "d"]);
        assert_eq!(out.rejected.len(), 2);
        assert_eq!(out.rejected[0].id, "b");
        assert!(matches!(
            &out.rejected[1].error,
            Error::MalformedRecord { id, .. } if id == "c"
        ));
    }
}
