//! Category classifier: split a snapshot into time, money and output streams.

use serde::Serialize;

use crate::record::{Category, LogRecord};

/// Three disjoint streams, each in input order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassifiedLogs {
    pub time: Vec<LogRecord>,
    pub money: Vec<LogRecord>,
    pub output: Vec<LogRecord>,
}

impl ClassifiedLogs {
    pub fn stream(&self, category: Category) -> &[LogRecord] {
        match category {
            Category::Time => &self.time,
            Category::Money => &self.money,
            Category::Output => &self.output,
        }
    }

    pub fn len(&self) -> usize {
        self.time.len() + self.money.len() + self.output.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partition records by category. Every record lands in exactly one stream.
pub fn classify(records: &[LogRecord]) -> ClassifiedLogs {
    let mut out = ClassifiedLogs::default();

    for record in records {
        let stream = match record.category() {
            Category::Time => &mut out.time,
            Category::Money => &mut out.money,
            Category::Output => &mut out.output,
        };
        stream.push(record.clone());
    }

    tracing::debug!(
        time = out.time.len(),
        money = out.money.len(),
        output = out.output.len(),
        "classified records"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use std::collections::HashSet;

    const TZ: chrono_tz::Tz = chrono_tz::Asia::Shanghai;

    fn mixed() -> Vec<LogRecord> {
        let t0 = Utc.with_ymd_and_hms(2025, 3, 3, 1, 0, 0).unwrap();
        vec![
            LogRecord::time("a", t0, "Write Paper", 30.0, TZ),
            LogRecord::money("b", t0 + Duration::hours(1), "Lunch", 25.0, TZ),
            LogRecord::output("c", t0 + Duration::hours(2), "Sketch", TZ),
            LogRecord::time("d", t0 + Duration::hours(3), "Gym", 60.0, TZ),
            LogRecord::money("e", t0 + Duration::hours(4), "Books", 80.0, TZ),
        ]
    }

    #[test]
    fn test_partition_is_exact() {
        let input = mixed();
        let out = classify(&input);
        assert_eq!(out.len(), input.len());

        let mut seen = HashSet::new();
        for r in out.time.iter().chain(&out.money).chain(&out.output) {
            assert!(seen.insert(r.id.clone()), "{} appears twice", r.id);
        }
        let expected: HashSet<_> = input.iter().map(|r| r.id.clone()).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_order_within_stream_is_stable() {
        let out = classify(&mixed());
        fn ids(v: &[LogRecord]) -> Vec<&str> { v.iter().map(|r| r.id.as_str()).collect() }
        assert_eq!(ids(&out.time), vec!["a", "d"]);
        assert_eq!(ids(&out.money), vec!["b", "e"]);
        assert_eq!(ids(out.stream(Category::Output)), vec!["c"]);
    }

    #[test]
    fn test_empty_input() {
        let out = classify(&[]);
        assert!(out.is_empty());
    }
}
