//! Time utilities: every calendar computation goes through the display timezone.

use std::ops::RangeInclusive;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{Error, Result};

/// Default display timezone when none is configured.
pub const DEFAULT_TIMEZONE: &str = "Asia/Shanghai";

/// Parse an IANA timezone name like "Asia/Shanghai".
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse()
        .map_err(|_| Error::UnknownTimezone(name.to_string()))
}

/// Years a stored record may be dated in.
pub const SUPPORTED_YEARS: RangeInclusive<i32> = 1..=9999;

/// Whether `instant` falls in [`SUPPORTED_YEARS`].
pub fn in_supported_range(instant: DateTime<Utc>) -> bool {
    SUPPORTED_YEARS.contains(&instant.year())
}

/// Wall clock of `instant` in `tz`. At the edges of chrono's range, where the
/// shifted value is not representable, the UTC reading is returned.
pub fn local_naive(instant: DateTime<Utc>, tz: Tz) -> NaiveDateTime {
    let utc = instant.naive_utc();
    let offset = tz.offset_from_utc_datetime(&utc).fix();
    utc.checked_add_signed(Duration::seconds(i64::from(offset.local_minus_utc())))
        .unwrap_or(utc)
}

/// Calendar date of `instant` in `tz`.
pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    local_naive(instant, tz).date()
}

/// Interpret a wall-clock time in `tz`, returning UTC.
///
/// Ambiguous times (DST fold) resolve to the earlier instant; times inside a
/// DST gap, or too close to chrono's range limits to shift, return `None`.
pub fn local_to_utc(local: NaiveDateTime, tz: Tz) -> Option<DateTime<Utc>> {
    let offset = tz.offset_from_local_datetime(&local).earliest()?.fix();
    local
        .checked_sub_signed(Duration::seconds(i64::from(offset.local_minus_utc())))
        .map(|naive| naive.and_utc())
}

/// Instant of local midnight at the start of `date`.
///
/// A few zones skip midnight on DST days; the UTC reading of the same wall
/// clock is used there so week keys stay monotonic.
pub fn local_midnight(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    local_to_utc(naive, tz).unwrap_or_else(|| naive.and_utc())
}

/// `MM-DD HH:MM` in `tz`.
pub fn short_label(instant: DateTime<Utc>, tz: Tz) -> String {
    local_naive(instant, tz).format("%m-%d %H:%M").to_string()
}

/// `MM-DD` in `tz`.
pub fn month_day_label(instant: DateTime<Utc>, tz: Tz) -> String {
    local_naive(instant, tz).format("%m-%d").to_string()
}
