//! Presentation rounding. Totals accumulate at full precision; only the
//! rendered value is rounded.

use serde::Serializer;

/// Round `value` to `places` decimals, half away from zero.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Fixed two-decimal rendering for money.
pub fn money(value: f64) -> String {
    format!("{:.2}", round_to(value, 2))
}

/// Fixed one-decimal rendering for percentages.
pub fn percent(value: f64) -> String {
    format!("{:.1}", round_to(value, 1))
}

/// Minutes as `1h 25m`, or `40m` under an hour.
pub fn minutes(total: f64) -> String {
    let m = total.round() as i64;
    if m < 60 {
        format!("{m}m")
    } else {
        format!("{}h {:02}m", m / 60, m % 60)
    }
}

pub(crate) fn serialize_2dp<S: Serializer>(value: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(round_to(*value, 2))
}

pub(crate) fn serialize_1dp<S: Serializer>(value: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(round_to(*value, 1))
}
