//! Normalization of the loosely typed `created_at` values the backend emits.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Epoch values at or above this are milliseconds, below it seconds.
///
/// 10^11 seconds is roughly the year 5138, 10^11 milliseconds is March 1973.
const MILLIS_THRESHOLD: f64 = 1e11;

/// Parse a `created_at` value into a UTC timestamp.
///
/// Accepts RFC 3339 strings, numeric strings, and JSON numbers holding epoch
/// seconds or milliseconds. Anything else yields `None`.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_f64().and_then(from_epoch),
        Value::String(s) => {
            let s = s.trim();
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(from_epoch))
        }
        _ => None,
    }
}

fn from_epoch(raw: f64) -> Option<DateTime<Utc>> {
    if !raw.is_finite() {
        return None;
    }
    let millis = if raw.abs() >= MILLIS_THRESHOLD {
        raw
    } else {
        raw * 1000.0
    };
    DateTime::from_timestamp_millis(millis as i64)
}
