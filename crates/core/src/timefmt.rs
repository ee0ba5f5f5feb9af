//! Timestamp parsing and relative-time display formatting.
//!
//! Display code never fails on bad data: the lenient entry points degrade
//! to a neutral result, while the fallible variants stay available for
//! callers that need to tell malformed input apart from a real value.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Accepted timezone-less formats, interpreted as UTC. These are what the
/// admin forms produce for `datetime-local` inputs.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Parse a stored timestamp string.
///
/// Accepts full RFC 3339 (`2024-01-31T00:00:00.000Z`) as well as the
/// timezone-less `datetime-local` shapes (`2024-01-31T00:00`).
pub fn parse_timestamp(value: &str) -> Result<Timestamp, CoreError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(CoreError::Validation(format!(
        "unparseable timestamp '{value}'"
    )))
}

/// Relative distance from `now`, e.g. `"3 days ago"` or `"in 2 hours"`.
///
/// Degrades to an empty string on unparseable input.
pub fn published_since(value: &str, now: Timestamp) -> String {
    try_published_since(value, now).unwrap_or_default()
}

/// Fallible variant of [`published_since`].
pub fn try_published_since(value: &str, now: Timestamp) -> Result<String, CoreError> {
    let date = parse_timestamp(value)?;
    let distance = distance_strict(date, now);
    if date > now {
        Ok(format!("in {distance}"))
    } else {
        Ok(format!("{distance} ago"))
    }
}

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const MONTH: i64 = 30 * DAY;
const YEAR: i64 = 365 * DAY;

/// Largest-unit distance between two instants, strict units only
/// ("1 minute", "3 days" -- never "about a minute").
fn distance_strict(a: Timestamp, b: Timestamp) -> String {
    let secs = (b - a).num_seconds().abs();
    let (count, unit) = if secs < MINUTE {
        (secs, "second")
    } else if secs < HOUR {
        (secs / MINUTE, "minute")
    } else if secs < DAY {
        (secs / HOUR, "hour")
    } else if secs < MONTH {
        (secs / DAY, "day")
    } else if secs < YEAR {
        (secs / MONTH, "month")
    } else {
        (secs / YEAR, "year")
    };
    let plural = if count == 1 { "" } else { "s" };
    format!("{count} {unit}{plural}")
}
