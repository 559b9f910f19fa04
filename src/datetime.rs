//! Calendar and clock plumbing at the chrono seam.
//!
//! Timestamps are `DateTime<Utc>` everywhere inside the crate; text input
//! accepts ISO 8601 with an optional offset (a missing offset means UTC)
//! and text output is Postgres style, e.g. `2001-01-01 08:00:00+00`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Timelike, Utc};

use crate::errors::{Error, Result};

const DATETIME_TZ_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M%#z",
    "%Y-%m-%dT%H:%M%#z",
];

const DATETIME_NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse a timestamptz literal.
pub fn parse_timestamptz(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Ok(t.with_timezone(&Utc));
    }
    for fmt in DATETIME_TZ_FORMATS {
        if let Ok(t) = DateTime::parse_from_str(s, fmt) {
            return Ok(t.with_timezone(&Utc));
        }
    }
    for fmt in DATETIME_NAIVE_FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(t.and_utc());
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(midnight_utc(d));
    }
    Err(Error::text(format!(
        "Invalid input syntax for type timestamptz: \"{s}\""
    )))
}

/// Parse a date literal.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| Error::text(format!("Invalid input syntax for type date: \"{s}\"")))
}

/// Postgres-style output: seconds always, fractional seconds only when
/// present, offset spelled `+00`.
pub fn format_timestamptz(t: DateTime<Utc>) -> String {
    if t.nanosecond() == 0 {
        t.format("%Y-%m-%d %H:%M:%S+00").to_string()
    } else {
        let s = t.format("%Y-%m-%d %H:%M:%S%.6f").to_string();
        let trimmed = s.trim_end_matches('0').trim_end_matches('.');
        format!("{trimmed}+00")
    }
}

pub fn format_date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

/// Promote a date to midnight UTC of that day.
pub fn midnight_utc(d: NaiveDate) -> DateTime<Utc> {
    d.and_hms_opt(0, 0, 0)
        .expect("midnight is always a valid time")
        .and_utc()
}

/// A duration interval must be strictly positive.
pub fn ensure_positive_duration(d: TimeDelta) -> Result<()> {
    if d <= TimeDelta::zero() {
        return Err(Error::arg_value("The duration must be a positive interval"));
    }
    Ok(())
}
