//! Display formatting for backend timestamps

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Placeholder for input that is not a recognizable date.
pub const INVALID_DATE: &str = "Invalid Date";

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Formats a timestamp as en-US long form in local time,
/// e.g. `January 5, 2024 at 03:07 PM`.
///
/// Timestamps with an offset are converted to local time, naive date-times
/// are taken as local, and bare dates are midnight UTC. Empty input gives an
/// empty string.
#[must_use]
pub fn format_date(input: &str) -> String {
    let input = input.trim();
    if input.is_empty() {
        return String::new();
    }
    parse_local(input).map_or_else(|| INVALID_DATE.to_string(), |dt| format_naive(&dt))
}

fn parse_local(input: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    if let Some(dt) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
    {
        return Some(dt);
    }
    let midnight = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&midnight).with_timezone(&Local).naive_local())
}

fn format_naive(dt: &NaiveDateTime) -> String {
    dt.format("%B %-d, %Y at %I:%M %p").to_string()
}
