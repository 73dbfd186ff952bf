//! Timestamp parsing and rendering.
//!
//! Every helper formats per call from an explicit millisecond value; there is
//! no shared formatter state. Dates are anchored at UTC midnight so the same
//! log yields the same timestamps on every host.

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike};

/// Sentinel for a record whose timestamp is unknown.
pub const UNKNOWN: i64 = -1;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S,%3f";
const PRETTY_TIME_FORMAT: &str = "%H:%M:%S%.3f";
const NOT_AVAILABLE: &str = "N/A";

/// Parse `YYYY-MM-DD` into epoch milliseconds at midnight of that day.
pub fn parse_date(token: &str) -> Option<i64> {
    let date = NaiveDate::parse_from_str(token, DATE_FORMAT).ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis())
}

/// Parse `HH:MM:SS,mmm` into milliseconds within the day.
pub fn parse_time_of_day(token: &str) -> Option<i64> {
    let time = NaiveTime::parse_from_str(token, TIME_FORMAT).ok()?;
    let seconds = i64::from(time.num_seconds_from_midnight());
    let millis = i64::from(time.nanosecond() / 1_000_000);
    Some(seconds * 1_000 + millis)
}

/// `YYYY-MM-DD` of the day containing `ms`.
pub fn render_date(ms: i64) -> Option<String> {
    DateTime::from_timestamp_millis(ms).map(|dt| dt.format(DATE_FORMAT).to_string())
}

/// `HH:MM:SS,mmm` as written in log headers.
pub fn render_time(ms: i64) -> Option<String> {
    DateTime::from_timestamp_millis(ms).map(|dt| dt.format(TIME_FORMAT).to_string())
}

/// `HH:MM:SS.mmm`, or `N/A` for an unknown timestamp.
pub fn pretty_time(ms: i64) -> String {
    if ms == UNKNOWN {
        return NOT_AVAILABLE.to_string();
    }
    DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format(PRETTY_TIME_FORMAT).to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// `YYYY-MM-DD`, or `N/A` for an unknown timestamp.
pub fn pretty_date(ms: i64) -> String {
    if ms == UNKNOWN {
        return NOT_AVAILABLE.to_string();
    }
    render_date(ms).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Decimal with `,` thousands grouping: `1234567` -> `1,234,567`.
pub fn pretty_number(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
