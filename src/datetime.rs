//! Date/time utilities for feedsync.

use chrono::{DateTime, NaiveDateTime, Utc};

/// SQLite `datetime('now')` format.
const SQLITE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a stored timestamp.
///
/// Accepts RFC3339 as well as SQLite's `YYYY-MM-DD HH:MM:SS`, which is
/// always UTC.
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, SQLITE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Parse a stored timestamp, falling back to now for unreadable values.
pub fn parse_datetime_or_now(s: &str) -> DateTime<Utc> {
    parse_datetime(s).unwrap_or_else(Utc::now)
}

/// Format a timestamp the way SQLite stores it.
pub fn to_sqlite_string(dt: &DateTime<Utc>) -> String {
    dt.format(SQLITE_FORMAT).to_string()
}
