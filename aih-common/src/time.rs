//! Timestamp utilities

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};

/// Storage format for every timestamp column
///
/// Lexically ordered, so range filters can compare the raw text and
/// SQLite date functions (`JULIANDAY`, `strftime`) accept it.
pub const DB_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current UTC time formatted for storage
pub fn db_now() -> String {
    to_db_timestamp(&now().naive_utc())
}

pub fn to_db_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(DB_TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp
pub fn parse_db_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, DB_TIMESTAMP_FORMAT).ok()
}

/// Competency (MM/YYYY) of the current month
pub fn current_competency() -> String {
    let today = now();
    format!("{:02}/{}", today.month(), today.year())
}

pub fn current_year() -> i32 {
    now().year()
}
