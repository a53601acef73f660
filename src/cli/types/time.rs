//! Date and time parsing for command-line input.

use crate::error::{ClubError, Result};
use chrono::{NaiveDate, NaiveDateTime};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Accepted event time layouts, most specific first.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| ClubError::InvalidDate {
        value: s.to_string(),
    })
}

/// Parse a local event time such as `2025-03-14 17:30` or `2025-03-14T17:30:00`.
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime> {
    let trimmed = s.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| ClubError::InvalidDate {
            value: s.to_string(),
        })
}

/// Today's date on the club's local clock.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
