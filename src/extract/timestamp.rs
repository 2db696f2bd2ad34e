//! Timestamp handling for export fields; every result is truncated to a date.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};

/// Offset-carrying layouts, Twitter's `created_at` first.
const OFFSET_FORMATS: [&str; 3] = [
    "%a %b %d %H:%M:%S %z %Y",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S %z",
];

const NAIVE_DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%b %d, %Y %r",
];

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%m/%d/%Y", "%b %d, %Y", "%B %d, %Y", "%d %B %Y"];

/// Calendar date of an epoch-seconds timestamp in the local time zone
#[must_use]
pub fn epoch_to_local_date(secs: i64) -> Option<NaiveDate> {
    Local
        .timestamp_opt(secs, 0)
        .earliest()
        .map(|dt| dt.date_naive())
}

/// Parse a textual date-time in any of the layouts exports are known to use.
///
/// Timestamps with an offset keep the date in their own offset.
#[must_use]
pub fn parse_loose_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .ok()
        .or_else(|| {
            OFFSET_FORMATS
                .iter()
                .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
        })
        .map(|dt| dt.date_naive())
        .or_else(|| {
            NAIVE_DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        })
}
