//! Date parsing and formatting helpers

use std::time::SystemTime;

use chrono::{DateTime, NaiveDateTime, Utc};

/// Output layout for creation dates
const ISO_8601: &str = "%Y-%m-%dT%H:%M:%S";

/// Tries each layout in turn and returns the first successful parse
///
/// # Arguments
/// * `text` - The date text
/// * `formats` - `chrono` format strings, in priority order
pub fn parse_first(text: &str, formats: &[&str]) -> Option<NaiveDateTime> {
    formats
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text.trim(), format).ok())
}

/// Formats a timestamp as ISO-8601 without a zone suffix
pub fn to_iso8601(date: &NaiveDateTime) -> String {
    date.format(ISO_8601).to_string()
}

/// Formats a filesystem timestamp as ISO-8601 (UTC)
pub fn system_time_to_iso8601(time: SystemTime) -> String {
    let date: DateTime<Utc> = time.into();
    to_iso8601(&date.naive_utc())
}

/// The current time as ISO-8601 (UTC)
pub fn now_iso8601() -> String {
    to_iso8601(&Utc::now().naive_utc())
}
