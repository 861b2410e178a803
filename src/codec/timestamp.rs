use chrono::{DateTime, NaiveDateTime, Utc};

/// Wire format shared by requests and responses: UTC, millisecond precision.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Length of `2015-12-23T00:00:00.000Z`.
const TIMESTAMP_LEN: usize = 24;

/// Parses a wire timestamp. Empty or malformed input yields `None`, and so
/// does anything without exactly three fractional digits.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    // chrono treats the `%.3f` fraction as optional when parsing.
    if raw.len() != TIMESTAMP_LEN || raw.as_bytes().get(19) != Some(&b'.') {
        return None;
    }
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}
