//! Archive file naming: `<db>-<ISO-8601 with ':' and '.' replaced by '-'>.gz`

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};

/// Extension of every archive produced by the dump utility
pub const ARCHIVE_EXTENSION: &str = "gz";

/// Length of `2024-01-31T23-59-59-123Z`
const TIMESTAMP_LEN: usize = 24;

/// `2024-01-31T23:59:59.123Z` rendered as `2024-01-31T23-59-59-123Z`
pub fn timestamp_fragment(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
        .replace([':', '.'], "-")
}

/// File name for a new archive of `db_name` taken at `at`
pub fn archive_file_name(db_name: &str, at: DateTime<Utc>) -> String {
    format!("{}-{}.{}", db_name, timestamp_fragment(at), ARCHIVE_EXTENSION)
}

/// Whether a file name carries the archive extension
pub fn is_archive_name(file_name: &str) -> bool {
    file_name
        .strip_suffix(ARCHIVE_EXTENSION)
        .is_some_and(|stem| stem.len() > 1 && stem.ends_with('.'))
}

/// Recover the creation instant encoded in an archive name
pub fn parse_archive_timestamp(file_name: &str) -> Option<DateTime<Utc>> {
    let stem = file_name.strip_suffix(&format!(".{}", ARCHIVE_EXTENSION))?;
    if stem.len() < TIMESTAMP_LEN + 1 || !stem.is_char_boundary(stem.len() - TIMESTAMP_LEN) {
        return None;
    }
    let (prefix, fragment) = stem.split_at(stem.len() - TIMESTAMP_LEN);
    if !prefix.ends_with('-') || !fragment.is_ascii() || !fragment.ends_with('Z') {
        return None;
    }

    let seconds = NaiveDateTime::parse_from_str(&fragment[..19], "%Y-%m-%dT%H-%M-%S").ok()?;
    if &fragment[19..20] != "-" {
        return None;
    }
    let millis: i64 = fragment[20..23].parse().ok()?;

    Some(Utc.from_utc_datetime(&(seconds + Duration::milliseconds(millis))))
}
