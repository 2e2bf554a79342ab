//! Timestamps written into marker files.

use chrono::{DateTime, SecondsFormat, Utc};

/// Current time as an RFC 3339 string, as written into marker files.
pub fn timestamp() -> String {
    format_timestamp(Utc::now())
}

/// Format a timestamp the way marker files record it.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
