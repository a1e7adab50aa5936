//! Time utilities for PeerPlay.
//!
//! Credentials carry RFC 3339 `issuanceDate` strings; JWTs carry
//! whole seconds since the Unix epoch.

use chrono::{DateTime, SecondsFormat, Utc};

/// Return the current time as seconds since Unix epoch.
pub fn now_secs() -> i64 {
    Utc::now().timestamp()
}

/// Convert seconds since Unix epoch to an RFC 3339 string.
pub fn secs_to_rfc3339(secs: i64) -> String {
    let dt = DateTime::from_timestamp(secs, 0).unwrap_or(DateTime::UNIX_EPOCH);
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse an RFC 3339 string into seconds since Unix epoch.
pub fn rfc3339_to_secs(s: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.timestamp())
}
