//! # Time Utilities
//!
//! Clock helpers built on chrono.

use chrono::{DateTime, Utc};

/// Get current UTC time.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Milliseconds since the Unix epoch.
pub fn unix_millis(time: DateTime<Utc>) -> i64 {
    time.timestamp_millis()
}
