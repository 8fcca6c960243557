//! Route handlers.

pub mod core;
pub mod records;
pub mod views;

use chrono::{SecondsFormat, Utc};

/// Response timestamp, ISO-8601 with milliseconds.
pub(crate) fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
