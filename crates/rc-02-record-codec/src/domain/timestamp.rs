//! Timestamp conversion between caller input, contract storage (Unix
//! seconds) and presentation (ISO-8601 UTC with milliseconds).

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

use super::errors::CodecError;

/// A timestamp as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimestampInput {
    Seconds(u64),
    Fractional(f64),
    Text(String),
}

impl TimestampInput {
    /// Whole Unix seconds, fractions floored.
    pub fn to_unix_seconds(&self) -> Result<u64, CodecError> {
        match self {
            TimestampInput::Seconds(secs) => Ok(*secs),
            TimestampInput::Fractional(secs) if secs.is_finite() && *secs >= 0.0 => {
                Ok(secs.floor() as u64)
            }
            TimestampInput::Fractional(secs) => Err(CodecError::InvalidTimestamp(secs.to_string())),
            TimestampInput::Text(text) => parse_iso_seconds(text),
        }
    }
}

impl From<u64> for TimestampInput {
    fn from(secs: u64) -> Self {
        TimestampInput::Seconds(secs)
    }
}

impl From<&str> for TimestampInput {
    fn from(text: &str) -> Self {
        TimestampInput::Text(text.to_string())
    }
}

/// Parses an ISO-8601 date or date-time to whole Unix seconds.
///
/// Accepts RFC 3339 (`2024-01-01T00:00:00.999Z`, offsets included), a
/// zone-less date-time read as UTC, or a bare date at UTC midnight.
/// Sub-second precision is floored. Instants before the epoch are rejected.
pub fn parse_iso_seconds(text: &str) -> Result<u64, CodecError> {
    let text = text.trim();
    let invalid = || CodecError::InvalidTimestamp(text.to_string());

    let seconds = if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        dt.timestamp()
    } else if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        naive.and_utc().timestamp()
    } else if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        date.and_hms_opt(0, 0, 0).ok_or_else(invalid)?.and_utc().timestamp()
    } else {
        return Err(invalid());
    };

    u64::try_from(seconds).map_err(|_| invalid())
}

/// `2024-01-01T00:00:00.000Z`; `None` when out of chrono's range.
pub fn to_iso(seconds: u64) -> Option<String> {
    let seconds = i64::try_from(seconds).ok()?;
    DateTime::<Utc>::from_timestamp(seconds, 0)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Serde helper presenting stored seconds as ISO-8601, falling back to the
/// raw number for values no calendar can hold.
pub fn serialize_iso<S>(seconds: &u64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match to_iso(*seconds) {
        Some(iso) => serializer.serialize_str(&iso),
        None => serializer.serialize_u64(*seconds),
    }
}
