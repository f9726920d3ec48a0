//! # Temporal Types: UTC Timestamps
//!
//! Defines `Timestamp`, a UTC-only timestamp truncated to millisecond
//! precision. Status history is ordered by these values, so two entries
//! written in the same second must still compare correctly; seconds
//! precision is not enough.
//!
//! Parsing is lenient about offsets (`+08:00` from a Taipei client is
//! converted to UTC) but strict about syntax: anything that is not RFC 3339
//! is rejected at the boundary.

use chrono::{DateTime, SecondsFormat, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

/// A UTC timestamp with millisecond precision.
///
/// # Construction
///
/// - [`Timestamp::now()`]: current UTC time, truncated.
/// - [`Timestamp::from_utc()`]: from a `DateTime<Utc>`, truncating.
/// - [`Timestamp::parse()`]: from an RFC 3339 string with any offset.
/// - [`Timestamp::from_epoch_millis()`]: from Unix epoch milliseconds.
///
/// Deserialization goes through [`Timestamp::from_utc()`], so stored
/// values with finer precision are truncated on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        DateTime::<Utc>::deserialize(deserializer).map(Self::from_utc)
    }
}

impl Timestamp {
    /// Create a timestamp from the current UTC time.
    pub fn now() -> Self {
        Self(truncate_to_millis(Utc::now()))
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, dropping
    /// sub-millisecond components.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_millis(dt))
    }

    /// Parse an RFC 3339 timestamp, converting any offset to UTC.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTimestamp`] if the string is not
    /// valid RFC 3339.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let dt = DateTime::parse_from_rfc3339(s.trim()).map_err(|e| {
            ValidationError::InvalidTimestamp {
                value: s.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self::from_utc(dt.with_timezone(&Utc)))
    }

    /// Create a timestamp from Unix epoch milliseconds.
    pub fn from_epoch_millis(millis: i64) -> Result<Self, ValidationError> {
        DateTime::from_timestamp_millis(millis)
            .map(Self)
            .ok_or_else(|| ValidationError::InvalidTimestamp {
                value: millis.to_string(),
                reason: "out of range".to_string(),
            })
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Unix epoch milliseconds.
    pub fn epoch_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Render as RFC 3339 with millisecond precision and a `Z` suffix
    /// (e.g. `2026-01-15T12:00:00.000Z`).
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

fn truncate_to_millis(dt: DateTime<Utc>) -> DateTime<Utc> {
    let millis = dt.nanosecond() / 1_000_000;
    dt.with_nanosecond(millis * 1_000_000).unwrap_or(dt)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Timestamp ordering agrees with epoch-millisecond ordering.
        #[test]
        fn ordering_matches_epoch_millis(a in 0i64..4_102_444_800_000, b in 0i64..4_102_444_800_000) {
            let ta = Timestamp::from_epoch_millis(a).unwrap();
            let tb = Timestamp::from_epoch_millis(b).unwrap();
            prop_assert_eq!(ta.cmp(&tb), a.cmp(&b));
        }
    }
}
