//! Timestamp type used throughout the gateway.
//!
//! Timestamps are UTC instants internally, but every persisted and returned
//! representation renders in IST (+05:30) as `%Y-%m-%dT%H:%M:%S%z` — the
//! format the downstream consumers of the verification records expect.

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Offset for Indian Standard Time.
const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// A point in time, rendered in IST on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Get the current system time as a `Timestamp`.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    pub fn as_utc(&self) -> DateTime<Utc> {
        self.0
    }

    /// Render as an IST string, e.g. `2025-05-02T14:03:21+0530`.
    pub fn to_ist_string(&self) -> String {
        let ist = FixedOffset::east_opt(IST_OFFSET_SECS).unwrap_or_else(|| {
            // 5h30m is always a valid offset; this branch is unreachable.
            FixedOffset::east_opt(0).unwrap()
        });
        self.0
            .with_timezone(&ist)
            .format("%Y-%m-%dT%H:%M:%S%z")
            .to_string()
    }

    /// Parse a timestamp from its IST (or any RFC 3339-ish offset) rendering.
    pub fn parse(s: &str) -> Option<Self> {
        DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z")
            .ok()
            .map(|dt| Self(dt.with_timezone(&Utc)))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ist_string())
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_ist_string())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Timestamp::parse(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid timestamp: {raw}"))
        })
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

/// RFC 3339 UTC rendering, used for audit events rather than stored records.
pub fn utc_rfc3339_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn renders_ist_offset() {
        let ts = Timestamp::from_utc(Utc.with_ymd_and_hms(2025, 5, 2, 8, 33, 21).unwrap());
        assert_eq!(ts.to_ist_string(), "2025-05-02T14:03:21+0530");
    }

    #[test]
    fn parse_round_trips() {
        let ts = Timestamp::from_utc(Utc.with_ymd_and_hms(2024, 12, 31, 18, 30, 0).unwrap());
        let rendered = ts.to_ist_string();
        let back = Timestamp::parse(&rendered).unwrap();
        assert_eq!(back, ts);
    }

    #[test]
    fn serde_uses_ist_string() {
        let ts = Timestamp::from_utc(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"2025-01-01T05:30:00+0530\"");
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
    }

    #[test]
    fn rejects_garbage() {
        assert!(Timestamp::parse("yesterday").is_none());
    }
}
