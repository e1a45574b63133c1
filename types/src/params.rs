//! Per-flow polling policy.
//!
//! The vendor task API is asynchronous: a submit returns a request id and the
//! result must be fetched by repeated status queries. How patient the gateway
//! is differs per document type — Aadhaar redirect-link generation settles in
//! one or two checks, PAN source lookups can take five — so the budget is
//! flow-level configuration, never a universal constant.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry budget and inter-poll delay for one verification flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollPolicy {
    /// Maximum number of status checks before giving up.
    #[serde(default = "default_max_checks")]
    pub max_checks: u32,

    /// Delay between consecutive checks, in seconds. The first check is
    /// issued immediately; the delay applies only between retries.
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,
}

impl PollPolicy {
    pub fn new(max_checks: u32, delay_secs: u64) -> Self {
        Self {
            max_checks,
            delay_secs,
        }
    }

    /// Default policy for Aadhaar digilocker-redirect flows: 2 checks, 5 s apart.
    pub fn aadhaar() -> Self {
        Self::new(2, 5)
    }

    /// Default policy for PAN source verification: 5 checks, 5 s apart.
    pub fn pan() -> Self {
        Self::new(5, 5)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(default_max_checks(), default_delay_secs())
    }
}

fn default_max_checks() -> u32 {
    2
}

fn default_delay_secs() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_defaults_differ() {
        assert_eq!(PollPolicy::aadhaar().max_checks, 2);
        assert_eq!(PollPolicy::pan().max_checks, 5);
        assert_eq!(PollPolicy::aadhaar().delay(), Duration::from_secs(5));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let policy: PollPolicy = toml_like_from_json(r#"{"max_checks": 3}"#);
        assert_eq!(policy.max_checks, 3);
        assert_eq!(policy.delay_secs, 5);
    }

    fn toml_like_from_json(json: &str) -> PollPolicy {
        serde_json::from_str(json).unwrap()
    }
}
