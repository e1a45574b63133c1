//! Lifecycle and vendor task states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status reported by the task vendor for an asynchronous verification task.
///
/// Only `completed` and `in_progress` have defined poller behavior; anything
/// else is an unexpected terminal state and fails fast without retry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    Completed,
    InProgress,
    /// Any other vendor-reported status (`failed`, `cancelled`, ...).
    Other(String),
}

impl TaskStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "completed" => TaskStatus::Completed,
            "in_progress" => TaskStatus::InProgress,
            other => TaskStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Completed => f.write_str("completed"),
            TaskStatus::InProgress => f.write_str("in_progress"),
            TaskStatus::Other(s) => f.write_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(TaskStatus::parse(&raw))
    }
}

impl Serialize for TaskStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Persisted lifecycle state of a verification record.
///
/// `Completed`, `Failed` and `VerificationFailed` are terminal: once a record
/// carries one of them, a second terminal write for the same key must be
/// rejected as a duplicate. Status-field upserts on a `Pending` record are
/// unrestricted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Pending,
    Completed,
    Failed,
    VerificationFailed,
}

impl RecordStatus {
    /// Whether no further writes besides audit fields are meaningful.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RecordStatus::Pending)
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecordStatus::Pending => "pending",
            RecordStatus::Completed => "completed",
            RecordStatus::Failed => "failed",
            RecordStatus::VerificationFailed => "verification_failed",
        };
        f.write_str(s)
    }
}
