//! Outward service seams: object storage, email, agent directory.
//!
//! These are collaborators the flows call but whose real implementations
//! live at the edge of the system (filesystem/S3, SMTP, the agent
//! database). Only the traits live here so flows, the daemon, and the test
//! doubles can all agree on one surface.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("object storage error: {0}")]
    Storage(String),
    #[error("mail error: {0}")]
    Mail(String),
    #[error("agent directory error: {0}")]
    Directory(String),
}

/// Stores vendor-delivered files (video-KYC captures) and hands back a
/// retrievable URL.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` under `key`; returns the URL the stored object is
    /// reachable at.
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<String, ServiceError>;
}

/// Outbound email, used when a rejected video-KYC session is relinked.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), ServiceError>;
}

/// An agent as the directory knows them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentContact {
    pub agent_code: String,
    pub name: String,
    pub email: String,
    pub mobile: String,
}

/// Lookup and bookkeeping over the agent/distributor directory.
///
/// The directory is keyed by video-KYC profile id while a session is open;
/// a relink moves the agent's pointer to the replacement session.
#[async_trait]
pub trait AgentDirectory: Send + Sync {
    /// Find the agent whose open session is `profile_id`.
    async fn find_by_profile(&self, profile_id: &str)
        -> Result<Option<AgentContact>, ServiceError>;

    /// Point the agent's open session at `new_profile_id`.
    async fn relink_profile(
        &self,
        agent_code: &str,
        new_profile_id: &str,
    ) -> Result<(), ServiceError>;

    /// Trigger agent-code issuance for an approved session. The reviewer
    /// action and session status are forwarded so the issuing system can
    /// re-check them.
    async fn issue_agent_code(
        &self,
        profile_id: &str,
        reviewer_action: &str,
        status: &str,
    ) -> Result<String, ServiceError>;

    /// Record that a distributor's session reached a terminal review state.
    async fn mark_distributor_reviewed(
        &self,
        profile_id: &str,
        approved: bool,
    ) -> Result<(), ServiceError>;
}
