//! Recording service doubles: object storage, mail, agent directory.

use async_trait::async_trait;
use idgate_utils::services::{
    AgentContact, AgentDirectory, Mailer, ObjectStorage, ServiceError,
};
use std::collections::HashMap;
use std::sync::Mutex;

/// Object storage that keeps uploads in memory and answers with a
/// predictable URL (`null://{key}`). Keys listed in `fail_keys` fail, for
/// exercising per-file error handling.
#[derive(Default)]
pub struct RecordingObjectStore {
    stored: Mutex<HashMap<String, Vec<u8>>>,
    fail_keys: Mutex<Vec<String>>,
}

impl RecordingObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(&self, key: impl Into<String>) {
        self.fail_keys.lock().unwrap().push(key.into());
    }

    pub fn stored_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.stored.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.stored.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl ObjectStorage for RecordingObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<String, ServiceError> {
        if self.fail_keys.lock().unwrap().iter().any(|k| k == key) {
            return Err(ServiceError::Storage(format!("upload refused: {key}")));
        }
        self.stored.lock().unwrap().insert(key.to_string(), bytes);
        Ok(format!("null://{key}"))
    }
}

/// One captured outbound email.
#[derive(Clone, Debug)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Mailer that records messages instead of sending them.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), ServiceError> {
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

/// In-memory agent directory keyed by profile id. Relinks, issued codes and
/// distributor reviews are all recorded for assertions.
#[derive(Default)]
pub struct NullAgentDirectory {
    agents: Mutex<HashMap<String, AgentContact>>,
    relinks: Mutex<Vec<(String, String)>>,
    issued: Mutex<Vec<String>>,
    reviews: Mutex<Vec<(String, bool)>>,
}

impl NullAgentDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent whose open session is `profile_id`.
    pub fn with_agent(self, profile_id: impl Into<String>, agent: AgentContact) -> Self {
        self.agents.lock().unwrap().insert(profile_id.into(), agent);
        self
    }

    /// `(agent_code, new_profile_id)` pairs, in relink order.
    pub fn relinks(&self) -> Vec<(String, String)> {
        self.relinks.lock().unwrap().clone()
    }

    /// Profile ids agent codes were issued for.
    pub fn issued(&self) -> Vec<String> {
        self.issued.lock().unwrap().clone()
    }

    /// `(profile_id, approved)` distributor review records.
    pub fn reviews(&self) -> Vec<(String, bool)> {
        self.reviews.lock().unwrap().clone()
    }
}

#[async_trait]
impl AgentDirectory for NullAgentDirectory {
    async fn find_by_profile(
        &self,
        profile_id: &str,
    ) -> Result<Option<AgentContact>, ServiceError> {
        Ok(self.agents.lock().unwrap().get(profile_id).cloned())
    }

    async fn relink_profile(
        &self,
        agent_code: &str,
        new_profile_id: &str,
    ) -> Result<(), ServiceError> {
        self.relinks
            .lock()
            .unwrap()
            .push((agent_code.to_string(), new_profile_id.to_string()));
        Ok(())
    }

    async fn issue_agent_code(
        &self,
        profile_id: &str,
        _reviewer_action: &str,
        _status: &str,
    ) -> Result<String, ServiceError> {
        self.issued.lock().unwrap().push(profile_id.to_string());
        Ok(format!("AG-{}", self.issued.lock().unwrap().len()))
    }

    async fn mark_distributor_reviewed(
        &self,
        profile_id: &str,
        approved: bool,
    ) -> Result<(), ServiceError> {
        self.reviews
            .lock()
            .unwrap()
            .push((profile_id.to_string(), approved));
        Ok(())
    }
}
