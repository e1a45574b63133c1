//! Real implementations of the gateway's edge services: filesystem object
//! storage, an HTTP mail relay, and the HTTP agent directory.

use async_trait::async_trait;
use idgate_utils::services::{AgentContact, AgentDirectory, Mailer, ObjectStorage, ServiceError};
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::debug;

/// Writes vendor-delivered files under a local directory and serves them
/// back as `{public_base_url}/{key}` links.
pub struct FsObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl FsObjectStore {
    pub fn new(root: PathBuf, public_base_url: impl Into<String>) -> Self {
        Self {
            root,
            public_base_url: public_base_url.into(),
        }
    }
}

#[async_trait]
impl ObjectStorage for FsObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<String, ServiceError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| ServiceError::Storage(format!("creating {}: {e}", self.root.display())))?;
        let path = self.root.join(key);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| ServiceError::Storage(format!("writing {}: {e}", path.display())))?;
        debug!(key, "stored object");
        Ok(format!("{}/{key}", self.public_base_url))
    }
}

/// Posts messages to an HTTP mail relay.
pub struct HttpMailer {
    client: reqwest::Client,
    relay_url: String,
    from: String,
}

impl HttpMailer {
    pub fn new(
        client: reqwest::Client,
        relay_url: impl Into<String>,
        from: impl Into<String>,
    ) -> Self {
        Self {
            client,
            relay_url: relay_url.into(),
            from: from.into(),
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), ServiceError> {
        self.client
            .post(&self.relay_url)
            .json(&json!({
                "from": self.from,
                "to": to,
                "subject": subject,
                "html_body": body,
            }))
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| ServiceError::Mail(e.to_string()))?;
        debug!(to, subject, "mail relayed");
        Ok(())
    }
}

/// HTTP client for the agent/distributor directory service.
pub struct HttpAgentDirectory {
    client: reqwest::Client,
    lookup_url: String,
    relink_url: String,
    agent_code_url: String,
    distributor_review_url: String,
}

impl HttpAgentDirectory {
    pub fn new(
        client: reqwest::Client,
        lookup_url: impl Into<String>,
        relink_url: impl Into<String>,
        agent_code_url: impl Into<String>,
        distributor_review_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            lookup_url: lookup_url.into(),
            relink_url: relink_url.into(),
            agent_code_url: agent_code_url.into(),
            distributor_review_url: distributor_review_url.into(),
        }
    }

    async fn post(&self, url: &str, payload: Value) -> Result<Value, ServiceError> {
        let response = self
            .client
            .post(url)
            .json(&payload)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| ServiceError::Directory(e.to_string()))?;
        response
            .json()
            .await
            .map_err(|e| ServiceError::Directory(format!("directory response was not JSON: {e}")))
    }
}

#[async_trait]
impl AgentDirectory for HttpAgentDirectory {
    async fn find_by_profile(
        &self,
        profile_id: &str,
    ) -> Result<Option<AgentContact>, ServiceError> {
        let response = self
            .client
            .get(&self.lookup_url)
            .query(&[("profile_id", profile_id)])
            .send()
            .await
            .map_err(|e| ServiceError::Directory(e.to_string()))?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response
            .error_for_status()
            .map_err(|e| ServiceError::Directory(e.to_string()))?;
        let contact = response
            .json()
            .await
            .map_err(|e| ServiceError::Directory(format!("directory response was not JSON: {e}")))?;
        Ok(Some(contact))
    }

    async fn relink_profile(
        &self,
        agent_code: &str,
        new_profile_id: &str,
    ) -> Result<(), ServiceError> {
        self.post(
            &self.relink_url,
            json!({"agent_code": agent_code, "new_profile_id": new_profile_id}),
        )
        .await?;
        Ok(())
    }

    async fn issue_agent_code(
        &self,
        profile_id: &str,
        reviewer_action: &str,
        status: &str,
    ) -> Result<String, ServiceError> {
        let body = self
            .post(
                &self.agent_code_url,
                json!({
                    "profile_id": profile_id,
                    "reviewer_action": reviewer_action,
                    "status": status,
                }),
            )
            .await?;
        body.get("agent_code")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| {
                ServiceError::Directory("no agent_code in issuance response".to_string())
            })
    }

    async fn mark_distributor_reviewed(
        &self,
        profile_id: &str,
        approved: bool,
    ) -> Result<(), ServiceError> {
        self.post(
            &self.distributor_review_url,
            json!({"profile_id": profile_id, "approved": approved}),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fs_store_writes_file_and_returns_public_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path().to_path_buf(), "http://files.local");

        let url = store.put("agent_1.jpg", b"jpeg bytes".to_vec()).await.unwrap();

        assert_eq!(url, "http://files.local/agent_1.jpg");
        let written = std::fs::read(dir.path().join("agent_1.jpg")).unwrap();
        assert_eq!(written, b"jpeg bytes");
    }

    #[tokio::test]
    async fn fs_store_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("files");
        let store = FsObjectStore::new(root.clone(), "http://files.local");

        store.put("x.pdf", vec![1, 2, 3]).await.unwrap();

        assert!(root.join("x.pdf").exists());
    }
}
