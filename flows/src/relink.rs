//! Re-link workflow: when a vendor reviewer rejects an agent's video-KYC
//! session, open a fresh capture session for the same person, mail them the
//! new link, and move the agent's session pointer to the new profile id.

use crate::error::FlowError;
use idgate_store::{VideoKycRecord, VideoKycStore};
use idgate_types::{ProfileId, ReferenceId};
use idgate_utils::services::{AgentDirectory, Mailer};
use idgate_vendor::ProfileApi;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

/// What a re-link produced, when an agent was found for the rejected
/// session.
#[derive(Clone, Debug)]
pub struct RelinkOutcome {
    pub agent_code: String,
    pub new_profile_id: ProfileId,
}

pub struct RelinkService {
    profiles: Arc<dyn ProfileApi>,
    store: Arc<dyn VideoKycStore>,
    directory: Arc<dyn AgentDirectory>,
    mailer: Arc<dyn Mailer>,
    config_id: String,
}

impl RelinkService {
    pub fn new(
        profiles: Arc<dyn ProfileApi>,
        store: Arc<dyn VideoKycStore>,
        directory: Arc<dyn AgentDirectory>,
        mailer: Arc<dyn Mailer>,
        config_id: String,
    ) -> Self {
        Self {
            profiles,
            store,
            directory,
            mailer,
            config_id,
        }
    }

    /// Handle a rejection for `old_profile_id`. `Ok(None)` means no agent
    /// holds this session and the rejection needs no follow-up.
    pub async fn relink(
        &self,
        old_profile_id: &ProfileId,
        rejection: &Value,
    ) -> Result<Option<RelinkOutcome>, FlowError> {
        let Some(agent) = self.directory.find_by_profile(old_profile_id.as_str()).await? else {
            info!(%old_profile_id, "rejected session has no agent linkage, nothing to re-link");
            return Ok(None);
        };

        let old_record = self.store.find_by_profile(old_profile_id)?;

        let reference_id = ReferenceId::generate();
        let response = self
            .profiles
            .create_profile(&json!({
                "reference_id": reference_id.as_str(),
                "config": {"id": self.config_id},
                "data": {},
            }))
            .await?;

        let new_profile_id = ProfileId::new(
            response
                .get("profile_id")
                .and_then(Value::as_str)
                .unwrap_or_default(),
        );
        let capture_link = response
            .get("capture_link")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();

        // Carry the identity expectations over so the replacement session
        // cross-checks against the same person.
        let mut record = VideoKycRecord::pending(
            reference_id,
            new_profile_id.clone(),
            response.clone(),
        );
        if let Some(old) = &old_record {
            record.aadhar_name = old.aadhar_name.clone();
            record.aadhar_dob = old.aadhar_dob.clone();
            record.user_type = old.user_type;
        }
        self.store.insert(record)?;

        let remarks = rejection
            .get("status_description")
            .or_else(|| rejection.get("remarks"))
            .and_then(Value::as_str)
            .unwrap_or("quality issues / mismatch information");
        let body = resend_email_body(&agent.name, remarks, &capture_link, new_profile_id.as_str());
        if let Err(e) = self
            .mailer
            .send(&agent.email, "Video KYC re-verification required", &body)
            .await
        {
            // The new session exists either way; the agent can still be
            // reached through support.
            warn!(%new_profile_id, error = %e, "re-link notification mail failed");
        }

        self.directory
            .relink_profile(&agent.agent_code, new_profile_id.as_str())
            .await?;
        info!(%old_profile_id, %new_profile_id, agent_code = %agent.agent_code, "session re-linked");

        Ok(Some(RelinkOutcome {
            agent_code: agent.agent_code,
            new_profile_id,
        }))
    }
}

fn resend_email_body(agent_name: &str, remarks: &str, link: &str, profile_id: &str) -> String {
    format!(
        r#"<html>
    <body>
        <p>Dear {agent_name},</p>
        <p>Unfortunately, your Video KYC has been rejected. Please find the remarks below:
           <br><strong>Remarks: {remarks}</strong>
        </p>
        <p>You can complete your Video KYC again using the following link:
           <br><strong>Link: <a href="{link}">{link}</a></strong>
           <br><strong>Profile ID: {profile_id}</strong>
        </p>
        <p>If you have any questions, feel free to contact our support team.
           <br>Thank you for your cooperation.
        </p>
    </body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use idgate_nullables::{NullAgentDirectory, RecordingMailer, ScriptedProfileApi};
    use idgate_store_memory::MemoryStore;
    use idgate_store::UserType;
    use idgate_utils::services::AgentContact;

    fn agent() -> AgentContact {
        AgentContact {
            agent_code: "AG-42".into(),
            name: "Rahul Sharma".into(),
            email: "rahul@example.in".into(),
            mobile: "9876543210".into(),
        }
    }

    fn service(
        directory: Arc<NullAgentDirectory>,
        mailer: Arc<RecordingMailer>,
        store: Arc<MemoryStore>,
    ) -> RelinkService {
        RelinkService::new(
            Arc::new(ScriptedProfileApi::new(
                vec![Ok(json!({
                    "profile_id": "prof-new",
                    "capture_link": "https://capture.example/prof-new",
                }))],
                vec![],
            )),
            store,
            directory,
            mailer,
            "cfg-1".into(),
        )
    }

    #[tokio::test]
    async fn unknown_profile_is_a_no_op() {
        let service = service(
            Arc::new(NullAgentDirectory::new()),
            Arc::new(RecordingMailer::new()),
            Arc::new(MemoryStore::new()),
        );
        let outcome = service
            .relink(&ProfileId::new("prof-old"), &json!({}))
            .await
            .expect("no-op");
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn rejection_opens_new_session_mails_and_moves_pointer() {
        let directory = Arc::new(NullAgentDirectory::new().with_agent("prof-old", agent()));
        let mailer = Arc::new(RecordingMailer::new());
        let store = Arc::new(MemoryStore::new());

        let mut old = VideoKycRecord::pending(
            ReferenceId::new("ref-old"),
            ProfileId::new("prof-old"),
            json!({}),
        );
        old.aadhar_name = Some("Rahul Sharma".into());
        old.aadhar_dob = Some("1995-01-15".into());
        old.user_type = Some(UserType::Agent);
        store.insert(old).unwrap();

        let service = service(directory.clone(), mailer.clone(), store.clone());
        let outcome = service
            .relink(
                &ProfileId::new("prof-old"),
                &json!({"status_description": "face not visible"}),
            )
            .await
            .expect("relinked")
            .expect("agent found");

        assert_eq!(outcome.agent_code, "AG-42");
        assert_eq!(outcome.new_profile_id.as_str(), "prof-new");

        // New pending session carries the old identity expectations.
        let new_record = store
            .find_by_profile(&ProfileId::new("prof-new"))
            .unwrap()
            .unwrap();
        assert_eq!(new_record.aadhar_name.as_deref(), Some("Rahul Sharma"));
        assert_eq!(new_record.user_type, Some(UserType::Agent));

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "rahul@example.in");
        assert!(sent[0].body.contains("face not visible"));
        assert!(sent[0].body.contains("https://capture.example/prof-new"));

        assert_eq!(directory.relinks(), vec![("AG-42".to_string(), "prof-new".to_string())]);
    }
}
