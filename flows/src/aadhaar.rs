//! Aadhaar verification flow: submit a DigiLocker fetch task, poll it to
//! completion, and later serve the parsed result back to the caller.

use crate::error::FlowError;
use idgate_crypto::FieldCipher;
use idgate_poller::{CompletionPoller, Delay};
use idgate_store::{AadhaarRecord, AadhaarStore};
use idgate_types::params::PollPolicy;
use idgate_types::ReferenceId;
use idgate_vendor::{TaskApi, TaskSpec};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

/// Vendor-side task parameters carried on every Aadhaar submission.
#[derive(Clone, Debug)]
pub struct AadhaarTaskConfig {
    pub key_id: String,
    pub ou_id: String,
    pub secret: String,
    pub callback_url: String,
}

/// What a successful submission returns: the reference to use for later
/// retrieval and the DigiLocker redirect the end user must visit.
#[derive(Clone, Debug, Serialize)]
pub struct AadhaarSubmission {
    pub reference_id: Option<String>,
    pub redirect_url: Option<String>,
}

/// Normalized Aadhaar data served from a completed record.
#[derive(Clone, Debug, Serialize)]
pub struct AadhaarData {
    pub aadhaar_name: Option<String>,
    pub aadhaar_number: Option<String>,
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub home_house: Option<String>,
    pub home_village: Option<String>,
    pub home_district: Option<String>,
    pub home_state: Option<String>,
    pub home_pincode: Option<String>,
    pub home_address: Option<String>,
}

pub struct AadhaarFlow<C, D> {
    poller: CompletionPoller<C, D>,
    store: Arc<dyn AadhaarStore>,
    cipher: Arc<FieldCipher>,
    config: AadhaarTaskConfig,
    policy: PollPolicy,
}

impl<C: TaskApi, D: Delay> AadhaarFlow<C, D> {
    pub fn new(
        poller: CompletionPoller<C, D>,
        store: Arc<dyn AadhaarStore>,
        cipher: Arc<FieldCipher>,
        config: AadhaarTaskConfig,
        policy: PollPolicy,
    ) -> Self {
        Self {
            poller,
            store,
            cipher,
            config,
            policy,
        }
    }

    /// Submit an Aadhaar fetch task and wait for the redirect URL.
    ///
    /// The Aadhaar number is optional; when the caller supplies one it is
    /// encrypted and stored pending, so the retrieval path can tail-check it
    /// against what the vendor later reports.
    pub async fn submit(
        &self,
        aadhaar_number: Option<&str>,
    ) -> Result<AadhaarSubmission, FlowError> {
        let reference_id = ReferenceId::generate();

        if let Some(number) = aadhaar_number {
            let encrypted = self.cipher.encrypt(number)?;
            self.store
                .insert(AadhaarRecord::pending(reference_id.clone(), Some(encrypted)))?;
        }

        let spec = TaskSpec {
            task_id: reference_id.as_str().to_owned(),
            group_id: ReferenceId::generate().into_inner(),
            data: json!({
                "reference_id": reference_id.as_str(),
                "key_id": self.config.key_id,
                "ou_id": self.config.ou_id,
                "secret": self.config.secret,
                "callback_url": self.config.callback_url,
                "doc_type": "ADHAR",
                "file_format": "xml",
                "extra_fields": {},
            }),
        };

        let request_id = self.poller.client().submit(&spec).await?;
        info!(%reference_id, %request_id, "aadhaar task submitted");

        let outcome = self.poller.poll(&request_id, &self.policy).await?;
        let source_output = outcome.envelope.source_output().cloned().unwrap_or(Value::Null);

        Ok(AadhaarSubmission {
            reference_id: source_output
                .get("reference_id")
                .and_then(Value::as_str)
                .map(str::to_owned),
            redirect_url: source_output
                .get("redirect_url")
                .and_then(Value::as_str)
                .map(str::to_owned),
        })
    }

    /// Serve the parsed Aadhaar data a callback delivered earlier.
    ///
    /// When a number was captured at submission time, its last four digits
    /// must agree with the UID the vendor reported; a disagreement is an
    /// identity mismatch, not data.
    pub fn retrieve(&self, reference_id: &ReferenceId) -> Result<AadhaarData, FlowError> {
        let record = self
            .store
            .find_by_request_ref(reference_id)?
            .ok_or_else(|| {
                FlowError::NotFound(
                    "No Aadhar data found for the provided reference_id".to_owned(),
                )
            })?;

        let parsed = record
            .callback_payload
            .as_ref()
            .and_then(|p| p.get("parsed_details"))
            .filter(|d| !d.is_null())
            .ok_or_else(|| {
                FlowError::NotFound("No parsed details found in the received data".to_owned())
            })?;

        let field =
            |name: &str| parsed.get(name).and_then(Value::as_str).map(str::to_owned);

        let stored_number = match &record.aadhaar_number_enc {
            Some(token) => Some(self.cipher.decrypt(token)?),
            None => None,
        };

        if let Some(number) = &stored_number {
            let reported_uid = parsed.get("uid").and_then(Value::as_str).unwrap_or("");
            let stored_tail = tail4(number);
            let reported_tail = tail4(reported_uid);
            if !reported_tail.is_empty() && stored_tail != reported_tail {
                warn!(%reference_id, "aadhaar number tail mismatch");
                return Err(FlowError::IdentityMismatch {
                    expected: format!("number ending {stored_tail}"),
                    received: format!("number ending {reported_tail}"),
                });
            }
        }

        Ok(AadhaarData {
            aadhaar_name: field("name"),
            aadhaar_number: stored_number,
            dob: field("dob"),
            gender: field("gender"),
            home_house: field("house"),
            home_village: field("vtc"),
            home_district: field("dist"),
            home_state: field("state"),
            home_pincode: field("pc"),
            home_address: field("street"),
        })
    }
}

fn tail4(s: &str) -> &str {
    // UIDs are ascii digits (possibly masked with X)
    s.get(s.len().saturating_sub(4)..).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use idgate_nullables::{CountingDelay, ScriptedTaskApi};
    use idgate_store_memory::MemoryStore;
    use idgate_types::status::RecordStatus;
    use idgate_types::Timestamp;
    use serde_json::json;

    fn config() -> AadhaarTaskConfig {
        AadhaarTaskConfig {
            key_id: "key".into(),
            ou_id: "ou".into(),
            secret: "c2VjcmV0".into(),
            callback_url: "https://gateway.example/callback".into(),
        }
    }

    fn flow(
        replies: Vec<Value>,
        store: Arc<MemoryStore>,
    ) -> AadhaarFlow<ScriptedTaskApi, CountingDelay> {
        AadhaarFlow::new(
            CompletionPoller::new(
                ScriptedTaskApi::new("vendor-req-1", replies),
                CountingDelay::new(),
            ),
            store,
            Arc::new(FieldCipher::new([7u8; 32])),
            config(),
            PollPolicy::aadhaar(),
        )
    }

    fn completed_reply() -> Value {
        json!({
            "status": "completed",
            "result": {"source_output": {
                "reference_id": "ref-echo",
                "redirect_url": "https://digilocker.example/session",
            }},
        })
    }

    #[tokio::test]
    async fn submit_returns_redirect_and_stores_encrypted_number() {
        let store = Arc::new(MemoryStore::new());
        let flow = flow(vec![completed_reply()], store.clone());

        let submission = flow.submit(Some("123412341234")).await.expect("submitted");
        assert_eq!(submission.redirect_url.as_deref(), Some("https://digilocker.example/session"));
        assert_eq!(submission.reference_id.as_deref(), Some("ref-echo"));

        let spec = &flow.poller.client().submitted()[0];
        assert_eq!(spec.data["doc_type"], "ADHAR");
        assert_eq!(spec.data["file_format"], "xml");

        // Stored number is ciphertext, not the plain value.
        let reference = ReferenceId::new(spec.task_id.clone());
        let record = store.find_by_request_ref(&reference).unwrap().unwrap();
        let stored = record.aadhaar_number_enc.unwrap();
        assert_ne!(stored, "123412341234");
        assert_eq!(record.status, RecordStatus::Pending);
    }

    #[tokio::test]
    async fn submit_without_number_stores_nothing() {
        let store = Arc::new(MemoryStore::new());
        let flow = flow(vec![completed_reply()], store.clone());
        flow.submit(None).await.expect("submitted");
        let reference = ReferenceId::new(flow.poller.client().submitted()[0].task_id.clone());
        assert!(store.find_by_request_ref(&reference).unwrap().is_none());
    }

    fn seeded_record(store: &MemoryStore, cipher: &FieldCipher, uid: &str) -> ReferenceId {
        let reference = ReferenceId::new("ref-1");
        store
            .insert(AadhaarRecord::pending(
                reference.clone(),
                Some(cipher.encrypt("123412341234").unwrap()),
            ))
            .unwrap();
        store
            .apply_callback(
                &reference,
                &ReferenceId::new("vendor-ref-1"),
                json!({"parsed_details": {
                    "name": "Rahul Sharma",
                    "dob": "1995-01-15",
                    "gender": "M",
                    "uid": uid,
                    "house": "12",
                    "vtc": "Pune",
                    "dist": "Pune",
                    "state": "MH",
                    "pc": "411001",
                    "street": "MG Road",
                }}),
                Timestamp::now(),
            )
            .unwrap();
        reference
    }

    #[tokio::test]
    async fn retrieve_matches_tail_and_returns_decrypted_number() {
        let store = Arc::new(MemoryStore::new());
        let cipher = FieldCipher::new([7u8; 32]);
        let reference = seeded_record(&store, &cipher, "XXXXXXXX1234");
        let flow = flow(vec![], store.clone());

        let data = flow.retrieve(&reference).expect("retrieved");
        assert_eq!(data.aadhaar_number.as_deref(), Some("123412341234"));
        assert_eq!(data.aadhaar_name.as_deref(), Some("Rahul Sharma"));
        assert_eq!(data.home_pincode.as_deref(), Some("411001"));
    }

    #[tokio::test]
    async fn retrieve_rejects_tail_mismatch() {
        let store = Arc::new(MemoryStore::new());
        let cipher = FieldCipher::new([7u8; 32]);
        let reference = seeded_record(&store, &cipher, "XXXXXXXX9999");
        let flow = flow(vec![], store.clone());

        let err = flow.retrieve(&reference).expect_err("tails disagree");
        match err {
            FlowError::IdentityMismatch { expected, received } => {
                assert!(expected.contains("1234"));
                assert!(received.contains("9999"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn retrieve_unknown_reference_is_not_found() {
        let flow = flow(vec![], Arc::new(MemoryStore::new()));
        let err = flow.retrieve(&ReferenceId::new("missing")).expect_err("not found");
        assert!(matches!(err, FlowError::NotFound(_)));
    }
}
