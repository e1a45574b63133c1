//! PAN verification flow: submit a verify task, poll it, persist the
//! completed task document, and serve the PAN number back on demand.

use crate::error::FlowError;
use idgate_crypto::FieldCipher;
use idgate_poller::{CompletionPoller, Delay};
use idgate_store::{PanRecord, PanStore};
use idgate_types::params::PollPolicy;
use idgate_types::{RecordStatus, ReferenceId, Timestamp};
use idgate_vendor::{TaskApi, TaskSpec};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

/// Client submission body.
#[derive(Clone, Debug, Deserialize)]
pub struct PanRequest {
    pub pan_number: Option<String>,
    pub dob: Option<String>,
    pub full_name: Option<String>,
}

/// Response for a completed PAN verification.
#[derive(Clone, Debug, Serialize)]
pub struct PanVerification {
    pub status: Option<String>,
    pub pan_status: Option<String>,
    pub dob_match: Option<Value>,
    pub name_match: Option<Value>,
    pub user_input_details: Option<Value>,
    /// The number as the caller supplied it; only the stored copy is
    /// encrypted.
    pub input_pan_number: Option<String>,
    pub reference_id: String,
}

pub struct PanFlow<C, D> {
    poller: CompletionPoller<C, D>,
    store: Arc<dyn PanStore>,
    cipher: Arc<FieldCipher>,
    policy: PollPolicy,
}

impl<C: TaskApi, D: Delay> PanFlow<C, D> {
    pub fn new(
        poller: CompletionPoller<C, D>,
        store: Arc<dyn PanStore>,
        cipher: Arc<FieldCipher>,
        policy: PollPolicy,
    ) -> Self {
        Self {
            poller,
            store,
            cipher,
            policy,
        }
    }

    /// Submit and poll a PAN verification.
    ///
    /// On completion the whole vendor task document is persisted keyed by
    /// our `task_id`, with `input_pan_number` encrypted in place.
    pub async fn submit(&self, request: PanRequest) -> Result<PanVerification, FlowError> {
        let mut missing = Vec::new();
        if request.pan_number.as_deref().unwrap_or("").is_empty() {
            missing.push("pan_number".to_owned());
        }
        if request.dob.as_deref().unwrap_or("").is_empty() {
            missing.push("dob".to_owned());
        }
        if request.full_name.as_deref().unwrap_or("").is_empty() {
            missing.push("full_name".to_owned());
        }
        if !missing.is_empty() {
            return Err(FlowError::missing_fields(missing));
        }

        let task_id = ReferenceId::generate();
        let spec = TaskSpec {
            task_id: task_id.as_str().to_owned(),
            group_id: ReferenceId::generate().into_inner(),
            data: json!({
                "id_number": request.pan_number,
                "dob": request.dob,
                "full_name": request.full_name,
            }),
        };

        let request_id = self.poller.client().submit(&spec).await?;
        info!(%task_id, %request_id, "pan task submitted");

        let outcome = self.poller.poll(&request_id, &self.policy).await?;
        let mut task = outcome.envelope.into_raw();

        let received_at = Timestamp::now();
        task["recieved_data_time"] = Value::String(received_at.to_ist_string());

        let input_pan = task
            .pointer("/result/source_output/input_details/input_pan_number")
            .and_then(Value::as_str)
            .map(str::to_owned);
        if let Some(plain) = &input_pan {
            let encrypted = self.cipher.encrypt(plain)?;
            if let Some(slot) =
                task.pointer_mut("/result/source_output/input_details/input_pan_number")
            {
                *slot = Value::String(encrypted);
            }
        }

        self.store.insert_completed(PanRecord {
            task_id: task_id.clone(),
            status: RecordStatus::Completed,
            task_document: task.clone(),
            received_at,
        })?;

        let source_output = task
            .pointer("/result/source_output")
            .cloned()
            .unwrap_or(Value::Null);

        Ok(PanVerification {
            status: task.get("status").and_then(Value::as_str).map(str::to_owned),
            pan_status: source_output
                .get("pan_status")
                .and_then(Value::as_str)
                .map(str::to_owned),
            dob_match: source_output.get("dob_match").cloned(),
            name_match: source_output.get("name_match").cloned(),
            user_input_details: source_output.get("input_details").cloned(),
            input_pan_number: input_pan,
            reference_id: task_id.into_inner(),
        })
    }

    /// Decrypt and return the PAN number stored under `reference_id`.
    pub fn retrieve_number(&self, reference_id: &ReferenceId) -> Result<String, FlowError> {
        let record = self.store.find_by_task_id(reference_id)?.ok_or_else(|| {
            FlowError::NotFound("No Pan data found for the provided reference_id".to_owned())
        })?;

        let token = record
            .task_document
            .pointer("/result/source_output/input_details/input_pan_number")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                FlowError::NotFound("No PAN number found in the stored data".to_owned())
            })?;

        Ok(self.cipher.decrypt(token)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idgate_nullables::{CountingDelay, ScriptedTaskApi};
    use idgate_store_memory::MemoryStore;
    use std::time::Duration;

    fn request() -> PanRequest {
        PanRequest {
            pan_number: Some("ABCDE1234F".into()),
            dob: Some("1995-01-15".into()),
            full_name: Some("Rahul Sharma".into()),
        }
    }

    fn completed_reply() -> Value {
        json!({
            "status": "completed",
            "result": {"source_output": {
                "pan_status": "VALID",
                "dob_match": true,
                "name_match": true,
                "input_details": {
                    "input_pan_number": "ABCDE1234F",
                    "input_dob": "1995-01-15",
                },
            }},
        })
    }

    fn flow(
        replies: Vec<Value>,
        store: Arc<MemoryStore>,
    ) -> PanFlow<ScriptedTaskApi, CountingDelay> {
        PanFlow::new(
            CompletionPoller::new(
                ScriptedTaskApi::new("vendor-req-1", replies),
                CountingDelay::new(),
            ),
            store,
            Arc::new(FieldCipher::new([9u8; 32])),
            PollPolicy::pan(),
        )
    }

    #[tokio::test]
    async fn missing_fields_are_listed() {
        let flow = flow(vec![], Arc::new(MemoryStore::new()));
        let err = flow
            .submit(PanRequest {
                pan_number: None,
                dob: Some("1995-01-15".into()),
                full_name: None,
            })
            .await
            .expect_err("two fields missing");
        assert_eq!(
            err.to_string(),
            "Missing mandatory fields: pan_number, full_name"
        );
    }

    #[tokio::test]
    async fn completion_on_third_poll_consumes_two_delays() {
        let in_progress = json!({"status": "in_progress"});
        let flow = flow(
            vec![in_progress.clone(), in_progress, completed_reply()],
            Arc::new(MemoryStore::new()),
        );

        let verification = flow.submit(request()).await.expect("completed");
        assert_eq!(verification.status.as_deref(), Some("completed"));
        assert_eq!(verification.pan_status.as_deref(), Some("VALID"));
        assert_eq!(verification.input_pan_number.as_deref(), Some("ABCDE1234F"));
        assert_eq!(
            flow.poller_delays(),
            vec![Duration::from_secs(5), Duration::from_secs(5)]
        );
    }

    #[tokio::test]
    async fn stored_document_carries_encrypted_pan() {
        let store = Arc::new(MemoryStore::new());
        let flow = flow(vec![completed_reply()], store.clone());

        let verification = flow.submit(request()).await.expect("completed");
        let record = store
            .find_by_task_id(&ReferenceId::new(verification.reference_id.clone()))
            .unwrap()
            .unwrap();
        let stored = record
            .task_document
            .pointer("/result/source_output/input_details/input_pan_number")
            .and_then(Value::as_str)
            .unwrap();
        assert_ne!(stored, "ABCDE1234F");

        // And the retrieval path round-trips it back to plaintext.
        let plain = flow
            .retrieve_number(&ReferenceId::new(verification.reference_id))
            .unwrap();
        assert_eq!(plain, "ABCDE1234F");
    }

    #[tokio::test]
    async fn duplicate_task_id_is_a_conflict() {
        let store = Arc::new(MemoryStore::new());
        let flow = flow(vec![completed_reply()], store.clone());
        let verification = flow.submit(request()).await.expect("completed");

        let record = store
            .find_by_task_id(&ReferenceId::new(verification.reference_id.clone()))
            .unwrap()
            .unwrap();
        let err = store.insert_completed(record).expect_err("already stored");
        assert!(err.is_duplicate());
    }

    impl PanFlow<ScriptedTaskApi, CountingDelay> {
        fn poller_delays(&self) -> Vec<Duration> {
            self.poller.delay_ref().slept()
        }
    }
}
