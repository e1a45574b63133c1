//! Vendor callback receiver: classify the pushed payload, apply the
//! terminal write for the matching collection, and run review side effects.
//!
//! Classification is tag-driven, in priority order: a `doc_type` of `ADHAR`
//! wins, then the presence of a `profile_id`, and anything else lands in the
//! opaque event store. Payload shape is never guessed from field positions.

use crate::crosscheck::{crosscheck, CrosscheckOutcome};
use crate::error::FlowError;
use crate::relink::RelinkService;
use idgate_store::{AadhaarStore, UserType, VendorEventStore, VideoKycStore};
use idgate_types::{ProfileId, RecordStatus, ReferenceId, Timestamp};
use idgate_utils::services::{AgentDirectory, ServiceError};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Downloads a vendor-hosted file resource. Split out from object storage so
/// callback tests never touch the network.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ServiceError>;
}

/// The real fetcher.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ServiceError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| ServiceError::Storage(format!("Failed to download file from {url}: {e}")))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ServiceError::Storage(format!("Failed to download file from {url}: {e}")))?;
        Ok(bytes.to_vec())
    }
}

/// A classified callback payload.
#[derive(Clone, Debug)]
pub enum CallbackPayload {
    Aadhaar {
        reference_id: Option<ReferenceId>,
        payload: Value,
    },
    VideoKyc {
        profile_id: ProfileId,
        payload: Value,
    },
    Other(Value),
}

impl CallbackPayload {
    pub fn classify(payload: Value) -> Self {
        if payload.get("doc_type").and_then(Value::as_str) == Some("ADHAR") {
            let reference_id = payload
                .get("reference_id")
                .and_then(Value::as_str)
                .map(ReferenceId::new);
            return CallbackPayload::Aadhaar {
                reference_id,
                payload,
            };
        }
        if let Some(profile_id) = payload.get("profile_id").and_then(Value::as_str) {
            let profile_id = ProfileId::new(profile_id);
            return CallbackPayload::VideoKyc {
                profile_id,
                payload,
            };
        }
        CallbackPayload::Other(payload)
    }
}

/// How a handled callback should be acknowledged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallbackAck {
    /// "Received IDFY Aadhar Data"
    Aadhaar,
    /// "Received Video KYC data"; `error` carries a body-level message the
    /// vendor sees alongside HTTP 200 (identity mismatch is data, not a
    /// failure of the webhook).
    VideoKyc { error: Option<String> },
    /// "Received IDFY data"
    Other,
}

pub struct CallbackService {
    aadhaar: Arc<dyn AadhaarStore>,
    video: Arc<dyn VideoKycStore>,
    events: Arc<dyn VendorEventStore>,
    storage: Arc<dyn idgate_utils::services::ObjectStorage>,
    fetcher: Arc<dyn ResourceFetcher>,
    directory: Arc<dyn AgentDirectory>,
    relink: RelinkService,
}

impl CallbackService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        aadhaar: Arc<dyn AadhaarStore>,
        video: Arc<dyn VideoKycStore>,
        events: Arc<dyn VendorEventStore>,
        storage: Arc<dyn idgate_utils::services::ObjectStorage>,
        fetcher: Arc<dyn ResourceFetcher>,
        directory: Arc<dyn AgentDirectory>,
        relink: RelinkService,
    ) -> Self {
        Self {
            aadhaar,
            video,
            events,
            storage,
            fetcher,
            directory,
            relink,
        }
    }

    pub async fn dispatch(&self, payload: Value) -> Result<CallbackAck, FlowError> {
        match CallbackPayload::classify(payload) {
            CallbackPayload::Aadhaar {
                reference_id,
                payload,
            } => self.handle_aadhaar(reference_id, payload),
            CallbackPayload::VideoKyc {
                profile_id,
                payload,
            } => self.handle_video_kyc(profile_id, payload).await,
            CallbackPayload::Other(payload) => {
                self.events.insert(payload)?;
                info!("opaque vendor event stored");
                Ok(CallbackAck::Other)
            }
        }
    }

    fn handle_aadhaar(
        &self,
        reference_id: Option<ReferenceId>,
        payload: Value,
    ) -> Result<CallbackAck, FlowError> {
        let reference_id = reference_id.ok_or_else(|| {
            FlowError::InvalidInput("reference_id missing in Aadhaar callback".to_owned())
        })?;

        self.aadhaar
            .apply_callback(&reference_id, &reference_id, payload, Timestamp::now())
            .map_err(|e| {
                if e.is_duplicate() {
                    FlowError::Duplicate("Reference id already exists".to_owned())
                } else {
                    FlowError::Store(e)
                }
            })?;
        info!(%reference_id, "aadhaar callback applied");
        Ok(CallbackAck::Aadhaar)
    }

    async fn handle_video_kyc(
        &self,
        profile_id: ProfileId,
        payload: Value,
    ) -> Result<CallbackAck, FlowError> {
        let Some(record) = self.video.find_by_profile(&profile_id)? else {
            // Unknown sessions are acknowledged rather than answered with an
            // error; the vendor must not retry-storm over our lookup miss.
            // The payload still lands in the event store so nothing the
            // vendor pushed is silently dropped.
            warn!(%profile_id, "video kyc callback for unknown profile, stored as event");
            self.events.insert(payload)?;
            return Ok(CallbackAck::VideoKyc { error: None });
        };
        if record.callback_payload.is_some() {
            return Err(FlowError::Duplicate("profile id already exists".to_owned()));
        }

        let reviewer_action = payload
            .get("reviewer_action")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        let session_status = payload
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();

        if reviewer_action == "rejected" || session_status == "rejected" {
            self.relink.relink(&profile_id, &payload).await?;
            self.video
                .apply_callback(
                    &profile_id,
                    payload,
                    None,
                    RecordStatus::Failed,
                    Timestamp::now(),
                )
                .map_err(duplicate_profile)?;
            info!(%profile_id, "video kyc rejection recorded");
            return Ok(CallbackAck::VideoKyc { error: None });
        }

        let file_urls = self.upload_resources(&profile_id, &payload).await;
        let mut ack_error = None;

        if reviewer_action == "completed" {
            match record.user_type {
                Some(UserType::Agent) => {
                    ack_error = self
                        .agent_review(&profile_id, &record.aadhar_name, &record.aadhar_dob, &payload, &session_status)
                        .await;
                }
                Some(UserType::Distributor) => {
                    if let Err(e) = self
                        .directory
                        .mark_distributor_reviewed(profile_id.as_str(), true)
                        .await
                    {
                        error!(%profile_id, error = %e, "distributor auto-approval failed");
                    }
                }
                None => {}
            }
        }

        self.video
            .apply_callback(
                &profile_id,
                payload,
                file_urls,
                RecordStatus::Completed,
                Timestamp::now(),
            )
            .map_err(duplicate_profile)?;
        info!(%profile_id, "video kyc callback applied");
        Ok(CallbackAck::VideoKyc { error: ack_error })
    }

    /// Cross-check the stored identity and trigger agent-code issuance.
    /// Returns a body-level error message when issuance could not happen.
    async fn agent_review(
        &self,
        profile_id: &ProfileId,
        stored_name: &Option<String>,
        stored_dob: &Option<String>,
        payload: &Value,
        session_status: &str,
    ) -> Option<String> {
        match crosscheck(stored_name.as_deref(), stored_dob.as_deref(), payload) {
            CrosscheckOutcome::Match => {
                match self
                    .directory
                    .issue_agent_code(profile_id.as_str(), "completed", session_status)
                    .await
                {
                    Ok(code) => {
                        info!(%profile_id, agent_code = %code, "agent code issued");
                        None
                    }
                    Err(e) => {
                        error!(%profile_id, error = %e, "agent code issuance failed");
                        Some("Agent code not created".to_owned())
                    }
                }
            }
            CrosscheckOutcome::Mismatch { expected, received } => {
                warn!(%profile_id, "name/dob mismatch in video kyc data");
                Some(format!(
                    "Identity mismatch: expected {expected}, received {received}"
                ))
            }
            CrosscheckOutcome::FieldsMissing => {
                warn!(%profile_id, "name or dob missing in video kyc data");
                Some("Name or DOB missing in Video KYC data".to_owned())
            }
        }
    }

    /// Collect the session's file resources and push each to object storage.
    /// A failed file contributes an error string in place of a URL; the
    /// callback itself still succeeds.
    async fn upload_resources(&self, profile_id: &ProfileId, payload: &Value) -> Option<Value> {
        let resources = payload.get("resources")?;
        let mut file_urls = Map::new();

        for (kind, extension) in [("documents", "pdf"), ("images", "jpg"), ("videos", "mp4")] {
            let singular = &kind[..kind.len() - 1];
            let Some(entries) = resources.get(kind).and_then(Value::as_array) else {
                continue;
            };
            for entry in entries {
                let (Some(ref_id), Some(url)) = (
                    entry.get("ref_id").and_then(Value::as_str),
                    entry.get("value").and_then(Value::as_str),
                ) else {
                    continue;
                };
                let key = format!("{singular}_{ref_id}");
                let object_name = format!("{}_{key}.{extension}", profile_id.as_str());
                let stored = match self.fetcher.fetch(url).await {
                    Ok(bytes) => self.storage.put(&object_name, bytes).await,
                    Err(e) => Err(e),
                };
                match stored {
                    Ok(stored_url) => {
                        file_urls.insert(key, json!(stored_url));
                    }
                    Err(e) => {
                        error!(%profile_id, %url, error = %e, "file upload failed");
                        file_urls.insert(key, json!(format!("Error: {e}")));
                    }
                }
            }
        }

        if file_urls.is_empty() {
            None
        } else {
            Some(Value::Object(file_urls))
        }
    }
}

fn duplicate_profile(e: idgate_store::StoreError) -> FlowError {
    if e.is_duplicate() {
        FlowError::Duplicate("profile id already exists".to_owned())
    } else {
        FlowError::Store(e)
    }
}
