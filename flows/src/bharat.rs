//! Bharat-family flows: Aadhaar OTP, PAN verify, bank-account checks.
//!
//! These flows relay the vendor's HTTP status to the caller, so each
//! operation yields an [`ApiResponse`] carrying both the status and the JSON
//! body, while client-side validation failures surface as [`FlowError`].

use crate::error::FlowError;
use base64::Engine;
use idgate_crypto::FieldCipher;
use idgate_store::{BharatRecord, BharatStore};
use idgate_types::{DocType, RecordStatus, ReferenceId, ResultId, Timestamp};
use idgate_utils::services::ObjectStorage;
use idgate_vendor::{BharatApi, BharatReply};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

/// A vendor-relayed outcome: HTTP status plus body, forwarded as-is.
#[derive(Clone, Debug)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }
}

pub struct BharatFlows {
    api: Arc<dyn BharatApi>,
    store: Arc<dyn BharatStore>,
    storage: Arc<dyn ObjectStorage>,
    cipher: Arc<FieldCipher>,
}

impl BharatFlows {
    pub fn new(
        api: Arc<dyn BharatApi>,
        store: Arc<dyn BharatStore>,
        storage: Arc<dyn ObjectStorage>,
        cipher: Arc<FieldCipher>,
    ) -> Self {
        Self {
            api,
            store,
            storage,
            cipher,
        }
    }

    /// `POST /aadhaar/send-otp`
    pub async fn send_otp(&self, body: &Value) -> Result<ApiResponse, FlowError> {
        let aadhaar_no: String = body
            .get("aadhaar_no")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .replace(' ', "");
        if aadhaar_no.len() != 12 || !aadhaar_no.chars().all(|c| c.is_ascii_digit()) {
            return Err(FlowError::InvalidInput(
                "Invalid 'aadhaar'. Must be a 12-digit number without spaces.".to_owned(),
            ));
        }

        let request_id = ReferenceId::generate();
        let reply = self.api.send_otp(request_id.as_str(), &aadhaar_no).await?;
        let result_id = reply.result_id().map(str::to_owned);

        let status = if reply.is_ok() {
            RecordStatus::Pending
        } else {
            RecordStatus::Failed
        };
        self.store.insert(BharatRecord::new(
            DocType::Aadhaar,
            request_id.clone(),
            result_id.clone().map(ResultId::new),
            status,
            json!({"aadhaar_no": self.cipher.encrypt(&aadhaar_no)?}),
            reply.body.clone(),
        ))?;

        if reply.is_ok() {
            info!(%request_id, "aadhaar otp sent");
            Ok(ApiResponse::ok(json!({
                "message": "Otp has sent successfully",
                "request_id": request_id.as_str(),
                "result_id": result_id,
            })))
        } else {
            Ok(vendor_error(&reply, "aadhaar must be correct"))
        }
    }

    /// `POST /aadhaar/verify-otp`
    pub async fn verify_otp(&self, body: &Value) -> Result<ApiResponse, FlowError> {
        let (request_id, result_id) = require_pair(body)?;
        let otp = body.get("otp").and_then(Value::as_str).unwrap_or_default();
        if otp.is_empty() {
            return Err(FlowError::InvalidInput(
                "All fields ('request_id', 'result_id', 'otp') are required".to_owned(),
            ));
        }
        if self.store.find_by_pair(&request_id, &result_id)?.is_none() {
            return Err(FlowError::NotFound("Record not found".to_owned()));
        }

        let reply = self
            .api
            .verify_otp(request_id.as_str(), result_id.as_str(), otp)
            .await?;

        // A body-level vendor error means a bad OTP, not a transport
        // failure; no outcome is recorded so the caller can retry.
        if let Some(message) = reply.error_message() {
            return Ok(ApiResponse {
                status: 422,
                body: json!({"error": message}),
            });
        }

        if reply.is_ok() {
            let mut image_url = None;
            if let Some(image) = reply.data().get("image").and_then(Value::as_str) {
                image_url = Some(self.upload_aadhaar_image(request_id.as_str(), image).await?);
            }
            self.store.update_outcome(
                &request_id,
                &result_id,
                RecordStatus::Completed,
                reply.body.clone(),
                image_url,
                Timestamp::now(),
            )?;
            info!(%request_id, "aadhaar otp verified");
            Ok(ApiResponse::ok(reply.data().clone()))
        } else {
            self.store.update_outcome(
                &request_id,
                &result_id,
                RecordStatus::VerificationFailed,
                reply.body.clone(),
                None,
                Timestamp::now(),
            )?;
            Ok(vendor_error(&reply, "unable to verify"))
        }
    }

    /// `POST /pan/verify`
    pub async fn verify_pan(&self, body: &Value) -> Result<ApiResponse, FlowError> {
        let full_name = trimmed(body, "full_name");
        let dob = trimmed(body, "date_of_birth");
        let pan = trimmed(body, "pan_number").to_uppercase();
        if full_name.is_empty() || dob.is_empty() || pan.is_empty() {
            return Err(FlowError::InvalidInput(
                "Fields 'full_name', 'date_of_birth', and 'pan' are required.".to_owned(),
            ));
        }

        let request_id = ReferenceId::generate();
        let reply = self
            .api
            .verify_pan(request_id.as_str(), &full_name, &dob, &pan)
            .await?;

        self.store.insert(BharatRecord::new(
            DocType::Pan,
            request_id.clone(),
            None,
            if reply.is_ok() {
                RecordStatus::Completed
            } else {
                RecordStatus::Failed
            },
            json!({
                "full_name": full_name,
                "date_of_birth": dob,
                "pan": self.cipher.encrypt(&pan)?,
            }),
            reply.body.clone(),
        ))?;

        let message = if reply.is_ok() {
            "PAN verification successful"
        } else {
            "PAN verification failed"
        };
        Ok(ApiResponse {
            status: reply.status,
            body: json!({"message": message, "response": reply.body}),
        })
    }

    /// `POST /bank-account/send-request` (penny drop)
    pub async fn penny_drop_send(&self, body: &Value) -> Result<ApiResponse, FlowError> {
        let bank_account = trimmed(body, "bank_account");
        let ifsc = trimmed(body, "ifsc");
        if bank_account.is_empty() || !bank_account.chars().all(|c| c.is_ascii_digit()) {
            return Err(FlowError::InvalidInput("Invalid bank account".to_owned()));
        }
        if ifsc.len() != 11 {
            return Err(FlowError::InvalidInput("Invalid IFSC code".to_owned()));
        }

        // A completed verification for the same account+IFSC answers from
        // the stored result instead of dropping another penny.
        if let Some(existing) = self
            .store
            .find_completed_bank_account(&bank_account, &ifsc)?
        {
            info!(request_id = %existing.request_id, "penny drop short-circuited by stored result");
            let data = existing
                .verify_response
                .as_ref()
                .and_then(|r| r.get("data"))
                .cloned()
                .unwrap_or(Value::Null);
            return Ok(ApiResponse::ok(data));
        }

        let request_id = ReferenceId::generate();
        let reply = self
            .api
            .penny_drop_send(request_id.as_str(), &bank_account, &ifsc)
            .await?;
        let result_id = reply.result_id().map(str::to_owned);

        self.store.insert(BharatRecord::new(
            DocType::BankAccount,
            request_id.clone(),
            result_id.clone().map(ResultId::new),
            if reply.is_ok() {
                RecordStatus::Pending
            } else {
                RecordStatus::Failed
            },
            json!({"bank_account": bank_account, "ifsc": ifsc}),
            reply.body.clone(),
        ))?;

        if reply.is_ok() {
            Ok(ApiResponse::ok(json!({
                "message": "Request sent successfully",
                "request_id": request_id.as_str(),
                "result_id": result_id,
            })))
        } else {
            Ok(vendor_error(&reply, "Invalid request"))
        }
    }

    /// `POST /bank-account/get-status`
    pub async fn penny_drop_status(&self, body: &Value) -> Result<ApiResponse, FlowError> {
        let (request_id, result_id) = require_pair(body)?;
        if self.store.find_by_pair(&request_id, &result_id)?.is_none() {
            return Err(FlowError::NotFound("Record not found".to_owned()));
        }

        let reply = self
            .api
            .penny_drop_status(request_id.as_str(), result_id.as_str())
            .await?;

        if reply.is_ok() {
            let verified = reply.data().get("status").and_then(Value::as_str) == Some("SUCCESS");
            self.store.update_outcome(
                &request_id,
                &result_id,
                if verified {
                    RecordStatus::Completed
                } else {
                    RecordStatus::Failed
                },
                reply.body.clone(),
                None,
                Timestamp::now(),
            )?;
            Ok(ApiResponse::ok(reply.data().clone()))
        } else {
            Ok(vendor_error(&reply, "Unable to get status"))
        }
    }

    /// `POST /bank-account/verify` (pennyless)
    pub async fn pennyless_verify(&self, body: &Value) -> Result<ApiResponse, FlowError> {
        let bank_account = trimmed(body, "bank_account");
        let ifsc = trimmed(body, "ifsc").to_uppercase();
        if bank_account.is_empty() || ifsc.is_empty() {
            return Err(FlowError::InvalidInput(
                "Both 'bank_account' and 'ifsc' are required.".to_owned(),
            ));
        }

        let request_id = ReferenceId::generate();
        let reply = self
            .api
            .pennyless_verify(request_id.as_str(), &bank_account, &ifsc)
            .await?;

        self.store.insert(BharatRecord::new(
            DocType::BankIfsc,
            request_id.clone(),
            None,
            if reply.is_ok() {
                RecordStatus::Completed
            } else {
                RecordStatus::Failed
            },
            json!({"bank_account": bank_account, "ifsc": ifsc}),
            reply.body.clone(),
        ))?;

        let message = if reply.is_ok() {
            "Bank account verification successful"
        } else {
            "Bank account verification failed"
        };
        Ok(ApiResponse {
            status: reply.status,
            body: json!({"message": message, "response": reply.body}),
        })
    }

    async fn upload_aadhaar_image(
        &self,
        request_id: &str,
        image_base64: &str,
    ) -> Result<String, FlowError> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(image_base64)
            .map_err(|e| {
                error!(%request_id, error = %e, "aadhaar image was not valid base64");
                FlowError::InvalidInput(format!("invalid image payload: {e}"))
            })?;
        let object_name = format!("bharat_aadhaar_image_{request_id}.jpg");
        Ok(self.storage.put(&object_name, bytes).await?)
    }
}

fn trimmed(body: &Value, field: &str) -> String {
    body.get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_owned()
}

fn require_pair(body: &Value) -> Result<(ReferenceId, ResultId), FlowError> {
    let request_id = body.get("request_id").and_then(Value::as_str).unwrap_or_default();
    let result_id = body.get("result_id").and_then(Value::as_str).unwrap_or_default();
    if request_id.is_empty() || result_id.is_empty() {
        return Err(FlowError::InvalidInput(
            "Both 'request_id' and 'result_id' are required".to_owned(),
        ));
    }
    Ok((ReferenceId::new(request_id), ResultId::new(result_id)))
}

fn vendor_error(reply: &BharatReply, fallback: &str) -> ApiResponse {
    ApiResponse {
        status: reply.status,
        body: json!({"error": reply.error_message().unwrap_or(fallback)}),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idgate_nullables::{RecordingObjectStore, ScriptedBharatApi};
    use idgate_store_memory::MemoryStore;

    struct Harness {
        store: Arc<MemoryStore>,
        storage: Arc<RecordingObjectStore>,
        api: Arc<ScriptedBharatApi>,
        flows: BharatFlows,
    }

    fn harness(replies: Vec<BharatReply>) -> Harness {
        let store = Arc::new(MemoryStore::new());
        let storage = Arc::new(RecordingObjectStore::new());
        let api = Arc::new(ScriptedBharatApi::new(replies));
        let flows = BharatFlows::new(
            api.clone(),
            store.clone(),
            storage.clone(),
            Arc::new(FieldCipher::new([3u8; 32])),
        );
        Harness {
            store,
            storage,
            api,
            flows,
        }
    }

    fn reply(status: u16, body: Value) -> BharatReply {
        BharatReply { status, body }
    }

    #[tokio::test]
    async fn send_otp_rejects_malformed_aadhaar() {
        let h = harness(vec![]);
        for bad in ["12341234123", "1234 1234 123a", ""] {
            let err = h
                .flows
                .send_otp(&json!({"aadhaar_no": bad}))
                .await
                .expect_err("invalid aadhaar");
            assert!(err.to_string().starts_with("Invalid 'aadhaar'"));
        }
        // Spaces alone are tolerated.
        let h = harness(vec![reply(200, json!({"data": {"result_id": "res-1"}}))]);
        let response = h
            .flows
            .send_otp(&json!({"aadhaar_no": "1234 1234 1234"}))
            .await
            .expect("sent");
        assert_eq!(response.status, 200);
        assert_eq!(response.body["result_id"], "res-1");
    }

    #[tokio::test]
    async fn send_otp_stores_pending_record_with_encrypted_number() {
        let h = harness(vec![reply(200, json!({"data": {"result_id": "res-1"}}))]);
        let response = h
            .flows
            .send_otp(&json!({"aadhaar_no": "123412341234"}))
            .await
            .expect("sent");

        let request_id = response.body["request_id"].as_str().unwrap();
        let record = h
            .store
            .find_by_pair(&ReferenceId::new(request_id), &ResultId::new("res-1"))
            .unwrap()
            .unwrap();
        assert_eq!(record.status, RecordStatus::Pending);
        assert_ne!(record.subject["aadhaar_no"], "123412341234");
    }

    #[tokio::test]
    async fn verify_otp_uploads_image_and_completes_record() {
        let image = base64::engine::general_purpose::STANDARD.encode(b"jpeg-bytes");
        let h = harness(vec![
            reply(200, json!({"data": {"result_id": "res-1"}})),
            reply(200, json!({"data": {"name": "Rahul Sharma", "image": image}})),
        ]);
        let sent = h
            .flows
            .send_otp(&json!({"aadhaar_no": "123412341234"}))
            .await
            .expect("sent");
        let request_id = sent.body["request_id"].as_str().unwrap().to_owned();

        let verified = h
            .flows
            .verify_otp(&json!({
                "request_id": request_id,
                "result_id": "res-1",
                "otp": "123456",
            }))
            .await
            .expect("verified");
        assert_eq!(verified.status, 200);
        assert_eq!(verified.body["name"], "Rahul Sharma");

        let record = h
            .store
            .find_by_pair(&ReferenceId::new(request_id.as_str()), &ResultId::new("res-1"))
            .unwrap()
            .unwrap();
        assert_eq!(record.status, RecordStatus::Completed);
        let image_url = record.image_file_url.unwrap();
        assert_eq!(image_url, format!("null://bharat_aadhaar_image_{request_id}.jpg"));
        assert_eq!(
            h.storage.get(&format!("bharat_aadhaar_image_{request_id}.jpg")),
            Some(b"jpeg-bytes".to_vec())
        );
    }

    #[tokio::test]
    async fn verify_otp_vendor_error_body_maps_to_422() {
        let h = harness(vec![
            reply(200, json!({"data": {"result_id": "res-1"}})),
            reply(200, json!({"error": "Invalid OTP entered"})),
        ]);
        let sent = h
            .flows
            .send_otp(&json!({"aadhaar_no": "123412341234"}))
            .await
            .expect("sent");
        let request_id = sent.body["request_id"].as_str().unwrap().to_owned();

        let response = h
            .flows
            .verify_otp(&json!({
                "request_id": request_id,
                "result_id": "res-1",
                "otp": "000000",
            }))
            .await
            .expect("relayed");
        assert_eq!(response.status, 422);
        assert_eq!(response.body["error"], "Invalid OTP entered");

        // The record stays pending; the caller may retry with a fresh OTP.
        let record = h
            .store
            .find_by_pair(&ReferenceId::new(request_id.as_str()), &ResultId::new("res-1"))
            .unwrap()
            .unwrap();
        assert_eq!(record.status, RecordStatus::Pending);
    }

    #[tokio::test]
    async fn verify_otp_unknown_pair_is_not_found() {
        let h = harness(vec![]);
        let err = h
            .flows
            .verify_otp(&json!({
                "request_id": "req-x",
                "result_id": "res-x",
                "otp": "123456",
            }))
            .await
            .expect_err("no record");
        assert_eq!(err.to_string(), "Record not found");
    }

    #[tokio::test]
    async fn penny_drop_validates_account_and_ifsc() {
        let h = harness(vec![]);
        let err = h
            .flows
            .penny_drop_send(&json!({"bank_account": "12ab", "ifsc": "HDFC0001234"}))
            .await
            .expect_err("non-digit account");
        assert_eq!(err.to_string(), "Invalid bank account");

        let err = h
            .flows
            .penny_drop_send(&json!({"bank_account": "123456789012", "ifsc": "HDFC"}))
            .await
            .expect_err("short ifsc");
        assert_eq!(err.to_string(), "Invalid IFSC code");
    }

    #[tokio::test]
    async fn completed_penny_drop_short_circuits_repeat_request() {
        let h = harness(vec![
            reply(200, json!({"data": {"result_id": "res-1"}})),
            reply(200, json!({"data": {"status": "SUCCESS", "account_name": "RAHUL SHARMA"}})),
        ]);
        let body = json!({"bank_account": "123456789012", "ifsc": "HDFC0001234"});

        let sent = h.flows.penny_drop_send(&body).await.expect("sent");
        let request_id = sent.body["request_id"].as_str().unwrap().to_owned();

        let status = h
            .flows
            .penny_drop_status(&json!({"request_id": request_id, "result_id": "res-1"}))
            .await
            .expect("status");
        assert_eq!(status.body["status"], "SUCCESS");

        // Scripted replies are exhausted, so a vendor round-trip would fail:
        // the stored result must answer instead.
        let again = h.flows.penny_drop_send(&body).await.expect("short-circuit");
        assert_eq!(again.status, 200);
        assert_eq!(again.body["account_name"], "RAHUL SHARMA");
    }

    #[tokio::test]
    async fn penny_drop_status_failure_marks_record_failed() {
        let h = harness(vec![
            reply(200, json!({"data": {"result_id": "res-1"}})),
            reply(200, json!({"data": {"status": "FAILED"}})),
        ]);
        let sent = h
            .flows
            .penny_drop_send(&json!({"bank_account": "123456789012", "ifsc": "HDFC0001234"}))
            .await
            .expect("sent");
        let request_id = sent.body["request_id"].as_str().unwrap().to_owned();

        h.flows
            .penny_drop_status(&json!({"request_id": request_id, "result_id": "res-1"}))
            .await
            .expect("status");
        let record = h
            .store
            .find_by_pair(&ReferenceId::new(request_id.as_str()), &ResultId::new("res-1"))
            .unwrap()
            .unwrap();
        assert_eq!(record.status, RecordStatus::Failed);
    }

    #[tokio::test]
    async fn pennyless_verify_relays_vendor_outcome() {
        let h = harness(vec![reply(200, json!({"status": "SUCCESS"}))]);
        let response = h
            .flows
            .pennyless_verify(&json!({"bank_account": "123456789012", "ifsc": "hdfc0001234"}))
            .await
            .expect("verified");
        assert_eq!(response.status, 200);
        assert_eq!(response.body["message"], "Bank account verification successful");
        assert_eq!(response.body["response"]["status"], "SUCCESS");
    }

    #[tokio::test]
    async fn pan_verify_requires_all_fields() {
        let h = harness(vec![]);
        let err = h
            .flows
            .verify_pan(&json!({"full_name": "Rahul Sharma"}))
            .await
            .expect_err("missing fields");
        assert_eq!(
            err.to_string(),
            "Fields 'full_name', 'date_of_birth', and 'pan' are required."
        );
    }

    #[tokio::test]
    async fn pan_verify_uppercases_pan_and_records_outcome() {
        let h = harness(vec![reply(200, json!({"data": {"status": "VALID"}}))]);
        let response = h
            .flows
            .verify_pan(&json!({
                "full_name": " Rahul Sharma ",
                "date_of_birth": "1995-01-15",
                "pan_number": "abcde1234f",
            }))
            .await
            .expect("verified");
        assert_eq!(response.status, 200);
        assert_eq!(response.body["message"], "PAN verification successful");

        // The PAN reaches the vendor upper-cased.
        let calls = h.api.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].starts_with("verify_pan:"));
        assert!(calls[0].ends_with(":ABCDE1234F"));
    }
}
