//! Records for the Bharat vendor family (OTP, PAN, penny-drop flows).
//!
//! These flows have no server-side poll loop: the caller drives the status
//! check through a second endpoint, so records move `pending` →
//! `completed` / `failed` / `verification_failed` across two requests keyed
//! by the `(request_id, result_id)` pair.

use crate::StoreError;
use idgate_types::{DocType, RecordStatus, ReferenceId, ResultId, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BharatRecord {
    /// Which verification this record belongs to (`aadhaar`, `pan`,
    /// `bank_account`, `bank_ifsc`).
    pub kind: DocType,
    pub request_id: ReferenceId,
    /// Vendor-assigned result id; absent when the submit itself failed.
    pub result_id: Option<ResultId>,
    pub status: RecordStatus,
    /// Input fields of the attempt (aadhaar number, PAN details, account +
    /// IFSC). Sensitive numbers are encrypted before this struct is built.
    pub subject: serde_json::Value,
    /// Vendor response to the initial submit.
    pub sent_response: serde_json::Value,
    /// Vendor response to the verify / status call, once made.
    pub verify_response: Option<serde_json::Value>,
    /// Object-storage URL of the Aadhaar photo, for OTP verifications.
    pub image_file_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl BharatRecord {
    pub fn new(
        kind: DocType,
        request_id: ReferenceId,
        result_id: Option<ResultId>,
        status: RecordStatus,
        subject: serde_json::Value,
        sent_response: serde_json::Value,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            kind,
            request_id,
            result_id,
            status,
            subject,
            sent_response,
            verify_response: None,
            image_file_url: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Storage for Bharat-family records.
pub trait BharatStore: Send + Sync {
    fn insert(&self, record: BharatRecord) -> Result<(), StoreError>;

    /// Look up the record for a `(request_id, result_id)` correlation pair.
    fn find_by_pair(
        &self,
        request_id: &ReferenceId,
        result_id: &ResultId,
    ) -> Result<Option<BharatRecord>, StoreError>;

    /// Look up a previously completed penny-drop verification for the same
    /// account + IFSC, to short-circuit a repeat request.
    fn find_completed_bank_account(
        &self,
        bank_account: &str,
        ifsc: &str,
    ) -> Result<Option<BharatRecord>, StoreError>;

    /// Record the outcome of a verify / status call.
    ///
    /// Must be atomic per pair: once a record is terminal, a second outcome
    /// write is rejected with [`StoreError::Duplicate`].
    fn update_outcome(
        &self,
        request_id: &ReferenceId,
        result_id: &ResultId,
        status: RecordStatus,
        verify_response: serde_json::Value,
        image_file_url: Option<String>,
        updated_at: Timestamp,
    ) -> Result<(), StoreError>;
}
