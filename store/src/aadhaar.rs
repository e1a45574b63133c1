//! Aadhaar verification records.

use crate::StoreError;
use idgate_types::{RecordStatus, ReferenceId, Timestamp};
use serde::{Deserialize, Serialize};

/// One Aadhaar verification attempt, keyed by the server-generated
/// `request_ref_id`. The vendor later reports its own `reference_id` through
/// the callback; both are kept because the callback dedup check runs against
/// the vendor-side id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AadhaarRecord {
    /// Server-generated key, created at submission time. Immutable.
    pub request_ref_id: ReferenceId,
    /// Aadhaar number as an encrypted token — never stored in the clear.
    pub aadhaar_number_enc: Option<String>,
    /// Vendor-reported reference id, set when the callback arrives.
    pub vendor_reference_id: Option<ReferenceId>,
    pub status: RecordStatus,
    /// Full callback payload (including `parsed_details`), set on the terminal write.
    pub callback_payload: Option<serde_json::Value>,
    pub request_time: Timestamp,
    pub data_received_time: Option<Timestamp>,
}

impl AadhaarRecord {
    pub fn pending(request_ref_id: ReferenceId, aadhaar_number_enc: Option<String>) -> Self {
        Self {
            request_ref_id,
            aadhaar_number_enc,
            vendor_reference_id: None,
            status: RecordStatus::Pending,
            callback_payload: None,
            request_time: Timestamp::now(),
            data_received_time: None,
        }
    }
}

/// Storage for Aadhaar verification records.
pub trait AadhaarStore: Send + Sync {
    /// Insert a freshly created pending record. Fails with
    /// [`StoreError::Duplicate`] if the `request_ref_id` is already present.
    fn insert(&self, record: AadhaarRecord) -> Result<(), StoreError>;

    /// Look up by the server-generated request reference.
    fn find_by_request_ref(
        &self,
        request_ref_id: &ReferenceId,
    ) -> Result<Option<AadhaarRecord>, StoreError>;

    /// Apply a vendor callback: the terminal write for this collection.
    ///
    /// Must be atomic per key: if any record already carries
    /// `vendor_reference_id`, the write is rejected with
    /// [`StoreError::Duplicate`] and the stored record is left untouched.
    /// Otherwise the record keyed by `request_ref_id` is upserted with the
    /// payload, the vendor reference, a received timestamp, and
    /// `RecordStatus::Completed`.
    fn apply_callback(
        &self,
        request_ref_id: &ReferenceId,
        vendor_reference_id: &ReferenceId,
        payload: serde_json::Value,
        received_at: Timestamp,
    ) -> Result<(), StoreError>;
}
