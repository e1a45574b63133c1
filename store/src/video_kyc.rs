//! Video-KYC session records.

use crate::StoreError;
use idgate_types::{ProfileId, RecordStatus, ReferenceId, Timestamp};
use serde::{Deserialize, Serialize};

/// Which kind of user a video-KYC session belongs to. Drives the side effect
/// taken when the vendor reports a completed review.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Agent,
    Distributor,
}

/// One video-KYC session, keyed by the profile id the vendor assigned at
/// link-generation time (`generate_profile_id` in the original records).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VideoKycRecord {
    pub request_ref_id: ReferenceId,
    pub profile_id: ProfileId,
    /// Expected name captured at link-generation time, for cross-checking.
    pub aadhar_name: Option<String>,
    /// Expected date of birth captured at link-generation time.
    pub aadhar_dob: Option<String>,
    pub user_type: Option<UserType>,
    pub status: RecordStatus,
    /// Vendor response to the link-generation call.
    pub link_response: serde_json::Value,
    /// Latest caller-driven status query result merged into the record.
    pub last_status_response: Option<serde_json::Value>,
    /// Vendor-pushed callback payload, set on the terminal write.
    pub callback_payload: Option<serde_json::Value>,
    /// Object-storage URLs for the session's file resources; failed uploads
    /// carry an error string in place of a URL.
    pub file_urls: Option<serde_json::Value>,
    pub request_time: Timestamp,
    pub update_status_time: Option<Timestamp>,
    pub data_received_time: Option<Timestamp>,
}

impl VideoKycRecord {
    pub fn pending(
        request_ref_id: ReferenceId,
        profile_id: ProfileId,
        link_response: serde_json::Value,
    ) -> Self {
        Self {
            request_ref_id,
            profile_id,
            aadhar_name: None,
            aadhar_dob: None,
            user_type: None,
            status: RecordStatus::Pending,
            link_response,
            last_status_response: None,
            callback_payload: None,
            file_urls: None,
            request_time: Timestamp::now(),
            update_status_time: None,
            data_received_time: None,
        }
    }
}

/// Storage for video-KYC session records.
pub trait VideoKycStore: Send + Sync {
    /// Insert a freshly generated session. [`StoreError::Duplicate`] if the
    /// profile id is already present.
    fn insert(&self, record: VideoKycRecord) -> Result<(), StoreError>;

    fn find_by_profile(
        &self,
        profile_id: &ProfileId,
    ) -> Result<Option<VideoKycRecord>, StoreError>;

    /// Merge a caller-driven status query result into a still-open record.
    /// Free-form while the record is non-terminal; this is not the terminal
    /// write path.
    fn upsert_status(
        &self,
        profile_id: &ProfileId,
        status_payload: serde_json::Value,
        updated_at: Timestamp,
    ) -> Result<(), StoreError>;

    /// Apply a vendor callback: the terminal write for this collection.
    ///
    /// Must be atomic per key: a record that has already received a callback
    /// rejects the write with [`StoreError::Duplicate`], leaving the stored
    /// payload untouched.
    fn apply_callback(
        &self,
        profile_id: &ProfileId,
        payload: serde_json::Value,
        file_urls: Option<serde_json::Value>,
        status: RecordStatus,
        received_at: Timestamp,
    ) -> Result<(), StoreError>;
}
