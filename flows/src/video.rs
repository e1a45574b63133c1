//! Video-KYC flow: generate a capture link, track session status, and fetch
//! captured documents.

use crate::error::FlowError;
use idgate_store::{UserType, VideoKycRecord, VideoKycStore};
use idgate_types::{ProfileId, ReferenceId, Timestamp};
use idgate_vendor::ProfileApi;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

const REQUIRED_ADDRESS_FIELDS: [&str; 6] = [
    "home_house",
    "home_address",
    "home_district",
    "home_pincode",
    "home_village",
    "home_state",
];

/// Summary served by the status endpoint.
#[derive(Clone, Debug, Serialize)]
pub struct VideoKycStatus {
    pub reviewer_action: Option<String>,
    pub status: Option<String>,
    pub request_time: String,
    pub profile_id: Option<String>,
    pub reference_id: Option<String>,
}

pub struct VideoKycFlow<P> {
    profiles: P,
    store: Arc<dyn VideoKycStore>,
    /// Vendor-side capture configuration id sent on every profile create.
    config_id: String,
}

impl<P: ProfileApi> VideoKycFlow<P> {
    pub fn new(profiles: P, store: Arc<dyn VideoKycStore>, config_id: String) -> Self {
        Self {
            profiles,
            store,
            config_id,
        }
    }

    pub fn profiles(&self) -> &P {
        &self.profiles
    }

    /// Create a vendor capture profile and persist the pending session.
    ///
    /// The body must carry all six `home_*` address fields; `aadhar_name`,
    /// `aadhar_dob` and `user_type` are captured for the later cross-check
    /// and review side effects.
    pub async fn generate_link(&self, request: &Value) -> Result<Value, FlowError> {
        for field in REQUIRED_ADDRESS_FIELDS {
            if request.get(field).is_none() {
                return Err(FlowError::InvalidInput(format!("'{field}' is missing")));
            }
        }

        let reference_id = ReferenceId::generate();
        let profile_request = json!({
            "reference_id": reference_id.as_str(),
            "config": {"id": self.config_id},
            "data": {
                "addresses": [{
                    "type": [" "],
                    "house_number": request["home_house"],
                    "street_address": request["home_address"],
                    "district": request["home_district"],
                    "pincode": request["home_pincode"],
                    "city": request["home_village"],
                    "state": request["home_state"],
                    "country_code": "+91",
                    "country": "India",
                }],
            },
        });

        let response = self.profiles.create_profile(&profile_request).await?;
        let profile_id = ProfileId::new(
            response
                .get("profile_id")
                .and_then(Value::as_str)
                .unwrap_or_default(),
        );
        info!(%reference_id, %profile_id, "video kyc profile created");

        let str_field = |name: &str| {
            request
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_owned)
        };
        let user_type = match request.get("user_type").and_then(Value::as_str) {
            Some("agent") => Some(UserType::Agent),
            Some("distributor") => Some(UserType::Distributor),
            _ => None,
        };

        let mut record = VideoKycRecord::pending(reference_id, profile_id, response.clone());
        record.aadhar_name = str_field("aadhar_name");
        record.aadhar_dob = str_field("aadhar_dob");
        record.user_type = user_type;
        self.store.insert(record)?;

        Ok(response)
    }

    /// Query the vendor for session state, merge it into the stored record,
    /// and return the review summary.
    pub async fn status(&self, profile_id: &ProfileId) -> Result<VideoKycStatus, FlowError> {
        let response = self.profiles.profile_status(profile_id).await?;

        let record = self
            .store
            .find_by_profile(profile_id)?
            .ok_or_else(|| FlowError::NotFound("KYC data not found".to_owned()))?;

        self.store
            .upsert_status(profile_id, response.clone(), Timestamp::now())?;

        let str_field = |name: &str| {
            response
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_owned)
        };
        Ok(VideoKycStatus {
            reviewer_action: str_field("reviewer_action"),
            status: str_field("status"),
            request_time: record.request_time.to_ist_string(),
            profile_id: str_field("profile_id"),
            reference_id: str_field("reference_id"),
        })
    }

    /// Raw vendor passthrough for the captured document view.
    pub async fn document(&self, profile_id: &ProfileId) -> Result<Value, FlowError> {
        Ok(self.profiles.profile_status(profile_id).await?)
    }
}
