//! Opaque identifier newtypes.
//!
//! Four distinct identifier spaces exist in the gateway and confusing them
//! is an easy way to look up the wrong collection, so each gets its own
//! newtype:
//!
//! - [`ReferenceId`] — server-generated, created at submission time, the key
//!   clients use to retrieve results later.
//! - [`VendorRequestId`] — vendor-assigned task identifier returned by a
//!   submit call, used for status polling.
//! - [`ResultId`] — second half of the Bharat-family correlation pair.
//! - [`ProfileId`] — vendor-assigned video-KYC session identifier, the
//!   callback correlation key.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! opaque_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

opaque_id!(
    /// Server-generated reference identifier, unique per verification attempt.
    ReferenceId
);
opaque_id!(
    /// Vendor-assigned request/task identifier returned by a submit call.
    VendorRequestId
);
opaque_id!(
    /// Vendor-assigned result identifier (Bharat flows pair it with the request id).
    ResultId
);
opaque_id!(
    /// Vendor-assigned video-KYC session identifier.
    ProfileId
);

impl ReferenceId {
    /// Generate a fresh reference id: 32 lowercase hex characters
    /// (uuid-v4 without hyphens), matching what the vendors accept as
    /// `task_id`/`group_id`/`reference_id`.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }
}
