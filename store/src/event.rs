//! Opaque vendor event storage.
//!
//! The callback endpoint receives payloads that belong to no known request
//! flow. They are kept verbatim for later inspection — no key, no dedup.

use crate::StoreError;

pub trait VendorEventStore: Send + Sync {
    fn insert(&self, payload: serde_json::Value) -> Result<(), StoreError>;
}
