//! Abstract document-store traits for the idgate verification gateway.
//!
//! Every storage backend implements these traits; the rest of the codebase
//! depends only on them and receives a handle at construction time. The
//! collections are document-shaped and keyed by caller- or vendor-supplied
//! identifiers; no schema is enforced beyond the record structs here.
//!
//! The one invariant every backend must uphold: for a given key, at most one
//! terminal write may succeed. The check-before-write on the terminal paths
//! is folded into single trait operations (`apply_callback`,
//! `insert_completed`) so a backend can make it atomic per key — two racing
//! writers must not both observe "no terminal record" and proceed.

pub mod aadhaar;
pub mod bharat;
pub mod error;
pub mod event;
pub mod pan;
pub mod video_kyc;

pub use aadhaar::{AadhaarRecord, AadhaarStore};
pub use bharat::{BharatRecord, BharatStore};
pub use error::StoreError;
pub use event::VendorEventStore;
pub use pan::{PanRecord, PanStore};
pub use video_kyc::{UserType, VideoKycRecord, VideoKycStore};
