//! Fundamental types for the idgate verification gateway.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: identifiers, document types, lifecycle states, timestamps, and
//! per-flow polling policies.

pub mod doc_type;
pub mod id;
pub mod params;
pub mod status;
pub mod time;

pub use doc_type::DocType;
pub use id::{ProfileId, ReferenceId, ResultId, VendorRequestId};
pub use params::PollPolicy;
pub use status::{RecordStatus, TaskStatus};
pub use time::Timestamp;
