//! Verification flows: the gateway's business logic.
//!
//! Each flow composes the vendor clients, the poller, the stores and the
//! outward services behind the trait seams those crates define. The RPC
//! layer stays a thin shell over this crate.

pub mod aadhaar;
pub mod bharat;
pub mod callback;
pub mod crosscheck;
pub mod error;
pub mod pan;
pub mod relink;
pub mod video;

pub use aadhaar::{AadhaarData, AadhaarFlow, AadhaarSubmission, AadhaarTaskConfig};
pub use bharat::{ApiResponse, BharatFlows};
pub use callback::{CallbackAck, CallbackPayload, CallbackService, HttpFetcher, ResourceFetcher};
pub use crosscheck::{crosscheck, extract_identity, CapturedIdentity, CrosscheckOutcome};
pub use error::FlowError;
pub use pan::{PanFlow, PanRequest, PanVerification};
pub use relink::{RelinkOutcome, RelinkService};
pub use video::{VideoKycFlow, VideoKycStatus};
