use idgate_crypto::CryptoError;
use idgate_poller::PollError;
use idgate_store::StoreError;
use idgate_utils::services::ServiceError;
use idgate_vendor::VendorError;
use thiserror::Error;

/// Flow-level failures. The RPC layer maps these onto HTTP statuses; the
/// display strings are the client-visible messages.
#[derive(Debug, Error)]
pub enum FlowError {
    /// Client input validation: missing body fields.
    #[error("Missing mandatory fields: {}", fields.join(", "))]
    MissingFields { fields: Vec<String> },

    /// Client input validation with a verbatim message.
    #[error("{0}")]
    InvalidInput(String),

    /// Lookup found nothing for the given key.
    #[error("{0}")]
    NotFound(String),

    /// A terminal write was attempted on an already-terminal key.
    #[error("{0}")]
    Duplicate(String),

    /// A stored identity field disagreed with what the vendor reported.
    #[error("Identity mismatch: expected {expected}, received {received}")]
    IdentityMismatch { expected: String, received: String },

    #[error("{0}")]
    Vendor(#[from] VendorError),

    #[error("{0}")]
    Poll(#[from] PollError),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Crypto(#[from] CryptoError),

    #[error("{0}")]
    Service(#[from] ServiceError),
}

impl FlowError {
    pub fn missing_fields(fields: Vec<String>) -> Self {
        FlowError::MissingFields { fields }
    }
}
