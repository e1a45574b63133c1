use thiserror::Error;

use idgate_vendor::VendorError;

/// Why a poll loop stopped short of completion.
#[derive(Debug, Error)]
pub enum PollError {
    /// Status query failed in transport or decoding, or the vendor returned
    /// no task for the request id.
    #[error("{0}")]
    Query(String),

    /// The vendor reported a status that is neither completed nor
    /// in-progress; the message is relayed to the caller.
    #[error("{message}")]
    Terminal { status: String, message: String },

    /// All checks were spent with the task still in progress.
    #[error("Reached maximum number of checks without completion")]
    BudgetExhausted { checks: u32 },
}

impl PollError {
    pub(crate) fn from_vendor(err: VendorError) -> Self {
        PollError::Query(err.to_string())
    }
}
