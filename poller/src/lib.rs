//! Budgeted status polling against the task vendor.
//!
//! After a task is submitted the vendor works asynchronously; we query its
//! status endpoint up to a fixed number of times. The first check fires
//! immediately after submission, and the configured delay only runs between
//! retries, so a budget of `n` checks costs at most `n - 1` sleeps.
//!
//! A poll ends one of three ways: the task completes, the vendor reports a
//! status that is neither completed nor in-progress (we fail fast and relay
//! the vendor's message), or the budget runs out.

pub mod delay;
pub mod error;

pub use delay::{Delay, TokioDelay};
pub use error::PollError;

use idgate_types::params::PollPolicy;
use idgate_types::{TaskStatus, VendorRequestId};
use idgate_vendor::{TaskApi, TaskEnvelope};
use tracing::{debug, info, warn};

/// What a successful poll hands back: the completed envelope plus how many
/// checks it took.
#[derive(Debug)]
pub struct PollOutcome {
    pub envelope: TaskEnvelope,
    pub checks_used: u32,
}

/// Polls the task vendor's status endpoint until completion or budget
/// exhaustion. The delay source is injected so tests never sleep.
pub struct CompletionPoller<C, D> {
    client: C,
    delay: D,
}

impl<C: TaskApi, D: Delay> CompletionPoller<C, D> {
    pub fn new(client: C, delay: D) -> Self {
        Self { client, delay }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn delay_ref(&self) -> &D {
        &self.delay
    }

    /// Run the poll loop for `request_id` under `policy`.
    pub async fn poll(
        &self,
        request_id: &VendorRequestId,
        policy: &PollPolicy,
    ) -> Result<PollOutcome, PollError> {
        for attempt in 1..=policy.max_checks {
            if attempt > 1 {
                self.delay.sleep(policy.delay()).await;
            }
            let envelope = self
                .client
                .status(request_id)
                .await
                .map_err(PollError::from_vendor)?
                .ok_or_else(|| {
                    PollError::Query(format!("no task found for request id {request_id}"))
                })?;
            debug!(%request_id, attempt, status = %envelope.status, "poll check");
            match &envelope.status {
                TaskStatus::Completed => {
                    info!(%request_id, checks = attempt, "task completed");
                    return Ok(PollOutcome {
                        envelope,
                        checks_used: attempt,
                    });
                }
                TaskStatus::InProgress => continue,
                TaskStatus::Other(status) => {
                    let status = status.clone();
                    let message = envelope
                        .error_message()
                        .unwrap_or("task did not complete")
                        .to_owned();
                    warn!(%request_id, %status, %message, "task failed");
                    return Err(PollError::Terminal { status, message });
                }
            }
        }
        warn!(%request_id, max_checks = policy.max_checks, "poll budget exhausted");
        Err(PollError::BudgetExhausted {
            checks: policy.max_checks,
        })
    }
}
