//! Fixed-interval status polling with cancellation.
//!
//! [`poll_until_terminal`] checks the job once immediately and then once
//! per [`PollPolicy::interval`] until the service reports a terminal
//! status or the [`CancellationToken`] is triggered. No backoff, no
//! jitter.

use std::time::Duration;

use hwpgen_core::job::{JobId, JobOutcome};
use tokio_util::sync::CancellationToken;

use crate::error::WorkflowError;
use crate::service::JobService;

/// Default delay between status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// What a failed status request does to the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportErrorPolicy {
    /// The first failed status check ends the workflow.
    #[default]
    Abort,
    /// Keep polling until this many consecutive checks have failed.
    Tolerate { max_consecutive: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// `None` polls until a terminal status or cancellation.
    pub max_attempts: Option<u32>,
    pub on_transport_error: TransportErrorPolicy,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
            on_transport_error: TransportErrorPolicy::default(),
        }
    }
}

/// Poll `job_id` until it completes (returns the result filename) or
/// fails (returns [`WorkflowError::Job`] with the server message).
///
/// Once a terminal status is seen no further request is issued for the
/// job. Cancellation is checked before every request and while waiting.
pub async fn poll_until_terminal(
    service: &dyn JobService,
    job_id: &JobId,
    policy: &PollPolicy,
    cancel: &CancellationToken,
) -> Result<String, WorkflowError> {
    let mut attempts = 0u32;
    let mut consecutive_failures = 0u32;

    loop {
        if cancel.is_cancelled() {
            tracing::info!(job_id = %job_id, attempts, "Polling cancelled");
            return Err(WorkflowError::Cancelled);
        }

        attempts += 1;
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(job_id = %job_id, attempts, "Polling cancelled");
                return Err(WorkflowError::Cancelled);
            }
            result = service.job_status(job_id) => result,
        };

        match result {
            Ok(response) => {
                consecutive_failures = 0;
                tracing::debug!(job_id = %job_id, attempt = attempts, status = %response.status, "Job status");

                match response.outcome() {
                    Some(JobOutcome::Completed { filename }) => {
                        tracing::info!(job_id = %job_id, attempts, filename = %filename, "Job completed");
                        return Ok(filename);
                    }
                    Some(JobOutcome::Failed { message }) => {
                        tracing::warn!(job_id = %job_id, attempts, error = %message, "Job failed");
                        return Err(WorkflowError::Job { message });
                    }
                    None => {}
                }
            }
            Err(e) => {
                consecutive_failures += 1;
                let give_up = match policy.on_transport_error {
                    TransportErrorPolicy::Abort => true,
                    TransportErrorPolicy::Tolerate { max_consecutive } => {
                        consecutive_failures >= max_consecutive
                    }
                };
                if give_up {
                    tracing::error!(job_id = %job_id, attempts, error = %e, "Status check failed");
                    return Err(WorkflowError::PollTransport {
                        job_id: job_id.to_string(),
                        source: e,
                    });
                }
                tracing::warn!(
                    job_id = %job_id,
                    consecutive_failures,
                    error = %e,
                    "Status check failed, polling again",
                );
            }
        }

        if let Some(max) = policy.max_attempts {
            if attempts >= max {
                tracing::warn!(job_id = %job_id, attempts, "Poll attempt limit reached");
                return Err(WorkflowError::PollLimit {
                    job_id: job_id.to_string(),
                    attempts,
                });
            }
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(job_id = %job_id, attempts, "Polling cancelled");
                return Err(WorkflowError::Cancelled);
            }
            _ = tokio::time::sleep(policy.interval) => {}
        }
    }
}
