//! Job submission: one creation request, no retry.

use hwpgen_core::job::JobId;
use hwpgen_core::payload::SubmissionPayload;

use crate::error::WorkflowError;
use crate::service::JobService;

/// Validate the payload and issue exactly one creation request.
///
/// A response without a usable `request_id` is [`WorkflowError::MissingJobId`];
/// a transport or status failure is [`WorkflowError::Submission`].
pub async fn submit_job(
    service: &dyn JobService,
    payload: &SubmissionPayload,
) -> Result<JobId, WorkflowError> {
    payload
        .validate()
        .map_err(|e| WorkflowError::Validation(e.to_string()))?;

    let response = service
        .create_job(payload)
        .await
        .map_err(WorkflowError::Submission)?;

    let job_id = response.into_job_id().ok_or(WorkflowError::MissingJobId)?;
    tracing::info!(job_id = %job_id, "Generation job submitted");
    Ok(job_id)
}
