//! The seam between the workflow and the remote job service.
//!
//! The submitter, poller and workflow runner only see [`JobService`],
//! so the HTTP client can be swapped for a scripted fake.

use async_trait::async_trait;
use hwpgen_core::job::{CreateJobResponse, JobId, StatusResponse};
use hwpgen_core::payload::SubmissionPayload;

use crate::api::GeneratorApi;
use crate::error::ApiError;

#[async_trait]
pub trait JobService: Send + Sync {
    /// Issue one job-creation request.
    async fn create_job(&self, payload: &SubmissionPayload) -> Result<CreateJobResponse, ApiError>;

    /// Issue one status request.
    async fn job_status(&self, job_id: &JobId) -> Result<StatusResponse, ApiError>;

    /// Fetch the generated artifact.
    async fn fetch_artifact(&self, filename: &str) -> Result<Vec<u8>, ApiError>;

    /// Address of the artifact, for link-only delivery.
    fn artifact_url(&self, filename: &str) -> Result<String, ApiError>;
}

#[async_trait]
impl JobService for GeneratorApi {
    async fn create_job(&self, payload: &SubmissionPayload) -> Result<CreateJobResponse, ApiError> {
        self.submit(payload).await
    }

    async fn job_status(&self, job_id: &JobId) -> Result<StatusResponse, ApiError> {
        self.status(job_id).await
    }

    async fn fetch_artifact(&self, filename: &str) -> Result<Vec<u8>, ApiError> {
        self.download(filename).await
    }

    fn artifact_url(&self, filename: &str) -> Result<String, ApiError> {
        self.download_url(filename)
    }
}
