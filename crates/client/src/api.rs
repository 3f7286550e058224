//! REST API client for the document-generation service.
//!
//! Wraps job creation, status checks, artifact download and template
//! management using [`reqwest`].

use hwpgen_core::job::{CreateJobResponse, JobId, StatusResponse};
use hwpgen_core::payload::SubmissionPayload;
use hwpgen_core::template::{QuestionNumbersResponse, UploadResponse};

use crate::error::ApiError;

/// HTTP client for one document-generation service.
#[derive(Debug, Clone)]
pub struct GeneratorApi {
    client: reqwest::Client,
    api_url: String,
}

impl GeneratorApi {
    /// Create a new API client.
    ///
    /// * `api_url` - Base HTTP URL, e.g. `http://host:8000`.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    /// Create an API client reusing an existing [`reqwest::Client`]
    /// (timeouts and connection pooling are configured there).
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self { client, api_url }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Request a new document.
    ///
    /// Sends `POST /generate-problem/` and returns the raw creation
    /// response; a missing `request_id` is the caller's concern.
    pub async fn submit(&self, payload: &SubmissionPayload) -> Result<CreateJobResponse, ApiError> {
        let response = self
            .client
            .post(format!("{}/generate-problem/", self.api_url))
            .json(payload)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Sends `GET /status/{id}`.
    pub async fn status(&self, job_id: &JobId) -> Result<StatusResponse, ApiError> {
        let url = self.segment_url(&["status", job_id.as_str()])?;
        let response = self.client.get(url).send().await?;

        Self::parse_response(response).await
    }

    /// Address of a generated file, for callers that hand the link to
    /// something else instead of fetching it.
    pub fn download_url(&self, filename: &str) -> Result<String, ApiError> {
        Ok(self.segment_url(&["download", filename])?.to_string())
    }

    /// Fetch a generated file (`GET /download/{filename}`).
    pub async fn download(&self, filename: &str) -> Result<Vec<u8>, ApiError> {
        let url = self.segment_url(&["download", filename])?;
        let response = self.client.get(url).send().await?;
        let response = Self::ensure_success(response).await?;

        Ok(response.bytes().await?.to_vec())
    }

    /// Names of all uploaded templates (`GET /templates/`).
    pub async fn list_templates(&self) -> Result<Vec<String>, ApiError> {
        let response = self
            .client
            .get(format!("{}/templates/", self.api_url))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Upload an HWP template as multipart field `file`
    /// (`POST /templates/upload/`).
    pub async fn upload_template(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResponse, ApiError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}/templates/upload/", self.api_url))
            .multipart(form)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Question numbers offered by a template
    /// (`GET /templates/{name}/questions`).
    pub async fn template_questions(
        &self,
        template_name: &str,
    ) -> Result<QuestionNumbersResponse, ApiError> {
        let url = self.segment_url(&["templates", template_name, "questions"])?;
        let response = self.client.get(url).send().await?;

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// Append path segments to the base URL, percent-encoding each one.
    fn segment_url(&self, segments: &[&str]) -> Result<reqwest::Url, ApiError> {
        let mut url = reqwest::Url::parse(&self.api_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", self.api_url)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(format!("{} cannot be a base", self.api_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or an [`ApiError::Status`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
