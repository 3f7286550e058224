//! Error types for the HTTP layers and the job workflow.

use hwpgen_core::error::CoreError;
use hwpgen_core::job::{
    MSG_DOWNLOAD_FAILED, MSG_MISSING_JOB_ID, MSG_STATUS_CHECK_FAILED, MSG_SUBMISSION_FAILED,
};

/// Errors from the document-generation REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, body decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("API error ({status}): {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The configured base URL cannot address the requested resource.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Errors from the OCR service. Callers normally degrade these to a
/// placeholder text instead of failing.
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("OCR request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("OCR service error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("OCR response contained no text segments")]
    NoText,
}

/// Failures of one submit -> poll -> retrieve workflow.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// The payload was rejected before anything was sent.
    #[error("Invalid submission: {0}")]
    Validation(String),

    /// The creation response carried no job identifier.
    #[error("Job creation response contained no request id")]
    MissingJobId,

    /// The creation request failed.
    #[error("Job submission failed: {0}")]
    Submission(#[source] ApiError),

    /// A status check failed and the poll policy gave up.
    #[error("Status check for job {job_id} failed: {source}")]
    PollTransport {
        job_id: String,
        #[source]
        source: ApiError,
    },

    /// The poll policy's attempt limit was reached before a terminal status.
    #[error("Job {job_id} still not finished after {attempts} status checks")]
    PollLimit { job_id: String, attempts: u32 },

    /// The service reported `error` for the job.
    #[error("Job failed: {message}")]
    Job { message: String },

    /// Fetching or saving the artifact failed.
    #[error("Download of '{filename}' failed: {reason}")]
    Download { filename: String, reason: String },

    /// A job is already being submitted or polled.
    #[error("A job is already in flight")]
    Busy,

    /// Nothing to retrieve: the last job did not complete.
    #[error("No completed job to download")]
    NotCompleted,

    /// The workflow was torn down before finishing.
    #[error("Workflow cancelled")]
    Cancelled,

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl WorkflowError {
    /// Message shown to the user. Server-provided job errors are shown
    /// verbatim.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::MissingJobId => MSG_MISSING_JOB_ID.to_string(),
            Self::Submission(_) => MSG_SUBMISSION_FAILED.to_string(),
            Self::PollTransport { .. } | Self::PollLimit { .. } => {
                MSG_STATUS_CHECK_FAILED.to_string()
            }
            Self::Job { message } => message.clone(),
            Self::Download { .. } => MSG_DOWNLOAD_FAILED.to_string(),
            Self::Busy => "이미 변환이 진행 중입니다.".to_string(),
            Self::NotCompleted => "다운로드할 변환 결과가 없습니다.".to_string(),
            Self::Cancelled => "변환이 취소되었습니다.".to_string(),
            Self::Core(e) => e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_error_message_is_verbatim() {
        let err = WorkflowError::Job {
            message: "서식 오류".into(),
        };
        assert_eq!(err.user_message(), "서식 오류");
    }

    #[test]
    fn missing_id_message() {
        assert_eq!(
            WorkflowError::MissingJobId.user_message(),
            "요청 ID를 받지 못했습니다."
        );
    }

    #[test]
    fn submission_failure_message() {
        let err = WorkflowError::Submission(ApiError::Status {
            status: 500,
            body: "boom".into(),
        });
        assert_eq!(err.user_message(), MSG_SUBMISSION_FAILED);
        assert!(err.to_string().contains("500"));
    }
}
