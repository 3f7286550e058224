//! Job identifiers, status values and wire shapes of the
//! document-generation service (creation and status endpoints).
//!
//! The status label set is owned by the server, so [`JobStatus`] is an
//! open enum: unknown labels are preserved in [`JobStatus::Other`] and
//! treated as non-terminal.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Status label constants
// ---------------------------------------------------------------------------

/// Job accepted, generation not finished yet.
pub const STATUS_PENDING: &str = "pending";
/// Generation finished; the response carries a filename.
pub const STATUS_COMPLETED: &str = "completed";
/// Generation failed; the response may carry an error detail.
pub const STATUS_ERROR: &str = "error";

// ---------------------------------------------------------------------------
// User-facing messages
// ---------------------------------------------------------------------------

/// Shown when the creation response carries no job identifier.
pub const MSG_MISSING_JOB_ID: &str = "요청 ID를 받지 못했습니다.";
/// Shown when the creation request itself failed.
pub const MSG_SUBMISSION_FAILED: &str = "HWP 변환 요청에 실패했습니다.";
/// Shown when a status check failed at the transport level.
pub const MSG_STATUS_CHECK_FAILED: &str = "상태 확인 중 오류가 발생했습니다.";
/// Fallback when the server reports `error` without a detail.
pub const MSG_JOB_FAILED_FALLBACK: &str = "HWP 변환 중 오류가 발생했습니다.";
/// Shown when a completed job names no result file.
pub const MSG_MISSING_FILENAME: &str = "결과 파일 이름을 받지 못했습니다.";
/// Shown when fetching or saving the artifact failed.
pub const MSG_DOWNLOAD_FAILED: &str = "파일 다운로드에 실패했습니다.";

/// Server-assigned, opaque job identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Wrap a server-provided identifier. Blank identifiers are rejected.
    pub fn new(raw: impl Into<String>) -> Result<Self, CoreError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(CoreError::Validation(
                "Job identifier must not be empty".to_string(),
            ));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status reported by the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Pending,
    Completed,
    Error,
    /// Any label the server invents that we do not know about.
    Other(String),
}

impl JobStatus {
    /// `true` for `completed` and `error`; no poll follows a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => STATUS_PENDING,
            Self::Completed => STATUS_COMPLETED,
            Self::Error => STATUS_ERROR,
            Self::Other(label) => label,
        }
    }
}

impl From<String> for JobStatus {
    fn from(label: String) -> Self {
        match label.as_str() {
            STATUS_PENDING => Self::Pending,
            STATUS_COMPLETED => Self::Completed,
            STATUS_ERROR => Self::Error,
            _ => Self::Other(label),
        }
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response body of `POST /generate-problem/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateJobResponse {
    #[serde(default)]
    pub request_id: Option<String>,
}

impl CreateJobResponse {
    /// The job identifier, or `None` when the server omitted it (or sent
    /// a blank one).
    pub fn into_job_id(self) -> Option<JobId> {
        self.request_id.and_then(|id| JobId::new(id).ok())
    }
}

/// Response body of `GET /status/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    pub status: JobStatus,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Terminal result of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed { filename: String },
    Failed { message: String },
}

impl StatusResponse {
    /// Interpret the response. Returns `None` while the job is still
    /// running.
    pub fn outcome(&self) -> Option<JobOutcome> {
        match self.status {
            JobStatus::Completed => Some(match self.filename.as_deref() {
                Some(name) if !name.trim().is_empty() => JobOutcome::Completed {
                    filename: name.to_string(),
                },
                _ => JobOutcome::Failed {
                    message: MSG_MISSING_FILENAME.to_string(),
                },
            }),
            JobStatus::Error => Some(JobOutcome::Failed {
                message: self
                    .error
                    .clone()
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| MSG_JOB_FAILED_FALLBACK.to_string()),
            }),
            JobStatus::Pending | JobStatus::Other(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
