//! Per-submission workflow state machine.
//!
//! ```text
//! idle -> submitting -> polling -> completed
//!              |            |
//!              +-> failed <-+
//! ```
//!
//! A terminal state is only left by starting a fresh submission.

use std::fmt;

use crate::error::CoreError;
use crate::job::JobId;

/// Where in the workflow a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Submission,
    Polling,
    Job,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Submission => "submission",
            Self::Polling => "polling",
            Self::Job => "job",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WorkflowState {
    #[default]
    Idle,
    Submitting,
    Polling {
        job_id: JobId,
    },
    Completed {
        job_id: JobId,
        filename: String,
    },
    Failed {
        stage: FailureStage,
        message: String,
    },
}

impl WorkflowState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Submitting => "submitting",
            Self::Polling { .. } => "polling",
            Self::Completed { .. } => "completed",
            Self::Failed { .. } => "failed",
        }
    }

    /// A job is being created or polled; resubmission is refused.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Submitting | Self::Polling { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Failed { .. })
    }

    pub fn job_id(&self) -> Option<&JobId> {
        match self {
            Self::Polling { job_id } | Self::Completed { job_id, .. } => Some(job_id),
            _ => None,
        }
    }

    /// Result file of a completed job.
    pub fn filename(&self) -> Option<&str> {
        match self {
            Self::Completed { filename, .. } => Some(filename),
            _ => None,
        }
    }

    /// Start a new submission. Legal from `idle` or any terminal state.
    pub fn begin_submission(&mut self) -> Result<(), CoreError> {
        if self.is_in_flight() {
            return Err(self.reject("begin a submission"));
        }
        *self = Self::Submitting;
        Ok(())
    }

    /// The creation request returned an identifier.
    pub fn submitted(&mut self, job_id: JobId) -> Result<(), CoreError> {
        match self {
            Self::Submitting => {
                *self = Self::Polling { job_id };
                Ok(())
            }
            _ => Err(self.reject("start polling")),
        }
    }

    /// The poller observed `completed` with a filename.
    pub fn complete(&mut self, filename: String) -> Result<(), CoreError> {
        match std::mem::take(self) {
            Self::Polling { job_id } => {
                *self = Self::Completed { job_id, filename };
                Ok(())
            }
            other => {
                *self = other;
                Err(self.reject("complete"))
            }
        }
    }

    /// Record a failure. Legal only while in flight; a completed job
    /// stays completed even if fetching its artifact fails.
    pub fn fail(&mut self, stage: FailureStage, message: impl Into<String>) -> Result<(), CoreError> {
        let allowed = match (&*self, stage) {
            (Self::Submitting, FailureStage::Submission) => true,
            (Self::Polling { .. }, FailureStage::Polling | FailureStage::Job) => true,
            _ => false,
        };
        if !allowed {
            return Err(self.reject("record a failure"));
        }
        *self = Self::Failed {
            stage,
            message: message.into(),
        };
        Ok(())
    }

    /// Forget the current job (teardown or cancellation).
    pub fn reset(&mut self) {
        *self = Self::Idle;
    }

    fn reject(&self, action: &'static str) -> CoreError {
        CoreError::InvalidTransition {
            from: self.label(),
            action,
        }
    }
}
