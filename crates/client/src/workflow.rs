//! One conversion request from submission to downloaded document.
//!
//! [`ConversionWorkflow`] owns the [`WorkflowState`] of the current
//! submission, runs the submitter and the poller, keeps a
//! [`ProgressReporter`] ticking alongside, and retrieves the artifact
//! once the job completes. Cancelling its token (or dropping it) stops
//! both the poller and the ticker.

use std::sync::Arc;

use hwpgen_core::payload::SubmissionPayload;
use hwpgen_core::progress::{ProgressConfig, ProgressSnapshot};
use hwpgen_core::workflow::{FailureStage, WorkflowState};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::download::{deliver, ArtifactSink, Delivered};
use crate::error::WorkflowError;
use crate::poller::{poll_until_terminal, PollPolicy};
use crate::progress::ProgressReporter;
use crate::service::JobService;
use crate::submitter::submit_job;

pub struct ConversionWorkflow {
    service: Arc<dyn JobService>,
    poll_policy: PollPolicy,
    progress_config: ProgressConfig,
    state: WorkflowState,
    state_tx: watch::Sender<WorkflowState>,
    progress_tx: Arc<watch::Sender<ProgressSnapshot>>,
    cancel: CancellationToken,
}

impl ConversionWorkflow {
    pub fn new(service: Arc<dyn JobService>) -> Self {
        Self::with_policies(service, PollPolicy::default(), ProgressConfig::default())
    }

    pub fn with_policies(
        service: Arc<dyn JobService>,
        poll_policy: PollPolicy,
        progress_config: ProgressConfig,
    ) -> Self {
        let (state_tx, _) = watch::channel(WorkflowState::Idle);
        let (progress_tx, _) = watch::channel(ProgressSnapshot::initial());
        Self {
            service,
            poll_policy,
            progress_config,
            state: WorkflowState::Idle,
            state_tx,
            progress_tx: Arc::new(progress_tx),
            cancel: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// Follow state transitions while [`run`](Self::run) holds the
    /// workflow mutably.
    pub fn watch_state(&self) -> watch::Receiver<WorkflowState> {
        self.state_tx.subscribe()
    }

    /// Follow the progress bar of the current (and any later) submission.
    pub fn watch_progress(&self) -> watch::Receiver<ProgressSnapshot> {
        self.progress_tx.subscribe()
    }

    /// Token that tears the workflow down; clone it into whatever
    /// decides the user has gone away.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Submit `payload` and poll until the job finishes. Returns the
    /// result filename.
    ///
    /// Refused with [`WorkflowError::Busy`] while another job is in
    /// flight. Every failure is recorded in the state with its
    /// user-facing message; the progress bar completes on success,
    /// freezes on failure and simply stops on cancellation.
    pub async fn run(&mut self, payload: &SubmissionPayload) -> Result<String, WorkflowError> {
        if self.cancel.is_cancelled() {
            return Err(WorkflowError::Cancelled);
        }
        if self.state.begin_submission().is_err() {
            return Err(WorkflowError::Busy);
        }
        self.publish_state();

        let reporter = ProgressReporter::spawn_with(
            self.progress_config,
            &self.cancel,
            Arc::clone(&self.progress_tx),
        );

        let submitted = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(WorkflowError::Cancelled),
            result = submit_job(self.service.as_ref(), payload) => result,
        };
        let job_id = match submitted {
            Ok(job_id) => job_id,
            Err(e) => return Err(self.abort(&reporter, FailureStage::Submission, e)),
        };

        self.state.submitted(job_id.clone())?;
        self.publish_state();

        match poll_until_terminal(self.service.as_ref(), &job_id, &self.poll_policy, &self.cancel)
            .await
        {
            Ok(filename) => {
                reporter.complete();
                self.state.complete(filename.clone())?;
                self.publish_state();
                Ok(filename)
            }
            Err(e) => {
                let stage = match e {
                    WorkflowError::Job { .. } => FailureStage::Job,
                    _ => FailureStage::Polling,
                };
                Err(self.abort(&reporter, stage, e))
            }
        }
    }

    /// Deliver the result of the completed job. Can be called any number
    /// of times; it never creates a new job.
    pub async fn retrieve(&self, sink: &ArtifactSink) -> Result<Delivered, WorkflowError> {
        let filename = self.state.filename().ok_or(WorkflowError::NotCompleted)?;
        deliver(self.service.as_ref(), filename, sink)
            .await
            .inspect_err(|e| tracing::error!(filename, error = %e, "Result retrieval failed"))
    }

    /// Tear the workflow down: stops the poller and the progress ticker
    /// and forgets the current job.
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        if !self.state.is_terminal() {
            self.state.reset();
            self.publish_state();
        }
    }

    /// Forget a stale in-flight state left behind when a `run` future
    /// was dropped before finishing.
    pub fn reset(&mut self) {
        self.state.reset();
        self.publish_state();
    }

    // ---- private helpers ----

    fn abort(
        &mut self,
        reporter: &ProgressReporter,
        stage: FailureStage,
        error: WorkflowError,
    ) -> WorkflowError {
        if matches!(error, WorkflowError::Cancelled) {
            reporter.stop();
            self.state.reset();
        } else {
            reporter.fail();
            let message = error.user_message();
            if let Err(e) = self.state.fail(stage, message) {
                tracing::error!(error = %e, "Failed to record workflow failure");
            }
            tracing::warn!(stage = %stage, error = %error, "Conversion failed");
        }
        self.publish_state();
        error
    }

    fn publish_state(&self) {
        tracing::info!(state = self.state.label(), job_id = ?self.state.job_id().map(|id| id.as_str()), "Workflow transition");
        self.state_tx.send_replace(self.state.clone());
    }
}

impl Drop for ConversionWorkflow {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
