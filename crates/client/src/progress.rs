//! Timer-driven progress reporter.
//!
//! Runs a [`ProgressModel`] on a `tokio::time::interval` and publishes
//! every change on a [`watch`] channel. The ticker is independent of
//! the poller; the workflow reconciles the two by calling
//! [`ProgressReporter::complete`] or [`ProgressReporter::fail`] when a
//! terminal status is observed.

use std::sync::{Arc, Mutex};

use hwpgen_core::progress::{ProgressConfig, ProgressModel, ProgressSnapshot};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

pub struct ProgressReporter {
    model: Arc<Mutex<ProgressModel>>,
    tx: Arc<watch::Sender<ProgressSnapshot>>,
    /// Child of the workflow token; stops the ticker task.
    cancel: CancellationToken,
}

impl ProgressReporter {
    /// Start ticking. The first increment happens one interval after
    /// the call, not immediately.
    pub fn spawn(config: ProgressConfig, parent: &CancellationToken) -> Self {
        let (tx, _rx) = watch::channel(ProgressSnapshot::initial());
        Self::spawn_with(config, parent, Arc::new(tx))
    }

    /// Start ticking into an existing channel, so subscribers that
    /// outlive one submission keep receiving updates. The channel is
    /// reset to 0 first.
    pub fn spawn_with(
        config: ProgressConfig,
        parent: &CancellationToken,
        tx: Arc<watch::Sender<ProgressSnapshot>>,
    ) -> Self {
        let model = Arc::new(Mutex::new(ProgressModel::new(config)));
        tx.send_replace(ProgressSnapshot::initial());
        let cancel = parent.child_token();

        let task_model = Arc::clone(&model);
        let task_tx = Arc::clone(&tx);
        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            run_ticker(config, task_model, task_tx, task_cancel).await;
        });

        Self { model, tx, cancel }
    }

    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        lock(&self.model).snapshot()
    }

    /// Stop the ticker and snap to 100.
    pub fn complete(&self) {
        self.cancel.cancel();
        let mut model = lock(&self.model);
        model.complete();
        self.tx.send_replace(model.snapshot());
    }

    /// Stop the ticker, keep the value and raise the error indicator.
    pub fn fail(&self) {
        self.cancel.cancel();
        let mut model = lock(&self.model);
        model.fail();
        self.tx.send_replace(model.snapshot());
    }

    /// Stop the ticker without publishing anything (teardown).
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_ticker(
    config: ProgressConfig,
    model: Arc<Mutex<ProgressModel>>,
    tx: Arc<watch::Sender<ProgressSnapshot>>,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(config.interval);
    // The first tick of a tokio interval completes immediately.
    interval.tick().await;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                // Publish under the lock so a concurrent complete()/fail()
                // cannot be overwritten by a stale running snapshot.
                let mut model = lock(&model);
                if model.snapshot().is_terminal() {
                    break;
                }
                if model.tick() {
                    tx.send_replace(model.snapshot());
                }
            }
        }
    }
    tracing::trace!("Progress ticker stopped");
}

/// The model has no invariants a panicking holder could break halfway,
/// so a poisoned lock is still usable.
fn lock(model: &Mutex<ProgressModel>) -> std::sync::MutexGuard<'_, ProgressModel> {
    model.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
