//! Shared fixtures for client integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use hwpgen_client::error::ApiError;
use hwpgen_client::service::JobService;
use hwpgen_core::job::{CreateJobResponse, JobId, JobStatus, StatusResponse};
use hwpgen_core::payload::SubmissionPayload;

/// A [`JobService`] that replays scripted responses and counts calls.
///
/// Once the status script runs out every further check reports
/// `pending`; once the fetch script runs out every download succeeds.
pub struct ScriptedService {
    create: Mutex<Option<Result<CreateJobResponse, ApiError>>>,
    statuses: Mutex<VecDeque<Result<StatusResponse, ApiError>>>,
    fetches: Mutex<VecDeque<Result<Vec<u8>, ApiError>>>,
    artifact: Vec<u8>,
    pub create_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
    pub last_payload: Mutex<Option<serde_json::Value>>,
}

impl ScriptedService {
    pub fn new(
        create: Result<CreateJobResponse, ApiError>,
        statuses: Vec<Result<StatusResponse, ApiError>>,
    ) -> Self {
        Self {
            create: Mutex::new(Some(create)),
            statuses: Mutex::new(statuses.into()),
            fetches: Mutex::new(VecDeque::new()),
            artifact: b"HWP Document File".to_vec(),
            create_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            last_payload: Mutex::new(None),
        }
    }

    /// Script the next artifact downloads.
    pub fn with_fetches(self, fetches: Vec<Result<Vec<u8>, ApiError>>) -> Self {
        *self.fetches.lock().unwrap() = fetches.into();
        self
    }

    pub fn creates(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn polls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobService for ScriptedService {
    async fn create_job(&self, payload: &SubmissionPayload) -> Result<CreateJobResponse, ApiError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_payload.lock().unwrap() = Some(serde_json::to_value(payload).unwrap());
        self.create
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(unavailable("create already consumed")))
    }

    async fn job_status(&self, _job_id: &JobId) -> Result<StatusResponse, ApiError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(pending()))
    }

    async fn fetch_artifact(&self, _filename: &str) -> Result<Vec<u8>, ApiError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.fetches
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(self.artifact.clone()))
    }

    fn artifact_url(&self, filename: &str) -> Result<String, ApiError> {
        Ok(format!("http://generator.test/download/{filename}"))
    }
}

pub fn created(id: &str) -> Result<CreateJobResponse, ApiError> {
    Ok(CreateJobResponse {
        request_id: Some(id.to_string()),
    })
}

pub fn no_id() -> Result<CreateJobResponse, ApiError> {
    Ok(CreateJobResponse { request_id: None })
}

pub fn pending() -> StatusResponse {
    StatusResponse {
        status: JobStatus::Pending,
        filename: None,
        error: None,
    }
}

pub fn completed(filename: &str) -> StatusResponse {
    StatusResponse {
        status: JobStatus::Completed,
        filename: Some(filename.to_string()),
        error: None,
    }
}

pub fn failed(message: Option<&str>) -> StatusResponse {
    StatusResponse {
        status: JobStatus::Error,
        filename: None,
        error: message.map(str::to_string),
    }
}

pub fn unavailable(body: &str) -> ApiError {
    ApiError::Status {
        status: 503,
        body: body.to_string(),
    }
}

pub fn job_id(raw: &str) -> JobId {
    JobId::new(raw).unwrap()
}
