//! HTTP clients and the asynchronous job workflow.
//!
//! Talks to the document-generation service (job creation, status,
//! download, templates) and to the OCR service, and drives one
//! submission through submit -> poll -> retrieve with a cosmetic
//! progress ticker running alongside.

pub mod api;
pub mod config;
pub mod download;
pub mod error;
pub mod ocr;
pub mod poller;
pub mod progress;
pub mod service;
pub mod submitter;
pub mod workflow;
