//! Domain logic for the HWP problem generator.
//!
//! Everything in this crate is free of I/O: job and status types,
//! submission payloads, the per-submission workflow state machine, the
//! cosmetic progress model, OCR text normalization and the typed
//! hand-off between the recognition and generation steps.

pub mod error;
pub mod file_size;
pub mod job;
pub mod notation;
pub mod payload;
pub mod progress;
pub mod session;
pub mod template;
pub mod workflow;
