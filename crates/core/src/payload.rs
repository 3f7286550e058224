//! Request bodies for `POST /generate-problem/`.
//!
//! Two callers build different shapes: the OCR flow sends free text with
//! optional structural hints, the template flow sends a document name
//! plus numbered question strings. The workflow itself treats the
//! payload as opaque and only serializes it.

use serde::Serialize;

use crate::error::CoreError;

/// One numbered problem slot of an HWP template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub number: u32,
    pub content: String,
}

/// Body of a job-creation request.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SubmissionPayload {
    /// Free text extracted by OCR (and possibly edited by the user).
    Content {
        content: String,
        equation: Option<serde_json::Value>,
        position: Option<serde_json::Value>,
    },
    /// Template-based generation.
    Template {
        document_name: String,
        questions: Vec<Question>,
    },
}

impl SubmissionPayload {
    /// Free-text payload without structural hints.
    pub fn content(content: impl Into<String>) -> Self {
        Self::Content {
            content: content.into(),
            equation: None,
            position: None,
        }
    }

    pub fn template(document_name: impl Into<String>, questions: Vec<Question>) -> Self {
        Self::Template {
            document_name: document_name.into(),
            questions,
        }
    }

    /// Reject payloads the service cannot do anything with.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::Content { content, .. } => {
                if content.trim().is_empty() {
                    return Err(CoreError::Validation(
                        "Problem text must not be empty".to_string(),
                    ));
                }
            }
            Self::Template {
                document_name,
                questions,
            } => {
                if document_name.trim().is_empty() {
                    return Err(CoreError::Validation(
                        "Template name must not be empty".to_string(),
                    ));
                }
                if questions.is_empty() {
                    return Err(CoreError::Validation(
                        "Template has no question slots".to_string(),
                    ));
                }
                let empty: Vec<String> = questions
                    .iter()
                    .filter(|q| q.content.trim().is_empty())
                    .map(|q| q.number.to_string())
                    .collect();
                if !empty.is_empty() {
                    return Err(CoreError::Validation(format!(
                        "Questions without content: {}",
                        empty.join(", ")
                    )));
                }
            }
        }
        Ok(())
    }
}
