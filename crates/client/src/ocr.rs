//! Client for the upstream OCR service.
//!
//! Recognition failures never abort a conversion: [`OcrApi::recognize`]
//! logs the error and returns the placeholder text so the user can type
//! the problem in by hand.

use std::time::Instant;

use hwpgen_core::notation::RecognizedText;
use hwpgen_core::session::UploadedImage;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;

/// Header carrying the OCR service token.
pub const OCR_TOKEN_HEADER: &str = "X-Qanda-AIDT-Token";

#[derive(Debug, Serialize)]
struct OcrRequest<'a> {
    image: &'a str,
}

#[derive(Debug, Deserialize)]
struct OcrResponse {
    #[serde(default)]
    texts: Option<Vec<String>>,
}

/// HTTP client for the OCR endpoint.
#[derive(Debug, Clone)]
pub struct OcrApi {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl OcrApi {
    /// * `endpoint` - full recognition URL.
    /// * `token`    - value of the [`OCR_TOKEN_HEADER`] header, if the
    ///   service requires one.
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            token,
        }
    }

    /// Recognize the image, degrading any failure to the placeholder.
    pub async fn recognize(&self, image: &UploadedImage) -> RecognizedText {
        let started = Instant::now();
        match self.try_recognize(image).await {
            Ok(recognized) => {
                tracing::info!(
                    image = %image.name,
                    formulas = recognized.formula_count,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "OCR finished",
                );
                recognized
            }
            Err(e) => {
                tracing::warn!(image = %image.name, error = %e, "OCR failed, using placeholder text");
                RecognizedText::placeholder()
            }
        }
    }

    /// Recognize the image, surfacing the failure to the caller.
    pub async fn try_recognize(&self, image: &UploadedImage) -> Result<RecognizedText, OcrError> {
        let data_url = image.to_data_url();
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&OcrRequest { image: &data_url });
        if let Some(token) = &self.token {
            request = request.header(OCR_TOKEN_HEADER, token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(OcrError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: OcrResponse = response.json().await?;
        let segments = body.texts.ok_or(OcrError::NoText)?;
        Ok(RecognizedText::from_segments(&segments))
    }
}
