//! Typed hand-off between the upload, recognition and generation steps.
//!
//! Each step receives what the previous one produced as a value instead
//! of reading ambient storage by key.

use std::io::Cursor;
use std::path::Path;

use base64::Engine;

use crate::error::CoreError;
use crate::file_size::format_file_size;
use crate::notation::RecognizedText;
use crate::payload::SubmissionPayload;

/// Image extensions accepted for recognition.
pub const ACCEPTED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// An image the user picked, with the summary shown on the preview step.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub name: String,
    pub bytes: Vec<u8>,
    pub size_label: String,
    pub dimensions: (u32, u32),
}

impl UploadedImage {
    /// Validate the extension and read the dimensions from the image
    /// header without decoding pixel data.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, CoreError> {
        let name = name.into();
        let extension = Path::new(&name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if !ACCEPTED_IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            return Err(CoreError::InvalidImage(format!(
                "'{name}' is not a supported image. Accepted: {}",
                ACCEPTED_IMAGE_EXTENSIONS.join(", ")
            )));
        }

        let dimensions = image::ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()
            .map_err(|e| CoreError::InvalidImage(format!("Failed to read '{name}': {e}")))?
            .into_dimensions()
            .map_err(|e| CoreError::InvalidImage(format!("Failed to read '{name}': {e}")))?;

        let size_label = format_file_size(bytes.len() as u64);
        Ok(Self {
            name,
            bytes,
            size_label,
            dimensions,
        })
    }

    pub fn dimensions_label(&self) -> String {
        format!("{}x{}", self.dimensions.0, self.dimensions.1)
    }

    /// Data URL the recognizer expects. The media type is always JPEG,
    /// which is what the service is fed regardless of the source format.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:image/jpeg;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// Output of the recognition step, editable before submission.
#[derive(Debug, Clone)]
pub struct ConversionDraft {
    pub image_name: String,
    pub recognized: RecognizedText,
}

impl ConversionDraft {
    pub fn new(image_name: impl Into<String>, recognized: RecognizedText) -> Self {
        Self {
            image_name: image_name.into(),
            recognized,
        }
    }

    /// Replace the recognized text with the user's edit; the formula
    /// count is recomputed.
    pub fn with_text(mut self, text: &str) -> Self {
        self.recognized = RecognizedText::from_text(text);
        self
    }

    pub fn text(&self) -> &str {
        &self.recognized.text
    }

    pub fn formula_count(&self) -> usize {
        self.recognized.formula_count
    }

    pub fn into_payload(self) -> SubmissionPayload {
        SubmissionPayload::content(self.recognized.text)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::new(width, height);
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn reads_dimensions_and_size() {
        let bytes = png_bytes(4, 3);
        let len = bytes.len() as u64;
        let image = UploadedImage::from_bytes("problem.PNG", bytes).unwrap();
        assert_eq!(image.dimensions, (4, 3));
        assert_eq!(image.dimensions_label(), "4x3");
        assert_eq!(image.size_label, format_file_size(len));
    }

    #[test]
    fn rejects_other_extensions() {
        assert_matches!(
            UploadedImage::from_bytes("problem.gif", png_bytes(1, 1)),
            Err(CoreError::InvalidImage(_))
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_matches!(
            UploadedImage::from_bytes("problem.jpg", b"not an image".to_vec()),
            Err(CoreError::InvalidImage(_))
        );
    }

    #[test]
    fn data_url_prefix() {
        let image = UploadedImage::from_bytes("a.png", png_bytes(1, 1)).unwrap();
        let url = image.to_data_url();
        assert!(url.starts_with("data:image/jpeg;base64,iVBORw0KGgo"));
    }

    #[test]
    fn edited_draft_recounts_formulas() {
        let draft = ConversionDraft::new("a.png", RecognizedText::placeholder())
            .with_text(r"\(x\) + @y@");
        assert_eq!(draft.text(), "@x@ + @y@");
        assert_eq!(draft.formula_count(), 2);
        assert_matches!(draft.into_payload(), SubmissionPayload::Content { content, .. } if content == "@x@ + @y@");
    }
}
