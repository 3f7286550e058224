//! HWP template uploads and numbered question slots.

use serde::Deserialize;

use crate::error::CoreError;
use crate::payload::Question;

/// Only HWP documents are accepted as templates.
pub const TEMPLATE_EXTENSION: &str = ".hwp";

/// Shown when the user picks a file that is not an HWP document.
pub const MSG_HWP_ONLY: &str = "HWP 파일만 업로드 가능합니다.";

/// Shown when a template submission still has blank questions.
pub const MSG_FILL_ALL_QUESTIONS: &str = "모든 문제를 입력해주세요";

/// Response body of `GET /templates/{name}/questions`.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionNumbersResponse {
    pub question_numbers: Vec<u32>,
}

/// Response body of `POST /templates/upload/`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub message: String,
}

pub fn validate_template_filename(name: &str) -> Result<(), CoreError> {
    if name.ends_with(TEMPLATE_EXTENSION) {
        Ok(())
    } else {
        Err(CoreError::Validation(MSG_HWP_ONLY.to_string()))
    }
}

/// One empty slot per question number the template offers.
pub fn slots_from_numbers(numbers: &[u32]) -> Vec<Question> {
    numbers
        .iter()
        .map(|&number| Question {
            number,
            content: String::new(),
        })
        .collect()
}

/// Fill the slot with the given question number.
pub fn fill_slot(slots: &mut [Question], number: u32, content: impl Into<String>) -> Result<(), CoreError> {
    let slot = slots
        .iter_mut()
        .find(|q| q.number == number)
        .ok_or_else(|| {
            CoreError::Validation(format!("Template has no question number {number}"))
        })?;
    slot.content = content.into();
    Ok(())
}

/// Numbers of slots that are still blank.
pub fn empty_slots(slots: &[Question]) -> Vec<u32> {
    slots
        .iter()
        .filter(|q| q.content.trim().is_empty())
        .map(|q| q.number)
        .collect()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn only_hwp_files_accepted() {
        assert!(validate_template_filename("중간고사.hwp").is_ok());
        assert_matches!(
            validate_template_filename("notes.docx"),
            Err(CoreError::Validation(msg)) if msg == MSG_HWP_ONLY
        );
        assert!(validate_template_filename("archive.hwpx").is_err());
    }

    #[test]
    fn slots_start_empty() {
        let slots = slots_from_numbers(&[1, 2, 5]);
        assert_eq!(slots.len(), 3);
        assert_eq!(empty_slots(&slots), vec![1, 2, 5]);
    }

    #[test]
    fn fill_by_number() {
        let mut slots = slots_from_numbers(&[1, 2]);
        fill_slot(&mut slots, 2, "x+1=3").unwrap();
        assert_eq!(slots[1].content, "x+1=3");
        assert_eq!(empty_slots(&slots), vec![1]);
    }

    #[test]
    fn fill_unknown_number_fails() {
        let mut slots = slots_from_numbers(&[1]);
        assert!(fill_slot(&mut slots, 7, "x").is_err());
    }

    #[test]
    fn question_numbers_parse() {
        let resp: QuestionNumbersResponse =
            serde_json::from_str(r#"{"question_numbers": [1, 2, 3]}"#).unwrap();
        assert_eq!(resp.question_numbers, vec![1, 2, 3]);
    }
}
