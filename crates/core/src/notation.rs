//! Normalization of OCR output before it reaches the generator.
//!
//! The recognizer returns text segments with inline formulas wrapped in
//! `\(` ... `\)`. Both delimiters are remapped to the `@` sentinel, so a
//! formula reads `@...@` everywhere downstream.

use std::sync::LazyLock;

use regex::Regex;

/// Sentinel wrapped around inline formulas.
pub const FORMULA_SENTINEL: char = '@';

/// Opening inline-formula delimiter emitted by the recognizer.
pub const OCR_FORMULA_OPEN: &str = r"\(";
/// Closing inline-formula delimiter emitted by the recognizer.
pub const OCR_FORMULA_CLOSE: &str = r"\)";

/// Text shown when recognition produced nothing usable.
pub const RECOGNITION_PLACEHOLDER: &str = "텍스트 추출 실패";

static FORMULA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@[^@]*@").expect("valid regex"));

/// Join recognizer segments into one block of text.
pub fn join_segments<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Replace both inline-formula delimiters with the sentinel.
pub fn normalize_formulas(text: &str) -> String {
    let sentinel = FORMULA_SENTINEL.to_string();
    text.replace(OCR_FORMULA_OPEN, &sentinel)
        .replace(OCR_FORMULA_CLOSE, &sentinel)
}

/// Count sentinel-wrapped formulas (non-overlapping, left to right).
pub fn count_formulas(text: &str) -> usize {
    FORMULA_RE.find_iter(text).count()
}

/// Normalized OCR text plus the number of formulas found in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizedText {
    pub text: String,
    pub formula_count: usize,
}

impl RecognizedText {
    pub fn from_segments<S: AsRef<str>>(segments: &[S]) -> Self {
        Self::from_text(&join_segments(segments))
    }

    pub fn from_text(raw: &str) -> Self {
        let text = normalize_formulas(raw);
        let formula_count = count_formulas(&text);
        Self {
            text,
            formula_count,
        }
    }

    /// Stand-in used when recognition failed; the user can still type
    /// the problem in by hand.
    pub fn placeholder() -> Self {
        Self {
            text: RECOGNITION_PLACEHOLDER.to_string(),
            formula_count: 0,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.text == RECOGNITION_PLACEHOLDER
    }
}
