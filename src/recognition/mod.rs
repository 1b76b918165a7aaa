//! Interface to the external text recognizer.
//!
//! The detector hands one single-channel 8-bit raster per chain to a
//! [`TextRecognizer`] and keeps the reply only when it is a number with one
//! digit per chain member.

use crate::core::errors::OcrResult;
use image::GrayImage;
use serde::{Deserialize, Serialize};

/// A recognition engine reading a single word from a prepared raster.
///
/// Implementations are shared across threads during batch detection.
pub trait TextRecognizer: Send + Sync {
    /// Reads the text in `patch`. Background is black and glyphs are white.
    fn recognize(&self, patch: &GrayImage) -> OcrResult<String>;

    /// Engine setup this recognizer expects; adapters apply it when they start.
    fn settings(&self) -> RecognizerSettings {
        RecognizerSettings::default()
    }
}

impl<F> TextRecognizer for F
where
    F: Fn(&GrayImage) -> OcrResult<String> + Send + Sync,
{
    fn recognize(&self, patch: &GrayImage) -> OcrResult<String> {
        self(patch)
    }
}

/// Page segmentation mode requested from the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageMode {
    /// The raster holds exactly one word.
    SingleWord,
    /// The raster holds one line of text.
    SingleLine,
}

/// Language-model dictionaries an engine may consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dictionary {
    System,
    Frequency,
    Punctuation,
    Number,
    Unambiguous,
    Bigram,
    FixedLength,
}

impl Dictionary {
    pub const ALL: [Dictionary; 7] = [
        Dictionary::System,
        Dictionary::Frequency,
        Dictionary::Punctuation,
        Dictionary::Number,
        Dictionary::Unambiguous,
        Dictionary::Bigram,
        Dictionary::FixedLength,
    ];
}

/// Engine setup for reading bib numbers.
///
/// Dictionaries bias engines towards words, which hurts digit strings, so all of
/// them are disabled by default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizerSettings {
    pub language: String,
    pub page_mode: PageMode,
    pub disabled_dictionaries: Vec<Dictionary>,
    /// Restrict output to these characters, if the engine supports it.
    pub char_whitelist: Option<String>,
}

impl Default for RecognizerSettings {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            page_mode: PageMode::SingleWord,
            disabled_dictionaries: Dictionary::ALL.to_vec(),
            char_whitelist: None,
        }
    }
}

impl RecognizerSettings {
    /// Default settings restricted to the ten ASCII digits.
    pub fn digits_only() -> Self {
        Self {
            char_whitelist: Some("0123456789".to_string()),
            ..Self::default()
        }
    }

    /// Returns true when `dictionary` is switched off.
    pub fn is_disabled(&self, dictionary: Dictionary) -> bool {
        self.disabled_dictionaries.contains(&dictionary)
    }
}

/// Recognizer returning the same reply for every raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedRecognizer {
    reply: String,
}

impl FixedRecognizer {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

impl TextRecognizer for FixedRecognizer {
    fn recognize(&self, _patch: &GrayImage) -> OcrResult<String> {
        Ok(self.reply.clone())
    }
}

/// Reason a recognizer reply was not accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadingRejection {
    Empty,
    LengthMismatch { expected: usize, actual: usize },
    NotNumeric,
}

/// Validates a reply for a chain of `expected_len` components.
///
/// The trimmed reply must be non-empty, have one character per component and
/// consist of ASCII digits only.
pub fn accept_reading(raw: &str, expected_len: usize) -> Result<String, ReadingRejection> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(ReadingRejection::Empty);
    }
    let actual = text.chars().count();
    if actual != expected_len {
        return Err(ReadingRejection::LengthMismatch {
            expected: expected_len,
            actual,
        });
    }
    if !text.chars().all(|c| c.is_ascii_digit()) {
        return Err(ReadingRejection::NotNumeric);
    }
    Ok(text.to_string())
}
