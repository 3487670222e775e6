//! Text Normalization
//!
//! Derives the comparison forms of a transcript before command matching.

use serde::Serialize;

/// Punctuation a recognizer tends to append to an utterance
const TRAILING_PUNCTUATION: &[char] = &['!', '?', '.', ',', ';', ':'];

/// Comparison forms of one transcript
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct NormalizedTranscript {
    /// Trimmed input, original casing
    pub text: String,
    /// `text` lower-cased
    pub lowered: String,
    /// `lowered` with whitespace runs collapsed to single spaces
    pub compact: String,
    /// `compact` without trailing punctuation
    pub stripped: String,
}

/// Normalize a raw transcript
pub fn normalize_transcript(raw: &str) -> NormalizedTranscript {
    let text = raw.trim().to_string();
    let lowered = text.to_lowercase();
    let compact = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    let stripped = compact
        .trim_end_matches(TRAILING_PUNCTUATION)
        .trim()
        .to_string();

    NormalizedTranscript {
        text,
        lowered,
        compact,
        stripped,
    }
}
