//! Core processing modules
//!
//! Transcript normalization, classification and gating. Everything here is
//! pure and synchronous.

pub mod gate;
pub mod parser;
pub mod text_normalizer;

pub use gate::TranscriptGate;
pub use parser::{parse, InputMode, ParsedKind, ParsedVoiceInput};
pub use text_normalizer::{normalize_transcript, NormalizedTranscript};
