//! SpeechFlow Error Types
//!
//! Centralized error handling for the voice pipeline.

use crate::state::VoiceState;
use thiserror::Error;

/// Failure persisting settings or reading console input
#[derive(Error, Debug)]
pub enum VoiceError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid voice settings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for SpeechFlow I/O operations
pub type VoiceResult<T> = Result<T, VoiceError>;

/// A rejected state machine move.
///
/// These are integration bugs, not user-facing failures, and are never
/// swallowed by the state machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Unknown voice state: {0}")]
    UnknownState(String),

    #[error("Invalid voice state transition: {from} -> {to}")]
    Invalid { from: VoiceState, to: VoiceState },
}

/// Failure reported synchronously by a platform recognition session.
///
/// `code` uses the platform's raw error identifier so it can be fed through
/// the error normalizer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct SessionError {
    pub code: String,
    pub message: String,
}

impl SessionError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}
