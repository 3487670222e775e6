//! Recognition error normalization
//!
//! Maps raw platform error identifiers onto a small semantic taxonomy that
//! tells the controller whether to keep trying.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    PermissionDenied,
    ServiceBlocked,
    AudioCaptureUnavailable,
    NetworkError,
    NoSpeechDetected,
    RecognitionAborted,
    UnknownError,
    NotSupported,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::PermissionDenied => "permission_denied",
            ErrorCode::ServiceBlocked => "service_blocked",
            ErrorCode::AudioCaptureUnavailable => "audio_capture_unavailable",
            ErrorCode::NetworkError => "network_error",
            ErrorCode::NoSpeechDetected => "no_speech_detected",
            ErrorCode::RecognitionAborted => "recognition_aborted",
            ErrorCode::UnknownError => "unknown_error",
            ErrorCode::NotSupported => "not_supported",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized recognition failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDescriptor {
    pub raw_code: String,
    pub code: ErrorCode,
    pub message: String,
    pub recoverable: bool,
    pub restart: bool,
    /// RFC 3339, UTC, millisecond precision
    pub timestamp: String,
}

impl ErrorDescriptor {
    /// Raised locally when no recognition capability exists
    pub fn not_supported() -> Self {
        Self {
            raw_code: "not_supported".to_string(),
            code: ErrorCode::NotSupported,
            message: "Speech recognition is not supported on this platform.".to_string(),
            recoverable: false,
            restart: false,
            timestamp: now(),
        }
    }

    /// True when the controller should schedule a restart
    pub fn should_restart(&self) -> bool {
        self.recoverable && self.restart
    }
}

struct KnownError {
    raw: &'static str,
    code: ErrorCode,
    message: &'static str,
    recoverable: bool,
    restart: bool,
}

const KNOWN_ERRORS: &[KnownError] = &[
    KnownError {
        raw: "not-allowed",
        code: ErrorCode::PermissionDenied,
        message: "Microphone access is blocked. Enable microphone permissions and retry.",
        recoverable: false,
        restart: false,
    },
    KnownError {
        raw: "service-not-allowed",
        code: ErrorCode::ServiceBlocked,
        message: "Speech recognition service is not allowed in this session.",
        recoverable: false,
        restart: false,
    },
    KnownError {
        raw: "audio-capture",
        code: ErrorCode::AudioCaptureUnavailable,
        message: "No microphone was detected. Check your audio input device.",
        recoverable: true,
        restart: true,
    },
    KnownError {
        raw: "network",
        code: ErrorCode::NetworkError,
        message: "Speech recognition network error. Retrying automatically.",
        recoverable: true,
        restart: true,
    },
    KnownError {
        raw: "no-speech",
        code: ErrorCode::NoSpeechDetected,
        message: "No speech detected. Continue speaking to keep listening active.",
        recoverable: true,
        restart: true,
    },
    KnownError {
        raw: "aborted",
        code: ErrorCode::RecognitionAborted,
        message: "Speech recognition was stopped.",
        recoverable: true,
        restart: true,
    },
];

/// Normalize a raw platform error code.
///
/// Never fails. Unknown codes are optimistically treated as recoverable.
pub fn normalize(raw_code: Option<&str>) -> ErrorDescriptor {
    let raw_code = raw_code.filter(|code| !code.is_empty()).unwrap_or("unknown");

    match KNOWN_ERRORS.iter().find(|known| known.raw == raw_code) {
        Some(known) => ErrorDescriptor {
            raw_code: raw_code.to_string(),
            code: known.code,
            message: known.message.to_string(),
            recoverable: known.recoverable,
            restart: known.restart,
            timestamp: now(),
        },
        None => ErrorDescriptor {
            raw_code: raw_code.to_string(),
            code: ErrorCode::UnknownError,
            message: format!("Speech recognition error: {}", raw_code),
            recoverable: true,
            restart: true,
            timestamp: now(),
        },
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
