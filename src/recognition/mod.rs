//! Speech Recognition Module
//!
//! Platform-neutral view of a continuous speech-recognition service:
//! - `RecognitionSession` / `SessionFactory`: the capability the host provides
//! - `EventSink`: how a session reports results, errors and session end
//! - `RecognitionController`: lifecycle, state tracking and auto-restart

pub mod controller;
pub mod errors;

use crate::config::VoiceSettings;
use crate::error::SessionError;
use tokio::sync::mpsc;

// Re-export main types
pub use controller::{PendingRestart, RecognitionController, StartOptions};
pub use errors::{normalize, ErrorCode, ErrorDescriptor};

/// One candidate transcription with its confidence score
#[derive(Debug, Clone, PartialEq)]
pub struct Alternative {
    pub transcript: String,
    pub confidence: f32,
}

/// One recognized utterance, alternatives ordered best first
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechResult {
    pub alternatives: Vec<Alternative>,
    pub is_final: bool,
}

/// Payload of a result event
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultBatch {
    pub results: Vec<SpeechResult>,
}

impl ResultBatch {
    /// A batch holding a single final transcript
    pub fn single(transcript: impl Into<String>, confidence: f32) -> Self {
        Self {
            results: vec![SpeechResult {
                alternatives: vec![Alternative {
                    transcript: transcript.into(),
                    confidence,
                }],
                is_final: true,
            }],
        }
    }

    /// Most recent result
    pub fn latest(&self) -> Option<&SpeechResult> {
        self.results.last()
    }

    /// Best alternative of the most recent result
    pub fn best(&self) -> Option<&Alternative> {
        self.latest()?.alternatives.first()
    }

    pub fn transcript(&self) -> Option<&str> {
        self.best().map(|alt| alt.transcript.as_str())
    }
}

/// Event emitted by a recognition session
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionEvent {
    Result(ResultBatch),
    /// Raw platform error identifier, if the platform supplied one
    Error(Option<String>),
    End,
}

/// Identifies the session instance an event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct SessionEvent {
    pub session: SessionId,
    pub event: RecognitionEvent,
}

/// Handle a session uses to publish its events
#[derive(Debug, Clone)]
pub struct EventSink {
    session: SessionId,
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl EventSink {
    pub fn new(session: SessionId, tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { session, tx }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn result(&self, batch: ResultBatch) {
        self.send(RecognitionEvent::Result(batch));
    }

    pub fn error(&self, code: Option<&str>) {
        self.send(RecognitionEvent::Error(code.map(str::to_string)));
    }

    pub fn end(&self) {
        self.send(RecognitionEvent::End);
    }

    fn send(&self, event: RecognitionEvent) {
        // The receiver only goes away when the pipeline shuts down.
        let _ = self.tx.send(SessionEvent {
            session: self.session,
            event,
        });
    }
}

/// Settings applied to a session when it is created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub language: String,
    pub continuous: bool,
    pub interim_results: bool,
}

/// A live continuous-listening session provided by the platform
pub trait RecognitionSession: Send {
    /// Begin capturing. Synchronous failures carry the platform error code.
    fn start(&mut self) -> Result<(), SessionError>;

    /// Stop capturing. The platform still emits `End` afterwards.
    fn stop(&mut self) -> Result<(), SessionError>;

    /// Change the recognition language of the live session
    fn set_language(&mut self, language: &str);
}

/// Builds platform sessions
pub trait SessionFactory: Send {
    /// Returns `None` when speech recognition is unavailable
    fn create(&self, config: &SessionConfig, sink: EventSink)
        -> Option<Box<dyn RecognitionSession>>;
}

/// Options consumed by the recognition controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionOptions {
    pub language: String,
    pub continuous: bool,
    pub interim_results: bool,
    pub auto_restart: bool,
}

impl Default for RecognitionOptions {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            continuous: true,
            interim_results: false,
            auto_restart: true,
        }
    }
}

impl From<&VoiceSettings> for RecognitionOptions {
    fn from(settings: &VoiceSettings) -> Self {
        Self {
            language: settings.language.clone(),
            auto_restart: settings.auto_restart,
            ..Self::default()
        }
    }
}
