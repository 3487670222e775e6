pub mod mock_session;

use speechflow::commands::{BubbleKind, VoiceCommand};
use speechflow::core::ParsedVoiceInput;
use speechflow::router::VoiceHandlers;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Host that records every handler call as a short string
#[derive(Clone, Default)]
pub struct RecordingHost {
    calls: Arc<Mutex<Vec<String>>>,
    pub confirm: bool,
}

impl RecordingHost {
    pub fn confirming(confirm: bool) -> Self {
        Self {
            confirm,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("Calls lock poisoned").clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("Calls lock poisoned").push(call);
    }
}

impl VoiceHandlers for RecordingHost {
    fn dictation(&mut self, transcript: &str, _parsed: &ParsedVoiceInput) {
        self.record(format!("dictation:{}", transcript));
    }

    fn typed_intent(&mut self, kind: BubbleKind, _remainder: &str, _parsed: &ParsedVoiceInput) {
        self.record(format!("typed:{}", kind.keyword()));
    }

    fn command(&mut self, command: &VoiceCommand, _parsed: &ParsedVoiceInput) {
        match command {
            VoiceCommand::SelectBubble { bubble_index } => {
                self.record(format!("select:{}", bubble_index))
            }
            other => self.record(format!("command:{}", other.intent())),
        }
    }

    fn confirm_destructive(&mut self, parsed: &ParsedVoiceInput) -> bool {
        self.record(format!("confirm:{}", parsed.normalized.stripped));
        self.confirm
    }
}

/// Let the pipeline task drain its queues. With a paused clock this only
/// advances time by a millisecond.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
