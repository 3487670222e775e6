//! Voice Router
//!
//! Classifies a transcript and hands the result to the host application.
//! Destructive commands go through the host's confirmation check first.

use crate::commands::{BubbleKind, Intent, VoiceCommand};
use crate::core::parser::{parse, ParsedKind, ParsedVoiceInput};
use tracing::{debug, info};

/// Actions the host application performs for the router
pub trait VoiceHandlers {
    /// Free-form content for a new bubble
    fn dictation(&mut self, transcript: &str, parsed: &ParsedVoiceInput);

    /// A type keyword was spoken; `remainder` may be empty
    fn typed_intent(&mut self, _kind: BubbleKind, _remainder: &str, _parsed: &ParsedVoiceInput) {}

    /// Whether the host handles `intent`. Unsupported commands are skipped.
    fn supports(&self, _intent: Intent) -> bool {
        true
    }

    /// Perform a command
    fn command(&mut self, command: &VoiceCommand, parsed: &ParsedVoiceInput);

    /// Synchronous confirmation for destructive commands
    fn confirm_destructive(&mut self, _parsed: &ParsedVoiceInput) -> bool {
        true
    }

    /// Notified after any command was performed
    fn intent_fired(&mut self, _parsed: &ParsedVoiceInput) {}
}

/// What the router did with one transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Nothing to do (empty input)
    Ignored,
    /// Sent to the dictation handler
    Dictated,
    /// Typed intent set; `dictated` if content was created too
    Typed { kind: BubbleKind, dictated: bool },
    /// Command handler ran
    Dispatched(Intent),
    /// Confirmation was refused
    Declined(Intent),
    /// Host has no handler for this command
    Unhandled(Intent),
}

pub struct VoiceRouter<H> {
    handlers: H,
}

impl<H: VoiceHandlers> VoiceRouter<H> {
    pub fn new(handlers: H) -> Self {
        Self { handlers }
    }

    pub fn handlers(&self) -> &H {
        &self.handlers
    }

    pub fn handlers_mut(&mut self) -> &mut H {
        &mut self.handlers
    }

    pub fn into_handlers(self) -> H {
        self.handlers
    }

    /// Classify and dispatch a raw transcript
    pub fn route(&mut self, transcript: &str) -> RouteOutcome {
        let parsed = parse(transcript);
        self.route_parsed(&parsed)
    }

    /// Dispatch an already classified input
    pub fn route_parsed(&mut self, parsed: &ParsedVoiceInput) -> RouteOutcome {
        match &parsed.kind {
            ParsedKind::Ignore => RouteOutcome::Ignored,
            ParsedKind::Dictation { transcript } => {
                debug!("📝 Dictation: '{}'", transcript);
                self.handlers.dictation(transcript, parsed);
                RouteOutcome::Dictated
            }
            ParsedKind::Command {
                command: VoiceCommand::SetType { kind, remainder },
            } => {
                self.handlers.typed_intent(*kind, remainder, parsed);
                // One utterance both sets the type and creates the content.
                let dictated = !remainder.is_empty();
                if dictated {
                    self.handlers.dictation(remainder, parsed);
                }
                RouteOutcome::Typed {
                    kind: *kind,
                    dictated,
                }
            }
            ParsedKind::Command { command } => self.dispatch(command, parsed),
        }
    }

    fn dispatch(&mut self, command: &VoiceCommand, parsed: &ParsedVoiceInput) -> RouteOutcome {
        let intent = command.intent();

        if !self.handlers.supports(intent) {
            debug!("No handler for {}", intent);
            return RouteOutcome::Unhandled(intent);
        }

        if intent.is_destructive() && !self.handlers.confirm_destructive(parsed) {
            info!("🛡️ {} not confirmed", intent);
            return RouteOutcome::Declined(intent);
        }

        info!("🎯 Matched command: {}", intent);
        self.handlers.command(command, parsed);
        self.handlers.intent_fired(parsed);
        RouteOutcome::Dispatched(intent)
    }
}
