//! Transcript Classifier
//!
//! Turns one transcript into an ignore / command / dictation decision.
//! Rules are tried in a fixed order and the first match wins:
//!
//! 1. empty input is ignored
//! 2. bubble selection ("bubble 3", "go to bubble 3")
//! 3. "add bubble <text>" / "create bubble <text>"
//! 4. a leading type keyword ("question ...", "task ...")
//! 5. exact command aliases ("clear map", "undo")
//! 6. anything else is dictation

use super::text_normalizer::{normalize_transcript, NormalizedTranscript};
use crate::commands::{alias_command, BubbleKind, Intent, VoiceCommand};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref SELECT_BUBBLE: Regex =
        Regex::new(r"^(?:(?:select|focus|go to)\s+)?bubble\s+(\d+)$").unwrap();
    static ref ADD_BUBBLE_WITH_TEXT: Regex =
        Regex::new(r"^(?:add|create)\s+bubble\s+(.+)$").unwrap();
    static ref TYPE_PREFIX: Regex =
        Regex::new(r"^(question|task|note|blocker|idea)\s+(.+)$").unwrap();
}

/// Coarse classification of an input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    Ignore,
    Command,
    Dictation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ParsedKind {
    Ignore,
    Command { command: VoiceCommand },
    /// Free-form content for a new bubble
    Dictation { transcript: String },
}

/// Classification result, with the normalized forms kept for diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedVoiceInput {
    pub kind: ParsedKind,
    pub normalized: NormalizedTranscript,
}

impl ParsedVoiceInput {
    pub fn mode(&self) -> InputMode {
        match self.kind {
            ParsedKind::Ignore => InputMode::Ignore,
            ParsedKind::Command { .. } => InputMode::Command,
            ParsedKind::Dictation { .. } => InputMode::Dictation,
        }
    }

    /// Intent identifier; dictation reports `create_bubble`
    pub fn intent(&self) -> Option<Intent> {
        match &self.kind {
            ParsedKind::Ignore => None,
            ParsedKind::Command { command } => Some(command.intent()),
            ParsedKind::Dictation { .. } => Some(Intent::CreateBubble),
        }
    }

    pub fn command(&self) -> Option<&VoiceCommand> {
        match &self.kind {
            ParsedKind::Command { command } => Some(command),
            _ => None,
        }
    }

    fn command_from(command: VoiceCommand, normalized: NormalizedTranscript) -> Self {
        Self {
            kind: ParsedKind::Command { command },
            normalized,
        }
    }
}

/// Classify a raw transcript
pub fn parse(raw: &str) -> ParsedVoiceInput {
    let normalized = normalize_transcript(raw);

    if normalized.stripped.is_empty() {
        return ParsedVoiceInput {
            kind: ParsedKind::Ignore,
            normalized,
        };
    }

    let command = select_bubble(&normalized)
        .or_else(|| add_bubble_with_text(&normalized))
        .or_else(|| type_prefix(&normalized))
        .or_else(|| alias_command(&normalized.stripped));

    match command {
        Some(command) => ParsedVoiceInput::command_from(command, normalized),
        None => ParsedVoiceInput {
            kind: ParsedKind::Dictation {
                transcript: normalized.text.clone(),
            },
            normalized,
        },
    }
}

/// Spoken numbers are 1-based; "bubble 0" and overflowing numbers do not match
fn select_bubble(normalized: &NormalizedTranscript) -> Option<VoiceCommand> {
    let captures = SELECT_BUBBLE.captures(&normalized.stripped)?;
    let spoken: usize = captures[1].parse().ok()?;
    let bubble_index = spoken.checked_sub(1)?;
    Some(VoiceCommand::SelectBubble { bubble_index })
}

fn add_bubble_with_text(normalized: &NormalizedTranscript) -> Option<VoiceCommand> {
    let captures = ADD_BUBBLE_WITH_TEXT.captures(&normalized.compact)?;
    Some(VoiceCommand::AddBubble {
        transcript: Some(captures[1].to_string()),
    })
}

fn type_prefix(normalized: &NormalizedTranscript) -> Option<VoiceCommand> {
    let captures = TYPE_PREFIX.captures(&normalized.compact)?;
    let kind = BubbleKind::from_keyword(&captures[1])?;

    // `text` and `compact` split into the same words, so everything after the
    // first word of `text` is the remainder with its original casing.
    let remainder = normalized
        .text
        .split_once(char::is_whitespace)
        .map(|(_, rest)| rest.trim().to_string())
        .unwrap_or_default();

    Some(VoiceCommand::SetType { kind, remainder })
}
