//! Transcript Gate
//!
//! Decides which recognition results reach the router: interim results and
//! low-confidence results are dropped, and when a wake phrase is enabled only
//! utterances addressed to the app get through.

use crate::config::VoiceSettings;
use crate::recognition::ResultBatch;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptGate {
    confidence_threshold: f32,
    /// Lower-cased wake phrase words, when the wake phrase is enabled
    wake_words: Option<Vec<String>>,
}

impl Default for TranscriptGate {
    fn default() -> Self {
        Self::from_settings(&VoiceSettings::default())
    }
}

impl TranscriptGate {
    pub fn from_settings(settings: &VoiceSettings) -> Self {
        let wake_words = settings.wake_phrase_enabled.then(|| {
            settings
                .wake_phrase
                .to_lowercase()
                .split_whitespace()
                .map(String::from)
                .collect::<Vec<_>>()
        });

        Self {
            confidence_threshold: settings.confidence_threshold,
            wake_words: wake_words.filter(|words| !words.is_empty()),
        }
    }

    /// Transcript to route, or `None` when the result should be dropped
    pub fn admit(&self, batch: &ResultBatch) -> Option<String> {
        let latest = batch.latest()?;
        if !latest.is_final {
            debug!("Skipping interim result");
            return None;
        }

        let best = latest.alternatives.first()?;
        if best.confidence < self.confidence_threshold {
            debug!(
                "Dropping '{}' (confidence {:.2} < {:.2})",
                best.transcript, best.confidence, self.confidence_threshold
            );
            return None;
        }

        match &self.wake_words {
            Some(words) => strip_wake_phrase(&best.transcript, words),
            None => Some(best.transcript.clone()),
        }
    }
}

/// Remainder of `text` after the wake phrase, if `text` starts with it
fn strip_wake_phrase(text: &str, wake_words: &[String]) -> Option<String> {
    let spoken: Vec<&str> = text.split_whitespace().collect();
    if spoken.len() <= wake_words.len() {
        return None;
    }

    let addressed = wake_words.iter().zip(&spoken).all(|(wake, word)| {
        let cleaned: String = word
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        cleaned == *wake
    });
    if !addressed {
        debug!("No wake phrase in '{}'", text);
        return None;
    }

    let rest = spoken[wake_words.len()..].join(" ");
    let rest = rest.trim_start_matches([',', '!', '.', ' ']).to_string();
    (!rest.is_empty()).then_some(rest)
}
