use crate::error::VoiceResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// User-facing voice settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceSettings {
    // Recognition
    pub language: String,
    pub auto_restart: bool,

    // Addressing
    pub wake_phrase_enabled: bool,
    pub wake_phrase: String,
    pub push_to_talk_enabled: bool,
    pub confidence_threshold: f32,

    // Narration playback
    pub playback_rate: f32,
    pub playback_pitch: f32,
    pub playback_voice: String,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            auto_restart: true,
            wake_phrase_enabled: false,
            wake_phrase: "speechflow".to_string(),
            push_to_talk_enabled: false,
            confidence_threshold: 0.0,
            playback_rate: 1.0,
            playback_pitch: 1.0,
            playback_voice: String::new(),
        }
    }
}

impl VoiceSettings {
    /// Load settings from the default location, or defaults if absent
    pub fn load() -> VoiceResult<Self> {
        Self::load_from(&settings_path())
    }

    /// Load settings from `path`.
    ///
    /// A corrupt file is moved aside to `*.json.corrupt` and defaults are used.
    pub fn load_from(path: &Path) -> VoiceResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str::<Self>(&content) {
            Ok(settings) => Ok(settings.sanitized()),
            Err(e) => {
                // Graceful degradation: log warning and use defaults
                tracing::warn!("⚠️ Voice settings corrupted or invalid, using defaults: {}", e);
                let backup_path = path.with_extension("json.corrupt");
                let _ = std::fs::rename(path, &backup_path);
                Ok(Self::default())
            }
        }
    }

    /// Save sanitized settings to the default location
    pub fn save(&self) -> VoiceResult<Self> {
        self.save_to(&settings_path())
    }

    /// Save sanitized settings to `path` and return what was written
    pub fn save_to(&self, path: &Path) -> VoiceResult<Self> {
        let sanitized = self.clone().sanitized();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&sanitized)?;
        std::fs::write(path, content)?;
        Ok(sanitized)
    }

    /// Clamp and default every field into its valid range
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();

        let language = self.language.trim();
        let wake_phrase = self.wake_phrase.trim();

        Self {
            language: if language.is_empty() {
                defaults.language
            } else {
                language.to_string()
            },
            auto_restart: self.auto_restart,
            wake_phrase_enabled: self.wake_phrase_enabled,
            wake_phrase: if wake_phrase.is_empty() {
                defaults.wake_phrase
            } else {
                wake_phrase.to_lowercase()
            },
            push_to_talk_enabled: self.push_to_talk_enabled,
            confidence_threshold: clamp(
                self.confidence_threshold,
                0.0,
                1.0,
                defaults.confidence_threshold,
            ),
            playback_rate: clamp(self.playback_rate, 0.5, 2.0, defaults.playback_rate),
            playback_pitch: clamp(self.playback_pitch, 0.5, 2.0, defaults.playback_pitch),
            playback_voice: self.playback_voice,
        }
    }
}

fn clamp(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

pub fn settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("speechflow")
        .join("voice-settings.json")
}
