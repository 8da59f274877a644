use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use accentscope_core::shared::constants::{
    APP_DIR_NAME, CLASSIFICATION_CLIP_SECS, DEFAULT_TRANSCRIPTION_TIMEOUT_SECS, GEMINI_ENDPOINT,
    GEMINI_MODEL, MAX_AUDIO_DURATION_SECS, PROMPT_CHAR_LIMIT,
};

/// Persistent defaults read from `settings.json`. Command-line flags win.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub whisper_model: Option<PathBuf>,
    pub accent_model: Option<PathBuf>,
    pub accent_labels: Option<PathBuf>,
    pub timeout_secs: u64,
    pub max_duration_secs: f64,
    pub trim_seconds: u32,
    pub prompt_chars: usize,
    pub gemini_model: String,
    pub gemini_endpoint: String,
    pub work_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            whisper_model: None,
            accent_model: None,
            accent_labels: None,
            timeout_secs: DEFAULT_TRANSCRIPTION_TIMEOUT_SECS,
            max_duration_secs: MAX_AUDIO_DURATION_SECS,
            trim_seconds: CLASSIFICATION_CLIP_SECS,
            prompt_chars: PROMPT_CHAR_LIMIT,
            gemini_model: GEMINI_MODEL.to_string(),
            gemini_endpoint: GEMINI_ENDPOINT.to_string(),
            work_dir: None,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("settings.json"))
    }

    /// Missing or unreadable settings fall back to defaults.
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> Self {
        let Ok(json) = fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&json) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring invalid settings file {}: {e}", path.display());
                Self::default()
            }
        }
    }
}
