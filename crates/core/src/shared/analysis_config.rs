use std::path::PathBuf;
use std::time::Duration;

use super::constants::{
    CLASSIFICATION_CLIP_SECS, DEFAULT_TRANSCRIPTION_TIMEOUT_SECS, MAX_AUDIO_DURATION_SECS,
};

/// Tunables for a single analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Wall-clock budget for speech inference, measured from dispatch.
    pub transcription_timeout: Duration,
    /// Audio longer than this (seconds) is rejected after transcription.
    pub max_audio_duration: f64,
    /// Length of the clip fed to the accent classifier.
    pub classification_clip_secs: u32,
    /// Parent directory for per-run scratch directories. `None` uses the
    /// system temp dir.
    pub work_root: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            transcription_timeout: Duration::from_secs(DEFAULT_TRANSCRIPTION_TIMEOUT_SECS),
            max_audio_duration: MAX_AUDIO_DURATION_SECS,
            classification_clip_secs: CLASSIFICATION_CLIP_SECS,
            work_root: None,
        }
    }
}
