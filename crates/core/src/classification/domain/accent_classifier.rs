use thiserror::Error;

use crate::audio::domain::audio_segment::AudioSegment;
use crate::shared::analysis_error::AnalysisError;

use super::accent::AccentPrediction;

/// Domain interface for accent classification.
///
/// Returns the full ranking, best first. Callers only use the top entry.
pub trait AccentClassifier: Send + Sync {
    fn classify(
        &self,
        audio: &AudioSegment,
    ) -> Result<Vec<AccentPrediction>, Box<dyn std::error::Error>>;
}

/// Reasons classification produced no result. Never fatal to a run: the
/// caller logs it and substitutes the unknown accent.
#[derive(Error, Debug)]
pub enum ClassificationError {
    #[error("failed to trim audio: {0}")]
    Trim(#[source] AnalysisError),
    #[error("failed to decode trimmed audio: {0}")]
    Decode(String),
    #[error("trimmed audio has no audio track")]
    NoAudio,
    #[error("failed to load accent model: {0}")]
    ModelLoad(String),
    #[error("accent inference failed: {0}")]
    Inference(String),
    #[error("classifier returned an empty ranking")]
    EmptyRanking,
}
