use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::audio::domain::audio_reader::AudioReader;
use crate::audio::domain::transcoder::Transcoder;
use crate::classification::domain::accent::AccentResult;
use crate::classification::domain::accent_classifier::ClassificationError;
use crate::pipeline::model_registry::ModelRegistry;
use crate::pipeline::progress_reporter::{ProgressReporter, Stage};
use crate::shared::constants::{TRIMMED_AUDIO_FILENAME, WHISPER_SAMPLE_RATE};

/// Classifies the speaker's accent from the opening clip of the audio.
///
/// Failures never abort a run: they are reported as warnings, and the
/// `"Unknown"` fallback is returned instead.
pub struct ClassifyAccentUseCase {
    transcoder: Arc<dyn Transcoder>,
    reader: Arc<dyn AudioReader>,
    clip_secs: u32,
}

impl ClassifyAccentUseCase {
    pub fn new(transcoder: Arc<dyn Transcoder>, reader: Arc<dyn AudioReader>, clip_secs: u32) -> Self {
        Self {
            transcoder,
            reader,
            clip_secs,
        }
    }

    pub fn run(
        &self,
        audio_path: &Path,
        work_dir: &Path,
        registry: &ModelRegistry,
        reporter: &mut dyn ProgressReporter,
    ) -> AccentResult {
        match self.classify(audio_path, work_dir, registry, reporter) {
            Ok(accent) => {
                reporter.stage_succeeded(Stage::Classify, &format!("Accent: {}", accent.display()));
                accent
            }
            Err(e) => {
                reporter.warn(&format!("Accent classification failed, using fallback: {e}"));
                if matches!(e, ClassificationError::ModelLoad(_)) {
                    reporter.warn("No accent model is available; accent will be reported as Unknown");
                }
                reporter.stage_failed(Stage::Classify, &format!("Accent classification failed: {e}"));
                AccentResult::unknown()
            }
        }
    }

    /// Trim, decode and classify. The trimmed clip is removed whatever the
    /// outcome.
    pub fn classify(
        &self,
        audio_path: &Path,
        work_dir: &Path,
        registry: &ModelRegistry,
        reporter: &mut dyn ProgressReporter,
    ) -> Result<AccentResult, ClassificationError> {
        let trimmed = work_dir.join(TRIMMED_AUDIO_FILENAME);
        let result = self.classify_clip(audio_path, &trimmed, registry, reporter);

        if trimmed.exists() {
            if let Err(e) = fs::remove_file(&trimmed) {
                log::warn!("Failed to remove {}: {e}", trimmed.display());
            }
        }

        result
    }

    fn classify_clip(
        &self,
        audio_path: &Path,
        trimmed: &Path,
        registry: &ModelRegistry,
        reporter: &mut dyn ProgressReporter,
    ) -> Result<AccentResult, ClassificationError> {
        self.transcoder
            .trim(audio_path, trimmed, self.clip_secs)
            .map_err(ClassificationError::Trim)?;
        reporter.stage_progress(Stage::Classify, 0.3);

        let clip = self
            .reader
            .read_audio(trimmed, WHISPER_SAMPLE_RATE)
            .map_err(|e| ClassificationError::Decode(e.to_string()))?
            .ok_or(ClassificationError::NoAudio)?;

        let classifier = registry
            .accent_classifier()
            .map_err(|e| ClassificationError::ModelLoad(e.to_string()))?;
        reporter.stage_progress(Stage::Classify, 0.6);

        let ranking = classifier
            .classify(&clip)
            .map_err(|e| ClassificationError::Inference(e.to_string()))?;
        let accent = AccentResult::from_ranking(&ranking).ok_or(ClassificationError::EmptyRanking)?;
        reporter.stage_progress(Stage::Classify, 1.0);

        log::debug!("Accent ranking: {ranking:?}");
        Ok(accent)
    }
}
