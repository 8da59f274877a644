use std::path::Path;
use std::sync::Arc;

use crate::audio::domain::audio_reader::AudioReader;
use crate::pipeline::progress_reporter::{ProgressReporter, Stage};
use crate::shared::analysis_error::AnalysisError;
use crate::shared::constants::WHISPER_SAMPLE_RATE;
use crate::transcription::domain::speech_recognizer::SpeechRecognizer;
use crate::transcription::domain::transcript::assemble_transcript;
use crate::transcription::infrastructure::threaded_transcriber::ThreadedTranscriber;

/// Decodes the normalized WAV and turns it into a newline-separated transcript.
pub struct TranscribeAudioUseCase {
    reader: Arc<dyn AudioReader>,
    transcriber: ThreadedTranscriber,
    max_duration: f64,
}

impl TranscribeAudioUseCase {
    pub fn new(
        reader: Arc<dyn AudioReader>,
        transcriber: ThreadedTranscriber,
        max_duration: f64,
    ) -> Self {
        Self {
            reader,
            transcriber,
            max_duration,
        }
    }

    /// The duration cap is checked once recognition has finished, so an
    /// over-long clip still costs a full transcription (bounded by the timeout).
    pub fn run(
        &self,
        audio_path: &Path,
        recognizer: Arc<dyn SpeechRecognizer>,
        reporter: &mut dyn ProgressReporter,
    ) -> Result<String, AnalysisError> {
        let audio = self
            .reader
            .read_audio(audio_path, WHISPER_SAMPLE_RATE)
            .map_err(|e| {
                AnalysisError::Transcription(format!(
                    "failed to decode {}: {e}",
                    audio_path.display()
                ))
            })?
            .ok_or_else(|| {
                AnalysisError::Transcription(format!(
                    "{} has no audio track",
                    audio_path.display()
                ))
            })?;

        log::debug!(
            "Transcribing {:.1}s of audio (timeout {}s)",
            audio.duration(),
            self.transcriber.timeout().as_secs()
        );
        let result = self.transcriber.transcribe(recognizer, audio)?;

        if result.duration() > self.max_duration {
            return Err(AnalysisError::Duration {
                duration: result.duration(),
                limit: self.max_duration,
            });
        }

        if result.is_empty() {
            return Err(AnalysisError::EmptyTranscript);
        }

        let transcript = assemble_transcript(result.segments(), |done, total| {
            reporter.stage_progress(Stage::Transcribe, done as f64 / total as f64);
        });
        Ok(transcript)
    }
}
