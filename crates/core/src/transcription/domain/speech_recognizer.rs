use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::audio::domain::audio_segment::AudioSegment;

use super::transcript::TranscriptionResult;

/// Errors crossing the transcription worker thread must be `Send`.
pub type RecognizerError = Box<dyn std::error::Error + Send + Sync>;

/// Domain interface for speech-to-text transcription.
///
/// Implementations run inference on mono 16 kHz audio and report ordered
/// segments plus the audio duration. `cancelled` is raised by the caller
/// when it stops waiting; implementations should abort as soon as they
/// notice it.
pub trait SpeechRecognizer: Send + Sync {
    fn transcribe(
        &self,
        audio: &AudioSegment,
        cancelled: &Arc<AtomicBool>,
    ) -> Result<TranscriptionResult, RecognizerError>;
}
