use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::RecvTimeoutError;

use crate::audio::domain::audio_segment::AudioSegment;
use crate::shared::analysis_error::AnalysisError;
use crate::transcription::domain::speech_recognizer::SpeechRecognizer;
use crate::transcription::domain::transcript::TranscriptionResult;

/// Runs speech recognition on a dedicated worker thread under a wall-clock
/// deadline.
///
/// On timeout the caller returns immediately with `AnalysisError::Timeout`
/// and the worker's cancellation flag is raised. The worker is never joined:
/// a recognizer that ignores the flag keeps running until it finishes on
/// its own, and its result is dropped.
pub struct ThreadedTranscriber {
    timeout: Duration,
}

impl ThreadedTranscriber {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn transcribe(
        &self,
        recognizer: Arc<dyn SpeechRecognizer>,
        audio: AudioSegment,
    ) -> Result<TranscriptionResult, AnalysisError> {
        let cancelled = Arc::new(AtomicBool::new(false));
        self.transcribe_with_flag(recognizer, audio, cancelled)
    }

    fn transcribe_with_flag(
        &self,
        recognizer: Arc<dyn SpeechRecognizer>,
        audio: AudioSegment,
        cancelled: Arc<AtomicBool>,
    ) -> Result<TranscriptionResult, AnalysisError> {
        let (result_tx, result_rx) = crossbeam_channel::bounded(1);
        let worker_flag = cancelled.clone();

        thread::Builder::new()
            .name("transcription".to_string())
            .spawn(move || {
                let result = recognizer
                    .transcribe(&audio, &worker_flag)
                    .map_err(|e| e.to_string());
                // The receiver is gone if the caller already timed out.
                let _ = result_tx.send(result);
            })
            .map_err(|e| {
                AnalysisError::Transcription(format!("failed to start transcription worker: {e}"))
            })?;

        match result_rx.recv_timeout(self.timeout) {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(message)) => Err(AnalysisError::Transcription(message)),
            Err(RecvTimeoutError::Timeout) => {
                cancelled.store(true, Ordering::Relaxed);
                log::warn!(
                    "Transcription exceeded {}s; cancelling worker",
                    self.timeout.as_secs()
                );
                Err(AnalysisError::Timeout(self.timeout))
            }
            Err(RecvTimeoutError::Disconnected) => Err(AnalysisError::Transcription(
                "transcription worker exited without a result".to_string(),
            )),
        }
    }
}
