use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::audio::domain::audio_segment::AudioSegment;
use crate::transcription::domain::speech_recognizer::{RecognizerError, SpeechRecognizer};
use crate::transcription::domain::transcript::{Segment, TranscriptionResult};

/// Speech recognizer using whisper.cpp via whisper-rs.
///
/// The model is loaded once at construction; each call creates a fresh
/// inference state, so one recognizer can be shared across runs.
pub struct WhisperRecognizer {
    ctx: WhisperContext,
}

impl WhisperRecognizer {
    pub fn new(model_path: &Path) -> Result<Self, RecognizerError> {
        if !model_path.exists() {
            return Err(format!("Whisper model not found at: {}", model_path.display()).into());
        }
        let ctx = WhisperContext::new_with_params(
            model_path.to_str().ok_or("Invalid model path")?,
            WhisperContextParameters::default(),
        )
        .map_err(|e| format!("Failed to load Whisper model: {e}"))?;

        log::info!("Loaded Whisper model from {}", model_path.display());

        Ok(Self { ctx })
    }
}

impl SpeechRecognizer for WhisperRecognizer {
    fn transcribe(
        &self,
        audio: &AudioSegment,
        cancelled: &Arc<AtomicBool>,
    ) -> Result<TranscriptionResult, RecognizerError> {
        if !audio.is_speech_profile() {
            return Err(format!(
                "Whisper expects mono 16 kHz audio, got {} Hz with {} channel(s)",
                audio.sample_rate(),
                audio.channels()
            )
            .into());
        }

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| format!("Failed to create Whisper state: {e}"))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(Some("en"));
        params.set_translate(false);
        params.set_token_timestamps(true);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_n_threads(num_cpus().min(4) as i32);

        let abort_flag = cancelled.clone();
        params.set_abort_callback_safe(move || abort_flag.load(Ordering::Relaxed));

        let result = state.full(params, audio.samples());
        if cancelled.load(Ordering::Relaxed) {
            return Err("Whisper inference cancelled".into());
        }
        result.map_err(|e| format!("Whisper inference failed: {e}"))?;

        let mut segments = Vec::new();
        let num_segments = state.full_n_segments();

        for seg_idx in 0..num_segments {
            let segment = match state.get_segment(seg_idx) {
                Some(s) => s,
                None => continue,
            };

            let mut text = String::new();
            let mut start: Option<f64> = None;
            let mut end = 0.0f64;

            for tok_idx in 0..segment.n_tokens() {
                let token = match segment.get_token(tok_idx) {
                    Some(t) => t,
                    None => continue,
                };

                let piece = match token.to_str() {
                    Ok(t) => t,
                    Err(_) => continue,
                };

                // Special tokens render as [_BEG_], [_SOT_], <|endoftext|>, ...
                let trimmed = piece.trim();
                if trimmed.starts_with("[_") || trimmed.starts_with("<|") {
                    continue;
                }

                // Token timestamps are in centiseconds (10ms units)
                let token_data = token.token_data();
                start.get_or_insert(token_data.t0 as f64 / 100.0);
                end = end.max(token_data.t1 as f64 / 100.0);

                text.push_str(piece);
            }

            if text.trim().is_empty() {
                continue;
            }
            let start = start.unwrap_or(0.0);
            segments.push(Segment::new(text, start, end.max(start)));
        }

        Ok(TranscriptionResult::new(segments, audio.duration()))
    }
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
