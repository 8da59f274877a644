pub const WHISPER_MODEL_NAME: &str = "ggml-tiny.bin";
pub const WHISPER_MODEL_URL: &str =
    "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-tiny.bin";
pub const WHISPER_SAMPLE_RATE: u32 = 16000;
pub const TARGET_CHANNELS: u16 = 1;

/// ONNX export of an English-accent audio classifier (wav2vec2 family).
/// Not downloadable; looked up in the model cache when no path is given.
pub const ACCENT_MODEL_NAME: &str = "english_accents_classification.onnx";
pub const ACCENT_LABELS_NAME: &str = "english_accents_classification.json";

pub const DEFAULT_TRANSCRIPTION_TIMEOUT_SECS: u64 = 90;
pub const MAX_AUDIO_DURATION_SECS: f64 = 300.0;
pub const CLASSIFICATION_CLIP_SECS: u32 = 60;

pub const PROMPT_CHAR_LIMIT: usize = 1500;
pub const EXTENDED_PROMPT_CHAR_LIMIT: usize = 3000;

pub const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const GEMINI_REQUEST_TIMEOUT_SECS: u64 = 60;

pub const YOUTUBE_HOSTS: &[&str] = &["youtube.com", "youtu.be"];
pub const YOUTUBE_TEMP_STEM: &str = "temp_audio";
pub const YOUTUBE_AUDIO_FORMAT: &str = "m4a";
pub const DIRECT_DOWNLOAD_FILENAME: &str = "temp_video.mp4";
pub const NORMALIZED_AUDIO_FILENAME: &str = "audio.wav";
pub const TRIMMED_AUDIO_FILENAME: &str = "trimmed_audio.wav";

pub const APP_DIR_NAME: &str = "AccentScope";
