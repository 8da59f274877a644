mod settings;

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use serde::Serialize;

use accentscope_core::acquisition::infrastructure::http_downloader::HttpDownloader;
use accentscope_core::acquisition::infrastructure::yt_dlp_downloader::YtDlpDownloader;
use accentscope_core::audio::infrastructure::ffmpeg_audio_reader::FfmpegAudioReader;
use accentscope_core::audio::infrastructure::ffmpeg_transcoder::FfmpegTranscoder;
use accentscope_core::classification::domain::accent_classifier::AccentClassifier;
use accentscope_core::classification::infrastructure::onnx_accent_classifier::OnnxAccentClassifier;
use accentscope_core::evaluation::infrastructure::gemini_evaluator::{GeminiConfig, GeminiEvaluator};
use accentscope_core::pipeline::analysis_report::AnalysisReport;
use accentscope_core::pipeline::analyze_video_use_case::AnalyzeVideoUseCase;
use accentscope_core::pipeline::model_registry::{LoadError, ModelRegistry};
use accentscope_core::pipeline::progress_reporter::{LogProgressReporter, ProgressReporter};
use accentscope_core::shared::analysis_config::AnalysisConfig;
use accentscope_core::shared::constants::{
    ACCENT_LABELS_NAME, ACCENT_MODEL_NAME, EXTENDED_PROMPT_CHAR_LIMIT, WHISPER_MODEL_NAME,
    WHISPER_MODEL_URL,
};
use accentscope_core::shared::model_resolver::{self, ModelResolveError};
use accentscope_core::transcription::domain::speech_recognizer::SpeechRecognizer;
use accentscope_core::transcription::infrastructure::whisper_recognizer::WhisperRecognizer;

use settings::Settings;

/// English accent and fluency evaluation for spoken videos.
#[derive(Parser, Debug)]
#[command(name = "accentscope")]
struct Cli {
    /// YouTube URL, direct http(s) video URL or local media file.
    input: String,

    /// Gemini API key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Whisper ggml model file (downloaded to the cache if omitted).
    #[arg(long)]
    whisper_model: Option<PathBuf>,

    /// ONNX accent classifier. Never downloaded: if omitted it is looked up
    /// in the model cache, and when missing the accent is reported as Unknown.
    #[arg(long)]
    accent_model: Option<PathBuf>,

    /// Accent labels: a config.json with id2label or one label per line.
    /// Looked up in the model cache if omitted.
    #[arg(long)]
    accent_labels: Option<PathBuf>,

    /// Transcription timeout in seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Longest accepted audio, in seconds.
    #[arg(long)]
    max_duration: Option<f64>,

    /// Seconds of audio used for accent classification.
    #[arg(long)]
    trim_seconds: Option<u32>,

    /// Transcript characters sent for evaluation.
    #[arg(long)]
    prompt_chars: Option<usize>,

    /// Send the longer transcript prefix (3000 characters).
    #[arg(long, conflicts_with = "prompt_chars")]
    extended_prompt: bool,

    /// Gemini model name.
    #[arg(long)]
    gemini_model: Option<String>,

    /// Gemini API base URL.
    #[arg(long)]
    gemini_endpoint: Option<String>,

    /// Directory under which per-run scratch directories are created.
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

/// Effective options: command-line flags layered over `settings.json`.
#[derive(Debug, Clone, PartialEq)]
struct Options {
    whisper_model: Option<PathBuf>,
    accent_model: Option<PathBuf>,
    accent_labels: Option<PathBuf>,
    analysis: AnalysisConfig,
    gemini: GeminiOptions,
}

#[derive(Debug, Clone, PartialEq)]
struct GeminiOptions {
    model: String,
    endpoint: String,
    prompt_chars: usize,
}

impl Options {
    fn merge(cli: &Cli, settings: Settings) -> Self {
        Self {
            whisper_model: cli.whisper_model.clone().or(settings.whisper_model),
            accent_model: cli.accent_model.clone().or(settings.accent_model),
            accent_labels: cli.accent_labels.clone().or(settings.accent_labels),
            analysis: AnalysisConfig {
                transcription_timeout: Duration::from_secs(
                    cli.timeout.unwrap_or(settings.timeout_secs),
                ),
                max_audio_duration: cli.max_duration.unwrap_or(settings.max_duration_secs),
                classification_clip_secs: cli.trim_seconds.unwrap_or(settings.trim_seconds),
                work_root: cli.work_dir.clone().or(settings.work_dir),
            },
            gemini: GeminiOptions {
                model: cli.gemini_model.clone().unwrap_or(settings.gemini_model),
                endpoint: cli.gemini_endpoint.clone().unwrap_or(settings.gemini_endpoint),
                prompt_chars: match cli.prompt_chars {
                    Some(chars) => chars,
                    None if cli.extended_prompt => EXTENDED_PROMPT_CHAR_LIMIT,
                    None => settings.prompt_chars,
                },
            },
        }
    }
}

#[derive(Serialize)]
struct ReportJson<'a> {
    transcript: &'a str,
    accent: AccentJson<'a>,
    evaluation: Option<&'a str>,
    evaluation_error: Option<String>,
}

#[derive(Serialize)]
struct AccentJson<'a> {
    label: &'a str,
    confidence: f64,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let options = Options::merge(&cli, Settings::load());
    validate(&cli, &options)?;

    let registry = Arc::new(build_registry(&options));
    let evaluator = GeminiEvaluator::new(GeminiConfig {
        endpoint: options.gemini.endpoint.clone(),
        model: options.gemini.model.clone(),
        prompt_char_limit: options.gemini.prompt_chars,
        ..GeminiConfig::new(cli.api_key.clone())
    })?;

    let use_case = AnalyzeVideoUseCase::new(
        Box::new(YtDlpDownloader::new()),
        Box::new(HttpDownloader),
        Arc::new(FfmpegTranscoder::new()),
        Arc::new(FfmpegAudioReader),
        Box::new(evaluator),
        registry,
        &options.analysis,
    );

    let mut reporter = LogProgressReporter::default();
    let result = use_case.run(&cli.input, &mut reporter);
    reporter.summary();
    let report = result?;

    if cli.json {
        println!("{}", render_json(&report)?);
    } else {
        print!("{}", render_text(&report));
    }
    Ok(())
}

fn build_registry(options: &Options) -> ModelRegistry {
    let whisper_model = options.whisper_model.clone();
    let accent_model = options.accent_model.clone();
    let accent_labels = options.accent_labels.clone();

    ModelRegistry::new(
        move || -> Result<Arc<dyn SpeechRecognizer>, LoadError> {
            let path = match &whisper_model {
                Some(path) => path.clone(),
                None => {
                    log::info!("Resolving model: {WHISPER_MODEL_NAME}");
                    let path = model_resolver::resolve(
                        WHISPER_MODEL_NAME,
                        WHISPER_MODEL_URL,
                        None,
                        Some(Box::new(download_progress)),
                    )?;
                    eprintln!();
                    path
                }
            };
            Ok(Arc::new(WhisperRecognizer::new(&path)?))
        },
        move || -> Result<Arc<dyn AccentClassifier>, LoadError> {
            let model = match &accent_model {
                Some(path) => path.clone(),
                None => model_resolver::require(ACCENT_MODEL_NAME, None).map_err(accent_model_hint)?,
            };
            let labels = match &accent_labels {
                Some(path) => path.clone(),
                None => model_resolver::require(ACCENT_LABELS_NAME, None).map_err(accent_model_hint)?,
            };
            let classifier =
                OnnxAccentClassifier::new(&model, &labels).map_err(|e| e.to_string())?;
            Ok(Arc::new(classifier))
        },
    )
}

/// Point a missing cached accent file at the flags that supply it.
fn accent_model_hint(err: ModelResolveError) -> LoadError {
    match err {
        ModelResolveError::NotFound { .. } => format!(
            "{err}; pass --accent-model and --accent-labels to enable accent detection"
        )
        .into(),
        other => other.into(),
    }
}

fn validate(cli: &Cli, options: &Options) -> Result<(), Box<dyn std::error::Error>> {
    if cli.api_key.trim().is_empty() {
        return Err("A Gemini API key is required (--api-key or GEMINI_API_KEY)".into());
    }
    if options.analysis.transcription_timeout.is_zero() {
        return Err("Timeout must be at least 1 second".into());
    }
    let max = options.analysis.max_audio_duration;
    if max.is_nan() || max <= 0.0 {
        return Err(format!("Max duration must be positive, got {max}").into());
    }
    if options.analysis.classification_clip_secs == 0 {
        return Err("Trim seconds must be at least 1".into());
    }
    if options.gemini.prompt_chars == 0 {
        return Err("Prompt chars must be at least 1".into());
    }
    for path in [&options.whisper_model, &options.accent_model, &options.accent_labels]
        .into_iter()
        .flatten()
    {
        if !path.is_file() {
            return Err(format!("Model file not found: {}", path.display()).into());
        }
    }
    Ok(())
}

fn render_text(report: &AnalysisReport) -> String {
    format!(
        "Transcript:\n{}\nAccent: {}\n\nFluency evaluation:\n{}\n",
        report.transcript,
        report.accent.display(),
        report.evaluation_text()
    )
}

fn render_json(report: &AnalysisReport) -> Result<String, serde_json::Error> {
    let (evaluation, evaluation_error) = match &report.evaluation {
        Ok(text) => (Some(text.as_str()), None),
        Err(_) => (None, Some(report.evaluation_text())),
    };
    serde_json::to_string_pretty(&ReportJson {
        transcript: &report.transcript,
        accent: AccentJson {
            label: report.accent.label(),
            confidence: report.accent.confidence(),
        },
        evaluation,
        evaluation_error,
    })
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading speech model... {pct}%");
    } else {
        eprint!("\rDownloading speech model... {downloaded} bytes");
    }
}
