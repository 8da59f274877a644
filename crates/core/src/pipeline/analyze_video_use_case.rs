use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use crate::acquisition::domain::media_downloader::MediaDownloader;
use crate::acquisition::domain::media_reference::MediaReference;
use crate::audio::domain::audio_reader::AudioReader;
use crate::audio::domain::transcoder::Transcoder;
use crate::evaluation::domain::fluency_evaluator::FluencyEvaluator;
use crate::pipeline::acquire_audio_use_case::AcquireAudioUseCase;
use crate::pipeline::analysis_report::AnalysisReport;
use crate::pipeline::classify_accent_use_case::ClassifyAccentUseCase;
use crate::pipeline::model_registry::ModelRegistry;
use crate::pipeline::progress_reporter::{ProgressReporter, Stage};
use crate::pipeline::transcribe_audio_use_case::TranscribeAudioUseCase;
use crate::shared::analysis_config::AnalysisConfig;
use crate::shared::analysis_error::AnalysisError;
use crate::transcription::infrastructure::threaded_transcriber::ThreadedTranscriber;

/// Runs one analysis end to end: acquire, transcribe, classify, evaluate.
///
/// Every run gets its own scratch directory, removed when the run ends.
pub struct AnalyzeVideoUseCase {
    acquire: AcquireAudioUseCase,
    transcribe: TranscribeAudioUseCase,
    classify: ClassifyAccentUseCase,
    evaluator: Box<dyn FluencyEvaluator>,
    registry: Arc<ModelRegistry>,
    work_root: Option<PathBuf>,
}

impl AnalyzeVideoUseCase {
    pub fn new(
        youtube: Box<dyn MediaDownloader>,
        direct: Box<dyn MediaDownloader>,
        transcoder: Arc<dyn Transcoder>,
        reader: Arc<dyn AudioReader>,
        evaluator: Box<dyn FluencyEvaluator>,
        registry: Arc<ModelRegistry>,
        config: &AnalysisConfig,
    ) -> Self {
        Self {
            acquire: AcquireAudioUseCase::new(youtube, direct, transcoder.clone()),
            transcribe: TranscribeAudioUseCase::new(
                reader.clone(),
                ThreadedTranscriber::new(config.transcription_timeout),
                config.max_audio_duration,
            ),
            classify: ClassifyAccentUseCase::new(
                transcoder,
                reader,
                config.classification_clip_secs,
            ),
            evaluator,
            registry,
            work_root: config.work_root.clone(),
        }
    }

    pub fn run(
        &self,
        input: &str,
        reporter: &mut dyn ProgressReporter,
    ) -> Result<AnalysisReport, AnalysisError> {
        // 1. Acquire and normalize
        reporter.stage_started(Stage::Acquire);
        let reference =
            MediaReference::parse(input).map_err(|e| fail(reporter, Stage::Acquire, e))?;
        log::info!("Input is a {}", reference.kind());

        let work_dir = self
            .create_work_dir()
            .map_err(|e| fail(reporter, Stage::Acquire, e))?;
        let audio_path = self
            .acquire
            .run(&reference, work_dir.path(), reporter)
            .map_err(|e| fail(reporter, Stage::Acquire, e))?;
        reporter.stage_succeeded(Stage::Acquire, "Audio downloaded and converted.");

        // 2. Transcribe
        reporter.stage_started(Stage::Transcribe);
        let recognizer = self.registry.speech_recognizer().map_err(|e| {
            let err = AnalysisError::Transcription(format!("failed to load speech model: {e}"));
            fail(reporter, Stage::Transcribe, err)
        })?;
        let transcript = self
            .transcribe
            .run(&audio_path, recognizer, reporter)
            .map_err(|e| fail(reporter, Stage::Transcribe, e))?;
        reporter.stage_succeeded(Stage::Transcribe, "Transcription completed.");

        // 3. Classify (never fatal)
        reporter.stage_started(Stage::Classify);
        let accent = self
            .classify
            .run(&audio_path, work_dir.path(), &self.registry, reporter);
        remove_quietly(&audio_path);

        // 4. Evaluate (never fatal)
        reporter.stage_started(Stage::Evaluate);
        let provider = self.evaluator.provider().to_string();
        let evaluation = self.evaluator.evaluate(&transcript);
        match &evaluation {
            Ok(_) => {
                reporter.stage_succeeded(Stage::Evaluate, &format!("{provider} response received."))
            }
            Err(e) => {
                log::warn!("{provider} evaluation failed: {e}");
                reporter.stage_failed(Stage::Evaluate, &format!("{provider} API error: {e}"));
            }
        }

        if let Err(e) = work_dir.close() {
            log::warn!("Failed to remove working directory: {e}");
        }

        Ok(AnalysisReport {
            transcript,
            accent,
            evaluation,
            provider,
        })
    }

    fn create_work_dir(&self) -> Result<TempDir, AnalysisError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("accentscope-");
        match &self.work_root {
            Some(root) => {
                fs::create_dir_all(root).map_err(|e| AnalysisError::io(root, e))?;
                builder.tempdir_in(root).map_err(|e| AnalysisError::io(root, e))
            }
            None => builder
                .tempdir()
                .map_err(|e| AnalysisError::io(std::env::temp_dir(), e)),
        }
    }
}

fn fail(reporter: &mut dyn ProgressReporter, stage: Stage, error: AnalysisError) -> AnalysisError {
    reporter.stage_failed(stage, &error.to_string());
    error
}

fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        log::debug!("Could not remove {}: {e}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::domain::audio_segment::AudioSegment;
    use crate::classification::domain::accent::{AccentPrediction, AccentResult};
    use crate::classification::domain::accent_classifier::AccentClassifier;
    use crate::evaluation::domain::fluency_evaluator::EvaluationError;
    use crate::pipeline::model_registry::LoadError;
    use crate::shared::test_support::write_wav;
    use crate::transcription::domain::speech_recognizer::{RecognizerError, SpeechRecognizer};
    use crate::transcription::domain::transcript::{Segment, TranscriptionResult};
    use approx::assert_relative_eq;
    use std::error::Error;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    // ─── Stubs ───

    #[derive(Clone, Default)]
    struct Calls {
        downloads: Arc<AtomicUsize>,
        normalizations: Arc<AtomicUsize>,
        evaluated: Arc<Mutex<Vec<String>>>,
    }

    struct StubDownloader {
        calls: Calls,
    }

    impl MediaDownloader for StubDownloader {
        fn download(&self, _: &str, work_dir: &Path) -> Result<PathBuf, AnalysisError> {
            self.calls.downloads.fetch_add(1, Ordering::SeqCst);
            let path = work_dir.join("temp_video.mp4");
            fs::write(&path, b"media").unwrap();
            Ok(path)
        }
    }

    struct StubTranscoder {
        calls: Calls,
    }

    impl Transcoder for StubTranscoder {
        fn normalize(&self, input: &Path, output: &Path) -> Result<(), AnalysisError> {
            self.calls.normalizations.fetch_add(1, Ordering::SeqCst);
            fs::copy(input, output).unwrap();
            Ok(())
        }

        fn trim(&self, input: &Path, output: &Path, _: u32) -> Result<(), AnalysisError> {
            fs::copy(input, output).unwrap();
            Ok(())
        }
    }

    struct StubReader;

    impl AudioReader for StubReader {
        fn read_audio(&self, path: &Path, rate: u32) -> Result<Option<AudioSegment>, Box<dyn Error>> {
            assert!(path.exists(), "{} should exist while being read", path.display());
            Ok(Some(AudioSegment::new(vec![0.0; rate as usize], rate, 1)))
        }

        fn audio_metadata(&self, _: &Path) -> Result<Option<(u32, u16)>, Box<dyn Error>> {
            Ok(Some((16000, 1)))
        }
    }

    struct StubRecognizer {
        texts: Vec<&'static str>,
        duration: f64,
        delay: Duration,
    }

    impl SpeechRecognizer for StubRecognizer {
        fn transcribe(
            &self,
            _: &AudioSegment,
            _: &Arc<AtomicBool>,
        ) -> Result<TranscriptionResult, RecognizerError> {
            std::thread::sleep(self.delay);
            let segments = self
                .texts
                .iter()
                .enumerate()
                .map(|(i, t)| Segment::new(*t, i as f64, i as f64 + 1.0))
                .collect();
            Ok(TranscriptionResult::new(segments, self.duration))
        }
    }

    struct StubClassifier {
        fail: bool,
    }

    impl AccentClassifier for StubClassifier {
        fn classify(&self, _: &AudioSegment) -> Result<Vec<AccentPrediction>, Box<dyn Error>> {
            if self.fail {
                return Err("session run failed".into());
            }
            Ok(vec![AccentPrediction::new("american", 0.82)])
        }
    }

    struct StubEvaluator {
        calls: Calls,
        response: Result<String, EvaluationError>,
    }

    impl FluencyEvaluator for StubEvaluator {
        fn evaluate(&self, transcript: &str) -> Result<String, EvaluationError> {
            self.calls.evaluated.lock().unwrap().push(transcript.to_string());
            self.response.clone()
        }

        fn provider(&self) -> &str {
            "Gemini"
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        events: Vec<String>,
    }

    impl ProgressReporter for RecordingReporter {
        fn stage_started(&mut self, stage: Stage) {
            self.events.push(format!("started {stage}"));
        }
        fn stage_progress(&mut self, _: Stage, _: f64) {}
        fn stage_succeeded(&mut self, stage: Stage, message: &str) {
            self.events.push(format!("ok {stage}: {message}"));
        }
        fn stage_failed(&mut self, stage: Stage, message: &str) {
            self.events.push(format!("failed {stage}: {message}"));
        }
        fn info(&mut self, _: &str) {}
        fn warn(&mut self, _: &str) {}
    }

    const EVALUATION: &str = "Fluency: 90%. Clear, well-paced speech with minor hesitations.";

    struct Scenario {
        texts: Vec<&'static str>,
        duration: f64,
        delay: Duration,
        timeout: Duration,
        classifier_fails: bool,
        evaluation: Result<String, EvaluationError>,
    }

    impl Default for Scenario {
        fn default() -> Self {
            Self {
                texts: vec!["Hello", "world"],
                duration: 2.0,
                delay: Duration::ZERO,
                timeout: Duration::from_secs(5),
                classifier_fails: false,
                evaluation: Ok(EVALUATION.to_string()),
            }
        }
    }

    struct Harness {
        use_case: AnalyzeVideoUseCase,
        calls: Calls,
        work_root: TempDir,
    }

    fn harness(scenario: Scenario) -> Harness {
        let calls = Calls::default();
        let work_root = TempDir::new().unwrap();
        let config = AnalysisConfig {
            transcription_timeout: scenario.timeout,
            work_root: Some(work_root.path().to_path_buf()),
            ..AnalysisConfig::default()
        };
        let registry = ModelRegistry::preloaded(
            Arc::new(StubRecognizer {
                texts: scenario.texts,
                duration: scenario.duration,
                delay: scenario.delay,
            }),
            Arc::new(StubClassifier {
                fail: scenario.classifier_fails,
            }),
        );
        let use_case = AnalyzeVideoUseCase::new(
            Box::new(StubDownloader { calls: calls.clone() }),
            Box::new(StubDownloader { calls: calls.clone() }),
            Arc::new(StubTranscoder { calls: calls.clone() }),
            Arc::new(StubReader),
            Box::new(StubEvaluator {
                calls: calls.clone(),
                response: scenario.evaluation,
            }),
            Arc::new(registry),
            &config,
        );
        Harness {
            use_case,
            calls,
            work_root,
        }
    }

    fn local_wav(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("interview.wav");
        write_wav(&path, 16000, 1, 0.5);
        path
    }

    fn work_root_is_empty(h: &Harness) -> bool {
        fs::read_dir(h.work_root.path()).unwrap().next().is_none()
    }

    #[test]
    fn test_local_file_happy_path() {
        let h = harness(Scenario::default());
        let user_dir = TempDir::new().unwrap();
        let input = local_wav(&user_dir);
        let mut reporter = RecordingReporter::default();

        let report = h
            .use_case
            .run(input.to_str().unwrap(), &mut reporter)
            .unwrap();

        assert_eq!(report.transcript, "Hello\nworld\n");
        assert_eq!(report.accent.label(), "american");
        assert_relative_eq!(report.accent.confidence(), 0.82, epsilon = 1e-6);
        assert_eq!(report.evaluation, Ok(EVALUATION.to_string()));
        assert_eq!(report.evaluation_text(), EVALUATION);
        assert_eq!(*h.calls.evaluated.lock().unwrap(), vec!["Hello\nworld\n"]);
        assert_eq!(h.calls.downloads.load(Ordering::SeqCst), 0);
        assert!(input.exists());
        assert!(work_root_is_empty(&h));
        assert_eq!(
            reporter.events,
            vec![
                "started acquire",
                "ok acquire: Audio downloaded and converted.",
                "started transcribe",
                "ok transcribe: Transcription completed.",
                "started classify",
                "ok classify: Accent: American (82.00%)",
                "started evaluate",
                "ok evaluate: Gemini response received.",
            ]
        );
    }

    #[test]
    fn test_unsupported_scheme_fails_before_any_io() {
        let h = harness(Scenario::default());
        let mut reporter = RecordingReporter::default();

        let err = h
            .use_case
            .run("ftp://example.com/talk.mp4", &mut reporter)
            .unwrap_err();

        assert!(matches!(err, AnalysisError::Input(_)));
        assert_eq!(h.calls.downloads.load(Ordering::SeqCst), 0);
        assert_eq!(h.calls.normalizations.load(Ordering::SeqCst), 0);
        assert!(work_root_is_empty(&h));
        assert_eq!(reporter.events.len(), 2);
        assert!(reporter.events[1].starts_with("failed acquire"));
    }

    #[test]
    fn test_over_long_audio_aborts_the_run() {
        let h = harness(Scenario {
            duration: 301.0,
            ..Scenario::default()
        });
        let user_dir = TempDir::new().unwrap();
        let input = local_wav(&user_dir);
        let mut reporter = RecordingReporter::default();

        let err = h
            .use_case
            .run(input.to_str().unwrap(), &mut reporter)
            .unwrap_err();

        assert!(matches!(err, AnalysisError::Duration { .. }));
        assert!(h.calls.evaluated.lock().unwrap().is_empty());
        assert!(work_root_is_empty(&h));
        assert!(reporter
            .events
            .last()
            .unwrap()
            .starts_with("failed transcribe: audio is too long"));
    }

    #[test]
    fn test_direct_url_downloads_into_scratch_dir_and_cleans_up() {
        let h = harness(Scenario::default());

        let report = h
            .use_case
            .run("https://example.com/talk.mp4", &mut RecordingReporter::default())
            .unwrap();

        assert_eq!(report.transcript, "Hello\nworld\n");
        assert_eq!(h.calls.downloads.load(Ordering::SeqCst), 1);
        assert_eq!(h.calls.normalizations.load(Ordering::SeqCst), 1);
        assert!(work_root_is_empty(&h));
    }

    #[test]
    fn test_classifier_failure_does_not_abort() {
        let h = harness(Scenario {
            classifier_fails: true,
            ..Scenario::default()
        });
        let mut reporter = RecordingReporter::default();

        let report = h
            .use_case
            .run("https://example.com/talk.mp4", &mut reporter)
            .unwrap();

        assert_eq!(report.accent, AccentResult::unknown());
        assert_eq!(report.evaluation, Ok(EVALUATION.to_string()));
        assert!(reporter
            .events
            .iter()
            .any(|e| e.starts_with("failed classify: Accent classification failed")));
    }

    #[test]
    fn test_evaluation_failure_is_kept_in_the_report() {
        let error = EvaluationError::Status {
            status: 403,
            body: "API key not valid".to_string(),
        };
        let h = harness(Scenario {
            evaluation: Err(error.clone()),
            ..Scenario::default()
        });
        let mut reporter = RecordingReporter::default();

        let report = h
            .use_case
            .run("https://example.com/talk.mp4", &mut reporter)
            .unwrap();

        assert_eq!(report.transcript, "Hello\nworld\n");
        assert_eq!(report.evaluation, Err(error));
        assert_eq!(
            report.evaluation_text(),
            "Gemini API error: HTTP 403: API key not valid"
        );
        assert_eq!(
            reporter.events.last().unwrap(),
            "failed evaluate: Gemini API error: HTTP 403: API key not valid"
        );
    }

    #[test]
    fn test_empty_transcript_aborts_the_run() {
        let h = harness(Scenario {
            texts: vec![],
            ..Scenario::default()
        });

        let err = h
            .use_case
            .run("https://example.com/talk.mp4", &mut RecordingReporter::default())
            .unwrap_err();

        assert!(matches!(err, AnalysisError::EmptyTranscript));
        assert!(h.calls.evaluated.lock().unwrap().is_empty());
    }

    #[test]
    fn test_slow_recognizer_times_out() {
        let h = harness(Scenario {
            delay: Duration::from_secs(2),
            timeout: Duration::from_millis(100),
            ..Scenario::default()
        });
        let start = Instant::now();

        let err = h
            .use_case
            .run("https://example.com/talk.mp4", &mut RecordingReporter::default())
            .unwrap_err();

        assert!(matches!(err, AnalysisError::Timeout(_)));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_speech_model_load_failure_is_fatal() {
        let work_root = TempDir::new().unwrap();
        let config = AnalysisConfig {
            work_root: Some(work_root.path().to_path_buf()),
            ..AnalysisConfig::default()
        };
        let calls = Calls::default();
        let registry = ModelRegistry::new(
            || -> Result<Arc<dyn SpeechRecognizer>, LoadError> { Err("ggml-tiny.bin missing".into()) },
            || -> Result<Arc<dyn AccentClassifier>, LoadError> {
                Ok(Arc::new(StubClassifier { fail: false }))
            },
        );
        let use_case = AnalyzeVideoUseCase::new(
            Box::new(StubDownloader { calls: calls.clone() }),
            Box::new(StubDownloader { calls: calls.clone() }),
            Arc::new(StubTranscoder { calls: calls.clone() }),
            Arc::new(StubReader),
            Box::new(StubEvaluator {
                calls: calls.clone(),
                response: Ok(String::new()),
            }),
            Arc::new(registry),
            &config,
        );

        let err = use_case
            .run("https://example.com/talk.mp4", &mut RecordingReporter::default())
            .unwrap_err();

        assert!(matches!(err, AnalysisError::Transcription(ref m) if m.contains("ggml-tiny.bin")));
    }
}
