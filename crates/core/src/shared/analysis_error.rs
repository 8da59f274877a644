use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Fatal failures of an analysis run. Any of these aborts the pipeline.
///
/// Accent classification and fluency evaluation have their own error types
/// and never surface here: they degrade to fallback values instead.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("unsupported input: {0}")]
    Input(String),
    #[error("download failed: {0}")]
    Download(String),
    #[error("{message}:\n{diagnostics}")]
    Transcode { message: String, diagnostics: String },
    #[error("transcription timed out after {0:?}")]
    Timeout(Duration),
    #[error("audio is too long ({duration:.1}s); please use a clip under {limit:.0}s")]
    Duration { duration: f64, limit: f64 },
    #[error("transcription failed: {0}")]
    Transcription(String),
    #[error("transcription returned empty text")]
    EmptyTranscript,
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AnalysisError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
