use thiserror::Error;

/// Why the remote evaluation produced no text. Never fatal to a run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response: {0}")]
    MalformedResponse(String),
}

/// Domain interface for the remote fluency evaluation.
pub trait FluencyEvaluator: Send + Sync {
    /// Rate the transcript; the returned text is free-form model output.
    fn evaluate(&self, transcript: &str) -> Result<String, EvaluationError>;

    /// Short provider name used in user-facing messages.
    fn provider(&self) -> &str;
}
