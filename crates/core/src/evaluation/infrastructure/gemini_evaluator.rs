use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::evaluation::domain::fluency_evaluator::{EvaluationError, FluencyEvaluator};
use crate::evaluation::domain::fluency_prompt::build_prompt;
use crate::shared::constants::{
    GEMINI_ENDPOINT, GEMINI_MODEL, GEMINI_REQUEST_TIMEOUT_SECS, PROMPT_CHAR_LIMIT,
};

/// Connection settings for the Gemini `generateContent` API.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    /// API base, e.g. `https://generativelanguage.googleapis.com/v1beta`.
    pub endpoint: String,
    pub model: String,
    pub timeout: Duration,
    /// Transcript prefix length embedded in the prompt.
    pub prompt_char_limit: usize,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: GEMINI_ENDPOINT.to_string(),
            model: GEMINI_MODEL.to_string(),
            timeout: Duration::from_secs(GEMINI_REQUEST_TIMEOUT_SECS),
            prompt_char_limit: PROMPT_CHAR_LIMIT,
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Serialize, Deserialize, Debug, Default)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Serialize, Deserialize, Debug, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Debug)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Deserialize, Debug)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// `candidates[0].content.parts[0].text`
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()
            .map(|part| part.text)
    }
}

/// Fluency evaluator backed by Google's Gemini text-generation API.
///
/// One blocking POST per call; the API key travels in the query string and
/// is kept out of logs and error messages.
pub struct GeminiEvaluator {
    config: GeminiConfig,
    client: reqwest::blocking::Client,
}

impl GeminiEvaluator {
    pub fn new(config: GeminiConfig) -> Result<Self, EvaluationError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EvaluationError::Transport(e.without_url().to_string()))?;
        Ok(Self { config, client })
    }
}

impl FluencyEvaluator for GeminiEvaluator {
    fn evaluate(&self, transcript: &str) -> Result<String, EvaluationError> {
        let prompt = build_prompt(transcript, self.config.prompt_char_limit);
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let url = self.config.url();
        log::debug!("POST {url}?key=<redacted>");

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .map_err(|e| EvaluationError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(EvaluationError::Status {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .map_err(|e| EvaluationError::MalformedResponse(e.without_url().to_string()))?;

        parsed.first_text().ok_or_else(|| {
            EvaluationError::MalformedResponse(
                "no text at candidates[0].content.parts[0]".to_string(),
            )
        })
    }

    fn provider(&self) -> &str {
        "Gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_support::{request_body, MockHttpServer};

    const OK_RESPONSE: &str = r#"{
        "candidates": [
            {"content": {"parts": [{"text": "Fluency: 85%. Clear and confident."}], "role": "model"}}
        ]
    }"#;

    fn evaluator_for(server: &MockHttpServer) -> GeminiEvaluator {
        let mut config = GeminiConfig::new("test-key");
        config.endpoint = server.url("/v1beta");
        config.timeout = Duration::from_secs(5);
        GeminiEvaluator::new(config).unwrap()
    }

    fn sent_prompt(request: &str) -> String {
        let json: serde_json::Value = serde_json::from_str(request_body(request)).unwrap();
        json["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_returns_first_candidate_text() {
        let server = MockHttpServer::respond(200, "application/json", OK_RESPONSE.as_bytes());
        let text = evaluator_for(&server).evaluate("Hello\nworld\n").unwrap();
        assert_eq!(text, "Fluency: 85%. Clear and confident.");
    }

    #[test]
    fn test_request_shape_and_key_in_query() {
        let server = MockHttpServer::respond(200, "application/json", OK_RESPONSE.as_bytes());
        evaluator_for(&server).evaluate("Hello\nworld\n").unwrap();

        let request = server.request();
        let request_line = request.lines().next().unwrap();
        assert!(
            request_line.starts_with("POST /v1beta/models/gemini-2.0-flash:generateContent?key=test-key "),
            "got: {request_line}"
        );
        assert!(sent_prompt(&request).contains("Transcript:\nHello\nworld\n"));
    }

    #[test]
    fn test_only_transcript_prefix_is_sent() {
        let server = MockHttpServer::respond(200, "application/json", OK_RESPONSE.as_bytes());
        let transcript = format!("{}{}", "a".repeat(1500), "Z".repeat(500));

        evaluator_for(&server).evaluate(&transcript).unwrap();

        let prompt = sent_prompt(&server.request());
        assert!(prompt.contains(&"a".repeat(1500)));
        assert!(!prompt.contains('Z'));
    }

    #[test]
    fn test_extended_prefix_variant() {
        let server = MockHttpServer::respond(200, "application/json", OK_RESPONSE.as_bytes());
        let mut config = GeminiConfig::new("test-key");
        config.endpoint = server.url("/v1beta");
        config.prompt_char_limit = crate::shared::constants::EXTENDED_PROMPT_CHAR_LIMIT;
        let transcript = format!("{}{}", "a".repeat(3000), "Z");

        GeminiEvaluator::new(config)
            .unwrap()
            .evaluate(&transcript)
            .unwrap();

        let prompt = sent_prompt(&server.request());
        assert!(prompt.contains(&"a".repeat(3000)));
        assert!(!prompt.contains('Z'));
    }

    #[test]
    fn test_http_error_status() {
        let server = MockHttpServer::respond(403, "application/json", br#"{"error": "bad key"}"#);
        let err = evaluator_for(&server).evaluate("hi").unwrap_err();
        assert_eq!(
            err,
            EvaluationError::Status {
                status: 403,
                body: r#"{"error": "bad key"}"#.to_string()
            }
        );
    }

    #[test]
    fn test_missing_candidates_is_malformed() {
        let server = MockHttpServer::respond(200, "application/json", b"{}");
        let err = evaluator_for(&server).evaluate("hi").unwrap_err();
        assert!(matches!(err, EvaluationError::MalformedResponse(_)));
    }

    #[test]
    fn test_non_json_body_is_malformed() {
        let server = MockHttpServer::respond(200, "text/html", b"<html>oops</html>");
        let err = evaluator_for(&server).evaluate("hi").unwrap_err();
        assert!(matches!(err, EvaluationError::MalformedResponse(_)));
    }

    #[test]
    fn test_transport_error_does_not_leak_key() {
        let mut config = GeminiConfig::new("super-secret-key");
        config.endpoint = "http://127.0.0.1:1/v1beta".to_string();
        config.timeout = Duration::from_secs(5);
        let err = GeminiEvaluator::new(config)
            .unwrap()
            .evaluate("hi")
            .unwrap_err();
        assert!(matches!(err, EvaluationError::Transport(_)));
        assert!(!err.to_string().contains("super-secret-key"));
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        let mut config = GeminiConfig::new("k");
        config.endpoint = "https://example.com/v1beta/".to_string();
        assert_eq!(
            config.url(),
            "https://example.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }
}
