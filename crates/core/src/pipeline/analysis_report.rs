use crate::classification::domain::accent::AccentResult;
use crate::evaluation::domain::fluency_evaluator::EvaluationError;

/// Everything a successful run produces.
///
/// The evaluation keeps its error so callers decide how to show it.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub transcript: String,
    pub accent: AccentResult,
    pub evaluation: Result<String, EvaluationError>,
    pub provider: String,
}

impl AnalysisReport {
    /// The evaluation as shown to the user, e.g. `"Gemini API error: HTTP 403: ..."`.
    pub fn evaluation_text(&self) -> String {
        match &self.evaluation {
            Ok(text) => text.clone(),
            Err(e) => format!("{} API error: {e}", self.provider),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(evaluation: Result<String, EvaluationError>) -> AnalysisReport {
        AnalysisReport {
            transcript: "Hello\n".to_string(),
            accent: AccentResult::unknown(),
            evaluation,
            provider: "Gemini".to_string(),
        }
    }

    #[test]
    fn test_successful_evaluation_is_shown_verbatim() {
        let r = report(Ok("Fluency: 85%".to_string()));
        assert_eq!(r.evaluation_text(), "Fluency: 85%");
    }

    #[test]
    fn test_failed_evaluation_is_prefixed_with_provider() {
        let r = report(Err(EvaluationError::Status {
            status: 403,
            body: "API key not valid".to_string(),
        }));
        assert_eq!(
            r.evaluation_text(),
            "Gemini API error: HTTP 403: API key not valid"
        );
    }
}
