/// One entry of a classifier's ranked output.
#[derive(Clone, Debug, PartialEq)]
pub struct AccentPrediction {
    pub label: String,
    pub score: f32,
}

impl AccentPrediction {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

pub const UNKNOWN_ACCENT: &str = "Unknown";

/// The accent reported for a run: a label and a confidence in [0, 1].
#[derive(Clone, Debug, PartialEq)]
pub struct AccentResult {
    label: String,
    confidence: f64,
}

impl AccentResult {
    /// Confidence is clamped into [0, 1]; NaN becomes 0.
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            label: label.into(),
            confidence,
        }
    }

    /// Fallback used whenever classification fails.
    pub fn unknown() -> Self {
        Self::new(UNKNOWN_ACCENT, 0.0)
    }

    /// Top entry of a ranking, trusting the classifier's own order.
    pub fn from_ranking(ranking: &[AccentPrediction]) -> Option<Self> {
        ranking
            .first()
            .map(|top| Self::new(top.label.clone(), top.score as f64))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn is_unknown(&self) -> bool {
        self.label == UNKNOWN_ACCENT && self.confidence == 0.0
    }

    /// `"American (82.00%)"`: label capitalized, confidence as a percentage.
    pub fn display(&self) -> String {
        format!(
            "{} ({:.2}%)",
            capitalize(&self.label),
            self.confidence * 100.0
        )
    }
}

/// Uppercase the first character and lowercase the rest.
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
