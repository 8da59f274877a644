//! Accent classifier using ONNX Runtime via `ort`.
//!
//! Expects a wav2vec2-style sequence-classification export: raw mono 16 kHz
//! waveform in (`[1, samples]`, f32), logits out (`[1, num_labels]`).

use std::path::Path;
use std::sync::Mutex;

use crate::audio::domain::audio_segment::AudioSegment;
use crate::classification::domain::accent::AccentPrediction;
use crate::classification::domain::accent_classifier::AccentClassifier;

use super::label_map::load_labels;

/// Keeps the feature extractor's normalization from dividing by zero.
const NORM_EPSILON: f32 = 1e-7;

pub struct OnnxAccentClassifier {
    session: Mutex<ort::session::Session>,
    labels: Vec<String>,
}

impl OnnxAccentClassifier {
    pub fn new(model_path: &Path, labels_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if !model_path.exists() {
            return Err(format!("Accent model not found at: {}", model_path.display()).into());
        }
        let labels = load_labels(labels_path)?;
        let session = ort::session::Session::builder()?.commit_from_file(model_path)?;

        log::info!(
            "Loaded accent model from {} ({} labels)",
            model_path.display(),
            labels.len()
        );

        Ok(Self {
            session: Mutex::new(session),
            labels,
        })
    }
}

impl AccentClassifier for OnnxAccentClassifier {
    fn classify(
        &self,
        audio: &AudioSegment,
    ) -> Result<Vec<AccentPrediction>, Box<dyn std::error::Error>> {
        if audio.is_empty() {
            return Err("Cannot classify empty audio".into());
        }

        let waveform = normalize_waveform(audio.samples());
        let len = waveform.len();
        let input = ndarray::Array2::from_shape_vec((1, len), waveform)?;
        let input_value = ort::value::Tensor::from_array(input)?;

        let logits = {
            let mut session = self
                .session
                .lock()
                .map_err(|_| "Accent model session poisoned")?;
            let outputs = session.run(ort::inputs![input_value])?;
            if outputs.len() == 0 {
                return Err("Accent model produced no outputs".into());
            }
            let tensor = outputs[0].try_extract_array::<f32>()?;
            tensor.iter().copied().collect::<Vec<f32>>()
        };

        if logits.len() != self.labels.len() {
            return Err(format!(
                "Accent model produced {} logits for {} labels",
                logits.len(),
                self.labels.len()
            )
            .into());
        }

        Ok(rank(&softmax(&logits), &self.labels))
    }
}

/// Zero-mean, unit-variance scaling as done by the wav2vec2 feature extractor.
fn normalize_waveform(samples: &[f32]) -> Vec<f32> {
    let n = samples.len() as f32;
    let mean = samples.iter().sum::<f32>() / n;
    let variance = samples.iter().map(|s| (s - mean).powi(2)).sum::<f32>() / n;
    let std = (variance + NORM_EPSILON).sqrt();
    samples.iter().map(|s| (s - mean) / std).collect()
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|e| e / sum).collect()
}

/// Pair scores with labels, best first. Ties keep label order.
fn rank(scores: &[f32], labels: &[String]) -> Vec<AccentPrediction> {
    let mut ranking: Vec<AccentPrediction> = labels
        .iter()
        .zip(scores)
        .map(|(label, score)| AccentPrediction::new(label.clone(), *score))
        .collect();
    ranking.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranking
}
