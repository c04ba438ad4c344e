//! Linear bag-of-words classifier with softmax output.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::preprocess::Vocabulary;

/// Model errors.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid model shape: {0}")]
    InvalidShape(String),
}

pub type ModelResult<T> = Result<T, ModelError>;

/// Serialized model parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ModelParams {
    labels: Vec<String>,
    vocabulary: Vocabulary,
    /// One row per label, one column per vocabulary word
    weights: Vec<Vec<f64>>,
    /// One intercept per label
    bias: Vec<f64>,
}

/// Prediction for a single text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelOutput {
    /// Highest-probability label
    pub label: String,
    /// Probability of `label` (0.0 - 1.0)
    pub confidence: f64,
    /// Probability for every label, in model label order
    pub probabilities: Vec<f64>,
}

/// Multinomial logistic regression over word counts.
#[derive(Debug, Clone)]
pub struct LinearTextModel {
    params: ModelParams,
}

impl LinearTextModel {
    /// Build a model from parts, validating dimensions.
    pub fn new(
        labels: Vec<String>,
        vocabulary: Vocabulary,
        weights: Vec<Vec<f64>>,
        bias: Vec<f64>,
    ) -> ModelResult<Self> {
        Self::validated(ModelParams {
            labels,
            vocabulary,
            weights,
            bias,
        })
    }

    /// Parse model parameters from JSON.
    pub fn from_json(json: &str) -> ModelResult<Self> {
        let params: ModelParams = serde_json::from_str(json)?;
        Self::validated(params)
    }

    /// Load model parameters from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ModelResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let model = Self::from_json(&json)?;
        tracing::info!(
            path = %path.as_ref().display(),
            labels = model.labels().len(),
            vocabulary = model.params.vocabulary.len(),
            "loaded text model"
        );
        Ok(model)
    }

    fn validated(mut params: ModelParams) -> ModelResult<Self> {
        params.vocabulary = params.vocabulary.reindex();

        if params.labels.is_empty() {
            return Err(ModelError::InvalidShape("model has no labels".into()));
        }
        if params.weights.len() != params.labels.len() {
            return Err(ModelError::InvalidShape(format!(
                "{} weight rows for {} labels",
                params.weights.len(),
                params.labels.len()
            )));
        }
        if params.bias.len() != params.labels.len() {
            return Err(ModelError::InvalidShape(format!(
                "{} bias terms for {} labels",
                params.bias.len(),
                params.labels.len()
            )));
        }
        let width = params.vocabulary.len();
        if let Some((i, row)) = params
            .weights
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != width)
        {
            return Err(ModelError::InvalidShape(format!(
                "weight row {} has {} columns, vocabulary has {}",
                i,
                row.len(),
                width
            )));
        }
        let all_finite = params
            .weights
            .iter()
            .flatten()
            .chain(params.bias.iter())
            .all(|w| w.is_finite());
        if !all_finite {
            return Err(ModelError::InvalidShape("non-finite parameter".into()));
        }

        Ok(Self { params })
    }

    /// Labels in model order.
    pub fn labels(&self) -> &[String] {
        &self.params.labels
    }

    /// Predict the most probable label for a text.
    pub fn predict(&self, text: &str) -> ModelOutput {
        let features = self.params.vocabulary.encode(text);

        let logits: Vec<f64> = self
            .params
            .weights
            .iter()
            .zip(&self.params.bias)
            .map(|(row, b)| row.iter().zip(&features).map(|(w, x)| w * x).sum::<f64>() + b)
            .collect();

        let probabilities = softmax(&logits);

        // First maximum wins on ties
        let mut best = 0;
        for (i, p) in probabilities.iter().enumerate() {
            if *p > probabilities[best] {
                best = i;
            }
        }

        ModelOutput {
            label: self.params.labels[best].clone(),
            confidence: probabilities[best],
            probabilities,
        }
    }
}

/// Numerically stable softmax.
pub fn softmax(logits: &[f64]) -> Vec<f64> {
    if logits.is_empty() {
        return Vec::new();
    }
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const MODEL_JSON: &str = r#"{
        "labels": ["Influenza", "Common Cold", "No Disease"],
        "vocabulary": ["fever", "aches", "sneezing", "fine"],
        "weights": [
            [2.0, 1.5, 0.0, -1.0],
            [0.2, 0.0, 2.5, -1.0],
            [-1.0, -1.0, -1.0, 3.0]
        ],
        "bias": [0.0, 0.0, 0.5]
    }"#;

    #[test]
    fn test_predict_picks_highest_logit() {
        let model = LinearTextModel::from_json(MODEL_JSON).unwrap();

        let out = model.predict("I have a fever and body aches");
        assert_eq!(out.label, "Influenza");
        assert!(out.confidence > 0.9);

        let out = model.predict("Lots of sneezing");
        assert_eq!(out.label, "Common Cold");

        let out = model.predict("I feel fine");
        assert_eq!(out.label, "No Disease");
    }

    #[test]
    fn test_unknown_words_fall_back_to_bias() {
        let model = LinearTextModel::from_json(MODEL_JSON).unwrap();
        let out = model.predict("zzz qqq");
        assert_eq!(out.label, "No Disease");
        assert!((out.probabilities.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let json = r#"{"labels":["A","B"],"vocabulary":["x"],"weights":[[1.0]],"bias":[0.0,0.0]}"#;
        assert!(matches!(
            LinearTextModel::from_json(json),
            Err(ModelError::InvalidShape(_))
        ));

        let json = r#"{"labels":["A"],"vocabulary":["x","y"],"weights":[[1.0]],"bias":[0.0]}"#;
        assert!(matches!(
            LinearTextModel::from_json(json),
            Err(ModelError::InvalidShape(_))
        ));

        let json = r#"{"labels":[],"vocabulary":[],"weights":[],"bias":[]}"#;
        assert!(matches!(
            LinearTextModel::from_json(json),
            Err(ModelError::InvalidShape(_))
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            LinearTextModel::from_json("{not json"),
            Err(ModelError::JsonParse(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, MODEL_JSON).unwrap();

        let model = LinearTextModel::from_file(&path).unwrap();
        assert_eq!(model.labels().len(), 3);

        assert!(matches!(
            LinearTextModel::from_file(dir.path().join("missing.json")),
            Err(ModelError::Io(_))
        ));
    }

    #[test]
    fn test_softmax_stable_for_large_logits() {
        let p = softmax(&[1000.0, 1000.0]);
        assert!((p[0] - 0.5).abs() < 1e-12);
        assert!(softmax(&[]).is_empty());
    }

    proptest! {
        #[test]
        fn prop_softmax_is_distribution(logits in proptest::collection::vec(-50.0f64..50.0, 1..8)) {
            let p = softmax(&logits);
            prop_assert_eq!(p.len(), logits.len());
            prop_assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            prop_assert!(p.iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }
}
