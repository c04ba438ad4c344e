//! Adapter over the statistical text model.

use std::path::Path;

use symptom_infer_model::LinearTextModel;

use super::{Classification, Classifier, ClassifierResult};

/// Exposes a [`LinearTextModel`] through the classifier contract.
pub struct TrainedModelClassifier {
    model: LinearTextModel,
}

impl TrainedModelClassifier {
    pub fn new(model: LinearTextModel) -> Self {
        Self { model }
    }

    /// Load model weights from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ClassifierResult<Self> {
        Ok(Self::new(LinearTextModel::from_file(path)?))
    }
}

impl Classifier for TrainedModelClassifier {
    fn name(&self) -> &str {
        "trained-model"
    }

    fn classify(&self, text: &str) -> ClassifierResult<Classification> {
        let output = self.model.predict(text);
        Classification::checked(&output.label, output.confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassifierError;

    const MODEL_JSON: &str = r#"{
        "labels": ["Influenza", "No Disease"],
        "vocabulary": ["fever", "fine"],
        "weights": [[3.0, -2.0], [-2.0, 3.0]],
        "bias": [0.0, 0.0]
    }"#;

    #[test]
    fn test_adapter_reports_softmax_confidence() {
        let model = LinearTextModel::from_json(MODEL_JSON).unwrap();
        let classifier = TrainedModelClassifier::new(model);

        let out = classifier.classify("high fever").unwrap();
        assert_eq!(out.label, "Influenza");
        // softmax([3, -2]) for the winning class
        let expected = 1.0 / (1.0 + (-5.0f64).exp());
        assert!((out.confidence - expected).abs() < 1e-9);

        let out = classifier.classify("I am fine").unwrap();
        assert!(out.is_no_condition("No Disease"));
    }

    #[test]
    fn test_missing_model_file() {
        let result = TrainedModelClassifier::from_file("/nonexistent/model.json");
        assert!(matches!(result, Err(ClassifierError::Model(_))));
    }
}
