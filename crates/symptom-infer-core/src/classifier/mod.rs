//! Pluggable text classifier: raw text → (label, confidence).
//!
//! The engine only sees the [`Classifier`] trait. Variants:
//! - [`RuleTableClassifier`]: symptom co-occurrence rules
//! - [`TrainedModelClassifier`]: adapter over a statistical text model
//! - [`NullClassifier`]: no signal
//! - [`TimeoutClassifier`]: bounds the latency of any of the above

mod rules;
mod timeout;
mod trained;

pub use rules::*;
pub use timeout::*;
pub use trained::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classifier errors. Always recovered by the engine.
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Classifier timed out after {0} ms")]
    Timeout(u64),

    #[error("Classifier unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid classifier output: {0}")]
    InvalidOutput(String),

    #[error("Model error: {0}")]
    Model(#[from] symptom_infer_model::ModelError),
}

pub type ClassifierResult<T> = Result<T, ClassifierError>;

/// A classifier's single best guess.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Classification {
    pub label: String,
    /// Confidence (0.0 - 1.0)
    pub confidence: f64,
}

impl Classification {
    /// Build a classification, rejecting confidences outside [0, 1].
    pub fn checked(label: &str, confidence: f64) -> ClassifierResult<Self> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ClassifierError::InvalidOutput(format!(
                "confidence {} for {}",
                confidence, label
            )));
        }
        Ok(Self {
            label: label.to_string(),
            confidence,
        })
    }

    /// The "nothing identified" result.
    pub fn no_condition(sentinel: &str, confidence: f64) -> Self {
        Self {
            label: sentinel.to_string(),
            confidence,
        }
    }

    pub fn is_no_condition(&self, sentinel: &str) -> bool {
        self.label == sentinel
    }
}

/// Maps raw utterance text to a single labelled guess.
pub trait Classifier: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    fn classify(&self, text: &str) -> ClassifierResult<Classification>;
}

/// Classifier that never identifies anything.
#[derive(Debug, Clone)]
pub struct NullClassifier {
    sentinel: String,
}

impl NullClassifier {
    pub fn new(sentinel: &str) -> Self {
        Self {
            sentinel: sentinel.to_string(),
        }
    }
}

impl Classifier for NullClassifier {
    fn name(&self) -> &str {
        "disabled"
    }

    fn classify(&self, _text: &str) -> ClassifierResult<Classification> {
        Ok(Classification::no_condition(&self.sentinel, 0.0))
    }
}
