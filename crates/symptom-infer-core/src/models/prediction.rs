//! Ranked condition predictions.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Condition, ConditionInfo, Severity};

/// Where a prediction came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PredictionSource {
    /// The pluggable text classifier
    Classifier,
    /// Symptom overlap against the knowledge base
    Overlap,
}

impl fmt::Display for PredictionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictionSource::Classifier => write!(f, "Classifier"),
            PredictionSource::Overlap => write!(f, "Symptom Analysis"),
        }
    }
}

/// Whether condition details could be attached to a prediction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConditionDetails {
    /// The predicted condition exists in the knowledge base
    Available(ConditionInfo),
    /// No matching condition, or details suppressed by fusion policy
    NotApplicable,
}

/// A single ranked candidate condition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prediction {
    pub condition: String,
    /// Confidence (0.0 - 1.0)
    pub confidence: f64,
    pub source: PredictionSource,
    /// Reported symptoms the condition explains (empty for classifier predictions)
    pub matched_symptoms: BTreeSet<String>,
    pub details: ConditionDetails,
}

impl Prediction {
    /// Overlap-sourced prediction for a knowledge base condition.
    pub fn from_overlap(condition: &Condition, confidence: f64, matched: BTreeSet<String>) -> Self {
        Self {
            condition: condition.name.clone(),
            confidence,
            source: PredictionSource::Overlap,
            matched_symptoms: matched,
            details: ConditionDetails::Available(condition.info()),
        }
    }

    /// Classifier-sourced prediction, optionally enriched from the knowledge base.
    pub fn from_classifier(label: &str, confidence: f64, condition: Option<&Condition>) -> Self {
        Self {
            condition: label.to_string(),
            confidence,
            source: PredictionSource::Classifier,
            matched_symptoms: BTreeSet::new(),
            details: condition
                .map(|c| ConditionDetails::Available(c.info()))
                .unwrap_or(ConditionDetails::NotApplicable),
        }
    }

    pub fn severity(&self) -> Option<Severity> {
        match &self.details {
            ConditionDetails::Available(info) => Some(info.severity),
            ConditionDetails::NotApplicable => None,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match &self.details {
            ConditionDetails::Available(info) => Some(&info.description),
            ConditionDetails::NotApplicable => None,
        }
    }

    pub fn recommendation(&self) -> Option<&str> {
        match &self.details {
            ConditionDetails::Available(info) => Some(&info.recommendation),
            ConditionDetails::NotApplicable => None,
        }
    }

    /// Confidence formatted as a percentage with one decimal ("40.0%").
    pub fn confidence_percent(&self) -> String {
        format!("{:.1}%", self.confidence * 100.0)
    }
}

/// Stable sort by confidence, highest first. Ties keep insertion order.
pub fn rank_predictions(predictions: &mut [Prediction]) {
    predictions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
}
