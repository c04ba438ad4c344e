//! Response returned for one utterance.

use serde::{Deserialize, Serialize};

use super::{Prediction, SymptomSet};

/// Which composition branch produced a response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    /// Emergency symptom reported; prediction logic skipped
    Emergency,
    /// No recognizable symptoms; asks the user to describe them
    NeedsSymptoms,
    /// Top prediction above the high-confidence threshold
    Assertive,
    /// Several possibilities listed with confidences
    Differential,
    /// Symptoms found but no qualifying candidate
    NeedsDetail,
}

/// How long the user says symptoms have lasted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SymptomDuration {
    pub value: u32,
    /// Unit as written ("day", "weeks", ...)
    pub unit: String,
}

/// Reported intensity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Mild,
    #[default]
    Moderate,
    Severe,
}

/// Reported frequency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Constant,
    Intermittent,
    Occasional,
    Frequent,
    Rare,
    #[default]
    Unknown,
}

/// Free-text qualifiers around the symptoms. Informational only.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SymptomContext {
    pub duration: Option<SymptomDuration>,
    pub intensity: Intensity,
    pub frequency: Frequency,
}

/// Structured reply for one utterance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Response {
    pub kind: ResponseKind,
    pub message: String,
    /// Ranked predictions retained for display
    pub predictions: Vec<Prediction>,
    pub extracted_symptoms: SymptomSet,
    /// Top prediction's confidence, or 0
    pub confidence: f64,
    /// Top prediction's recommendation when asserted, or empty
    pub recommendation: String,
    pub emergency: bool,
    pub context: SymptomContext,
}

impl Response {
    /// Response with every prediction field at its empty default.
    pub fn empty(kind: ResponseKind, message: &str, symptoms: SymptomSet, context: SymptomContext) -> Self {
        Self {
            kind,
            message: message.to_string(),
            predictions: Vec::new(),
            extracted_symptoms: symptoms,
            confidence: 0.0,
            recommendation: String::new(),
            emergency: false,
            context,
        }
    }

    /// Highest-ranked prediction, if any.
    pub fn top_prediction(&self) -> Option<&Prediction> {
        self.predictions.first()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
