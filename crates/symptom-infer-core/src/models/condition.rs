//! Knowledge base condition models.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical symptom labels extracted from one utterance.
pub type SymptomSet = BTreeSet<String>;

/// How serious a condition is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}

/// A condition in the knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Condition {
    /// Unique condition name
    pub name: String,
    /// Defining canonical symptoms (non-empty)
    pub symptoms: BTreeSet<String>,
    pub severity: Severity,
    pub description: String,
    pub recommendation: String,
}

/// Condition fields shown to the user alongside a prediction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConditionInfo {
    pub severity: Severity,
    pub description: String,
    pub recommendation: String,
}

impl Condition {
    /// Create a condition from a symptom list.
    pub fn new<I, S>(name: &str, symptoms: I, severity: Severity) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            symptoms: symptoms.into_iter().map(Into::into).collect(),
            severity,
            description: String::new(),
            recommendation: String::new(),
        }
    }

    /// Builder-style description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Builder-style recommendation.
    pub fn with_recommendation(mut self, recommendation: &str) -> Self {
        self.recommendation = recommendation.to_string();
        self
    }

    /// Symptoms this condition shares with the reported set.
    pub fn matched_symptoms(&self, reported: &SymptomSet) -> BTreeSet<String> {
        self.symptoms.intersection(reported).cloned().collect()
    }

    /// Display fields for predictions.
    pub fn info(&self) -> ConditionInfo {
        ConditionInfo {
            severity: self.severity,
            description: self.description.clone(),
            recommendation: self.recommendation.clone(),
        }
    }
}
