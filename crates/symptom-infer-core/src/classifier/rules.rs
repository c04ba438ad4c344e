//! Deterministic rule-table classifier over extracted symptoms.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Classification, Classifier, ClassifierResult};
use crate::inference::SymptomExtractor;
use crate::knowledge::SynonymTable;

/// Confidence reported when no symptoms are found at all.
const NO_SYMPTOM_CONFIDENCE: f64 = 0.1;

/// Fires when every listed symptom is present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SymptomRule {
    pub all_of: Vec<String>,
    pub label: String,
    pub confidence: f64,
}

/// Fires when no rule matched and at least `min_symptoms` were found.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountFallback {
    pub min_symptoms: usize,
    pub label: String,
    pub confidence: f64,
}

/// Classifier driven by an ordered table of symptom co-occurrence rules.
pub struct RuleTableClassifier {
    synonyms: Arc<SynonymTable>,
    rules: Vec<SymptomRule>,
    fallbacks: Vec<CountFallback>,
    sentinel: String,
}

impl RuleTableClassifier {
    /// Classifier with the default rule table.
    pub fn new(synonyms: Arc<SynonymTable>, sentinel: &str) -> Self {
        Self::with_rules(synonyms, sentinel, default_rules(), default_fallbacks())
    }

    /// Classifier with a custom table. Fallbacks are tried from the largest
    /// `min_symptoms` down.
    pub fn with_rules(
        synonyms: Arc<SynonymTable>,
        sentinel: &str,
        rules: Vec<SymptomRule>,
        mut fallbacks: Vec<CountFallback>,
    ) -> Self {
        fallbacks.sort_by(|a, b| b.min_symptoms.cmp(&a.min_symptoms));
        Self {
            synonyms,
            rules,
            fallbacks,
            sentinel: sentinel.to_string(),
        }
    }
}

impl Classifier for RuleTableClassifier {
    fn name(&self) -> &str {
        "rule-table"
    }

    fn classify(&self, text: &str) -> ClassifierResult<Classification> {
        let symptoms = SymptomExtractor::new(&self.synonyms).extract(text);

        if symptoms.is_empty() {
            return Ok(Classification::no_condition(&self.sentinel, NO_SYMPTOM_CONFIDENCE));
        }

        if let Some(rule) = self
            .rules
            .iter()
            .find(|r| r.all_of.iter().all(|s| symptoms.contains(s)))
        {
            return Classification::checked(&rule.label, rule.confidence);
        }

        match self
            .fallbacks
            .iter()
            .find(|f| symptoms.len() >= f.min_symptoms)
        {
            Some(fallback) => Classification::checked(&fallback.label, fallback.confidence),
            None => Ok(Classification::no_condition(&self.sentinel, NO_SYMPTOM_CONFIDENCE)),
        }
    }
}

fn rule(all_of: &[&str], label: &str, confidence: f64) -> SymptomRule {
    SymptomRule {
        all_of: all_of.iter().map(|s| s.to_string()).collect(),
        label: label.to_string(),
        confidence,
    }
}

fn default_rules() -> Vec<SymptomRule> {
    vec![
        rule(&["fever", "cough", "shortness of breath"], "COVID-19", 0.85),
        rule(&["fever", "cough", "body aches"], "Influenza", 0.80),
        rule(&["runny nose", "sore throat"], "Common Cold", 0.75),
        rule(&["cough", "shortness of breath", "chest pain"], "Pneumonia", 0.90),
        rule(&["cough", "fatigue"], "Bronchitis", 0.70),
    ]
}

fn default_fallbacks() -> Vec<CountFallback> {
    vec![
        CountFallback {
            min_symptoms: 3,
            label: "Influenza".into(),
            confidence: 0.60,
        },
        CountFallback {
            min_symptoms: 1,
            label: "Common Cold".into(),
            confidence: 0.50,
        },
    ]
}
