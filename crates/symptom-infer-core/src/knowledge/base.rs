//! Condition knowledge base.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use sha2::{Digest, Sha256};
use strsim::jaro_winkler;

use super::{normalize_label, KnowledgeError, KnowledgeResult, OrderedEntries};
use crate::models::{Condition, Severity};

/// Minimum Jaro-Winkler similarity for a loose label match.
const LABEL_MATCH_THRESHOLD: f64 = 0.92;

/// On-disk condition record.
#[derive(Debug, Deserialize)]
struct ConditionRecord {
    symptoms: Vec<String>,
    severity: Severity,
    description: String,
    #[serde(alias = "recommendation")]
    recommendations: String,
}

/// Read-only condition table, kept in load order.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeBase {
    conditions: Vec<Condition>,
}

impl KnowledgeBase {
    /// Build a knowledge base, validating names and symptom lists.
    pub fn new(conditions: Vec<Condition>) -> KnowledgeResult<Self> {
        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(conditions.len());

        for mut condition in conditions {
            condition.name = condition.name.trim().to_string();
            if condition.name.is_empty() {
                return Err(KnowledgeError::Invalid("condition with empty name".into()));
            }
            if !seen.insert(condition.name.clone()) {
                return Err(KnowledgeError::Invalid(format!(
                    "duplicate condition: {}",
                    condition.name
                )));
            }

            condition.symptoms = condition
                .symptoms
                .iter()
                .map(|s| normalize_label(s))
                .filter(|s| !s.is_empty())
                .collect();
            if condition.symptoms.is_empty() {
                return Err(KnowledgeError::Invalid(format!(
                    "condition {} has no symptoms",
                    condition.name
                )));
            }

            normalized.push(condition);
        }

        Ok(Self {
            conditions: normalized,
        })
    }

    /// Parse a knowledge base keyed by condition name.
    pub fn from_json(json: &str) -> KnowledgeResult<Self> {
        let OrderedEntries(entries) = serde_json::from_str::<OrderedEntries<ConditionRecord>>(json)?;

        let conditions = entries
            .into_iter()
            .map(|(name, record)| Condition {
                name,
                symptoms: record.symptoms.into_iter().collect(),
                severity: record.severity,
                description: record.description,
                recommendation: record.recommendations,
            })
            .collect();

        Self::new(conditions)
    }

    /// Load a knowledge base file. Any failure here is fatal to engine startup.
    pub fn from_file<P: AsRef<Path>>(path: P) -> KnowledgeResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let kb = Self::from_json(&json)?;
        tracing::info!(
            path = %path.as_ref().display(),
            conditions = kb.len(),
            fingerprint = %kb.fingerprint(),
            "loaded knowledge base"
        );
        Ok(kb)
    }

    /// All conditions in load order.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Exact lookup by name.
    pub fn get(&self, name: &str) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.name == name)
    }

    /// Resolve a free-form label (e.g. a classifier output) to a condition.
    ///
    /// Tries an exact match, then case-insensitive, then the closest name by
    /// Jaro-Winkler similarity above [`LABEL_MATCH_THRESHOLD`].
    pub fn find_condition(&self, label: &str) -> Option<&Condition> {
        if let Some(condition) = self.get(label) {
            return Some(condition);
        }

        let lower = label.trim().to_lowercase();
        if lower.is_empty() {
            return None;
        }

        if let Some(condition) = self
            .conditions
            .iter()
            .find(|c| c.name.to_lowercase() == lower)
        {
            return Some(condition);
        }

        self.conditions
            .iter()
            .map(|c| (c, jaro_winkler(&lower, &c.name.to_lowercase())))
            .filter(|(_, score)| *score >= LABEL_MATCH_THRESHOLD)
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(c, _)| c)
    }

    /// SHA-256 over the canonical serialization, hex encoded.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for condition in &self.conditions {
            // Serializing plain strings and sets cannot fail
            if let Ok(bytes) = serde_json::to_vec(condition) {
                hasher.update(&bytes);
            }
            hasher.update(b"\n");
        }
        hex::encode(hasher.finalize())
    }

    /// The bundled respiratory/infectious disease table.
    pub fn builtin() -> Self {
        Self {
            conditions: default_conditions(),
        }
    }
}

fn default_conditions() -> Vec<Condition> {
    vec![
        Condition::new(
            "COVID-19",
            [
                "fever", "cough", "fatigue", "shortness of breath", "loss of taste",
                "loss of smell", "sore throat", "headache", "body aches", "chills",
            ],
            Severity::High,
        )
        .with_description("A respiratory illness caused by the SARS-CoV-2 virus.")
        .with_recommendation("Seek medical attention immediately. Practice isolation and contact tracing."),
        Condition::new(
            "Influenza",
            [
                "fever", "cough", "fatigue", "body aches", "headache", "sore throat",
                "runny nose", "chills", "weakness",
            ],
            Severity::Medium,
        )
        .with_description("A viral infection that attacks your respiratory system.")
        .with_recommendation("Rest, stay hydrated, and consider antiviral medications if diagnosed early."),
        Condition::new(
            "Common Cold",
            [
                "runny nose", "sore throat", "cough", "congestion", "sneezing",
                "mild fever", "fatigue",
            ],
            Severity::Low,
        )
        .with_description("A viral infection of the upper respiratory tract.")
        .with_recommendation("Rest, stay hydrated, and use over-the-counter medications for symptom relief."),
        Condition::new(
            "Pneumonia",
            [
                "fever", "cough", "shortness of breath", "chest pain", "fatigue",
                "sweating", "chills", "loss of appetite",
            ],
            Severity::High,
        )
        .with_description("Infection that inflames the air sacs in one or both lungs.")
        .with_recommendation("Seek immediate medical attention. May require hospitalization."),
        Condition::new(
            "Bronchitis",
            [
                "cough", "mucus production", "fatigue", "mild fever", "chest discomfort",
                "shortness of breath",
            ],
            Severity::Medium,
        )
        .with_description("Inflammation of the bronchial tubes that carry air to the lungs.")
        .with_recommendation("Rest, stay hydrated, and consider seeing a doctor if symptoms persist."),
        Condition::new(
            "Strep Throat",
            [
                "sore throat", "difficulty swallowing", "fever", "headache", "fatigue",
                "swollen lymph nodes", "white patches on throat",
            ],
            Severity::Medium,
        )
        .with_description("Bacterial infection that causes inflammation and pain in the throat.")
        .with_recommendation("See a doctor for antibiotic treatment. Rest and stay hydrated."),
        Condition::new(
            "Mononucleosis",
            [
                "fatigue", "sore throat", "fever", "swollen lymph nodes", "headache",
                "body aches", "loss of appetite",
            ],
            Severity::Medium,
        )
        .with_description("Viral infection caused by Epstein-Barr virus.")
        .with_recommendation("Rest, stay hydrated, and avoid contact sports. May take weeks to recover."),
        Condition::new(
            "Dengue Fever",
            [
                "high fever", "severe headache", "pain behind eyes", "joint and muscle pain",
                "fatigue", "nausea", "vomiting", "skin rash",
            ],
            Severity::High,
        )
        .with_description("Mosquito-borne viral infection.")
        .with_recommendation("Seek immediate medical attention. Rest and stay hydrated."),
        Condition::new(
            "Malaria",
            [
                "fever", "chills", "headache", "muscle aches", "fatigue", "nausea",
                "vomiting", "sweating",
            ],
            Severity::High,
        )
        .with_description("Parasitic disease transmitted by mosquitoes.")
        .with_recommendation("Seek immediate medical attention. Requires specific antimalarial treatment."),
        Condition::new(
            "Tuberculosis",
            [
                "persistent cough", "coughing up blood", "chest pain", "fatigue",
                "weight loss", "night sweats", "fever", "loss of appetite",
            ],
            Severity::High,
        )
        .with_description("Bacterial infection that primarily affects the lungs.")
        .with_recommendation("Seek immediate medical attention. Requires long-term antibiotic treatment."),
    ]
}
