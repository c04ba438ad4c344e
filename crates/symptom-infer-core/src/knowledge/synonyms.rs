//! Symptom synonym table: canonical label → surface variants.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{normalize_label, KnowledgeError, KnowledgeResult, OrderedEntries};

/// Variants grouped under one canonical symptom label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SynonymEntry {
    pub canonical: String,
    /// Lower-cased substrings that signal the symptom
    pub variants: Vec<String>,
}

/// Read-only synonym table.
#[derive(Debug, Clone, PartialEq)]
pub struct SynonymTable {
    entries: Vec<SynonymEntry>,
}

impl SynonymTable {
    /// Build a table, lower-casing variants and rejecting empty groups.
    pub fn new(entries: Vec<SynonymEntry>) -> KnowledgeResult<Self> {
        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(entries.len());

        for entry in entries {
            let canonical = normalize_label(&entry.canonical);
            if canonical.is_empty() {
                return Err(KnowledgeError::Invalid("synonym entry with empty label".into()));
            }
            if !seen.insert(canonical.clone()) {
                return Err(KnowledgeError::Invalid(format!(
                    "duplicate synonym entry: {}",
                    canonical
                )));
            }

            let variants: Vec<String> = entry
                .variants
                .iter()
                .map(|v| normalize_label(v))
                .filter(|v| !v.is_empty())
                .collect();
            if variants.is_empty() {
                return Err(KnowledgeError::Invalid(format!(
                    "symptom {} has no variants",
                    canonical
                )));
            }

            normalized.push(SynonymEntry { canonical, variants });
        }

        Ok(Self {
            entries: normalized,
        })
    }

    /// Parse a table keyed by canonical label.
    pub fn from_json(json: &str) -> KnowledgeResult<Self> {
        let OrderedEntries(entries) = serde_json::from_str::<OrderedEntries<Vec<String>>>(json)?;
        Self::new(
            entries
                .into_iter()
                .map(|(canonical, variants)| SynonymEntry { canonical, variants })
                .collect(),
        )
    }

    /// Load a synonym table file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> KnowledgeResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let table = Self::from_json(&json)?;
        tracing::info!(
            path = %path.as_ref().display(),
            symptoms = table.len(),
            "loaded synonym table"
        );
        Ok(table)
    }

    pub fn entries(&self) -> &[SynonymEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The bundled synonym table.
    pub fn builtin() -> Self {
        Self {
            entries: default_synonyms(),
        }
    }
}

fn entry(canonical: &str, variants: &[&str]) -> SynonymEntry {
    SynonymEntry {
        canonical: canonical.to_string(),
        variants: variants.iter().map(|v| v.to_string()).collect(),
    }
}

fn default_synonyms() -> Vec<SynonymEntry> {
    vec![
        entry("fever", &["fever", "high temperature", "hot", "burning up", "temperature", "pyrexia"]),
        entry("cough", &["cough", "coughing", "dry cough", "wet cough", "hacking cough", "productive cough"]),
        entry("fatigue", &["fatigue", "tired", "exhausted", "weak", "lethargic", "run down", "tiredness"]),
        entry("headache", &["headache", "head pain", "migraine", "head ache", "cephalalgia"]),
        entry("sore throat", &["sore throat", "throat pain", "scratchy throat", "throat irritation", "pharyngitis"]),
        entry(
            "shortness of breath",
            &["shortness of breath", "difficulty breathing", "breathless", "can't breathe", "trouble breathing", "dyspnea"],
        ),
        entry("body aches", &["body aches", "muscle pain", "joint pain", "aches", "sore muscles", "myalgia"]),
        entry("runny nose", &["runny nose", "nasal discharge", "dripping nose", "stuffy nose", "rhinorrhea"]),
        entry("chills", &["chills", "shivering", "cold", "goosebumps", "rigors"]),
        entry("nausea", &["nausea", "sick to stomach", "queasy", "upset stomach", "nauseous"]),
        entry("vomiting", &["vomiting", "throwing up", "puking", "sick", "emesis"]),
        entry("chest pain", &["chest pain", "chest discomfort", "chest tightness", "thoracic pain"]),
        entry("loss of appetite", &["loss of appetite", "not hungry", "no appetite", "can't eat", "anorexia"]),
        entry("night sweats", &["night sweats", "sweating at night", "night perspiration"]),
        entry("weight loss", &["weight loss", "losing weight", "unintentional weight loss"]),
        entry("skin rash", &["skin rash", "rash", "red spots", "skin irritation", "dermatitis"]),
    ]
}
