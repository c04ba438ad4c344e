//! Symptom extraction by literal synonym matching.
//!
//! No tokenization, stemming or negation handling: a canonical label is
//! reported when any of its variants occurs as a substring of the
//! lower-cased text.

use crate::knowledge::SynonymTable;
use crate::models::SymptomSet;

/// Scans text against a synonym table.
pub struct SymptomExtractor<'a> {
    synonyms: &'a SynonymTable,
}

impl<'a> SymptomExtractor<'a> {
    pub fn new(synonyms: &'a SynonymTable) -> Self {
        Self { synonyms }
    }

    /// Canonical symptoms mentioned in the text. Empty text gives an empty set.
    pub fn extract(&self, text: &str) -> SymptomSet {
        let lower = text.to_lowercase();

        self.synonyms
            .entries()
            .iter()
            .filter(|entry| entry.variants.iter().any(|v| lower.contains(v.as_str())))
            .map(|entry| entry.canonical.clone())
            .collect()
    }

    /// First matching variant per symptom, for tracing why a label fired.
    pub fn explain(&self, text: &str) -> Vec<(&'a str, &'a str)> {
        let lower = text.to_lowercase();

        self.synonyms
            .entries()
            .iter()
            .filter_map(|entry| {
                entry
                    .variants
                    .iter()
                    .find(|v| lower.contains(v.as_str()))
                    .map(|v| (entry.canonical.as_str(), v.as_str()))
            })
            .collect()
    }
}
