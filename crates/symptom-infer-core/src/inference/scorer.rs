//! Condition scoring by symptom overlap.
//!
//! confidence = |condition symptoms ∩ reported| / |condition symptoms|
//!
//! The denominator is the condition's own symptom count, so a condition with
//! few symptoms, all reported, scores high even from a short report.

use crate::knowledge::KnowledgeBase;
use crate::models::{rank_predictions, Prediction, SymptomSet};

/// Scores every knowledge base condition against a symptom set.
pub struct OverlapScorer<'a> {
    knowledge: &'a KnowledgeBase,
    min_confidence: f64,
}

impl<'a> OverlapScorer<'a> {
    pub fn new(knowledge: &'a KnowledgeBase) -> Self {
        Self {
            knowledge,
            min_confidence: 0.0,
        }
    }

    /// Drop candidates scoring at or below `min_confidence`.
    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    /// Ranked overlap predictions. Conditions with no matching symptom are
    /// never returned; ties keep knowledge base order.
    pub fn score(&self, symptoms: &SymptomSet) -> Vec<Prediction> {
        let mut predictions: Vec<Prediction> = self
            .knowledge
            .conditions()
            .iter()
            .filter_map(|condition| {
                let matched = condition.matched_symptoms(symptoms);
                if matched.is_empty() {
                    return None;
                }
                let confidence = matched.len() as f64 / condition.symptoms.len() as f64;
                Some(Prediction::from_overlap(condition, confidence, matched))
            })
            .filter(|p| p.confidence > self.min_confidence)
            .collect();

        rank_predictions(&mut predictions);
        predictions
    }
}
