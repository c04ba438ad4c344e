//! Fusion of the classifier guess with overlap predictions.
//!
//! Rules, in order:
//! 1. A classifier guess above the confidence floor that is not the
//!    no-condition sentinel goes first.
//! 2. The top overlap candidates are appended.
//! 3. The list is re-ranked by confidence. The sort is stable and the
//!    classifier guess was inserted first, so it also leads on a tie.
//!
//! By default the same condition may appear once per source. With
//! `dedupe_by_condition` only its highest-ranked entry is kept.

use std::collections::HashSet;

use crate::classifier::Classification;
use crate::config::EngineConfig;
use crate::knowledge::KnowledgeBase;
use crate::models::{rank_predictions, ConditionDetails, Prediction};

/// Merges the two prediction sources into one ranked list.
pub struct PredictionFuser<'a> {
    knowledge: &'a KnowledgeBase,
    config: &'a EngineConfig,
}

impl<'a> PredictionFuser<'a> {
    pub fn new(knowledge: &'a KnowledgeBase, config: &'a EngineConfig) -> Self {
        Self { knowledge, config }
    }

    /// Fuse a classification with an already-ranked overlap list.
    pub fn fuse(&self, classification: &Classification, overlap: &[Prediction]) -> Vec<Prediction> {
        let mut fused = Vec::with_capacity(overlap.len().min(self.config.max_overlap_candidates) + 1);

        if let Some(prediction) = self.classifier_prediction(classification) {
            fused.push(prediction);
        }

        fused.extend(
            overlap
                .iter()
                .take(self.config.max_overlap_candidates)
                .cloned(),
        );

        rank_predictions(&mut fused);

        if self.config.fusion.dedupe_by_condition {
            fused = dedupe_by_condition(fused);
        }

        fused
    }

    /// Step 1: the classifier guess, if it qualifies.
    fn classifier_prediction(&self, classification: &Classification) -> Option<Prediction> {
        if classification.confidence <= self.config.classifier_min_confidence
            || classification.is_no_condition(&self.config.no_condition_label)
        {
            return None;
        }

        if !self.config.fusion.enrich_classifier_predictions {
            return Some(Prediction::from_classifier(
                &classification.label,
                classification.confidence,
                None,
            ));
        }

        // Canonical knowledge base name when the label resolves
        let condition = self.knowledge.find_condition(&classification.label);
        let label = condition
            .map(|c| c.name.as_str())
            .unwrap_or(&classification.label);

        Some(Prediction::from_classifier(
            label,
            classification.confidence,
            condition,
        ))
    }
}

/// Keep the first (highest-ranked) prediction per condition name. Matched
/// symptoms and details missing from the kept entry are taken from the
/// dropped ones.
fn dedupe_by_condition(ranked: Vec<Prediction>) -> Vec<Prediction> {
    let mut kept: Vec<Prediction> = Vec::with_capacity(ranked.len());
    let mut seen = HashSet::new();

    for prediction in ranked {
        let key = prediction.condition.to_lowercase();
        if seen.insert(key.clone()) {
            kept.push(prediction);
            continue;
        }

        if let Some(existing) = kept
            .iter_mut()
            .find(|p| p.condition.to_lowercase() == key)
        {
            if existing.matched_symptoms.is_empty() {
                existing.matched_symptoms = prediction.matched_symptoms;
            }
            if existing.details == ConditionDetails::NotApplicable {
                existing.details = prediction.details;
            }
        }
    }

    kept
}
