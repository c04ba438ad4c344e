//! Response composition.
//!
//! Branches, in priority order:
//! 1. Emergency symptom present → fixed urgent-care message, no predictions
//! 2. No symptoms → ask the user to describe them
//! 3. Fused predictions:
//!    - top above the high-confidence threshold → assertive single condition
//!    - otherwise → numbered list of possibilities
//!    - empty → ask for more detail

use std::fmt::Write;

use super::context::extract_context;
use super::PredictionFuser;
use crate::classifier::Classification;
use crate::config::EngineConfig;
use crate::models::{Prediction, Response, ResponseKind, SymptomContext, SymptomSet};

pub const EMERGENCY_MESSAGE: &str = "EMERGENCY: You're experiencing symptoms that require immediate medical attention. Please call emergency services (911) immediately or go to the nearest emergency room.";

pub const NEEDS_SYMPTOMS_MESSAGE: &str = "I understand you're not feeling well. Could you please describe your symptoms in more detail? For example, are you experiencing fever, cough, fatigue, or any other specific symptoms?";

pub const NEEDS_DETAIL_MESSAGE: &str = "I've identified some symptoms that could indicate various conditions. To provide a more accurate assessment, could you tell me more about how long you've been experiencing these symptoms and their severity?";

const DIFFERENTIAL_HEADER: &str = "Based on your symptoms, there are several possibilities:\n\n";

const CONSULT_SUFFIX: &str = "\nI recommend consulting with a healthcare provider for proper diagnosis.";

/// Turns symptoms and predictions into a user-facing response.
pub struct ResponseComposer<'a> {
    config: &'a EngineConfig,
    fuser: PredictionFuser<'a>,
}

impl<'a> ResponseComposer<'a> {
    pub fn new(config: &'a EngineConfig, fuser: PredictionFuser<'a>) -> Self {
        Self { config, fuser }
    }

    /// Whether any extracted symptom triggers the emergency override.
    pub fn is_emergency(&self, symptoms: &SymptomSet) -> bool {
        symptoms.iter().any(|s| self.config.is_emergency_symptom(s))
    }

    /// The branches that need no predictions. `None` means predictions are
    /// required to answer.
    pub fn short_circuit(&self, text: &str, symptoms: &SymptomSet) -> Option<Response> {
        if self.is_emergency(symptoms) {
            let mut response = Response::empty(
                ResponseKind::Emergency,
                EMERGENCY_MESSAGE,
                symptoms.clone(),
                extract_context(text),
            );
            response.emergency = true;
            return Some(response);
        }

        if symptoms.is_empty() {
            return Some(Response::empty(
                ResponseKind::NeedsSymptoms,
                NEEDS_SYMPTOMS_MESSAGE,
                SymptomSet::new(),
                extract_context(text),
            ));
        }

        None
    }

    /// Compose the full response.
    pub fn compose(
        &self,
        text: &str,
        symptoms: &SymptomSet,
        classification: &Classification,
        overlap: &[Prediction],
    ) -> Response {
        if let Some(response) = self.short_circuit(text, symptoms) {
            return response;
        }

        let fused = self.fuser.fuse(classification, overlap);
        self.from_predictions(symptoms.clone(), extract_context(text), fused)
    }

    fn from_predictions(
        &self,
        symptoms: SymptomSet,
        context: SymptomContext,
        mut fused: Vec<Prediction>,
    ) -> Response {
        let Some(top) = fused.first() else {
            return Response::empty(ResponseKind::NeedsDetail, NEEDS_DETAIL_MESSAGE, symptoms, context);
        };

        let confidence = top.confidence;
        let (kind, message, recommendation) = if confidence > self.config.high_confidence_threshold {
            (
                ResponseKind::Assertive,
                assertive_message(top),
                top.recommendation().unwrap_or_default().to_string(),
            )
        } else {
            (
                ResponseKind::Differential,
                differential_message(&fused, self.config.max_displayed_predictions),
                String::new(),
            )
        };

        fused.truncate(self.config.max_displayed_predictions);

        Response {
            kind,
            message,
            predictions: fused,
            extracted_symptoms: symptoms,
            confidence,
            recommendation,
            emergency: false,
            context,
        }
    }
}

fn assertive_message(top: &Prediction) -> String {
    let mut message = format!(
        "Based on your symptoms, there's a strong possibility you might have {}.",
        top.condition
    );
    if let Some(description) = top.description().filter(|d| !d.is_empty()) {
        message.push(' ');
        message.push_str(description);
    }
    message
}

fn differential_message(ranked: &[Prediction], limit: usize) -> String {
    let mut message = String::from(DIFFERENTIAL_HEADER);
    for (i, prediction) in ranked.iter().take(limit).enumerate() {
        // Writing to a String cannot fail
        let _ = writeln!(
            message,
            "{}. {} ({} confidence)",
            i + 1,
            prediction.condition,
            prediction.confidence_percent()
        );
    }
    message.push_str(CONSULT_SUFFIX);
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::KnowledgeBase;
    use crate::models::{Condition, Severity};
    use crate::inference::OverlapScorer;

    fn kb() -> KnowledgeBase {
        KnowledgeBase::new(vec![
            Condition::new("Flu", ["fever", "cough", "chills"], Severity::Medium)
                .with_description("Viral infection.")
                .with_recommendation("Rest and fluids."),
            Condition::new("Cold", ["cough", "sneezing", "runny nose", "sore throat", "congestion"], Severity::Low),
        ])
        .unwrap()
    }

    fn set(items: &[&str]) -> SymptomSet {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn nothing() -> Classification {
        Classification::no_condition("No Disease", 0.0)
    }

    #[test]
    fn test_emergency_suppresses_predictions() {
        let kb = kb();
        let config = EngineConfig::default();
        let composer = ResponseComposer::new(&config, PredictionFuser::new(&kb, &config));

        let symptoms = set(&["chest pain", "fever"]);
        let overlap = OverlapScorer::new(&kb).score(&symptoms);
        let high = Classification::checked("Flu", 0.99).unwrap();

        let response = composer.compose("chest pain and fever", &symptoms, &high, &overlap);
        assert!(response.emergency);
        assert_eq!(response.kind, ResponseKind::Emergency);
        assert_eq!(response.message, EMERGENCY_MESSAGE);
        assert!(response.predictions.is_empty());
        assert_eq!(response.confidence, 0.0);
        assert!(response.recommendation.is_empty());
        assert_eq!(response.extracted_symptoms, symptoms);
    }

    #[test]
    fn test_emergency_table_is_configurable() {
        let kb = kb();
        let mut config = EngineConfig::default();
        config.emergency_symptoms = vec!["fever".into()];
        let composer = ResponseComposer::new(&config, PredictionFuser::new(&kb, &config));

        assert!(composer.is_emergency(&set(&["fever"])));
        assert!(!composer.is_emergency(&set(&["chest pain"])));
    }

    #[test]
    fn test_no_symptoms() {
        let kb = kb();
        let config = EngineConfig::default();
        let composer = ResponseComposer::new(&config, PredictionFuser::new(&kb, &config));

        let response = composer.compose("hello", &SymptomSet::new(), &nothing(), &[]);
        assert_eq!(response.kind, ResponseKind::NeedsSymptoms);
        assert_eq!(response.message, NEEDS_SYMPTOMS_MESSAGE);
        assert!(!response.emergency);
    }

    #[test]
    fn test_assertive_message() {
        let kb = kb();
        let config = EngineConfig::default();
        let composer = ResponseComposer::new(&config, PredictionFuser::new(&kb, &config));

        let symptoms = set(&["fever", "cough", "chills"]);
        let overlap = OverlapScorer::new(&kb).score(&symptoms);
        let response = composer.compose("", &symptoms, &nothing(), &overlap);

        assert_eq!(response.kind, ResponseKind::Assertive);
        assert_eq!(
            response.message,
            "Based on your symptoms, there's a strong possibility you might have Flu. Viral infection."
        );
        assert_eq!(response.confidence, 1.0);
        assert_eq!(response.recommendation, "Rest and fluids.");
    }

    #[test]
    fn test_assertive_without_details() {
        let kb = kb();
        let config = EngineConfig::default();
        let composer = ResponseComposer::new(&config, PredictionFuser::new(&kb, &config));

        let symptoms = set(&["sneezing"]);
        let guess = Classification::checked("Hay Fever", 0.9).unwrap();
        let response = composer.compose("", &symptoms, &guess, &[]);

        assert_eq!(
            response.message,
            "Based on your symptoms, there's a strong possibility you might have Hay Fever."
        );
        assert!(response.recommendation.is_empty());
    }

    #[test]
    fn test_threshold_is_strict() {
        let kb = kb();
        let config = EngineConfig::default();
        let composer = ResponseComposer::new(&config, PredictionFuser::new(&kb, &config));

        let guess = Classification::checked("Flu", 0.7).unwrap();
        let response = composer.compose("", &set(&["sneezing"]), &guess, &[]);
        assert_eq!(response.kind, ResponseKind::Differential);
    }

    #[test]
    fn test_differential_message() {
        let kb = kb();
        let config = EngineConfig::default();
        let composer = ResponseComposer::new(&config, PredictionFuser::new(&kb, &config));

        let symptoms = set(&["cough"]);
        let overlap = OverlapScorer::new(&kb).score(&symptoms);
        let response = composer.compose("", &symptoms, &nothing(), &overlap);

        assert_eq!(response.kind, ResponseKind::Differential);
        assert_eq!(
            response.message,
            "Based on your symptoms, there are several possibilities:\n\n\
             1. Flu (33.3% confidence)\n\
             2. Cold (20.0% confidence)\n\
             \nI recommend consulting with a healthcare provider for proper diagnosis."
        );
        assert_eq!(response.predictions.len(), 2);
        assert!((response.confidence - 1.0 / 3.0).abs() < 1e-12);
        assert!(response.recommendation.is_empty());
    }

    #[test]
    fn test_needs_detail_when_nothing_qualifies() {
        let kb = kb();
        let config = EngineConfig::default();
        let composer = ResponseComposer::new(&config, PredictionFuser::new(&kb, &config));

        let response = composer.compose("", &set(&["headache"]), &nothing(), &[]);
        assert_eq!(response.kind, ResponseKind::NeedsDetail);
        assert_eq!(response.message, NEEDS_DETAIL_MESSAGE);
        assert!(response.predictions.is_empty());
        assert_eq!(response.confidence, 0.0);
    }

    #[test]
    fn test_display_limit() {
        let kb = kb();
        let mut config = EngineConfig::default();
        config.max_displayed_predictions = 1;
        let composer = ResponseComposer::new(&config, PredictionFuser::new(&kb, &config));

        let symptoms = set(&["cough"]);
        let overlap = OverlapScorer::new(&kb).score(&symptoms);
        let response = composer.compose("", &symptoms, &nothing(), &overlap);

        assert_eq!(response.predictions.len(), 1);
        assert!(!response.message.contains("2. "));
    }
}
