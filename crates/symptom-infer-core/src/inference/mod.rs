//! Symptom inference engine.
//!
//! Pipeline: Extraction → Emergency/empty check → Classification + Overlap
//! scoring → Fusion → Response composition

mod composer;
mod context;
mod extractor;
mod fuser;
mod scorer;

pub use composer::*;
pub use context::extract_context;
pub use extractor::*;
pub use fuser::*;
pub use scorer::*;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::classifier::{
    Classification, Classifier, NullClassifier, RuleTableClassifier, TimeoutClassifier,
    TrainedModelClassifier,
};
use crate::config::{ClassifierBackend, ConfigError, EngineConfig};
use crate::knowledge::{KnowledgeBase, KnowledgeError, SynonymTable};
use crate::models::{Prediction, Response, SymptomSet};

/// Engine construction errors. Per-utterance processing never fails.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Knowledge error: {0}")]
    Knowledge(#[from] KnowledgeError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Main engine that coordinates the full pipeline.
///
/// Holds only read-only state, so one engine can serve concurrent callers.
pub struct SymptomEngine {
    knowledge: Arc<KnowledgeBase>,
    synonyms: Arc<SynonymTable>,
    classifier: Arc<dyn Classifier>,
    config: EngineConfig,
}

impl SymptomEngine {
    /// Create an engine from explicit collaborators.
    pub fn new(
        knowledge: Arc<KnowledgeBase>,
        synonyms: Arc<SynonymTable>,
        classifier: Arc<dyn Classifier>,
        config: EngineConfig,
    ) -> EngineResult<Self> {
        config.validate()?;
        tracing::info!(
            conditions = knowledge.len(),
            symptoms = synonyms.len(),
            classifier = classifier.name(),
            "symptom engine ready"
        );
        Ok(Self {
            knowledge,
            synonyms,
            classifier,
            config,
        })
    }

    /// Create an engine whose classifier is chosen by `config.classifier`.
    pub fn from_config(
        knowledge: KnowledgeBase,
        synonyms: SynonymTable,
        config: EngineConfig,
    ) -> EngineResult<Self> {
        let synonyms = Arc::new(synonyms);
        let classifier = build_classifier(&config, &synonyms);
        Self::new(Arc::new(knowledge), synonyms, classifier, config)
    }

    /// Load any of the three data files; missing paths use the bundled tables
    /// and default config.
    pub fn from_files(
        knowledge_path: Option<&Path>,
        synonyms_path: Option<&Path>,
        config_path: Option<&Path>,
    ) -> EngineResult<Self> {
        let knowledge = match knowledge_path {
            Some(path) => KnowledgeBase::from_file(path)?,
            None => KnowledgeBase::builtin(),
        };
        let synonyms = match synonyms_path {
            Some(path) => SynonymTable::from_file(path)?,
            None => SynonymTable::builtin(),
        };
        let config = match config_path {
            Some(path) => EngineConfig::from_file(path)?,
            None => EngineConfig::default(),
        };
        Self::from_config(knowledge, synonyms, config)
    }

    /// Engine over the bundled tables with the default config.
    pub fn builtin() -> EngineResult<Self> {
        Self::from_files(None, None, None)
    }

    /// Process one utterance.
    pub fn respond(&self, text: &str) -> Response {
        let symptoms = self.extract(text);
        tracing::debug!(
            matches = ?SymptomExtractor::new(&self.synonyms).explain(text),
            "extracted symptoms"
        );

        let fuser = PredictionFuser::new(&self.knowledge, &self.config);
        let composer = ResponseComposer::new(&self.config, fuser);

        // Emergency and empty input never reach the classifier
        if let Some(response) = composer.short_circuit(text, &symptoms) {
            if response.emergency {
                tracing::warn!(symptoms = ?symptoms, "emergency symptom reported");
            }
            return response;
        }

        let classification = self.classify(text);
        let overlap = self.score(&symptoms);
        let response = composer.compose(text, &symptoms, &classification, &overlap);

        tracing::debug!(
            kind = ?response.kind,
            confidence = response.confidence,
            predictions = response.predictions.len(),
            "composed response"
        );
        response
    }

    /// Canonical symptoms mentioned in the text.
    pub fn extract(&self, text: &str) -> SymptomSet {
        SymptomExtractor::new(&self.synonyms).extract(text)
    }

    /// Run the classifier. Any failure, including a confidence outside
    /// [0, 1], degrades to the no-condition sentinel.
    pub fn classify(&self, text: &str) -> Classification {
        let result = self
            .classifier
            .classify(text)
            .and_then(|c| Classification::checked(&c.label, c.confidence));

        match result {
            Ok(classification) => {
                tracing::debug!(
                    classifier = self.classifier.name(),
                    label = %classification.label,
                    confidence = classification.confidence,
                    "classified"
                );
                classification
            }
            Err(e) => {
                tracing::warn!(
                    classifier = self.classifier.name(),
                    error = %e,
                    "classifier failed, continuing with overlap scoring only"
                );
                Classification::no_condition(&self.config.no_condition_label, 0.0)
            }
        }
    }

    /// Ranked overlap predictions for a symptom set.
    pub fn score(&self, symptoms: &SymptomSet) -> Vec<Prediction> {
        OverlapScorer::new(&self.knowledge)
            .with_min_confidence(self.config.min_overlap_confidence)
            .score(symptoms)
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }
}

/// Select the classifier named by the config, wrapped in a timeout when one
/// is set. A model that fails to load leaves the engine on overlap scoring.
pub fn build_classifier(config: &EngineConfig, synonyms: &Arc<SynonymTable>) -> Arc<dyn Classifier> {
    let sentinel = config.no_condition_label.as_str();

    let classifier: Arc<dyn Classifier> = match &config.classifier.backend {
        ClassifierBackend::RuleTable => {
            Arc::new(RuleTableClassifier::new(Arc::clone(synonyms), sentinel))
        }
        ClassifierBackend::TrainedModel { model_path } => {
            match TrainedModelClassifier::from_file(model_path) {
                Ok(classifier) => Arc::new(classifier),
                Err(e) => {
                    tracing::warn!(
                        path = %model_path.display(),
                        error = %e,
                        "failed to load classifier model, classifier disabled"
                    );
                    Arc::new(NullClassifier::new(sentinel))
                }
            }
        }
        ClassifierBackend::Disabled => Arc::new(NullClassifier::new(sentinel)),
    };

    match config.classifier.timeout_ms {
        Some(ms) => Arc::new(TimeoutClassifier::new(classifier, Duration::from_millis(ms))),
        None => classifier,
    }
}
