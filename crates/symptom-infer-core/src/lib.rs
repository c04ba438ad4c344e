//! Symptom-Infer Core Library
//!
//! Local symptom inference: free-text symptom descriptions in, ranked
//! candidate conditions and a user-facing message out.
//!
//! # Architecture
//!
//! ```text
//! Utterance → Symptom Extraction ──┬── emergency symptom? ──► Emergency response
//!                                  │
//!                                  ├── no symptoms? ─────────► Clarifying question
//!                                  │
//!                     ┌────────────┴────────────┐
//!                     ▼                         ▼
//!                Classifier               Overlap Scoring
//!            (rules / trained model)   (knowledge base ∩ symptoms)
//!                     │                         │
//!                     └────────────┬────────────┘
//!                                  ▼
//!                          Prediction Fusion
//!                                  │
//!                                  ▼
//!                        Response Composition
//!               (assertive / differential / needs detail)
//! ```
//!
//! # Core Principle
//!
//! **Emergency symptoms always win.** No prediction is made once one is reported.
//!
//! # Modules
//!
//! - [`knowledge`]: Condition knowledge base and symptom synonym table
//! - [`models`]: Domain types (Condition, Prediction, Response, etc.)
//! - [`classifier`]: Pluggable text classifier and its variants
//! - [`inference`]: Extraction, scoring, fusion, composition and the engine
//! - [`config`]: Thresholds, limits and classifier selection

pub mod classifier;
pub mod config;
pub mod inference;
pub mod knowledge;
pub mod models;

// Re-export commonly used types
pub use classifier::{Classification, Classifier, ClassifierError};
pub use config::{ClassifierBackend, EngineConfig};
pub use inference::{EngineError, SymptomEngine};
pub use knowledge::{KnowledgeBase, KnowledgeError, SynonymTable};
pub use models::{
    Condition, ConditionDetails, Prediction, PredictionSource, Response, ResponseKind, Severity,
    SymptomContext,
};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::path::Path;
use std::sync::Arc;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum SymptomInferError {
    #[error("Knowledge error: {0}")]
    KnowledgeError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<KnowledgeError> for SymptomInferError {
    fn from(e: KnowledgeError) -> Self {
        SymptomInferError::KnowledgeError(e.to_string())
    }
}

impl From<config::ConfigError> for SymptomInferError {
    fn from(e: config::ConfigError) -> Self {
        SymptomInferError::ConfigError(e.to_string())
    }
}

impl From<EngineError> for SymptomInferError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Knowledge(e) => e.into(),
            EngineError::Config(e) => e.into(),
        }
    }
}

impl From<serde_json::Error> for SymptomInferError {
    fn from(e: serde_json::Error) -> Self {
        SymptomInferError::SerializationError(e.to_string())
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open an engine over the given data files. Missing paths fall back to the
/// bundled tables and the default config.
#[uniffi::export]
pub fn open_engine(
    knowledge_base_path: Option<String>,
    synonyms_path: Option<String>,
    config_path: Option<String>,
) -> Result<Arc<SymptomInferenceCore>, SymptomInferError> {
    let engine = SymptomEngine::from_files(
        knowledge_base_path.as_deref().map(Path::new),
        synonyms_path.as_deref().map(Path::new),
        config_path.as_deref().map(Path::new),
    )?;
    Ok(Arc::new(SymptomInferenceCore { engine }))
}

/// Open an engine over the bundled tables.
#[uniffi::export]
pub fn open_builtin_engine() -> Result<Arc<SymptomInferenceCore>, SymptomInferError> {
    let engine = SymptomEngine::builtin()?;
    Ok(Arc::new(SymptomInferenceCore { engine }))
}

/// Install a stderr log subscriber, e.g. `"symptom_infer_core=debug"`.
/// Returns false if a subscriber was already installed.
#[uniffi::export]
pub fn init_logging(filter: String) -> bool {
    let filter = tracing_subscriber::EnvFilter::try_new(&filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe engine wrapper for FFI. The engine is read-only, so no lock
/// is needed.
#[derive(uniffi::Object)]
pub struct SymptomInferenceCore {
    engine: SymptomEngine,
}

#[uniffi::export]
impl SymptomInferenceCore {
    /// Process one utterance.
    pub fn respond(&self, text: String) -> FfiResponse {
        self.engine.respond(&text).into()
    }

    /// Process one utterance and return the full response as JSON.
    pub fn respond_json(&self, text: String) -> Result<String, SymptomInferError> {
        Ok(self.engine.respond(&text).to_json()?)
    }

    /// Canonical symptoms mentioned in the text, sorted.
    pub fn extract_symptoms(&self, text: String) -> Vec<String> {
        self.engine.extract(&text).into_iter().collect()
    }

    /// SHA-256 of the loaded knowledge base.
    pub fn knowledge_base_fingerprint(&self) -> String {
        self.engine.knowledge().fingerprint()
    }

    /// Names of all known conditions, in knowledge base order.
    pub fn condition_names(&self) -> Vec<String> {
        self.engine
            .knowledge()
            .conditions()
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe response.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiResponse {
    pub kind: String,
    pub message: String,
    pub predictions: Vec<FfiPrediction>,
    pub extracted_symptoms: Vec<String>,
    pub confidence: f64,
    pub recommendation: String,
    pub emergency: bool,
    pub duration_value: Option<u32>,
    pub duration_unit: Option<String>,
    pub intensity: String,
    pub frequency: String,
}

impl From<Response> for FfiResponse {
    fn from(response: Response) -> Self {
        let (duration_value, duration_unit) = match response.context.duration {
            Some(d) => (Some(d.value), Some(d.unit)),
            None => (None, None),
        };
        Self {
            kind: format!("{:?}", response.kind),
            message: response.message,
            predictions: response.predictions.into_iter().map(|p| p.into()).collect(),
            extracted_symptoms: response.extracted_symptoms.into_iter().collect(),
            confidence: response.confidence,
            recommendation: response.recommendation,
            emergency: response.emergency,
            duration_value,
            duration_unit,
            intensity: format!("{:?}", response.context.intensity),
            frequency: format!("{:?}", response.context.frequency),
        }
    }
}

/// FFI-safe prediction. Detail fields are `None` when not applicable.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPrediction {
    pub condition: String,
    pub confidence: f64,
    pub source: String,
    pub matched_symptoms: Vec<String>,
    pub severity: Option<String>,
    pub description: Option<String>,
    pub recommendation: Option<String>,
}

impl From<Prediction> for FfiPrediction {
    fn from(prediction: Prediction) -> Self {
        let (severity, description, recommendation) = match prediction.details {
            ConditionDetails::Available(info) => (
                Some(info.severity.to_string()),
                Some(info.description),
                Some(info.recommendation),
            ),
            ConditionDetails::NotApplicable => (None, None, None),
        };
        Self {
            condition: prediction.condition,
            confidence: prediction.confidence,
            source: prediction.source.to_string(),
            matched_symptoms: prediction.matched_symptoms.into_iter().collect(),
            severity,
            description,
            recommendation,
        }
    }
}
