//! Engine configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sentinel label meaning "no condition identified".
pub const NO_CONDITION_LABEL: &str = "No Disease";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Thresholds, limits and collaborator selection for the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Classifier predictions must score strictly above this to be fused
    pub classifier_min_confidence: f64,
    /// Top predictions strictly above this get an assertive message
    pub high_confidence_threshold: f64,
    /// Overlap candidates taken into fusion
    pub max_overlap_candidates: usize,
    /// Predictions kept on the response and listed in messages
    pub max_displayed_predictions: usize,
    /// Overlap candidates must score strictly above this
    pub min_overlap_confidence: f64,
    /// Classifier sentinel for "nothing identified"
    pub no_condition_label: String,
    /// Canonical symptoms that trigger the emergency override
    pub emergency_symptoms: Vec<String>,
    pub fusion: FusionPolicy,
    pub classifier: ClassifierConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            classifier_min_confidence: 0.3,
            high_confidence_threshold: 0.7,
            max_overlap_candidates: 3,
            max_displayed_predictions: 3,
            min_overlap_confidence: 0.0,
            no_condition_label: NO_CONDITION_LABEL.to_string(),
            emergency_symptoms: vec![
                "shortness of breath".into(),
                "chest pain".into(),
                "difficulty breathing".into(),
                "unconsciousness".into(),
            ],
            fusion: FusionPolicy::default(),
            classifier: ClassifierConfig::default(),
        }
    }
}

/// How classifier and overlap predictions are merged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FusionPolicy {
    /// Keep only the highest-ranked prediction per condition name
    pub dedupe_by_condition: bool,
    /// Attach knowledge base details to classifier predictions
    pub enrich_classifier_predictions: bool,
}

impl Default for FusionPolicy {
    fn default() -> Self {
        Self {
            dedupe_by_condition: false,
            enrich_classifier_predictions: true,
        }
    }
}

/// Which classifier backs the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierBackend {
    /// Deterministic symptom co-occurrence rules
    #[default]
    RuleTable,
    /// Serialized bag-of-words model
    TrainedModel { model_path: PathBuf },
    /// Overlap scoring only
    Disabled,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ClassifierConfig {
    pub backend: ClassifierBackend,
    /// Give up on the classifier after this many milliseconds
    pub timeout_ms: Option<u64>,
}

impl EngineConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&json)?;
        tracing::debug!(path = %path.as_ref().display(), ?config, "loaded engine config");
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> ConfigResult<()> {
        for (name, value) in [
            ("classifier_min_confidence", self.classifier_min_confidence),
            ("high_confidence_threshold", self.high_confidence_threshold),
            ("min_overlap_confidence", self.min_overlap_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        if self.max_overlap_candidates == 0 {
            return Err(ConfigError::Invalid("max_overlap_candidates must be > 0".into()));
        }
        if self.max_displayed_predictions == 0 {
            return Err(ConfigError::Invalid("max_displayed_predictions must be > 0".into()));
        }
        if self.no_condition_label.trim().is_empty() {
            return Err(ConfigError::Invalid("no_condition_label must not be empty".into()));
        }
        if self.classifier.timeout_ms == Some(0) {
            return Err(ConfigError::Invalid("classifier timeout must be > 0".into()));
        }
        Ok(())
    }

    /// Whether a canonical symptom triggers the emergency override.
    pub fn is_emergency_symptom(&self, symptom: &str) -> bool {
        self.emergency_symptoms
            .iter()
            .any(|s| s.eq_ignore_ascii_case(symptom))
    }
}
