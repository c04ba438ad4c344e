//! Engine startup from data files.

use std::fs;
use std::path::Path;

use symptom_infer_core::models::{PredictionSource, ResponseKind};
use symptom_infer_core::{open_engine, EngineError, KnowledgeError, SymptomEngine};

const KNOWLEDGE_JSON: &str = r#"{
    "Hay Fever": {
        "symptoms": ["sneezing", "runny nose", "itchy eyes"],
        "severity": "low",
        "description": "Allergic reaction to pollen.",
        "recommendations": "Antihistamines."
    },
    "Sinusitis": {
        "symptoms": ["runny nose", "facial pain", "headache", "congestion"],
        "severity": "medium",
        "description": "Inflamed sinuses.",
        "recommendations": "Nasal irrigation."
    }
}"#;

const SYNONYMS_JSON: &str = r#"{
    "sneezing": ["sneezing", "sneeze"],
    "runny nose": ["runny nose", "Dripping Nose"],
    "itchy eyes": ["itchy eyes", "watery eyes"],
    "headache": ["headache"]
}"#;

const CONFIG_JSON: &str = r#"{
    "classifier": { "backend": { "kind": "disabled" } },
    "high_confidence_threshold": 0.6
}"#;

fn write(dir: &Path, name: &str, contents: &str) -> anyhow::Result<std::path::PathBuf> {
    let path = dir.join(name);
    fs::write(&path, contents)?;
    Ok(path)
}

#[test]
fn test_engine_from_files() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let kb = write(dir.path(), "conditions.json", KNOWLEDGE_JSON)?;
    let synonyms = write(dir.path(), "synonyms.json", SYNONYMS_JSON)?;
    let config = write(dir.path(), "config.json", CONFIG_JSON)?;

    let engine = SymptomEngine::from_files(Some(&kb), Some(&synonyms), Some(&config))?;
    assert_eq!(engine.knowledge().len(), 2);
    assert_eq!(engine.classifier_name(), "disabled");

    // Variants are lower-cased on load
    let response = engine.respond("Dripping nose, I sneeze all day and have watery eyes");
    assert_eq!(response.kind, ResponseKind::Assertive);
    assert_eq!(response.predictions[0].condition, "Hay Fever");
    assert_eq!(response.predictions[0].source, PredictionSource::Overlap);
    assert_eq!(response.recommendation, "Antihistamines.");

    Ok(())
}

#[test]
fn test_file_order_breaks_ties() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let kb = write(
        dir.path(),
        "conditions.json",
        r#"{
            "Zeta": {"symptoms": ["fever", "x"], "severity": "low", "description": "", "recommendations": ""},
            "Alpha": {"symptoms": ["fever", "y"], "severity": "low", "description": "", "recommendations": ""}
        }"#,
    )?;
    let config = write(dir.path(), "config.json", CONFIG_JSON)?;

    let engine = SymptomEngine::from_files(Some(&kb), None, Some(&config))?;
    let names: Vec<_> = engine
        .score(&engine.extract("fever"))
        .into_iter()
        .map(|p| p.condition)
        .collect();
    assert_eq!(names, vec!["Zeta", "Alpha"]);

    Ok(())
}

#[test]
fn test_missing_knowledge_file_is_fatal() {
    let result = SymptomEngine::from_files(Some(Path::new("/nonexistent/kb.json")), None, None);
    assert!(matches!(result, Err(EngineError::Knowledge(KnowledgeError::Io(_)))));
}

#[test]
fn test_malformed_knowledge_file_is_fatal() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;

    let truncated = write(dir.path(), "truncated.json", "{\"Flu\": {\"symptoms\": [")?;
    let result = SymptomEngine::from_files(Some(&truncated), None, None);
    assert!(matches!(result, Err(EngineError::Knowledge(KnowledgeError::Json(_)))));

    let bad_severity = write(
        dir.path(),
        "severity.json",
        r#"{"Flu": {"symptoms": ["fever"], "severity": "critical", "description": "", "recommendations": ""}}"#,
    )?;
    let result = SymptomEngine::from_files(Some(&bad_severity), None, None);
    assert!(matches!(result, Err(EngineError::Knowledge(KnowledgeError::Json(_)))));

    let no_symptoms = write(
        dir.path(),
        "empty.json",
        r#"{"Flu": {"symptoms": [], "severity": "low", "description": "", "recommendations": ""}}"#,
    )?;
    let result = SymptomEngine::from_files(Some(&no_symptoms), None, None);
    assert!(matches!(result, Err(EngineError::Knowledge(KnowledgeError::Invalid(_)))));

    Ok(())
}

#[test]
fn test_invalid_config_is_fatal() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = write(dir.path(), "config.json", r#"{"max_overlap_candidates": 0}"#)?;

    let result = SymptomEngine::from_files(None, None, Some(&config));
    assert!(matches!(result, Err(EngineError::Config(_))));

    Ok(())
}

#[test]
fn test_open_engine_over_ffi() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let kb = write(dir.path(), "conditions.json", KNOWLEDGE_JSON)?;

    let core = open_engine(Some(kb.to_string_lossy().into_owned()), None, None)?;
    assert_eq!(core.condition_names(), vec!["Hay Fever", "Sinusitis"]);

    let error = open_engine(Some("/nonexistent/kb.json".into()), None, None).err();
    assert!(error.is_some_and(|e| e.to_string().starts_with("Knowledge error")));

    Ok(())
}
