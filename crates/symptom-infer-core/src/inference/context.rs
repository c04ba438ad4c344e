//! Duration, intensity and frequency qualifiers from free text.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::{Frequency, Intensity, SymptomContext, SymptomDuration};

const SEVERE_WORDS: &[&str] = &["severe", "terrible", "awful", "intense", "extreme", "very bad"];
const MILD_WORDS: &[&str] = &["mild", "slight", "minor", "little"];

const FREQUENCY_WORDS: &[(&str, Frequency)] = &[
    ("constant", Frequency::Constant),
    ("continuous", Frequency::Constant),
    ("intermittent", Frequency::Intermittent),
    ("occasional", Frequency::Occasional),
    ("frequent", Frequency::Frequent),
    ("rare", Frequency::Rare),
];

/// Tried in order; the first unit that matches anywhere wins.
fn duration_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        ["day", "week", "hour", "month"]
            .iter()
            .filter_map(|unit| Regex::new(&format!(r"(?i)(\d+)\s*({}s?)", unit)).ok())
            .collect()
    })
}

/// Extract all qualifiers from an utterance.
pub fn extract_context(text: &str) -> SymptomContext {
    let lower = text.to_lowercase();
    SymptomContext {
        duration: extract_duration(&lower),
        intensity: extract_intensity(&lower),
        frequency: extract_frequency(&lower),
    }
}

fn extract_duration(text: &str) -> Option<SymptomDuration> {
    duration_patterns().iter().find_map(|pattern| {
        let caps = pattern.captures(text)?;
        let value = caps.get(1)?.as_str().parse().ok()?;
        Some(SymptomDuration {
            value,
            unit: caps.get(2)?.as_str().to_string(),
        })
    })
}

fn extract_intensity(text: &str) -> Intensity {
    if SEVERE_WORDS.iter().any(|w| text.contains(w)) {
        Intensity::Severe
    } else if MILD_WORDS.iter().any(|w| text.contains(w)) {
        Intensity::Mild
    } else {
        Intensity::Moderate
    }
}

fn extract_frequency(text: &str) -> Frequency {
    FREQUENCY_WORDS
        .iter()
        .find(|(word, _)| text.contains(word))
        .map(|(_, f)| *f)
        .unwrap_or_default()
}
