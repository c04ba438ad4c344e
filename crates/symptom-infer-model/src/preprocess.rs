//! Text preprocessing for the bag-of-words model.
//!
//! Mirrors the cleaning the model was trained with:
//! - Lower-case
//! - Drop everything that is not an ASCII letter or whitespace
//! - Collapse runs of whitespace

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Clean raw text into the normalized form the model expects.
pub fn clean_text(text: &str) -> String {
    let lower = text.to_lowercase();
    let kept: String = lower
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_whitespace())
        .collect();

    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split cleaned text into tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    clean_text(text)
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Word → feature column mapping.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Vocabulary {
    words: Vec<String>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// Build a vocabulary from an ordered word list. Later duplicates are ignored.
    pub fn new(words: Vec<String>) -> Self {
        let mut vocab = Self {
            words: Vec::with_capacity(words.len()),
            index: HashMap::new(),
        };
        for word in words {
            let word = word.to_lowercase();
            if !vocab.index.contains_key(&word) {
                vocab.index.insert(word.clone(), vocab.words.len());
                vocab.words.push(word);
            }
        }
        vocab
    }

    /// Rebuild the lookup index (needed after deserialization).
    pub(crate) fn reindex(self) -> Self {
        Self::new(self.words)
    }

    /// Number of feature columns.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Column for a word, if known.
    pub fn column(&self, word: &str) -> Option<usize> {
        self.index.get(word).copied()
    }

    /// Count-vectorize text. Unknown words are dropped.
    pub fn encode(&self, text: &str) -> Vec<f64> {
        let mut counts = vec![0.0; self.words.len()];
        for token in tokenize(text) {
            if let Some(col) = self.column(&token) {
                counts[col] += 1.0;
            }
        }
        counts
    }
}
