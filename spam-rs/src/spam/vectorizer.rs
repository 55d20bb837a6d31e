//! TF-IDF feature extraction
//!
//! The vectorizer is fitted once on the training partition and is read-only
//! afterwards. Transforming held-out text never extends the vocabulary.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::debug;

use super::stop_words;
use crate::error::{Result, SpamError};

/// Vectorizer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerConfig {
    /// Upper bound on vocabulary size
    #[serde(default = "default_max_features")]
    pub max_features: usize,
    /// Tokens shorter than this are discarded
    #[serde(default = "default_min_token_len")]
    pub min_token_len: usize,
    /// Drop the English stop-word list
    #[serde(default = "default_stop_words")]
    pub stop_words: bool,
}

fn default_max_features() -> usize {
    5000
}

fn default_min_token_len() -> usize {
    2
}

fn default_stop_words() -> bool {
    true
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: default_max_features(),
            min_token_len: default_min_token_len(),
            stop_words: default_stop_words(),
        }
    }
}

/// Sparse feature vector with implicit zeros
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    dim: usize,
    /// (column, weight) pairs, sorted by column, no explicit zeros
    entries: Vec<(usize, f64)>,
}

impl FeatureVector {
    /// Build a vector from (column, weight) pairs
    ///
    /// Entries are sorted by column; zero weights are dropped.
    pub fn from_entries(dim: usize, mut entries: Vec<(usize, f64)>) -> Result<Self> {
        entries.retain(|&(_, w)| w != 0.0);
        entries.sort_by_key(|&(idx, _)| idx);

        if entries.windows(2).any(|pair| pair[0].0 == pair[1].0) {
            return Err(SpamError::Training("duplicate feature column".to_string()));
        }
        if let Some(&(idx, _)) = entries.last() {
            if idx >= dim {
                return Err(SpamError::Training(format!(
                    "feature column {} out of range for dimension {}",
                    idx, dim
                )));
            }
        }
        if entries.iter().any(|&(_, w)| !w.is_finite() || w < 0.0) {
            return Err(SpamError::Training(
                "feature weights must be finite and non-negative".to_string(),
            ));
        }

        Ok(Self { dim, entries })
    }

    /// An all-zero vector
    pub fn zeros(dim: usize) -> Self {
        Self { dim, entries: Vec::new() }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of non-zero entries
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    /// Non-zero entries in column order
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// Weight at a column (zero if absent)
    pub fn get(&self, index: usize) -> f64 {
        self.entries
            .binary_search_by_key(&index, |&(idx, _)| idx)
            .map(|pos| self.entries[pos].1)
            .unwrap_or(0.0)
    }

    /// Euclidean norm
    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|&(_, w)| w * w).sum::<f64>().sqrt()
    }

    /// Dense representation
    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.dim];
        for &(idx, w) in &self.entries {
            dense[idx] = w;
        }
        dense
    }
}

/// Fitted TF-IDF vectorizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    config: VectorizerConfig,
    stop_words: BTreeSet<String>,
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
    n_documents: usize,
}

impl TfidfVectorizer {
    /// Fit vocabulary and IDF weights on training text
    pub fn fit<S: AsRef<str>>(config: VectorizerConfig, training_texts: &[S]) -> Result<Self> {
        if training_texts.is_empty() {
            return Err(SpamError::EmptyVocabulary);
        }
        if config.max_features == 0 {
            return Err(SpamError::Configuration(
                "max_features must be at least 1".to_string(),
            ));
        }

        let stop_words = if config.stop_words {
            stop_words::english()
        } else {
            BTreeSet::new()
        };

        let mut term_frequency: HashMap<String, u64> = HashMap::new();
        let mut document_frequency: HashMap<String, u64> = HashMap::new();

        for text in training_texts {
            let mut seen = HashSet::new();
            for token in tokenize(text.as_ref(), config.min_token_len, &stop_words) {
                *term_frequency.entry(token.to_string()).or_insert(0) += 1;
                if seen.insert(token) {
                    *document_frequency.entry(token.to_string()).or_insert(0) += 1;
                }
            }
        }

        if term_frequency.is_empty() {
            return Err(SpamError::EmptyVocabulary);
        }

        // Most frequent first, ties broken alphabetically
        let mut ranked: Vec<(String, u64)> = term_frequency.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(config.max_features);

        let retained: BTreeSet<String> = ranked.into_iter().map(|(token, _)| token).collect();
        let vocabulary: BTreeMap<String, usize> = retained
            .into_iter()
            .enumerate()
            .map(|(idx, token)| (token, idx))
            .collect();

        let n_documents = training_texts.len();
        let mut idf = vec![0.0; vocabulary.len()];
        for (token, &idx) in &vocabulary {
            let df = document_frequency.get(token).copied().unwrap_or(0);
            idf[idx] = ((1.0 + n_documents as f64) / (1.0 + df as f64)).ln() + 1.0;
        }

        debug!(
            documents = n_documents,
            vocabulary = vocabulary.len(),
            "Fitted TF-IDF vectorizer"
        );

        Ok(Self {
            config,
            stop_words,
            vocabulary,
            idf,
            n_documents,
        })
    }

    /// Transform texts into L2-normalized TF-IDF vectors, preserving order
    pub fn transform<S: AsRef<str>>(&self, texts: &[S]) -> Vec<FeatureVector> {
        texts.iter().map(|text| self.transform_one(text.as_ref())).collect()
    }

    /// Transform a single text
    pub fn transform_one(&self, text: &str) -> FeatureVector {
        let mut counts: BTreeMap<usize, u64> = BTreeMap::new();
        for token in tokenize(text, self.config.min_token_len, &self.stop_words) {
            if let Some(&idx) = self.vocabulary.get(token) {
                *counts.entry(idx).or_insert(0) += 1;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(idx, count)| (idx, count as f64 * self.idf[idx]))
            .collect();

        let norm = entries.iter().map(|&(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for entry in &mut entries {
                entry.1 /= norm;
            }
        }

        FeatureVector {
            dim: self.vocabulary.len(),
            entries,
        }
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// IDF weights indexed by column
    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn stop_words(&self) -> &BTreeSet<String> {
        &self.stop_words
    }

    /// Number of documents seen by `fit`
    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    /// Column for a token, if it is in the vocabulary
    pub fn index_of(&self, token: &str) -> Option<usize> {
        self.vocabulary.get(token).copied()
    }

    /// Check internal consistency after deserialization
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.vocabulary.is_empty() {
            return Err("vocabulary is empty".to_string());
        }
        if self.vocabulary.len() > self.config.max_features {
            return Err(format!(
                "vocabulary size {} exceeds max_features {}",
                self.vocabulary.len(),
                self.config.max_features
            ));
        }
        if self.idf.len() != self.vocabulary.len() {
            return Err(format!(
                "idf has {} weights for {} vocabulary entries",
                self.idf.len(),
                self.vocabulary.len()
            ));
        }

        let mut columns: Vec<usize> = self.vocabulary.values().copied().collect();
        columns.sort_unstable();
        if columns.iter().enumerate().any(|(expected, &idx)| expected != idx) {
            return Err("vocabulary columns are not a contiguous range".to_string());
        }
        if self.idf.iter().any(|w| !w.is_finite() || *w <= 0.0) {
            return Err("idf weights must be finite and positive".to_string());
        }

        Ok(())
    }
}

fn tokenize<'a>(
    text: &'a str,
    min_len: usize,
    stop_words: &'a BTreeSet<String>,
) -> impl Iterator<Item = &'a str> + 'a {
    text.split_whitespace()
        .filter(move |token| token.chars().count() >= min_len)
        .filter(move |token| !stop_words.contains(*token))
}
