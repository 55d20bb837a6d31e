//! Multinomial Naive Bayes classifier
//!
//! Trained on TF-IDF weights rather than raw counts, with additive smoothing
//! and class priors estimated from the training labels.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::{Label, Prediction};
use super::vectorizer::FeatureVector;
use crate::error::{Result, SpamError};

/// Classifier hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NaiveBayesConfig {
    /// Additive (Laplace/Lidstone) smoothing
    #[serde(default = "default_alpha")]
    pub alpha: f64,
}

fn default_alpha() -> f64 {
    1.0
}

impl Default for NaiveBayesConfig {
    fn default() -> Self {
        Self { alpha: default_alpha() }
    }
}

/// Per-class fitted parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ClassModel {
    label: Label,
    document_count: u64,
    log_prior: f64,
    feature_log_prob: Vec<f64>,
}

/// Trained multinomial Naive Bayes model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NaiveBayesClassifier {
    config: NaiveBayesConfig,
    n_features: usize,
    /// Classes seen in training, ordered by label
    classes: Vec<ClassModel>,
}

impl NaiveBayesClassifier {
    /// Fit the model on feature vectors and their labels
    pub fn fit(config: NaiveBayesConfig, features: &[FeatureVector], labels: &[Label]) -> Result<Self> {
        if features.is_empty() {
            return Err(SpamError::Training("no training examples".to_string()));
        }
        if features.len() != labels.len() {
            return Err(SpamError::Training(format!(
                "{} feature vectors but {} labels",
                features.len(),
                labels.len()
            )));
        }
        if !(config.alpha.is_finite() && config.alpha > 0.0) {
            return Err(SpamError::Training(format!(
                "alpha must be positive, got {}",
                config.alpha
            )));
        }

        let n_features = features[0].dim();
        if let Some(bad) = features.iter().find(|f| f.dim() != n_features) {
            return Err(SpamError::Training(format!(
                "inconsistent feature dimension {} (expected {})",
                bad.dim(),
                n_features
            )));
        }

        let n_samples = features.len() as f64;
        let mut classes = Vec::new();

        for label in Label::ALL {
            let mut document_count = 0u64;
            let mut feature_count = vec![0.0f64; n_features];

            for (vector, _) in features.iter().zip(labels).filter(|(_, l)| **l == label) {
                document_count += 1;
                for (idx, weight) in vector.iter() {
                    feature_count[idx] += weight;
                }
            }

            if document_count == 0 {
                continue;
            }

            let total: f64 = feature_count.iter().sum();
            let denominator = (total + config.alpha * n_features as f64).ln();
            let feature_log_prob = feature_count
                .iter()
                .map(|count| (count + config.alpha).ln() - denominator)
                .collect();

            classes.push(ClassModel {
                label,
                document_count,
                log_prior: (document_count as f64 / n_samples).ln(),
                feature_log_prob,
            });
        }

        debug!(
            samples = features.len(),
            features = n_features,
            classes = classes.len(),
            "Fitted Naive Bayes classifier"
        );

        Ok(Self {
            config,
            n_features,
            classes,
        })
    }

    /// Unnormalized log posterior per class
    pub fn joint_log_likelihood(&self, features: &FeatureVector) -> Vec<(Label, f64)> {
        self.classes
            .iter()
            .map(|class| {
                let likelihood: f64 = features
                    .iter()
                    .filter(|&(idx, _)| idx < self.n_features)
                    .map(|(idx, weight)| weight * class.feature_log_prob[idx])
                    .sum();
                (class.label, class.log_prior + likelihood)
            })
            .collect()
    }

    /// Posterior probability per class
    pub fn predict_proba(&self, features: &FeatureVector) -> Vec<(Label, f64)> {
        let jll = self.joint_log_likelihood(features);
        let max = jll.iter().map(|&(_, v)| v).fold(f64::NEG_INFINITY, f64::max);
        let log_norm = max + jll.iter().map(|&(_, v)| (v - max).exp()).sum::<f64>().ln();

        jll.into_iter()
            .map(|(label, v)| (label, (v - log_norm).exp()))
            .collect()
    }

    /// Most probable label and spam probability
    pub fn predict(&self, features: &FeatureVector) -> Prediction {
        let proba = self.predict_proba(features);

        let mut best = proba[0];
        for &candidate in &proba[1..] {
            // strict comparison keeps the lower label on ties
            if candidate.1 > best.1 {
                best = candidate;
            }
        }

        let score = proba
            .iter()
            .find(|(label, _)| label.is_spam())
            .map(|&(_, p)| p)
            .unwrap_or(0.0);

        Prediction { label: best.0, score }
    }

    /// Predict a batch, preserving order
    pub fn predict_batch(&self, features: &[FeatureVector]) -> Vec<Prediction> {
        features.iter().map(|f| self.predict(f)).collect()
    }

    pub fn config(&self) -> &NaiveBayesConfig {
        &self.config
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Labels seen during training
    pub fn classes(&self) -> Vec<Label> {
        self.classes.iter().map(|c| c.label).collect()
    }

    /// Training documents per class
    pub fn class_counts(&self) -> Vec<(Label, u64)> {
        self.classes.iter().map(|c| (c.label, c.document_count)).collect()
    }

    /// Check internal consistency after deserialization
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.classes.is_empty() {
            return Err("classifier has no classes".to_string());
        }
        if self.classes.windows(2).any(|pair| pair[0].label >= pair[1].label) {
            return Err("classes are not sorted and unique".to_string());
        }
        for class in &self.classes {
            if class.feature_log_prob.len() != self.n_features {
                return Err(format!(
                    "class {} has {} feature weights, expected {}",
                    class.label,
                    class.feature_log_prob.len(),
                    self.n_features
                ));
            }
            if !class.log_prior.is_finite() || class.feature_log_prob.iter().any(|p| !p.is_finite()) {
                return Err(format!("class {} has non-finite parameters", class.label));
            }
        }
        Ok(())
    }
}
