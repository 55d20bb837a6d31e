//! Spam classification module
//!
//! Text normalization, TF-IDF feature extraction and multinomial Naive Bayes.

pub mod classifier;
pub mod filter;
pub mod metrics;
pub mod normalizer;
pub mod stop_words;
pub mod types;
pub mod vectorizer;

pub use classifier::{NaiveBayesClassifier, NaiveBayesConfig};
pub use filter::SpamFilter;
pub use metrics::{ClassMetrics, ClassificationReport, ConfusionMatrix};
pub use normalizer::{normalize, normalize_text, TextNormalizer};
pub use types::*;
pub use vectorizer::{FeatureVector, TfidfVectorizer, VectorizerConfig};
