//! Inference-time spam filter
//!
//! Composes normalization, the fitted vectorizer and the trained classifier.

use tracing::debug;

use super::classifier::{NaiveBayesClassifier, NaiveBayesConfig};
use super::metrics::ClassificationReport;
use super::normalizer::normalize;
use super::types::{Label, Prediction, RawRecord};
use super::vectorizer::{TfidfVectorizer, VectorizerConfig};
use crate::error::Result;
use crate::storage::ArtifactStore;

/// A fitted vectorizer paired with the classifier trained on its features
#[derive(Debug, Clone, PartialEq)]
pub struct SpamFilter {
    vectorizer: TfidfVectorizer,
    classifier: NaiveBayesClassifier,
}

impl SpamFilter {
    pub fn new(vectorizer: TfidfVectorizer, classifier: NaiveBayesClassifier) -> Self {
        Self {
            vectorizer,
            classifier,
        }
    }

    /// Fit both stages on training records
    pub fn fit(
        records: &[RawRecord],
        vectorizer_config: VectorizerConfig,
        classifier_config: NaiveBayesConfig,
    ) -> Result<Self> {
        let texts: Vec<String> = records.iter().map(|r| normalize(r.text.as_deref())).collect();
        let labels: Vec<Label> = records.iter().map(|r| r.label).collect();

        let vectorizer = TfidfVectorizer::fit(vectorizer_config, &texts)?;
        let features = vectorizer.transform(&texts);
        let classifier = NaiveBayesClassifier::fit(classifier_config, &features, &labels)?;

        Ok(Self::new(vectorizer, classifier))
    }

    /// Load a saved pair
    pub fn load(store: &ArtifactStore) -> Result<Self> {
        let (vectorizer, classifier) = store.load()?;
        Ok(Self::new(vectorizer, classifier))
    }

    /// Persist the pair
    pub fn save(&self, store: &ArtifactStore) -> Result<()> {
        store.save(&self.vectorizer, &self.classifier)
    }

    /// Classify raw message text
    pub fn predict(&self, raw_text: Option<&str>) -> Prediction {
        let cleaned = normalize(raw_text);
        let features = self.vectorizer.transform_one(&cleaned);
        let prediction = self.classifier.predict(&features);
        debug!(
            known_tokens = features.nnz(),
            label = %prediction.label,
            score = prediction.score,
            "Classified message"
        );
        prediction
    }

    /// Classify a batch of records and score against their labels
    pub fn evaluate(&self, records: &[RawRecord]) -> ClassificationReport {
        let texts: Vec<String> = records.iter().map(|r| normalize(r.text.as_deref())).collect();
        let predicted: Vec<Label> = self
            .classifier
            .predict_batch(&self.vectorizer.transform(&texts))
            .into_iter()
            .map(|p| p.label)
            .collect();
        let actual: Vec<Label> = records.iter().map(|r| r.label).collect();

        ClassificationReport::compute(&actual, &predicted)
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn classifier(&self) -> &NaiveBayesClassifier {
        &self.classifier
    }

    pub fn into_parts(self) -> (TfidfVectorizer, NaiveBayesClassifier) {
        (self.vectorizer, self.classifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(text: &str, label: Label) -> RawRecord {
        RawRecord {
            text: Some(text.to_string()),
            label,
        }
    }

    #[test]
    fn test_free_cash_is_spam() {
        let records = vec![
            record("free money now", Label::Spam),
            record("meeting at noon", Label::Ham),
        ];
        let config = VectorizerConfig {
            max_features: 10,
            ..VectorizerConfig::default()
        };
        let filter = SpamFilter::fit(&records, config, NaiveBayesConfig::default()).unwrap();

        assert!(filter.vectorizer().index_of("at").is_none());
        assert!(filter.vectorizer().vocabulary_size() <= 10);

        let prediction = filter.predict(Some("free cash now"));
        assert_eq!(prediction.label, Label::Spam);
        assert!(prediction.score > 0.5);

        let prediction = filter.predict(Some("Meeting moved to NOON."));
        assert_eq!(prediction.label, Label::Ham);
    }

    #[test]
    fn test_missing_text_uses_prior() {
        let records = vec![
            record("free money", Label::Spam),
            record("free prize", Label::Spam),
            record("meeting notes", Label::Ham),
        ];
        let filter =
            SpamFilter::fit(&records, VectorizerConfig::default(), NaiveBayesConfig::default()).unwrap();

        let prediction = filter.predict(None);
        assert_eq!(prediction.label, Label::Spam);
        assert!((prediction.score - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_evaluate_training_data() {
        let records = vec![
            record("free money now", Label::Spam),
            record("claim your prize", Label::Spam),
            record("meeting at noon", Label::Ham),
            record("project status update", Label::Ham),
        ];
        let filter =
            SpamFilter::fit(&records, VectorizerConfig::default(), NaiveBayesConfig::default()).unwrap();

        let report = filter.evaluate(&records);
        assert_eq!(report.accuracy, 1.0);
        assert_eq!(report.spam.support, 2);
    }
}
