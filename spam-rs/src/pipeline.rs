//! Training and evaluation pipeline
//!
//! load → split → fit (training partition only) → evaluate → save.

use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use crate::config::Config;
use crate::dataset::{load_records, train_test_split};
use crate::error::Result;
use crate::spam::{ClassificationReport, RawRecord, SpamFilter};

/// Outcome of a training run
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub train_size: usize,
    pub test_size: usize,
    pub vocabulary_size: usize,
    pub evaluation: ClassificationReport,
    pub artifacts_dir: PathBuf,
}

/// Train on in-memory records and score the held-out partition
///
/// The vectorizer only ever sees the training partition.
pub fn train_on_records(records: Vec<RawRecord>, config: &Config) -> Result<(SpamFilter, TrainingReport)> {
    let split = train_test_split(records, config.dataset.test_size, config.dataset.seed)?;
    info!(
        train = split.train.len(),
        test = split.test.len(),
        "Split dataset"
    );

    let filter = SpamFilter::fit(
        &split.train,
        config.vectorizer.clone(),
        config.classifier.clone(),
    )?;
    info!(
        vocabulary = filter.vectorizer().vocabulary_size(),
        "Trained classifier"
    );

    let evaluation = filter.evaluate(&split.test);
    info!(accuracy = evaluation.accuracy, "Evaluated on held-out partition");

    let report = TrainingReport {
        train_size: split.train.len(),
        test_size: split.test.len(),
        vocabulary_size: filter.vectorizer().vocabulary_size(),
        evaluation,
        artifacts_dir: config.artifacts.dir.clone(),
    };

    Ok((filter, report))
}

/// Run the full pipeline from the configured dataset and save the artifacts
pub fn train(config: &Config) -> Result<TrainingReport> {
    let records = load_records(&config.dataset)?;
    let (filter, report) = train_on_records(records, config)?;

    filter.save(&config.artifacts.store())?;
    Ok(report)
}

/// Reload saved artifacts and score them on the held-out partition
///
/// The split is recomputed from the configured seed, so these are the same
/// rows `train` held out.
pub fn evaluate(config: &Config) -> Result<ClassificationReport> {
    let filter = SpamFilter::load(&config.artifacts.store())?;
    let records = load_records(&config.dataset)?;
    let split = train_test_split(records, config.dataset.test_size, config.dataset.seed)?;

    let report = filter.evaluate(&split.test);
    info!(
        rows = split.test.len(),
        accuracy = report.accuracy,
        "Evaluated saved model on held-out partition"
    );
    Ok(report)
}

/// Reload saved artifacts and score every row of the configured dataset,
/// training rows included
pub fn evaluate_all(config: &Config) -> Result<ClassificationReport> {
    let filter = SpamFilter::load(&config.artifacts.store())?;
    let records = load_records(&config.dataset)?;

    let report = filter.evaluate(&records);
    info!(
        rows = records.len(),
        accuracy = report.accuracy,
        "Evaluated saved model on full dataset"
    );
    Ok(report)
}
