//! spam-rs: email spam classifier
//!
//! Cleans message text, extracts TF-IDF features, trains a multinomial
//! Naive Bayes model and persists the fitted pair for inference.
//!
//! # Pipeline
//!
//! 1. Labeled rows are read from a CSV file with an explicit schema
//! 2. Each body is normalized (lowercase letters only, links become `url`)
//! 3. Rows are shuffled with a fixed seed and split into train/test
//! 4. The vectorizer is fitted on the training partition only
//! 5. The classifier is trained and scored on the held-out partition
//! 6. Vectorizer and classifier are written atomically to disk
//!
//! # Example
//!
//! ```no_run
//! use spam_rs::config::Config;
//! use spam_rs::spam::SpamFilter;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let report = spam_rs::pipeline::train(&config)?;
//!     println!("accuracy: {:.3}", report.evaluation.accuracy);
//!
//!     let filter = SpamFilter::load(&config.artifacts.store())?;
//!     let prediction = filter.predict(Some("FREE money, click http://win.example now!"));
//!     println!("{} ({:.2})", prediction.label, prediction.score);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration management
//! - [`dataset`]: CSV loading and train/test split
//! - [`error`]: Error types and handling
//! - [`pipeline`]: End-to-end training and evaluation
//! - [`spam`]: Normalizer, vectorizer, classifier, metrics and filter
//! - [`storage`]: Artifact persistence
//! - [`logging`]: Tracing subscriber setup

pub mod config;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod spam;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, SpamError};
pub use spam::{Label, Prediction, SpamFilter};
pub use storage::ArtifactStore;
