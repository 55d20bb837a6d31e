//! CLI for training and querying the spam classifier
//!
//! # Usage
//!
//! ```bash
//! # Train on the configured dataset and save artifacts
//! spam-rs --config spam.toml train
//!
//! # Re-score saved artifacts on the held-out partition
//! spam-rs --config spam.toml evaluate
//!
//! # Re-score saved artifacts on every row, training rows included
//! spam-rs --config spam.toml evaluate --all
//!
//! # Classify a single message
//! spam-rs --config spam.toml predict "Congratulations! You have won a prize"
//! ```

use clap::{Parser, Subcommand};
use spam_rs::config::Config;
use spam_rs::spam::SpamFilter;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "spam-rs")]
#[command(about = "Train and run the email spam classifier", long_about = None)]
struct Cli {
    /// TOML configuration file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the dataset CSV path
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Override the artifacts directory
    #[arg(long)]
    artifacts: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit vectorizer and classifier, report held-out metrics, save artifacts
    Train,
    /// Score saved artifacts on the held-out partition
    Evaluate {
        /// Score every dataset row, including the training partition
        #[arg(long)]
        all: bool,
    },
    /// Classify one message
    Predict {
        /// Message text
        text: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dataset) = cli.dataset {
        config.dataset.path = dataset;
    }
    if let Some(artifacts) = cli.artifacts {
        config.artifacts.dir = artifacts;
    }

    spam_rs::logging::init(&config.logging)?;
    info!("Starting spam-rs v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Train => {
            let report = spam_rs::pipeline::train(&config)?;
            println!("Training rows:   {}", report.train_size);
            println!("Test rows:       {}", report.test_size);
            println!("Vocabulary size: {}", report.vocabulary_size);
            println!();
            println!("Accuracy: {:.4}", report.evaluation.accuracy);
            println!();
            println!("Classification report:\n{}", report.evaluation);
            println!("✓ Model and vectorizer saved to {}", report.artifacts_dir.display());
        }
        Commands::Evaluate { all } => {
            let report = if all {
                spam_rs::pipeline::evaluate_all(&config)?
            } else {
                spam_rs::pipeline::evaluate(&config)?
            };
            println!("Accuracy: {:.4}", report.accuracy);
            println!();
            println!("Classification report:\n{}", report);
        }
        Commands::Predict { text } => {
            let filter = SpamFilter::load(&config.artifacts.store())?;
            let prediction = filter.predict(Some(&text));
            let action = config.filter.decide(&prediction);
            println!(
                "{} (spam probability {:.3}, action {:?})",
                prediction.label, prediction.score, action
            );
        }
    }

    Ok(())
}
