//! CSV dataset loader
//!
//! The schema is explicit: the configured text and label columns must be
//! present in the header row, otherwise loading fails.

use std::io::Read;
use tracing::info;

use crate::config::DatasetConfig;
use crate::error::{Result, SpamError};
use crate::spam::{Label, RawRecord};

/// Load records from the CSV file named in the config
pub fn load_records(config: &DatasetConfig) -> Result<Vec<RawRecord>> {
    let file = std::fs::File::open(&config.path).map_err(|e| {
        SpamError::Configuration(format!(
            "Failed to open dataset {}: {}",
            config.path.display(),
            e
        ))
    })?;

    let records = read_records(file, &config.text_column, &config.label_column)?;
    info!(
        rows = records.len(),
        "Loaded dataset from {}",
        config.path.display()
    );
    Ok(records)
}

/// Read records from any CSV source with a header row
pub fn read_records<R: Read>(source: R, text_column: &str, label_column: &str) -> Result<Vec<RawRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers.iter().position(|h| h.trim() == name).ok_or_else(|| {
            SpamError::Configuration(format!(
                "Dataset has no {:?} column (found: {})",
                name,
                headers.iter().collect::<Vec<_>>().join(", ")
            ))
        })
    };
    let text_idx = column(text_column)?;
    let label_idx = column(label_column)?;

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result?;
        // header is line 1
        let line = row + 2;

        let text = record
            .get(text_idx)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        let raw_label = record.get(label_idx).unwrap_or("");
        let label = parse_label(raw_label).ok_or_else(|| {
            SpamError::Configuration(format!(
                "Invalid label {:?} in column {:?} at line {}",
                raw_label, label_column, line
            ))
        })?;

        records.push(RawRecord { text, label });
    }

    Ok(records)
}

fn parse_label(value: &str) -> Option<Label> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" | "spam" => Some(Label::Spam),
        "0" | "0.0" | "false" | "ham" => Some(Label::Ham),
        _ => None,
    }
}
