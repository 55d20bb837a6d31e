use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpamError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Empty vocabulary: no usable training text")]
    EmptyVocabulary,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt artifact: {0}")]
    CorruptArtifact(String),

    #[error("Training error: {0}")]
    Training(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, SpamError>;
