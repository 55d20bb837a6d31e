use crate::error::{Result, SpamError};
use crate::spam::{FilterSettings, NaiveBayesConfig, VectorizerConfig};
use crate::storage::ArtifactStore;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub vectorizer: VectorizerConfig,
    #[serde(default)]
    pub classifier: NaiveBayesConfig,
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub filter: FilterSettings,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatasetConfig {
    /// CSV file with a header row
    #[serde(default = "default_dataset_path")]
    pub path: PathBuf,
    /// Column holding the message body
    #[serde(default = "default_text_column")]
    pub text_column: String,
    /// Column holding the 0/1 spam label
    #[serde(default = "default_label_column")]
    pub label_column: String,
    /// Fraction of rows held out for evaluation
    #[serde(default = "default_test_size")]
    pub test_size: f64,
    /// Shuffle seed for the train/test split
    #[serde(default = "default_seed")]
    pub seed: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtifactsConfig {
    #[serde(default = "default_artifacts_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_vectorizer_file")]
    pub vectorizer_file: String,
    #[serde(default = "default_model_file")]
    pub model_file: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default filter directive when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("emails.csv")
}

fn default_text_column() -> String {
    "text".to_string()
}

fn default_label_column() -> String {
    "spam".to_string()
}

fn default_test_size() -> f64 {
    0.2
}

fn default_seed() -> u64 {
    42
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from("artifacts")
}

fn default_vectorizer_file() -> String {
    crate::storage::artifacts::DEFAULT_VECTORIZER_FILE.to_string()
}

fn default_model_file() -> String {
    crate::storage::artifacts::DEFAULT_MODEL_FILE.to_string()
}

fn default_listen_addr() -> String {
    "127.0.0.1:8090".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
            text_column: default_text_column(),
            label_column: default_label_column(),
            test_size: default_test_size(),
            seed: default_seed(),
        }
    }
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: default_artifacts_dir(),
            vectorizer_file: default_vectorizer_file(),
            model_file: default_model_file(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl ArtifactsConfig {
    pub fn store(&self) -> ArtifactStore {
        ArtifactStore::with_file_names(&self.dir, &self.vectorizer_file, &self.model_file)
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            SpamError::Configuration(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| SpamError::Configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a path if given, otherwise use defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.dataset.test_size > 0.0 && self.dataset.test_size < 1.0) {
            return Err(SpamError::Configuration(format!(
                "dataset.test_size must be in (0, 1), got {}",
                self.dataset.test_size
            )));
        }
        if self.dataset.text_column.is_empty() || self.dataset.label_column.is_empty() {
            return Err(SpamError::Configuration(
                "dataset.text_column and dataset.label_column must be set".to_string(),
            ));
        }
        if self.vectorizer.max_features == 0 {
            return Err(SpamError::Configuration(
                "vectorizer.max_features must be at least 1".to_string(),
            ));
        }
        if !(self.classifier.alpha.is_finite() && self.classifier.alpha > 0.0) {
            return Err(SpamError::Configuration(format!(
                "classifier.alpha must be positive, got {}",
                self.classifier.alpha
            )));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(SpamError::Configuration(format!(
                "logging.format must be \"pretty\" or \"json\", got {:?}",
                self.logging.format
            )));
        }
        Ok(())
    }
}
