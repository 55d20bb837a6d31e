//! Persisted model artifacts
//!
//! The fitted vectorizer and the trained classifier are stored as two
//! independently loadable JSON files. Each file is a versioned envelope so a
//! format change is detected on load instead of producing wrong predictions.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

use crate::error::{Result, SpamError};
use crate::spam::{NaiveBayesClassifier, TfidfVectorizer};

/// Current on-disk format version
pub const FORMAT_VERSION: u32 = 1;

pub const VECTORIZER_KIND: &str = "spam-rs/tfidf-vectorizer";
pub const CLASSIFIER_KIND: &str = "spam-rs/multinomial-nb";

pub const DEFAULT_VECTORIZER_FILE: &str = "vectorizer.json";
pub const DEFAULT_MODEL_FILE: &str = "model.json";

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    kind: String,
    format_version: u32,
    crate_version: String,
    /// Shared by both artifacts written by one `save`
    generation: String,
    payload: T,
}

/// Directory holding a vectorizer/classifier pair
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
    vectorizer_file: String,
    model_file: String,
}

impl ArtifactStore {
    /// Store using the default file names
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self::with_file_names(dir, DEFAULT_VECTORIZER_FILE, DEFAULT_MODEL_FILE)
    }

    pub fn with_file_names<P: AsRef<Path>>(dir: P, vectorizer_file: &str, model_file: &str) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            vectorizer_file: vectorizer_file.to_string(),
            model_file: model_file.to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn vectorizer_path(&self) -> PathBuf {
        self.dir.join(&self.vectorizer_file)
    }

    pub fn model_path(&self) -> PathBuf {
        self.dir.join(&self.model_file)
    }

    /// Whether both artifact files are present
    pub fn exists(&self) -> bool {
        self.vectorizer_path().is_file() && self.model_path().is_file()
    }

    /// Persist both artifacts
    pub fn save(&self, vectorizer: &TfidfVectorizer, classifier: &NaiveBayesClassifier) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let generation = generation_id();
        write_atomic(
            &self.vectorizer_path(),
            &Envelope {
                kind: VECTORIZER_KIND.to_string(),
                format_version: FORMAT_VERSION,
                crate_version: env!("CARGO_PKG_VERSION").to_string(),
                generation: generation.clone(),
                payload: vectorizer,
            },
        )?;
        write_atomic(
            &self.model_path(),
            &Envelope {
                kind: CLASSIFIER_KIND.to_string(),
                format_version: FORMAT_VERSION,
                crate_version: env!("CARGO_PKG_VERSION").to_string(),
                generation,
                payload: classifier,
            },
        )?;
        sync_dir(&self.dir)?;

        info!("Saved artifacts to {}", self.dir.display());
        Ok(())
    }

    /// Load the pair written by one `save`
    pub fn load(&self) -> Result<(TfidfVectorizer, NaiveBayesClassifier)> {
        let vectorizer: Envelope<TfidfVectorizer> = read_envelope(&self.vectorizer_path(), VECTORIZER_KIND)?;
        let classifier: Envelope<NaiveBayesClassifier> = read_envelope(&self.model_path(), CLASSIFIER_KIND)?;

        if vectorizer.generation != classifier.generation {
            return Err(SpamError::CorruptArtifact(format!(
                "vectorizer and model come from different saves ({} vs {})",
                vectorizer.generation, classifier.generation
            )));
        }

        let (vectorizer, classifier) = (vectorizer.payload, classifier.payload);
        check_vectorizer(&vectorizer)?;
        check_classifier(&classifier)?;

        if classifier.n_features() != vectorizer.vocabulary_size() {
            return Err(SpamError::CorruptArtifact(format!(
                "model expects {} features but vocabulary has {}",
                classifier.n_features(),
                vectorizer.vocabulary_size()
            )));
        }

        info!(
            vocabulary = vectorizer.vocabulary_size(),
            "Loaded artifacts from {}",
            self.dir.display()
        );
        Ok((vectorizer, classifier))
    }

    /// Load only the vectorizer
    pub fn load_vectorizer(&self) -> Result<TfidfVectorizer> {
        let envelope: Envelope<TfidfVectorizer> = read_envelope(&self.vectorizer_path(), VECTORIZER_KIND)?;
        check_vectorizer(&envelope.payload)?;
        Ok(envelope.payload)
    }

    /// Load only the classifier
    pub fn load_classifier(&self) -> Result<NaiveBayesClassifier> {
        let envelope: Envelope<NaiveBayesClassifier> = read_envelope(&self.model_path(), CLASSIFIER_KIND)?;
        check_classifier(&envelope.payload)?;
        Ok(envelope.payload)
    }
}

fn check_vectorizer(vectorizer: &TfidfVectorizer) -> Result<()> {
    vectorizer
        .validate()
        .map_err(|e| SpamError::CorruptArtifact(format!("vectorizer: {}", e)))
}

fn check_classifier(classifier: &NaiveBayesClassifier) -> Result<()> {
    classifier
        .validate()
        .map_err(|e| SpamError::CorruptArtifact(format!("model: {}", e)))
}

fn read_envelope<T: DeserializeOwned>(path: &Path, kind: &str) -> Result<Envelope<T>> {
    let bytes = fs::read(path)?;

    // Check the header before the payload so version mismatches are reported as such
    let raw: Envelope<serde_json::Value> = serde_json::from_slice(&bytes)
        .map_err(|e| SpamError::CorruptArtifact(format!("{}: {}", path.display(), e)))?;

    if raw.kind != kind {
        return Err(SpamError::CorruptArtifact(format!(
            "{}: expected {}, found {}",
            path.display(),
            kind,
            raw.kind
        )));
    }
    if raw.format_version != FORMAT_VERSION {
        return Err(SpamError::CorruptArtifact(format!(
            "{}: unsupported format version {} (expected {})",
            path.display(),
            raw.format_version,
            FORMAT_VERSION
        )));
    }

    let payload = serde_json::from_value(raw.payload)
        .map_err(|e| SpamError::CorruptArtifact(format!("{}: {}", path.display(), e)))?;

    debug!("Read {} (written by {})", path.display(), raw.crate_version);

    Ok(Envelope {
        kind: raw.kind,
        format_version: raw.format_version,
        crate_version: raw.crate_version,
        generation: raw.generation,
        payload,
    })
}

/// Write to a temp file in the target directory, then rename over the target
fn write_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec(value)
        .map_err(|e| SpamError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;

    let tmp_path = temp_path_for(path);
    let result = (|| -> std::io::Result<()> {
        let mut file = File::create(&tmp_path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)
    })();

    if let Err(e) = result {
        if tmp_path.exists() {
            if let Err(cleanup) = fs::remove_file(&tmp_path) {
                warn!("Failed to remove {}: {}", tmp_path.display(), cleanup);
            }
        }
        return Err(SpamError::Io(e));
    }

    debug!("Wrote {}", path.display());
    Ok(())
}

/// Flush directory entries so completed renames survive a crash
#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<()> {
    File::open(dir)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<()> {
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "artifact".to_string());
    path.with_file_name(format!(".{}.{}.tmp", name, generation_id()))
}

fn generation_id() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    format!("{}.{}", nanos, std::process::id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spam::{Label, NaiveBayesConfig, VectorizerConfig};
    use tempfile::TempDir;

    fn fitted() -> (TfidfVectorizer, NaiveBayesClassifier) {
        let texts = ["free money now", "meeting at noon"];
        let vectorizer = TfidfVectorizer::fit(VectorizerConfig::default(), &texts).unwrap();
        let features = vectorizer.transform(&texts);
        let classifier = NaiveBayesClassifier::fit(
            NaiveBayesConfig::default(),
            &features,
            &[Label::Spam, Label::Ham],
        )
        .unwrap();
        (vectorizer, classifier)
    }

    #[test]
    fn test_save_and_load_pair() {
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp_dir.path().join("artifacts"));
        let (vectorizer, classifier) = fitted();

        store.save(&vectorizer, &classifier).unwrap();
        assert!(store.exists());

        let (loaded_vectorizer, loaded_classifier) = store.load().unwrap();
        assert_eq!(loaded_vectorizer, vectorizer);
        assert_eq!(loaded_classifier, classifier);

        assert_eq!(store.load_vectorizer().unwrap(), vectorizer);
        assert_eq!(store.load_classifier().unwrap(), classifier);
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp_dir.path());
        let (vectorizer, classifier) = fitted();
        store.save(&vectorizer, &classifier).unwrap();

        let names: Vec<String> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names.len(), 2, "unexpected files: {:?}", names);
    }

    #[test]
    fn test_missing_artifacts_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp_dir.path());
        assert!(matches!(store.load(), Err(SpamError::Io(_))));
    }

    #[test]
    fn test_malformed_artifact_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp_dir.path());
        let (vectorizer, classifier) = fitted();
        store.save(&vectorizer, &classifier).unwrap();

        fs::write(store.model_path(), b"{ not json").unwrap();
        assert!(matches!(store.load(), Err(SpamError::CorruptArtifact(_))));
        assert!(store.load_vectorizer().is_ok());
    }

    #[test]
    fn test_version_mismatch_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp_dir.path());
        let (vectorizer, classifier) = fitted();
        store.save(&vectorizer, &classifier).unwrap();

        let content = fs::read_to_string(store.vectorizer_path()).unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&content).unwrap();
        value["format_version"] = serde_json::json!(FORMAT_VERSION + 1);
        fs::write(store.vectorizer_path(), value.to_string()).unwrap();

        match store.load_vectorizer() {
            Err(SpamError::CorruptArtifact(msg)) => assert!(msg.contains("format version")),
            other => panic!("expected corrupt artifact, got {:?}", other),
        }
    }

    #[test]
    fn test_swapped_files_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp_dir.path());
        let (vectorizer, classifier) = fitted();
        store.save(&vectorizer, &classifier).unwrap();

        let swapped = ArtifactStore::with_file_names(temp_dir.path(), DEFAULT_MODEL_FILE, DEFAULT_VECTORIZER_FILE);
        assert!(matches!(swapped.load(), Err(SpamError::CorruptArtifact(_))));
    }

    #[test]
    fn test_mixed_generations_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let first = ArtifactStore::new(temp_dir.path().join("first"));
        let second = ArtifactStore::new(temp_dir.path().join("second"));
        let (vectorizer, classifier) = fitted();
        first.save(&vectorizer, &classifier).unwrap();
        second.save(&vectorizer, &classifier).unwrap();

        fs::copy(second.model_path(), first.model_path()).unwrap();
        assert!(matches!(first.load(), Err(SpamError::CorruptArtifact(_))));
    }

    #[test]
    fn test_failed_save_leaves_nothing_loadable() {
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp_dir.path());
        let (vectorizer, classifier) = fitted();

        // a directory in place of the model file makes the final rename fail
        fs::create_dir_all(store.model_path().join("occupied")).unwrap();

        assert!(matches!(store.save(&vectorizer, &classifier), Err(SpamError::Io(_))));
        assert!(store.load().is_err());

        let leftovers = fs::read_dir(temp_dir.path())
            .unwrap()
            .filter(|e| e.as_ref().unwrap().file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_failed_resave_does_not_mix_with_previous_pair() {
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp_dir.path());
        let (vectorizer, classifier) = fitted();
        store.save(&vectorizer, &classifier).unwrap();
        let previous_model = fs::read(store.model_path()).unwrap();

        // the new vectorizer lands, then the model rename fails
        fs::remove_file(store.model_path()).unwrap();
        fs::create_dir_all(store.model_path().join("occupied")).unwrap();
        assert!(matches!(store.save(&vectorizer, &classifier), Err(SpamError::Io(_))));

        // the previous model is still in place next to the new vectorizer
        fs::remove_dir_all(store.model_path()).unwrap();
        fs::write(store.model_path(), previous_model).unwrap();

        match store.load() {
            Err(SpamError::CorruptArtifact(msg)) => assert!(msg.contains("different saves")),
            other => panic!("expected corrupt artifact, got {:?}", other),
        }
        assert!(store.load_vectorizer().is_ok());
        assert!(store.load_classifier().is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_sync_dir() {
        let temp_dir = TempDir::new().unwrap();
        assert!(sync_dir(temp_dir.path()).is_ok());
        assert!(matches!(
            sync_dir(&temp_dir.path().join("missing")),
            Err(SpamError::Io(_))
        ));
    }

    #[test]
    fn test_unwritable_destination_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("file");
        fs::write(&blocker, b"x").unwrap();

        let store = ArtifactStore::new(blocker.join("artifacts"));
        let (vectorizer, classifier) = fitted();
        assert!(matches!(store.save(&vectorizer, &classifier), Err(SpamError::Io(_))));
    }
}
