use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};

use crate::classifier::{ClassifierError, LabelEncoder, LogisticModel};

pub const MODEL_FILE: &str = "model.json";
pub const ENCODER_FILE: &str = "topic_encoder.json";
pub const CHECKSUMS_FILE: &str = "checksums.json";

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Artifact not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Failed to parse {file}: {source}")]
    ParseError {
        file: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Hash mismatch: expected {expected}, got {actual} for {file_type} file")]
    HashMismatch {
        file_type: String,
        expected: String,
        actual: String,
    },
    #[error("Invalid artifact: {0}")]
    Invalid(#[from] ClassifierError),
}

/// Locates and loads the trained model and topic encoder.
///
/// The directory holds `model.json` and `topic_encoder.json`, and optionally
/// `checksums.json` mapping file names to SHA-256 digests. When checksums
/// are present every artifact is verified before it is parsed.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    artifacts_dir: PathBuf,
}

impl ArtifactStore {
    /// Creates a store over the default artifacts directory
    pub fn new_default() -> Self {
        Self::new(Self::get_default_artifacts_dir())
    }

    /// Returns the default artifacts directory path
    pub fn get_default_artifacts_dir() -> PathBuf {
        // 1. Check environment variable
        if let Ok(path) = env::var("PYQ_ARTIFACTS") {
            return PathBuf::from(path);
        }

        // 2. Use platform-specific data directory
        if let Some(data_dir) = dirs::data_dir() {
            return data_dir.join("pyq-predictor").join("artifacts");
        }

        // 3. Fallback to user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".local").join("share").join("pyq-predictor").join("artifacts");
        }

        // 4. If all else fails, use system temp directory
        env::temp_dir().join("pyq-predictor").join("artifacts")
    }

    pub fn new<P: AsRef<Path>>(artifacts_dir: P) -> Self {
        Self {
            artifacts_dir: artifacts_dir.as_ref().to_path_buf(),
        }
    }

    pub fn artifacts_dir(&self) -> &Path {
        &self.artifacts_dir
    }

    pub fn get_model_path(&self) -> PathBuf {
        self.artifacts_dir.join(MODEL_FILE)
    }

    pub fn get_encoder_path(&self) -> PathBuf {
        self.artifacts_dir.join(ENCODER_FILE)
    }

    pub fn get_checksums_path(&self) -> PathBuf {
        self.artifacts_dir.join(CHECKSUMS_FILE)
    }

    pub fn is_available(&self) -> bool {
        let model_path = self.get_model_path();
        let encoder_path = self.get_encoder_path();
        log::debug!("Checking artifacts:");
        log::debug!("  Model path: {:?} (exists: {})", model_path, model_path.exists());
        log::debug!("  Encoder path: {:?} (exists: {})", encoder_path, encoder_path.exists());
        model_path.exists() && encoder_path.exists()
    }

    /// Loads and validates the trained classifier
    pub fn load_classifier(&self) -> Result<LogisticModel, ArtifactError> {
        let model: LogisticModel = self.load_json(MODEL_FILE, "model")?;
        model.validate()?;
        log::info!("Loaded classifier from {:?}", self.get_model_path());
        Ok(model)
    }

    /// Loads and validates the topic encoder
    pub fn load_encoder(&self) -> Result<LabelEncoder, ArtifactError> {
        let encoder: LabelEncoder = self.load_json(ENCODER_FILE, "encoder")?;
        encoder.validate()?;
        log::info!("Loaded topic encoder with {} topics from {:?}", encoder.classes().len(), self.get_encoder_path());
        Ok(encoder)
    }

    fn load_json<T: DeserializeOwned>(&self, file: &str, file_type: &str) -> Result<T, ArtifactError> {
        let path = self.artifacts_dir.join(file);
        if !path.exists() {
            log::error!("{} artifact missing at {:?}", file_type, path);
            return Err(ArtifactError::NotFound(path));
        }

        match self.read_checksums()? {
            Some(checksums) => match checksums.get(file) {
                Some(expected) => {
                    self.verify_file(&path, file_type, expected)?;
                    log::debug!("{} file verified successfully", file_type);
                }
                None => log::warn!("{} has no entry for {}, skipping verification", CHECKSUMS_FILE, file),
            },
            None => log::warn!("No {} found, skipping verification of {}", CHECKSUMS_FILE, file),
        }

        let bytes = fs::read(&path)?;
        serde_json::from_slice(&bytes).map_err(|source| ArtifactError::ParseError {
            file: file.to_string(),
            source,
        })
    }

    fn read_checksums(&self) -> Result<Option<BTreeMap<String, String>>, ArtifactError> {
        let path = self.get_checksums_path();
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| ArtifactError::ParseError {
                file: CHECKSUMS_FILE.to_string(),
                source,
            })
    }

    fn digest(bytes: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        format!("{:x}", hasher.finalize())
    }

    /// Checks a file against an expected SHA-256 digest
    pub fn verify_file(&self, path: &Path, file_type: &str, expected_hash: &str) -> Result<(), ArtifactError> {
        log::debug!("Verifying file: {:?}", path);
        let hash = Self::digest(&fs::read(path)?);
        log::debug!("Calculated hash: {}", hash);
        log::debug!("Expected hash:   {}", expected_hash);
        if !hash.eq_ignore_ascii_case(expected_hash) {
            log::error!("{} hash mismatch: expected {}, got {}", file_type, expected_hash, hash);
            return Err(ArtifactError::HashMismatch {
                file_type: file_type.to_string(),
                expected: expected_hash.to_string(),
                actual: hash,
            });
        }
        Ok(())
    }

    /// Records the digests of the current artifacts in `checksums.json`.
    pub fn write_checksums(&self) -> Result<BTreeMap<String, String>, ArtifactError> {
        let mut checksums = BTreeMap::new();
        for file in [MODEL_FILE, ENCODER_FILE] {
            let path = self.artifacts_dir.join(file);
            if !path.exists() {
                return Err(ArtifactError::NotFound(path));
            }
            checksums.insert(file.to_string(), Self::digest(&fs::read(&path)?));
        }

        let json = serde_json::to_vec_pretty(&checksums).map_err(|source| ArtifactError::ParseError {
            file: CHECKSUMS_FILE.to_string(),
            source,
        })?;
        fs::write(self.get_checksums_path(), json)?;
        log::info!("Wrote checksums for {} artifacts to {:?}", checksums.len(), self.get_checksums_path());
        Ok(checksums)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_with_artifacts() -> (TempDir, ArtifactStore) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(MODEL_FILE), r#"{"weights":[0.0,0.2,0.7],"intercept":-2.5}"#).unwrap();
        fs::write(dir.path().join(ENCODER_FILE), r#"{"classes":["Arrays","Loops","Pointers"]}"#).unwrap();
        let store = ArtifactStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn test_load_without_checksums() -> Result<(), ArtifactError> {
        let (_dir, store) = store_with_artifacts();
        assert!(store.is_available());
        assert_eq!(store.load_classifier()?.weights(), &[0.0, 0.2, 0.7]);
        assert_eq!(store.load_encoder()?.classes().len(), 3);
        Ok(())
    }

    #[test]
    fn test_checksums_round_trip() -> Result<(), ArtifactError> {
        let (_dir, store) = store_with_artifacts();
        let checksums = store.write_checksums()?;
        store.verify_file(&store.get_model_path(), "model", &checksums[MODEL_FILE])?;
        assert!(matches!(
            store.verify_file(&store.get_encoder_path(), "encoder", &checksums[MODEL_FILE]),
            Err(ArtifactError::HashMismatch { file_type, .. }) if file_type == "encoder"
        ));
        assert!(store.load_classifier().is_ok());
        assert!(store.load_encoder().is_ok());
        Ok(())
    }

    #[test]
    fn test_tampered_artifact_is_rejected() -> Result<(), ArtifactError> {
        let (_dir, store) = store_with_artifacts();
        store.write_checksums()?;
        fs::write(store.get_model_path(), r#"{"weights":[9.0,9.0,9.0],"intercept":0.0}"#)?;
        assert!(matches!(store.load_classifier(), Err(ArtifactError::HashMismatch { .. })));
        assert!(store.load_encoder().is_ok());
        Ok(())
    }

    #[test]
    fn test_missing_and_invalid_artifacts() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        assert!(!store.is_available());
        assert!(matches!(store.load_classifier(), Err(ArtifactError::NotFound(_))));

        fs::write(store.get_model_path(), "not json").unwrap();
        assert!(matches!(store.load_classifier(), Err(ArtifactError::ParseError { .. })));

        fs::write(store.get_model_path(), r#"{"weights":[1.0],"intercept":0.0}"#).unwrap();
        assert!(matches!(store.load_classifier(), Err(ArtifactError::Invalid(_))));
    }

    #[test]
    fn test_default_artifacts_dir() {
        env::set_var("PYQ_ARTIFACTS", "/tmp/test-pyq-artifacts");
        let path = ArtifactStore::get_default_artifacts_dir();
        assert_eq!(path, PathBuf::from("/tmp/test-pyq-artifacts"));
        env::remove_var("PYQ_ARTIFACTS");

        let path = ArtifactStore::get_default_artifacts_dir();
        assert!(path.to_string_lossy().contains("pyq-predictor"));
    }
}
