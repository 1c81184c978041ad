use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::artifacts::{ArtifactInfo, MODEL_FILE, VECTORIZER_FILE};

/// Environment variable overriding the artifact cache root.
pub const CACHE_ENV_VAR: &str = "SPAMGUARD_CACHE";

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("No download source configured for {0} file")]
    MissingSource(String),
    #[error("Download error: {0}")]
    DownloadError(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Artifact verification failed")]
    VerificationFailed,
    #[error("Hash mismatch: expected {expected}, got {actual} for {file_type} file")]
    HashMismatch {
        file_type: String,
        expected: String,
        actual: String,
    },
}

/// Manages named artifact sets laid out as `<root>/<name>/{vectorizer,model}.json`.
#[derive(Clone, Debug)]
pub struct ArtifactManager {
    artifacts_dir: PathBuf,
    download_lock: Arc<Mutex<()>>,
}

impl ArtifactManager {
    /// Returns the default artifacts directory path
    pub fn get_default_artifacts_dir() -> PathBuf {
        Self::resolve_artifacts_dir(env::var_os(CACHE_ENV_VAR).map(PathBuf::from))
    }

    /// Picks the artifacts directory: the cache override if given, else the platform cache dir.
    fn resolve_artifacts_dir(cache_override: Option<PathBuf>) -> PathBuf {
        if let Some(path) = cache_override {
            return path.join("artifacts");
        }

        if let Some(cache_dir) = dirs::cache_dir() {
            return cache_dir.join("spamguard").join("artifacts");
        }

        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".cache").join("spamguard").join("artifacts");
        }

        env::temp_dir().join("spamguard").join("artifacts")
    }

    pub fn new<P: AsRef<Path>>(artifacts_dir: P) -> io::Result<Self> {
        let artifacts_dir = artifacts_dir.as_ref().to_path_buf();
        fs::create_dir_all(&artifacts_dir)?;
        Ok(Self {
            artifacts_dir,
            download_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn artifacts_dir(&self) -> &Path {
        &self.artifacts_dir
    }

    pub fn get_vectorizer_path(&self, name: &str) -> PathBuf {
        self.artifacts_dir.join(name).join(VECTORIZER_FILE)
    }

    pub fn get_model_path(&self, name: &str) -> PathBuf {
        self.artifacts_dir.join(name).join(MODEL_FILE)
    }

    pub fn is_downloaded(&self, name: &str) -> bool {
        let vectorizer_path = self.get_vectorizer_path(name);
        let model_path = self.get_model_path(name);
        log::debug!(
            "Checking artifacts '{}': vectorizer {:?} (exists: {}), model {:?} (exists: {})",
            name,
            vectorizer_path,
            vectorizer_path.exists(),
            model_path,
            model_path.exists()
        );
        vectorizer_path.exists() && model_path.exists()
    }

    /// Lowercase hex SHA-256 of `bytes`.
    pub fn sha256_hex(bytes: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        format!("{:x}", hasher.finalize())
    }

    /// Checks a file against an expected SHA-256. With no expected hash, only existence is checked.
    pub fn verify_file(path: &Path, expected_hash: Option<&str>) -> Result<bool, ArtifactError> {
        if !path.exists() {
            return Ok(false);
        }
        let Some(expected) = expected_hash else {
            return Ok(true);
        };
        let bytes = fs::read(path)?;
        let hash = Self::sha256_hex(&bytes);
        log::debug!("Verifying {:?}: calculated {}, expected {}", path, hash, expected);
        Ok(hash.eq_ignore_ascii_case(expected))
    }

    pub fn verify_artifacts(&self, info: &ArtifactInfo) -> Result<bool, ArtifactError> {
        let vectorizer_ok =
            Self::verify_file(&self.get_vectorizer_path(&info.name), info.vectorizer_hash.as_deref())?;
        let model_ok = Self::verify_file(&self.get_model_path(&info.name), info.model_hash.as_deref())?;

        log::info!(
            "Verification of '{}': vectorizer {}, model {}",
            info.name,
            vectorizer_ok,
            model_ok
        );
        Ok(vectorizer_ok && model_ok)
    }

    /// Downloads any missing or unverifiable file of the artifact set.
    ///
    /// On failure both files are removed so a half-updated set is never loaded.
    pub async fn download_artifacts(&self, info: &ArtifactInfo) -> Result<(), ArtifactError> {
        let _lock = self.download_lock.lock().await;

        let set_dir = self.artifacts_dir.join(&info.name);
        log::info!("Preparing artifact directory at {:?}", set_dir);
        fs::create_dir_all(&set_dir)?;

        let vectorizer_result = self
            .fetch_if_needed(
                info.vectorizer_url.as_deref(),
                &self.get_vectorizer_path(&info.name),
                info.vectorizer_hash.as_deref(),
                "vectorizer",
            )
            .await;
        let model_result = self
            .fetch_if_needed(
                info.model_url.as_deref(),
                &self.get_model_path(&info.name),
                info.model_hash.as_deref(),
                "model",
            )
            .await;

        match (vectorizer_result, model_result) {
            (Ok(()), Ok(())) => {
                log::info!("Artifacts '{}' ready to use", info.name);
                Ok(())
            }
            (Err(e), _) | (_, Err(e)) => {
                log::error!("Failed to set up artifacts '{}': {}", info.name, e);
                let _ = self.remove_download(&info.name);
                Err(e)
            }
        }
    }

    async fn fetch_if_needed(
        &self,
        url: Option<&str>,
        path: &Path,
        expected_hash: Option<&str>,
        file_type: &str,
    ) -> Result<(), ArtifactError> {
        if Self::verify_file(path, expected_hash)? {
            log::info!("Existing {} file at {:?} verified", file_type, path);
            return Ok(());
        }
        if path.exists() {
            log::warn!("{} file at {:?} failed verification, redownloading", file_type, path);
        }
        let url = url.ok_or_else(|| ArtifactError::MissingSource(file_type.to_string()))?;
        self.download_and_verify_file(url, path, expected_hash, file_type).await
    }

    async fn download_and_verify_file(
        &self,
        url: &str,
        path: &Path,
        expected_hash: Option<&str>,
        file_type: &str,
    ) -> Result<(), ArtifactError> {
        log::info!("Downloading {} file from {} to {:?}", file_type, url, path);
        let response = reqwest::get(url).await?.error_for_status()?;
        let bytes = response.bytes().await?;
        log::info!("Downloaded {} bytes", bytes.len());

        if let Some(expected) = expected_hash {
            let hash = Self::sha256_hex(&bytes);
            if !hash.eq_ignore_ascii_case(expected) {
                log::error!("{} hash mismatch: expected {}, got {}", file_type, expected, hash);
                return Err(ArtifactError::HashMismatch {
                    file_type: file_type.to_string(),
                    expected: expected.to_string(),
                    actual: hash,
                });
            }
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, &bytes)?;

        if !Self::verify_file(path, expected_hash)? {
            return Err(ArtifactError::VerificationFailed);
        }

        log::info!("{} file downloaded and verified successfully", file_type);
        Ok(())
    }

    pub fn remove_download(&self, name: &str) -> Result<(), ArtifactError> {
        for path in [self.get_vectorizer_path(name), self.get_model_path(name)] {
            if path.exists() {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }

    /// Ensures that an artifact set is present and verified, downloading it otherwise.
    pub async fn ensure_downloaded(&self, info: &ArtifactInfo) -> Result<(), ArtifactError> {
        if self.is_downloaded(&info.name) && self.verify_artifacts(info)? {
            log::info!("Artifacts '{}' present and verified", info.name);
            return Ok(());
        }
        log::info!("Artifacts '{}' missing or stale, downloading...", info.name);
        self.download_artifacts(info).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_set(manager: &ArtifactManager, name: &str) -> Result<(String, String), ArtifactError> {
        fs::create_dir_all(manager.artifacts_dir().join(name))?;
        let vectorizer = br#"{"vocabulary": {"free": 0}, "idf": [1.0]}"#;
        let model = br#"{"coef": [1.0]}"#;
        fs::write(manager.get_vectorizer_path(name), vectorizer)?;
        fs::write(manager.get_model_path(name), model)?;
        Ok((ArtifactManager::sha256_hex(vectorizer), ArtifactManager::sha256_hex(model)))
    }

    #[test]
    fn test_paths() -> Result<(), ArtifactError> {
        let dir = tempfile::tempdir()?;
        let manager = ArtifactManager::new(dir.path())?;
        assert!(manager.get_vectorizer_path("default").ends_with("default/vectorizer.json"));
        assert!(manager.get_model_path("default").ends_with("default/model.json"));
        assert!(!manager.is_downloaded("default"));
        Ok(())
    }

    #[test]
    fn test_verification() -> Result<(), ArtifactError> {
        let dir = tempfile::tempdir()?;
        let manager = ArtifactManager::new(dir.path())?;
        let (vectorizer_hash, model_hash) = write_set(&manager, "default")?;
        assert!(manager.is_downloaded("default"));

        let unhashed = ArtifactInfo::new("default");
        assert!(manager.verify_artifacts(&unhashed)?);

        let hashed = ArtifactInfo::new("default")
            .with_hashes(Some(vectorizer_hash.to_uppercase()), Some(model_hash));
        assert!(manager.verify_artifacts(&hashed)?);

        fs::write(manager.get_model_path("default"), "corrupted data")?;
        assert!(!manager.verify_artifacts(&hashed)?);
        Ok(())
    }

    #[test]
    fn test_remove_download() -> Result<(), ArtifactError> {
        let dir = tempfile::tempdir()?;
        let manager = ArtifactManager::new(dir.path())?;
        write_set(&manager, "default")?;
        manager.remove_download("default")?;
        assert!(!manager.is_downloaded("default"));
        Ok(())
    }

    #[tokio::test]
    async fn test_ensure_downloaded_uses_local_files() -> Result<(), ArtifactError> {
        let dir = tempfile::tempdir()?;
        let manager = ArtifactManager::new(dir.path())?;
        let (vectorizer_hash, model_hash) = write_set(&manager, "local")?;
        let info = ArtifactInfo::new("local").with_hashes(Some(vectorizer_hash), Some(model_hash));

        // No source URL, so this only succeeds if nothing needs fetching
        manager.ensure_downloaded(&info).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_download_without_source_fails_and_cleans_up() -> Result<(), ArtifactError> {
        let dir = tempfile::tempdir()?;
        let manager = ArtifactManager::new(dir.path())?;
        write_set(&manager, "partial")?;
        fs::remove_file(manager.get_model_path("partial"))?;

        let result = manager.download_artifacts(&ArtifactInfo::new("partial")).await;
        assert!(matches!(result, Err(ArtifactError::MissingSource(_))));
        assert!(!manager.get_vectorizer_path("partial").exists());
        Ok(())
    }

    #[test]
    fn test_default_artifacts_dir() {
        let path = ArtifactManager::resolve_artifacts_dir(Some(PathBuf::from(
            "/tmp/test-spamguard-cache",
        )));
        assert_eq!(path, PathBuf::from("/tmp/test-spamguard-cache/artifacts"));

        let path = ArtifactManager::resolve_artifacts_dir(None);
        assert!(path.ends_with("spamguard/artifacts"));
    }
}
