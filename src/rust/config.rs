use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::artifact_manager::ArtifactManager;
use crate::artifacts::{ArtifactInfo, MODEL_FILE, VECTORIZER_FILE};
use crate::classifier::ClassifierError;

fn default_artifact_name() -> String {
    "default".to_string()
}

fn default_true() -> bool {
    true
}

/// Startup configuration for locating and checking the classifier artifacts.
///
/// Every field has a default, so an empty JSON object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Root of the artifact cache; defaults to [`ArtifactManager::get_default_artifacts_dir`]
    #[serde(default)]
    pub artifacts_dir: Option<PathBuf>,
    /// Name of the artifact set under the root
    #[serde(default = "default_artifact_name")]
    pub artifact_name: String,
    /// Explicit vectorizer file, bypassing the artifact set layout
    #[serde(default)]
    pub vectorizer_file: Option<PathBuf>,
    /// Explicit model file, bypassing the artifact set layout
    #[serde(default)]
    pub model_file: Option<PathBuf>,
    /// Replacement stopword list, one word per line
    #[serde(default)]
    pub stopwords_file: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub verify_checksums: bool,
    #[serde(default)]
    pub vectorizer_sha256: Option<String>,
    #[serde(default)]
    pub model_sha256: Option<String>,
    /// Base URL the artifact set can be downloaded from
    #[serde(default)]
    pub source_url: Option<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            artifacts_dir: None,
            artifact_name: default_artifact_name(),
            vectorizer_file: None,
            model_file: None,
            stopwords_file: None,
            verify_checksums: true,
            vectorizer_sha256: None,
            model_sha256: None,
            source_url: None,
        }
    }
}

impl ClassifierConfig {
    /// Reads a JSON configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            ClassifierError::ConfigError(format!("Failed to read config {:?}: {}", path, e))
        })?;
        serde_json::from_str(&contents).map_err(|e| {
            ClassifierError::ConfigError(format!("Failed to parse config {:?}: {}", path, e))
        })
    }

    pub fn artifacts_root(&self) -> PathBuf {
        self.artifacts_dir
            .clone()
            .unwrap_or_else(ArtifactManager::get_default_artifacts_dir)
    }

    pub fn vectorizer_path(&self) -> PathBuf {
        self.vectorizer_file.clone().unwrap_or_else(|| {
            self.artifacts_root()
                .join(&self.artifact_name)
                .join(VECTORIZER_FILE)
        })
    }

    pub fn model_path(&self) -> PathBuf {
        self.model_file.clone().unwrap_or_else(|| {
            self.artifacts_root()
                .join(&self.artifact_name)
                .join(MODEL_FILE)
        })
    }

    /// Describes the configured artifact set for the [`ArtifactManager`].
    pub fn artifact_info(&self) -> ArtifactInfo {
        let info = ArtifactInfo::new(&self.artifact_name)
            .with_hashes(self.vectorizer_sha256.clone(), self.model_sha256.clone());
        match &self.source_url {
            Some(url) => info.with_source(url),
            None => info,
        }
    }
}
