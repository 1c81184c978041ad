use std::fmt;
use std::io;

use crate::artifact_manager::ArtifactError;

/// Represents the different types of errors that can occur while building the spam classifier.
///
/// Once a [`SpamClassifier`](super::SpamClassifier) is built, classification itself never fails;
/// every variant here surfaces at startup.
#[derive(Debug)]
pub enum ClassifierError {
    /// A vectorizer or model artifact is missing, unreadable or malformed
    ArtifactError(String),
    /// Error occurred during the build phase (missing or inconsistent components)
    BuildError(String),
    /// Error occurred due to invalid artifact contents or parameters
    ValidationError(String),
    /// Error occurred while reading or parsing configuration
    ConfigError(String),
}

impl fmt::Display for ClassifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArtifactError(msg) => write!(f, "Artifact error: {}", msg),
            Self::BuildError(msg) => write!(f, "Build error: {}", msg),
            Self::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Self::ConfigError(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for ClassifierError {}

impl From<io::Error> for ClassifierError {
    fn from(err: io::Error) -> Self {
        ClassifierError::ArtifactError(err.to_string())
    }
}

impl From<serde_json::Error> for ClassifierError {
    fn from(err: serde_json::Error) -> Self {
        ClassifierError::ArtifactError(format!("Failed to parse artifact: {}", err))
    }
}

impl From<ArtifactError> for ClassifierError {
    fn from(err: ArtifactError) -> Self {
        ClassifierError::ArtifactError(err.to_string())
    }
}
