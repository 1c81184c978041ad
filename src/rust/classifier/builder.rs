use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{error, info, warn};

use super::classifier::SpamClassifier;
use super::error::ClassifierError;
use super::model::{Classifier, LinearModel};
use super::normalizer::{Normalizer, StemmerKind};
use super::stopwords::StopwordSet;
use super::vectorizer::{TfidfVectorizer, Vectorizer};
use crate::artifact_manager::ArtifactManager;
use crate::artifacts::{MODEL_FILE, VECTORIZER_FILE};
use crate::config::ClassifierConfig;

/// A builder for constructing a SpamClassifier with a fluent interface.
///
/// Loading is all-or-nothing: `build` fails unless both a vectorizer and a classifier
/// were provided and their dimensions agree.
pub struct SpamClassifierBuilder {
    stopwords: Option<StopwordSet>,
    stemmer: StemmerKind,
    vectorizer: Option<Arc<dyn Vectorizer>>,
    model: Option<Arc<dyn Classifier>>,
    vectorizer_path: Option<PathBuf>,
    model_path: Option<PathBuf>,
}

impl Default for SpamClassifierBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SpamClassifierBuilder {
    /// Creates a builder with English stopwords and the Porter stemmer and no artifacts
    pub fn new() -> Self {
        Self {
            stopwords: None,
            stemmer: StemmerKind::Porter,
            vectorizer: None,
            model: None,
            vectorizer_path: None,
            model_path: None,
        }
    }

    /// Replaces the stopword list. It must match the list used when the artifacts were fitted.
    pub fn with_stopwords(mut self, stopwords: StopwordSet) -> Self {
        self.stopwords = Some(stopwords);
        self
    }

    /// Loads a replacement stopword list from a file, one word per line.
    pub fn with_stopwords_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ClassifierError> {
        let stopwords = StopwordSet::from_file(path.as_ref())?;
        info!("Loaded {} stopwords from {:?}", stopwords.len(), path.as_ref());
        Ok(self.with_stopwords(stopwords))
    }

    /// Selects the stemming algorithm. It must match the one used when the artifacts were fitted.
    pub fn with_stemmer(mut self, stemmer: StemmerKind) -> Self {
        self.stemmer = stemmer;
        self
    }

    /// Uses an in-memory vectorizer.
    pub fn with_vectorizer(mut self, vectorizer: impl Vectorizer + 'static) -> Self {
        self.vectorizer = Some(Arc::new(vectorizer));
        self
    }

    /// Uses an in-memory classifier.
    pub fn with_classifier(mut self, model: impl Classifier + 'static) -> Self {
        self.model = Some(Arc::new(model));
        self
    }

    /// Loads the vectorizer from a JSON artifact.
    ///
    /// # Errors
    /// - `BuildError` if a vectorizer file was already loaded
    /// - `ArtifactError` if the file is missing or is not valid JSON
    /// - `ValidationError` if the artifact is inconsistent
    pub fn with_vectorizer_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ClassifierError> {
        if self.vectorizer_path.is_some() {
            return Err(ClassifierError::BuildError("Vectorizer path already set".to_string()));
        }
        let path = path.as_ref();
        let vectorizer = TfidfVectorizer::from_file(path).map_err(|e| {
            error!("Failed to load vectorizer: {}", e);
            e
        })?;
        self.vectorizer = Some(Arc::new(vectorizer));
        self.vectorizer_path = Some(path.to_path_buf());
        Ok(self)
    }

    /// Loads the classifier from a JSON artifact.
    ///
    /// # Errors
    /// - `BuildError` if a model file was already loaded
    /// - `ArtifactError` if the file is missing or is not valid JSON
    /// - `ValidationError` if the artifact is inconsistent
    pub fn with_model_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ClassifierError> {
        if self.model_path.is_some() {
            return Err(ClassifierError::BuildError("Model path already set".to_string()));
        }
        let path = path.as_ref();
        let model = LinearModel::from_file(path).map_err(|e| {
            error!("Failed to load model: {}", e);
            e
        })?;
        self.model = Some(Arc::new(model));
        self.model_path = Some(path.to_path_buf());
        Ok(self)
    }

    /// Loads `vectorizer.json` and `model.json` from a directory.
    pub fn with_artifacts_dir<P: AsRef<Path>>(self, dir: P) -> Result<Self, ClassifierError> {
        let dir = dir.as_ref();
        self.with_vectorizer_file(dir.join(VECTORIZER_FILE))?
            .with_model_file(dir.join(MODEL_FILE))
    }

    /// Applies a startup configuration: stopword override, checksum verification and
    /// artifact loading.
    ///
    /// # Errors
    /// - `ArtifactError` if checksum verification is enabled and a file does not match
    /// - anything [`with_vectorizer_file`](Self::with_vectorizer_file),
    ///   [`with_model_file`](Self::with_model_file) or
    ///   [`with_stopwords_file`](Self::with_stopwords_file) return
    pub fn with_config(mut self, config: &ClassifierConfig) -> Result<Self, ClassifierError> {
        if let Some(stopwords_file) = &config.stopwords_file {
            self = self.with_stopwords_file(stopwords_file)?;
        }

        let vectorizer_path = config.vectorizer_path();
        let model_path = config.model_path();

        if config.verify_checksums {
            let checks = [
                (&vectorizer_path, config.vectorizer_sha256.as_deref(), "vectorizer"),
                (&model_path, config.model_sha256.as_deref(), "model"),
            ];
            for (path, expected, file_type) in checks {
                if expected.is_none() {
                    warn!("No checksum configured for {} file, skipping verification", file_type);
                    continue;
                }
                if path.exists() && !ArtifactManager::verify_file(path, expected)? {
                    error!("Checksum mismatch for {} file {:?}", file_type, path);
                    return Err(ClassifierError::ArtifactError(format!(
                        "Checksum mismatch for {} file {}",
                        file_type,
                        path.display()
                    )));
                }
            }
        }

        self.with_vectorizer_file(vectorizer_path)?
            .with_model_file(model_path)
    }

    /// Builds and returns the final SpamClassifier instance
    ///
    /// # Errors
    /// - `BuildError` if no vectorizer or no classifier was provided
    /// - `ValidationError` if the vectorizer and classifier dimensions differ
    pub fn build(self) -> Result<SpamClassifier, ClassifierError> {
        let vectorizer = self
            .vectorizer
            .ok_or_else(|| ClassifierError::BuildError("No vectorizer loaded".into()))?;
        let model = self
            .model
            .ok_or_else(|| ClassifierError::BuildError("No classifier loaded".into()))?;

        if vectorizer.dimension() != model.dimension() {
            return Err(ClassifierError::ValidationError(format!(
                "Vectorizer produces {} features but classifier expects {}",
                vectorizer.dimension(),
                model.dimension()
            )));
        }

        let stopwords = self.stopwords.unwrap_or_else(StopwordSet::english);
        let normalizer = Normalizer::new(stopwords, self.stemmer);
        info!(
            "Spam classifier ready ({} features, {} stopwords, {} stemmer)",
            vectorizer.dimension(),
            normalizer.stopwords().len(),
            self.stemmer
        );

        Ok(SpamClassifier {
            normalizer,
            vectorizer,
            model,
            vectorizer_path: self.vectorizer_path,
            model_path: self.model_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::model::ModelArtifact;
    use crate::classifier::vectorizer::VectorizerArtifact;
    use rust_stemmers::Algorithm;
    use std::collections::HashMap;
    use std::fs;

    fn vectorizer() -> TfidfVectorizer {
        TfidfVectorizer::from_artifact(VectorizerArtifact {
            vocabulary: HashMap::from([("free".to_string(), 0), ("meet".to_string(), 1)]),
            idf: vec![1.0, 1.0],
            ngram_range: (1, 1),
            norm: None,
            sublinear_tf: false,
            use_idf: true,
            token_pattern: crate::classifier::vectorizer::DEFAULT_TOKEN_PATTERN.into(),
        })
        .unwrap()
    }

    fn model(dimension: usize) -> LinearModel {
        LinearModel::from_artifact(ModelArtifact {
            coef: vec![1.0; dimension],
            intercept: 0.0,
            classes: [0, 1],
            spam_class: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_missing_components() {
        let result = SpamClassifierBuilder::new().with_classifier(model(2)).build();
        assert!(matches!(result, Err(ClassifierError::BuildError(_))));

        let result = SpamClassifierBuilder::new().with_vectorizer(vectorizer()).build();
        assert!(matches!(result, Err(ClassifierError::BuildError(_))));
    }

    #[test]
    fn test_dimension_mismatch() {
        let result = SpamClassifierBuilder::new()
            .with_vectorizer(vectorizer())
            .with_classifier(model(3))
            .build();
        assert!(matches!(result, Err(ClassifierError::ValidationError(_))));
    }

    #[test]
    fn test_missing_artifact_dir_fails() {
        let result = SpamClassifierBuilder::new().with_artifacts_dir("/nonexistent/spamguard");
        assert!(matches!(result, Err(ClassifierError::ArtifactError(_))));
    }

    #[test]
    fn test_vectorizer_file_set_twice() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(VECTORIZER_FILE);
        fs::write(&path, r#"{"vocabulary": {"free": 0}, "idf": [1.0]}"#)?;

        let result = SpamClassifierBuilder::new()
            .with_vectorizer_file(&path)?
            .with_vectorizer_file(&path);
        assert!(matches!(result, Err(ClassifierError::BuildError(_))));
        Ok(())
    }

    #[test]
    fn test_config_checksum_mismatch() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let set = dir.path().join("default");
        fs::create_dir_all(&set)?;
        fs::write(set.join(VECTORIZER_FILE), r#"{"vocabulary": {"free": 0}, "idf": [1.0]}"#)?;
        fs::write(set.join(MODEL_FILE), r#"{"coef": [1.0]}"#)?;

        let config = ClassifierConfig {
            artifacts_dir: Some(dir.path().to_path_buf()),
            model_sha256: Some("0".repeat(64)),
            ..Default::default()
        };
        let result = SpamClassifierBuilder::new().with_config(&config);
        assert!(matches!(result, Err(ClassifierError::ArtifactError(_))));

        let config = ClassifierConfig {
            verify_checksums: false,
            ..config
        };
        let classifier = SpamClassifierBuilder::new().with_config(&config)?.build()?;
        assert_eq!(classifier.info().dimension, 1);
        Ok(())
    }

    #[test]
    fn test_custom_stemmer_and_stopwords() -> Result<(), ClassifierError> {
        let classifier = SpamClassifierBuilder::new()
            .with_stopwords(StopwordSet::new(["the"]))
            .with_stemmer(StemmerKind::Snowball(Algorithm::English))
            .with_vectorizer(vectorizer())
            .with_classifier(model(2))
            .build()?;
        assert_eq!(classifier.normalize("the meeting generously"), "meet generous");
        assert_eq!(classifier.info().num_stopwords, 1);
        assert_eq!(classifier.info().stemmer, "snowball-English");
        Ok(())
    }
}
