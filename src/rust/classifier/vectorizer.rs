use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;

use log::{debug, info};
use ndarray::Array1;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::error::ClassifierError;
use super::utils::{normalize_values, word_ngrams, Norm};

/// Default token pattern of scikit-learn's `TfidfVectorizer`: words of two or more characters.
pub const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

/// A sparse feature vector over a fixed vocabulary.
///
/// Indices are strictly increasing and every index is below `dimension`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    dimension: usize,
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl FeatureVector {
    /// The all-zero vector.
    pub fn zeros(dimension: usize) -> Self {
        Self {
            dimension,
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Builds a vector from `(index, value)` entries. Entries are sorted, duplicate indices
    /// are summed and zero values dropped.
    pub fn from_entries(
        dimension: usize,
        entries: impl IntoIterator<Item = (usize, f64)>,
    ) -> Result<Self, ClassifierError> {
        let mut merged: BTreeMap<usize, f64> = BTreeMap::new();
        for (index, value) in entries {
            if index >= dimension {
                return Err(ClassifierError::ValidationError(format!(
                    "Feature index {} out of bounds for dimension {}",
                    index, dimension
                )));
            }
            *merged.entry(index).or_default() += value;
        }
        let (indices, values) = merged.into_iter().filter(|(_, v)| *v != 0.0).unzip();
        Ok(Self {
            dimension,
            indices,
            values,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored non-zero entries.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|&v| v == 0.0)
    }

    pub fn get(&self, index: usize) -> f64 {
        self.indices
            .binary_search(&index)
            .map(|pos| self.values[pos])
            .unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    pub fn to_dense(&self) -> Array1<f64> {
        let mut dense = Array1::zeros(self.dimension);
        for (index, value) in self.iter() {
            dense[index] = value;
        }
        dense
    }

    /// Dot product with a dense weight vector of the same dimension.
    pub fn dot(&self, weights: &Array1<f64>) -> f64 {
        self.iter().map(|(index, value)| value * weights[index]).sum()
    }
}

/// Maps normalized text to a fixed-dimension feature vector.
///
/// Implementations must be deterministic, keep `dimension()` constant for their lifetime,
/// and return a zero vector (not an error) for the empty string.
pub trait Vectorizer: Send + Sync {
    fn dimension(&self) -> usize;

    fn transform(&self, text: &str) -> FeatureVector;
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

fn default_true() -> bool {
    true
}

fn default_token_pattern() -> String {
    DEFAULT_TOKEN_PATTERN.to_string()
}

/// On-disk form of a fitted TF-IDF vectorizer, as exported from training.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorizerArtifact {
    /// Term to column index
    pub vocabulary: HashMap<String, usize>,
    /// Inverse document frequency per column
    pub idf: Vec<f64>,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default = "default_norm")]
    pub norm: Option<Norm>,
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default = "default_true")]
    pub use_idf: bool,
    #[serde(default = "default_token_pattern")]
    pub token_pattern: String,
}

/// A TF-IDF vectorizer loaded from a fitted artifact.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    ngram_range: (usize, usize),
    norm: Option<Norm>,
    sublinear_tf: bool,
    use_idf: bool,
    token_pattern: Regex,
}

impl TfidfVectorizer {
    /// Validates an artifact and compiles it into a usable vectorizer.
    ///
    /// # Errors
    /// - `ValidationError` if the vocabulary is empty or its size differs from the idf length
    /// - `ValidationError` if any column index is out of range or shared by two terms
    /// - `ValidationError` if the n-gram range or token pattern is invalid
    pub fn from_artifact(artifact: VectorizerArtifact) -> Result<Self, ClassifierError> {
        let dimension = artifact.idf.len();
        if artifact.vocabulary.is_empty() {
            return Err(ClassifierError::ValidationError("Vectorizer vocabulary is empty".into()));
        }
        if artifact.vocabulary.len() != dimension {
            return Err(ClassifierError::ValidationError(format!(
                "Vocabulary size {} does not match idf length {}",
                artifact.vocabulary.len(),
                dimension
            )));
        }

        let mut seen = HashSet::with_capacity(dimension);
        for (term, &index) in &artifact.vocabulary {
            if index >= dimension {
                return Err(ClassifierError::ValidationError(format!(
                    "Term '{}' has column {} outside dimension {}",
                    term, index, dimension
                )));
            }
            if !seen.insert(index) {
                return Err(ClassifierError::ValidationError(format!(
                    "Column {} is assigned to more than one term",
                    index
                )));
            }
        }

        if artifact.idf.iter().any(|w| !w.is_finite()) {
            return Err(ClassifierError::ValidationError("Idf weights must be finite".into()));
        }

        let (min_n, max_n) = artifact.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ClassifierError::ValidationError(format!(
                "Invalid ngram_range ({}, {})",
                min_n, max_n
            )));
        }

        let token_pattern = Regex::new(&artifact.token_pattern).map_err(|e| {
            ClassifierError::ValidationError(format!("Invalid token pattern: {}", e))
        })?;

        Ok(Self {
            vocabulary: artifact.vocabulary,
            idf: artifact.idf,
            ngram_range: artifact.ngram_range,
            norm: artifact.norm,
            sublinear_tf: artifact.sublinear_tf,
            use_idf: artifact.use_idf,
            token_pattern,
        })
    }

    /// Loads and validates a JSON vectorizer artifact.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ClassifierError::ArtifactError(format!(
                "Vectorizer file not found: {}",
                path.display()
            )));
        }
        let bytes = fs::read(path)?;
        let artifact: VectorizerArtifact = serde_json::from_slice(&bytes)?;
        let vectorizer = Self::from_artifact(artifact)?;
        info!(
            "Vectorizer loaded from {:?} ({} features)",
            path,
            vectorizer.dimension()
        );
        Ok(vectorizer)
    }

    fn analyze<'a>(&self, text: &'a str) -> Vec<String> {
        let tokens: Vec<&'a str> = self
            .token_pattern
            .find_iter(text)
            .map(|m| m.as_str())
            .collect();
        word_ngrams(&tokens, self.ngram_range.0, self.ngram_range.1)
    }
}

impl Vectorizer for TfidfVectorizer {
    fn dimension(&self) -> usize {
        self.idf.len()
    }

    fn transform(&self, text: &str) -> FeatureVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for gram in self.analyze(text) {
            if let Some(&index) = self.vocabulary.get(&gram) {
                *counts.entry(index).or_default() += 1.0;
            }
        }

        let (indices, mut values): (Vec<usize>, Vec<f64>) = counts
            .into_iter()
            .map(|(index, tf)| {
                let tf = if self.sublinear_tf { 1.0 + tf.ln() } else { tf };
                let weight = if self.use_idf { tf * self.idf[index] } else { tf };
                (index, weight)
            })
            .unzip();

        if let Some(norm) = self.norm {
            normalize_values(&mut values, norm);
        }

        debug!("Vectorized {} known terms", indices.len());
        FeatureVector {
            dimension: self.dimension(),
            indices,
            values,
        }
    }
}
