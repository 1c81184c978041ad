use std::path::PathBuf;

mod error;
mod normalizer;
mod stopwords;
mod utils;
pub mod builder;
pub mod classifier;
pub mod model;
pub mod vectorizer;

pub use builder::SpamClassifierBuilder;
pub use classifier::{Analysis, SpamClassifier, Verdict};
pub use error::ClassifierError;
pub use model::{Classifier, Label, LinearModel, ModelArtifact};
pub use normalizer::{Normalizer, StemmerKind};
pub use stopwords::{StopwordSet, ENGLISH_STOPWORDS};
pub use utils::Norm;
pub use vectorizer::{FeatureVector, TfidfVectorizer, Vectorizer, VectorizerArtifact};

/// Information about the loaded components of a spam classifier
#[derive(Debug, Clone)]
pub struct ClassifierInfo {
    /// Path to the vectorizer artifact, if loaded from disk
    pub vectorizer_path: Option<PathBuf>,
    /// Path to the model artifact, if loaded from disk
    pub model_path: Option<PathBuf>,
    /// Number of features produced by the vectorizer
    pub dimension: usize,
    /// Size of the stopword list used by the normalizer
    pub num_stopwords: usize,
    /// Stemming algorithm used by the normalizer
    pub stemmer: String,
}
