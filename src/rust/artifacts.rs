/// File name of the vectorizer artifact inside an artifact set directory.
pub const VECTORIZER_FILE: &str = "vectorizer.json";
/// File name of the model artifact inside an artifact set directory.
pub const MODEL_FILE: &str = "model.json";

/// Where a named artifact set comes from and how to check it.
///
/// Hashes are lowercase hex SHA-256 digests. A missing hash skips verification for that file;
/// a missing URL means the file can only be provided locally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactInfo {
    pub name: String,
    pub vectorizer_url: Option<String>,
    pub model_url: Option<String>,
    pub vectorizer_hash: Option<String>,
    pub model_hash: Option<String>,
}

impl ArtifactInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Points both files at `base_url`, using the standard file names.
    pub fn with_source(mut self, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        self.vectorizer_url = Some(format!("{}/{}", base, VECTORIZER_FILE));
        self.model_url = Some(format!("{}/{}", base, MODEL_FILE));
        self
    }

    pub fn with_hashes(mut self, vectorizer_hash: Option<String>, model_hash: Option<String>) -> Self {
        self.vectorizer_hash = vectorizer_hash.map(|h| h.to_lowercase());
        self.model_hash = model_hash.map(|h| h.to_lowercase());
        self
    }
}
