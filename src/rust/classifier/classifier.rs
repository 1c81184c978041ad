use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use log::debug;
use serde::Serialize;

use super::model::{Classifier, Label};
use super::normalizer::Normalizer;
use super::vectorizer::Vectorizer;

/// The outcome of classifying a piece of text.
///
/// `NoInput` is produced by the empty-input guard before any model runs and is never
/// folded into `Spam` or `NotSpam`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    NoInput,
    Spam,
    NotSpam,
}

impl From<Label> for Verdict {
    fn from(label: Label) -> Self {
        match label {
            Label::Spam => Verdict::Spam,
            Label::NotSpam => Verdict::NotSpam,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoInput => write!(f, "no_input"),
            Self::Spam => write!(f, "spam"),
            Self::NotSpam => write!(f, "not_spam"),
        }
    }
}

/// A verdict together with the intermediate values that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub verdict: Verdict,
    /// Normalized text fed to the vectorizer; `None` when the guard fired
    pub normalized: Option<String>,
    /// Number of vocabulary terms present in the input
    pub matched_features: usize,
    /// Decision score oriented so that positive means spam, if the model provides one
    pub score: Option<f64>,
}

/// A thread-safe spam classifier composing normalization, vectorization and a linear model.
///
/// # Thread Safety
///
/// All components are immutable after construction and the vectorizer and model are
/// held behind `Arc`, so a `SpamClassifier` can be shared across threads without locking.
///
/// ```rust,no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use spamguard::{SpamClassifier, Verdict};
///
/// let classifier = SpamClassifier::builder()
///     .with_artifacts_dir("artifacts")?
///     .build()?;
///
/// match classifier.classify("FREE money! Click now!!") {
///     Verdict::Spam => println!("spam"),
///     Verdict::NotSpam => println!("ham"),
///     Verdict::NoInput => println!("nothing to classify"),
/// }
/// # Ok(())
/// # }
/// ```
pub struct SpamClassifier {
    pub(crate) normalizer: Normalizer,
    pub(crate) vectorizer: Arc<dyn Vectorizer>,
    pub(crate) model: Arc<dyn Classifier>,
    pub(crate) vectorizer_path: Option<PathBuf>,
    pub(crate) model_path: Option<PathBuf>,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<SpamClassifier>();
    }
};

impl SpamClassifier {
    /// Creates a new SpamClassifierBuilder for fluent construction
    pub fn builder() -> super::builder::SpamClassifierBuilder {
        super::builder::SpamClassifierBuilder::new()
    }

    /// Returns information about the loaded components
    pub fn info(&self) -> super::ClassifierInfo {
        super::ClassifierInfo {
            vectorizer_path: self.vectorizer_path.clone(),
            model_path: self.model_path.clone(),
            dimension: self.vectorizer.dimension(),
            num_stopwords: self.normalizer.stopwords().len(),
            stemmer: self.normalizer.stemmer().to_string(),
        }
    }

    /// Normalizes raw text into the form the vectorizer expects.
    pub fn normalize(&self, text: &str) -> String {
        self.normalizer.normalize(text)
    }

    /// Classifies the input text.
    ///
    /// Empty or whitespace-only input returns [`Verdict::NoInput`] without touching the models.
    /// Any other input runs the full chain, even when it normalizes to nothing.
    pub fn classify(&self, text: &str) -> Verdict {
        self.analyze(text).verdict
    }

    /// Classifies the input text and reports the intermediate values.
    ///
    /// # Example
    /// ```rust,no_run
    /// # use spamguard::SpamClassifier;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// # let classifier = SpamClassifier::builder().with_artifacts_dir("artifacts")?.build()?;
    /// let analysis = classifier.analyze("Meeting moved to 3pm tomorrow");
    /// println!("{} ({:?})", analysis.verdict, analysis.score);
    /// # Ok(())
    /// # }
    /// ```
    pub fn analyze(&self, text: &str) -> Analysis {
        if text.trim().is_empty() {
            debug!("Empty input, skipping classification");
            return Analysis {
                verdict: Verdict::NoInput,
                normalized: None,
                matched_features: 0,
                score: None,
            };
        }

        let normalized = self.normalizer.normalize(text);
        let features = self.vectorizer.transform(&normalized);
        let label = self.model.predict(&features);
        let score = self.model.decision_score(&features);
        debug!(
            "Classified input: {} terms, {} features, label {}",
            normalized.split_whitespace().count(),
            features.nnz(),
            label
        );

        Analysis {
            verdict: label.into(),
            normalized: Some(normalized),
            matched_features: features.nnz(),
            score,
        }
    }
}

impl fmt::Debug for SpamClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpamClassifier")
            .field("normalizer", &self.normalizer)
            .field("dimension", &self.vectorizer.dimension())
            .field("vectorizer_path", &self.vectorizer_path)
            .field("model_path", &self.model_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::vectorizer::FeatureVector;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls so tests can assert whether the model chain ran.
    struct CountingVectorizer {
        calls: Arc<AtomicUsize>,
    }

    impl Vectorizer for CountingVectorizer {
        fn dimension(&self) -> usize {
            1
        }

        fn transform(&self, text: &str) -> FeatureVector {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let count = text.split_whitespace().count() as f64;
            FeatureVector::from_entries(1, vec![(0, count)]).unwrap()
        }
    }

    /// Spam whenever any term is present.
    struct AnyTermIsSpam;

    impl Classifier for AnyTermIsSpam {
        fn dimension(&self) -> usize {
            1
        }

        fn predict(&self, features: &FeatureVector) -> Label {
            if features.is_zero() {
                Label::NotSpam
            } else {
                Label::Spam
            }
        }
    }

    fn classifier(calls: Arc<AtomicUsize>) -> SpamClassifier {
        SpamClassifier::builder()
            .with_vectorizer(CountingVectorizer { calls })
            .with_classifier(AnyTermIsSpam)
            .build()
            .unwrap()
    }

    #[test]
    fn test_guard_skips_model_chain() {
        let calls = Arc::new(AtomicUsize::new(0));
        let classifier = classifier(Arc::clone(&calls));

        for text in ["", "   ", "\n\t", " \r\n "] {
            assert_eq!(classifier.classify(text), Verdict::NoInput);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_degenerate_text_runs_full_chain() {
        let calls = Arc::new(AtomicUsize::new(0));
        let classifier = classifier(Arc::clone(&calls));

        let analysis = classifier.analyze("the and a of");
        assert_eq!(analysis.verdict, Verdict::NotSpam);
        assert_eq!(analysis.normalized.as_deref(), Some(""));
        assert_eq!(analysis.score, None);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_analysis_reports_normalized_text() {
        let classifier = classifier(Arc::new(AtomicUsize::new(0)));
        let analysis = classifier.analyze("Cheap PILLS!!!");
        assert_eq!(analysis.verdict, Verdict::Spam);
        assert_eq!(analysis.normalized.as_deref(), Some("cheap pill"));
        assert_eq!(analysis.matched_features, 1);
    }

    #[test]
    fn test_info() {
        let classifier = classifier(Arc::new(AtomicUsize::new(0)));
        let info = classifier.info();
        assert_eq!(info.dimension, 1);
        assert_eq!(info.num_stopwords, 179);
        assert_eq!(info.stemmer, "porter");
        assert!(info.vectorizer_path.is_none());
    }

    #[test]
    fn test_verdict_from_label() {
        assert_eq!(Verdict::from(Label::Spam), Verdict::Spam);
        assert_eq!(Verdict::from(Label::NotSpam), Verdict::NotSpam);
        assert_eq!(Verdict::NoInput.to_string(), "no_input");
    }
}
