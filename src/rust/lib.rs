//! A thread-safe spam classifier for email text.
//!
//! Raw text is normalized (lowercased, URLs and non-letters removed, stopwords dropped,
//! words stemmed), turned into TF-IDF features and scored by a pre-trained linear model.
//! The vectorizer and model are loaded once from JSON artifacts and never change afterwards.
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use spamguard::{SpamClassifier, Verdict};
//!
//! let classifier = SpamClassifier::builder()
//!     .with_artifacts_dir("artifacts/default")?
//!     .build()?;
//!
//! assert_eq!(classifier.classify("   "), Verdict::NoInput);
//! println!("{}", classifier.classify("FREE money! Click www.win.com now!!"));
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! The classifier is immutable after `build` and can be shared across threads using `Arc`:
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use spamguard::SpamClassifier;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let classifier = Arc::new(SpamClassifier::builder()
//!     .with_artifacts_dir("artifacts/default")?
//!     .build()?);
//!
//! let mut handles = vec![];
//! for _ in 0..3 {
//!     let classifier = Arc::clone(&classifier);
//!     handles.push(thread::spawn(move || {
//!         classifier.classify("Meeting moved to 3pm tomorrow");
//!     }));
//! }
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! # Ok(())
//! # }
//! ```

pub mod artifact_manager;
pub mod artifacts;
pub mod classifier;
pub mod config;

pub use artifact_manager::{ArtifactError, ArtifactManager};
pub use artifacts::ArtifactInfo;
pub use classifier::{
    Analysis, Classifier, ClassifierError, ClassifierInfo, FeatureVector, Label, LinearModel,
    Normalizer, SpamClassifier, SpamClassifierBuilder, StemmerKind, StopwordSet, TfidfVectorizer,
    Vectorizer, Verdict,
};
pub use config::ClassifierConfig;
pub use rust_stemmers::Algorithm;

pub fn init_logger() {
    env_logger::init();
}
