use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::Algorithm;

use super::stopwords::StopwordSet;

lazy_static! {
    /// URL-prefixed runs plus any character outside `a-z` and whitespace.
    /// Matches are deleted, not replaced, so `end.Start` becomes `endstart`.
    static ref NOISE: Regex = Regex::new(r"http\S+|www\S+|[^a-z\s]").expect("valid noise pattern");
}

/// Stemming algorithm applied to the tokens that survive stopword removal.
///
/// Artifacts fitted with NLTK's `PorterStemmer` need `Porter`; Snowball English
/// (Porter2) agrees on many words but not all (`generously` is `gener` under Porter
/// and `generous` under Snowball).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StemmerKind {
    /// The original 1980 Porter algorithm.
    #[default]
    Porter,
    /// A Snowball algorithm from `rust-stemmers`.
    Snowball(Algorithm),
}

impl std::fmt::Display for StemmerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StemmerKind::Porter => write!(f, "porter"),
            StemmerKind::Snowball(algorithm) => write!(f, "snowball-{:?}", algorithm),
        }
    }
}

enum Stemmer {
    Porter,
    Snowball(rust_stemmers::Stemmer),
}

impl Stemmer {
    fn create(kind: StemmerKind) -> Self {
        match kind {
            StemmerKind::Porter => Stemmer::Porter,
            StemmerKind::Snowball(algorithm) => {
                Stemmer::Snowball(rust_stemmers::Stemmer::create(algorithm))
            }
        }
    }

    fn stem(&self, word: &str) -> String {
        match self {
            // Only fails on input outside lowercase ASCII, which `clean` already removed.
            Stemmer::Porter => stem::get(word).unwrap_or_else(|_| word.to_string()),
            Stemmer::Snowball(stemmer) => stemmer.stem(word).into_owned(),
        }
    }
}

/// Turns raw email text into the space-joined stem sequence the vectorizer was fitted on.
///
/// Steps, in order:
/// 1. Lowercase the input
/// 2. Delete URLs and every character that is not `a-z` or whitespace
/// 3. Split on whitespace
/// 4. Drop stopwords and stem what remains
/// 5. Join the stems with single spaces
///
/// Every step is total: any `&str` normalizes, and an empty result is a valid output.
pub struct Normalizer {
    stopwords: StopwordSet,
    stemmer: Stemmer,
    kind: StemmerKind,
}

impl Normalizer {
    pub fn new(stopwords: StopwordSet, kind: StemmerKind) -> Self {
        Self {
            stopwords,
            stemmer: Stemmer::create(kind),
            kind,
        }
    }

    /// English stopwords with the Porter stemmer.
    pub fn english() -> Self {
        Self::new(StopwordSet::english(), StemmerKind::Porter)
    }

    pub fn stopwords(&self) -> &StopwordSet {
        &self.stopwords
    }

    pub fn stemmer(&self) -> StemmerKind {
        self.kind
    }

    /// Lowercases and strips noise, leaving only `a-z` and whitespace.
    pub fn clean(&self, raw: &str) -> String {
        let lowered = raw.to_lowercase();
        NOISE.replace_all(&lowered, "").into_owned()
    }

    /// Returns the surviving stems in their original order.
    pub fn tokens(&self, raw: &str) -> Vec<String> {
        let cleaned = self.clean(raw);
        cleaned
            .split_whitespace()
            .filter(|word| !self.stopwords.contains(word))
            .map(|word| self.stemmer.stem(word))
            .collect()
    }

    pub fn normalize(&self, raw: &str) -> String {
        self.tokens(raw).join(" ")
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::english()
    }
}

impl Clone for Normalizer {
    fn clone(&self) -> Self {
        // Stemmer is not Clone
        Self::new(self.stopwords.clone(), self.kind)
    }
}

impl std::fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Normalizer")
            .field("stopwords", &self.stopwords.len())
            .field("stemmer", &self.kind)
            .finish()
    }
}
