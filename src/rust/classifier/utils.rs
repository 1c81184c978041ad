use serde::{Deserialize, Serialize};

/// Row normalization applied after term weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

/// Scales `values` to unit length under `norm`. A zero vector stays zero.
pub(crate) fn normalize_values(values: &mut [f64], norm: Norm) {
    let length: f64 = match norm {
        Norm::L1 => values.iter().map(|x| x.abs()).sum(),
        Norm::L2 => values.iter().map(|&x| x * x).sum::<f64>().sqrt(),
    };
    if length > 1e-12 {
        for value in values.iter_mut() {
            *value /= length;
        }
    }
}

/// Word n-grams over `tokens`, joined by a single space, for every `n` in `min_n..=max_n`.
pub(crate) fn word_ngrams(tokens: &[&str], min_n: usize, max_n: usize) -> Vec<String> {
    let mut grams = Vec::new();
    for n in min_n..=max_n {
        if n == 0 || n > tokens.len() {
            continue;
        }
        grams.extend(tokens.windows(n).map(|window| window.join(" ")));
    }
    grams
}
