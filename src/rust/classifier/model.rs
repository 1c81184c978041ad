use std::fmt;
use std::fs;
use std::path::Path;

use log::info;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::error::ClassifierError;
use super::vectorizer::FeatureVector;

/// The binary decision produced by a classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Spam,
    NotSpam,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spam => write!(f, "spam"),
            Self::NotSpam => write!(f, "not_spam"),
        }
    }
}

/// Maps a feature vector to a label.
///
/// Implementations must be deterministic and total over every vector their paired
/// vectorizer can produce, the all-zero vector included.
pub trait Classifier: Send + Sync {
    /// Number of features the classifier expects.
    fn dimension(&self) -> usize;

    fn predict(&self, features: &FeatureVector) -> Label;

    /// Signed decision score where positive leans towards the spam class, if the model has one.
    fn decision_score(&self, _features: &FeatureVector) -> Option<f64> {
        None
    }
}

fn default_classes() -> [i64; 2] {
    [0, 1]
}

fn default_spam_class() -> i64 {
    1
}

/// On-disk form of a fitted linear model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub coef: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
    /// Class values in model order; a positive decision selects `classes[1]`
    #[serde(default = "default_classes")]
    pub classes: [i64; 2],
    #[serde(default = "default_spam_class")]
    pub spam_class: i64,
}

/// A linear decision function `coef · x + intercept`, as fitted by a linear SVM
/// or logistic regression.
#[derive(Debug, Clone)]
pub struct LinearModel {
    coef: Array1<f64>,
    intercept: f64,
    classes: [i64; 2],
    spam_class: i64,
}

impl LinearModel {
    /// Validates an artifact and builds the model.
    ///
    /// # Errors
    /// - `ValidationError` if there are no coefficients or any weight is not finite
    /// - `ValidationError` if the two classes are equal or `spam_class` is not one of them
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ClassifierError> {
        if artifact.coef.is_empty() {
            return Err(ClassifierError::ValidationError("Model has no coefficients".into()));
        }
        if artifact.coef.iter().any(|w| !w.is_finite()) || !artifact.intercept.is_finite() {
            return Err(ClassifierError::ValidationError("Model weights must be finite".into()));
        }
        if artifact.classes[0] == artifact.classes[1] {
            return Err(ClassifierError::ValidationError(format!(
                "Model classes must be distinct, got {:?}",
                artifact.classes
            )));
        }
        if !artifact.classes.contains(&artifact.spam_class) {
            return Err(ClassifierError::ValidationError(format!(
                "Spam class {} is not one of the model classes {:?}",
                artifact.spam_class, artifact.classes
            )));
        }

        Ok(Self {
            coef: Array1::from(artifact.coef),
            intercept: artifact.intercept,
            classes: artifact.classes,
            spam_class: artifact.spam_class,
        })
    }

    /// Loads and validates a JSON model artifact.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ClassifierError::ArtifactError(format!(
                "Model file not found: {}",
                path.display()
            )));
        }
        let bytes = fs::read(path)?;
        let artifact: ModelArtifact = serde_json::from_slice(&bytes)?;
        let model = Self::from_artifact(artifact)?;
        info!("Model loaded from {:?} ({} coefficients)", path, model.coef.len());
        Ok(model)
    }

    /// Raw decision value `coef · x + intercept`.
    pub fn decision_function(&self, features: &FeatureVector) -> f64 {
        features.dot(&self.coef) + self.intercept
    }

    fn predicted_class(&self, features: &FeatureVector) -> i64 {
        if self.decision_function(features) > 0.0 {
            self.classes[1]
        } else {
            self.classes[0]
        }
    }
}

impl Classifier for LinearModel {
    fn dimension(&self) -> usize {
        self.coef.len()
    }

    fn predict(&self, features: &FeatureVector) -> Label {
        if self.predicted_class(features) == self.spam_class {
            Label::Spam
        } else {
            Label::NotSpam
        }
    }

    fn decision_score(&self, features: &FeatureVector) -> Option<f64> {
        let decision = self.decision_function(features);
        // Orient so that positive always means spam
        if self.spam_class == self.classes[1] {
            Some(decision)
        } else {
            Some(-decision)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(intercept: f64) -> LinearModel {
        LinearModel::from_artifact(ModelArtifact {
            coef: vec![2.0, -1.0],
            intercept,
            classes: [0, 1],
            spam_class: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_linear_decision() {
        let model = model(-0.5);
        let spammy = FeatureVector::from_entries(2, vec![(0, 1.0)]).unwrap();
        let hammy = FeatureVector::from_entries(2, vec![(1, 1.0)]).unwrap();

        assert_eq!(model.predict(&spammy), Label::Spam);
        assert_eq!(model.predict(&hammy), Label::NotSpam);
        assert!((model.decision_function(&spammy) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_vector_follows_intercept() {
        let zero = FeatureVector::zeros(2);
        assert_eq!(model(-0.5).predict(&zero), Label::NotSpam);
        assert_eq!(model(0.5).predict(&zero), Label::Spam);
        // A decision of exactly zero selects the first class
        assert_eq!(model(0.0).predict(&zero), Label::NotSpam);
    }

    #[test]
    fn test_inverted_spam_class() {
        let model = LinearModel::from_artifact(ModelArtifact {
            coef: vec![1.0],
            intercept: 0.0,
            classes: [1, 0],
            spam_class: 1,
        })
        .unwrap();
        let features = FeatureVector::from_entries(1, vec![(0, 1.0)]).unwrap();
        assert_eq!(model.predict(&features), Label::NotSpam);
        assert_eq!(model.decision_score(&features), Some(-1.0));
    }

    #[test]
    fn test_artifact_defaults() {
        let artifact: ModelArtifact = serde_json::from_str(r#"{"coef": [0.1, 0.2]}"#).unwrap();
        assert_eq!(artifact.classes, [0, 1]);
        assert_eq!(artifact.spam_class, 1);
        assert_eq!(artifact.intercept, 0.0);
    }

    #[test]
    fn test_invalid_artifacts_rejected() {
        let empty = ModelArtifact { coef: vec![], intercept: 0.0, classes: [0, 1], spam_class: 1 };
        assert!(LinearModel::from_artifact(empty).is_err());

        let same = ModelArtifact { coef: vec![1.0], intercept: 0.0, classes: [1, 1], spam_class: 1 };
        assert!(LinearModel::from_artifact(same).is_err());

        let unknown = ModelArtifact { coef: vec![1.0], intercept: 0.0, classes: [0, 1], spam_class: 2 };
        assert!(matches!(
            LinearModel::from_artifact(unknown),
            Err(ClassifierError::ValidationError(_))
        ));

        let nan = ModelArtifact { coef: vec![f64::NAN], intercept: 0.0, classes: [0, 1], spam_class: 1 };
        assert!(LinearModel::from_artifact(nan).is_err());
    }
}
