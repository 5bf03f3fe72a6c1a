use ndarray::Array1;
use serde::{Deserialize, Serialize};
use log::debug;

use super::error::ClassifierError;
use super::utils::{is_distribution, sigmoid};
use crate::pipeline::features::{FeatureVector, FEATURE_COUNT};

/// The binary outcome predicted for a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppearanceLabel {
    WontAppear,
    WillAppear,
}

impl AppearanceLabel {
    /// Class index of the label, the value written to the `Prediction` column.
    pub fn class(self) -> u8 {
        match self {
            Self::WontAppear => 0,
            Self::WillAppear => 1,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::WillAppear => "Likely to Appear",
            Self::WontAppear => "Unlikely to Appear",
        }
    }
}

/// Probabilities of `[WontAppear, WillAppear]`, in class-index order.
pub type ClassProbabilities = [f64; 2];

/// A pre-trained binary classifier over [`FeatureVector`]s.
///
/// Implementations are loaded once and shared read-only, so they must be
/// `Send + Sync`.
pub trait Classifier: Send + Sync {
    /// Predicts the label of a feature vector together with the probability
    /// of each class.
    fn predict(&self, features: &FeatureVector) -> Result<(AppearanceLabel, ClassProbabilities), ClassifierError>;
}

/// A logistic-regression model over the three question features.
///
/// Serialized as:
/// ```json
/// { "weights": [0.01, 0.32, 0.81], "intercept": -2.4 }
/// ```
/// where the weights follow the `[topic_encoded, marks, repetition_count]` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    weights: Vec<f64>,
    intercept: f64,
    #[serde(default = "LogisticModel::default_threshold")]
    threshold: f64,
}

impl LogisticModel {
    /// Creates a validated model
    ///
    /// # Errors
    /// - `ModelError` if the number of weights differs from the feature count
    /// - `ModelError` if any parameter is not finite
    pub fn new(weights: Vec<f64>, intercept: f64) -> Result<Self, ClassifierError> {
        let model = Self {
            weights,
            intercept,
            threshold: Self::default_threshold(),
        };
        model.validate()?;
        Ok(model)
    }

    /// Overrides the decision threshold on the positive-class probability
    pub fn with_threshold(mut self, threshold: f64) -> Result<Self, ClassifierError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ClassifierError::ValidationError(
                format!("Threshold must be within [0, 1], got {}", threshold)
            ));
        }
        self.threshold = threshold;
        Ok(self)
    }

    fn default_threshold() -> f64 {
        0.5
    }

    /// Validates that the parameters match the feature contract. Deserialized
    /// models must be validated before use.
    pub fn validate(&self) -> Result<(), ClassifierError> {
        if self.weights.len() != FEATURE_COUNT {
            return Err(ClassifierError::ModelError(
                format!("Model must have {} weights, found {}", FEATURE_COUNT, self.weights.len())
            ));
        }
        if !self.intercept.is_finite() || self.weights.iter().any(|w| !w.is_finite()) {
            return Err(ClassifierError::ModelError("Model parameters must be finite".to_string()));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ClassifierError::ModelError(
                format!("Threshold must be within [0, 1], got {}", self.threshold)
            ));
        }
        Ok(())
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl Classifier for LogisticModel {
    fn predict(&self, features: &FeatureVector) -> Result<(AppearanceLabel, ClassProbabilities), ClassifierError> {
        if self.weights.len() != FEATURE_COUNT {
            return Err(ClassifierError::ModelError(
                format!("Model must have {} weights, found {}", FEATURE_COUNT, self.weights.len())
            ));
        }

        let x = features.to_array();
        let w = Array1::from(self.weights.clone());
        let positive = sigmoid(w.dot(&x) + self.intercept);
        let probabilities = [1.0 - positive, positive];

        if !is_distribution(&probabilities) {
            return Err(ClassifierError::PredictionError(
                format!("Model produced invalid probabilities {:?}", probabilities)
            ));
        }

        let label = if positive >= self.threshold {
            AppearanceLabel::WillAppear
        } else {
            AppearanceLabel::WontAppear
        };
        debug!("Classified {:?} as {:?} (p = {:.4})", features.as_slice(), label, positive);

        Ok((label, probabilities))
    }
}
