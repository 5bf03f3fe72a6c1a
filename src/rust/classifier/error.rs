/// Represents the different types of errors a classifier can raise.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifierError {
    /// The model parameters do not fit the feature contract
    #[error("Model error: {0}")]
    ModelError(String),
    /// The classifier produced something that is not a probability distribution
    #[error("Prediction error: {0}")]
    PredictionError(String),
    /// Error occurred due to invalid input parameters
    #[error("Validation error: {0}")]
    ValidationError(String),
}
