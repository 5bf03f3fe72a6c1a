use crate::classifier::ClassifierError;

/// Why a topic could not be resolved or encoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopicNotFound {
    /// The loaded dataset has no topics to match against
    #[error("the loaded dataset has no topics")]
    EmptyVocabulary,
    /// No topic of the loaded dataset appears in the question text
    #[error("no known topic appears in the question text")]
    NotInText,
    /// An explicitly named topic is not part of the loaded dataset
    #[error("topic '{0}' is not part of the loaded dataset")]
    NotInVocabulary(String),
    /// The topic is not known to the trained model's encoder
    #[error("topic '{0}' is unknown to the trained model")]
    UnknownToEncoder(String),
}

/// Errors raised while validating input or producing predictions.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The pipeline is missing a collaborator or has an invalid configuration
    #[error("Build error: {0}")]
    BuildError(String),
    /// A required column is absent from the uploaded dataset
    #[error("Required column '{0}' is missing")]
    MissingColumn(String),
    #[error("Topic not found: {0}")]
    TopicNotFound(#[from] TopicNotFound),
    /// A single-question prediction was requested before any dataset was loaded
    #[error("No dataset loaded")]
    NoDatasetLoaded,
    #[error("Marks must be between {min} and {max}, got {value}")]
    InvalidMarks { value: u32, min: u32, max: u32 },
    /// A row holds a value that does not fit its column; rows are 1-based
    #[error("Invalid record at row {row}: {reason}")]
    InvalidRecord { row: usize, reason: String },
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl PipelineError {
    /// A message suitable for showing to the person who submitted the request.
    pub fn user_message(&self) -> String {
        match self {
            Self::BuildError(msg) => format!("The predictor is not set up correctly: {}.", msg),
            Self::MissingColumn(column) => {
                format!("'{}' column is missing in the uploaded CSV.", column)
            }
            Self::TopicNotFound(TopicNotFound::NotInText) | Self::TopicNotFound(TopicNotFound::EmptyVocabulary) => {
                "Could not identify the topic. Try to include keywords like 'loops', 'structures', etc.".to_string()
            }
            Self::TopicNotFound(TopicNotFound::NotInVocabulary(topic)) => {
                format!("Topic '{}' does not appear in the uploaded question set.", topic)
            }
            Self::TopicNotFound(TopicNotFound::UnknownToEncoder(topic)) => {
                format!("Error encoding topic '{}'. The trained model does not know this topic.", topic)
            }
            Self::NoDatasetLoaded => {
                "Please upload a question CSV first to enable topic matching.".to_string()
            }
            Self::InvalidMarks { min, max, .. } => {
                format!("Marks must be a whole number between {} and {}.", min, max)
            }
            Self::InvalidRecord { row, reason } => {
                format!("Row {} of the uploaded CSV is invalid: {}.", row, reason)
            }
            Self::Classifier(e) => format!("The prediction model failed: {}.", e),
            Self::Csv(e) => format!("The uploaded file could not be read as CSV: {}.", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_causes_have_distinct_messages() {
        let in_text = PipelineError::from(TopicNotFound::NotInText).user_message();
        let in_encoder = PipelineError::from(TopicNotFound::UnknownToEncoder("Loops".into())).user_message();
        assert_ne!(in_text, in_encoder);
        assert!(in_encoder.contains("Loops"));
    }

    #[test]
    fn test_missing_column_message_names_column() {
        let error = PipelineError::MissingColumn("Topic".into());
        assert!(error.user_message().contains("'Topic'"));
        assert_eq!(error.to_string(), "Required column 'Topic' is missing");
    }
}
