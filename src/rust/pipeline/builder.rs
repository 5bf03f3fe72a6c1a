use std::sync::Arc;

use log::info;

use super::error::PipelineError;
use super::pipeline::PredictionPipeline;
use crate::classifier::{Classifier, TopicEncoder};
use crate::config::PipelineConfig;

/// A builder for constructing a PredictionPipeline with a fluent interface.
#[derive(Default)]
pub struct PipelineBuilder {
    classifier: Option<Arc<dyn Classifier>>,
    encoder: Option<Arc<dyn TopicEncoder>>,
    config: PipelineConfig,
}

impl PipelineBuilder {
    /// Creates a new empty PipelineBuilder with the default configuration
    pub fn new() -> Self {
        Self {
            classifier: None,
            encoder: None,
            config: PipelineConfig::default(),
        }
    }

    /// Sets the pre-trained classifier that scores feature vectors
    pub fn with_classifier(self, classifier: impl Classifier + 'static) -> Self {
        self.with_shared_classifier(Arc::new(classifier))
    }

    /// Sets a classifier that is already shared with other pipelines
    pub fn with_shared_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Sets the topic encoder the classifier was trained with
    pub fn with_encoder(self, encoder: impl TopicEncoder + 'static) -> Self {
        self.with_shared_encoder(Arc::new(encoder))
    }

    pub fn with_shared_encoder(mut self, encoder: Arc<dyn TopicEncoder>) -> Self {
        self.encoder = Some(encoder);
        self
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the pipeline
    ///
    /// # Returns
    /// * `Result<PredictionPipeline, PipelineError>` - The pipeline, or a
    ///   `BuildError` if:
    ///   - No classifier or encoder has been set
    ///   - The encoder knows no topics
    ///   - The configuration is invalid
    pub fn build(self) -> Result<PredictionPipeline, PipelineError> {
        let classifier = self.classifier
            .ok_or_else(|| PipelineError::BuildError("A classifier must be set".to_string()))?;
        let encoder = self.encoder
            .ok_or_else(|| PipelineError::BuildError("A topic encoder must be set".to_string()))?;

        if encoder.is_empty() {
            return Err(PipelineError::BuildError("The topic encoder knows no topics".to_string()));
        }
        self.config.validate().map_err(PipelineError::BuildError)?;

        info!(
            "Prediction pipeline ready ({} encoded topics, batch policy: {})",
            encoder.len(),
            self.config.batch_policy
        );
        Ok(PredictionPipeline {
            classifier,
            encoder,
            config: self.config,
        })
    }
}
