use std::sync::Arc;

use log::{debug, info, warn};

use super::builder::PipelineBuilder;
use super::error::{PipelineError, TopicNotFound};
use super::features::{build_feature_vector, derive_repetition_count_or, FeatureVector};
use super::matcher::{resolve_topic, TopicVocabulary};
use super::result::{BatchReport, PredictionResult};
use crate::classifier::{Classifier, ClassifierError, TopicEncoder};
use crate::config::{BatchPolicy, PipelineConfig};
use crate::dataset::{Dataset, QuestionRecord};

/// Turns question records or free-text questions into predictions.
///
/// The classifier and encoder are injected at construction and shared
/// read-only, so one pipeline can serve any number of requests, from any
/// number of threads:
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use pyq_predictor::{LabelEncoder, LogisticModel, PredictionPipeline, QuestionRecord};
///
/// let pipeline = PredictionPipeline::builder()
///     .with_classifier(LogisticModel::new(vec![0.0, 0.1, 0.9], -2.0)?)
///     .with_encoder(LabelEncoder::fit(["Arrays", "Pointers"]))
///     .build()?;
///
/// let records = vec![
///     QuestionRecord::new("Arrays", 5, 3),
///     QuestionRecord::new("Pointers", 8, 1),
/// ];
/// let result = pipeline.predict_from_text(Some(records.as_slice()), "Explain arrays in C with example", 5)?;
/// assert_eq!(result.matched_topic.as_deref(), Some("Arrays"));
/// assert_eq!(result.estimated_repetition_count, Some(3));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PredictionPipeline {
    pub(crate) classifier: Arc<dyn Classifier>,
    pub(crate) encoder: Arc<dyn TopicEncoder>,
    pub(crate) config: PipelineConfig,
}

// Compile-time verification of thread-safety
const _: fn() = || {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<PredictionPipeline>();
};

impl std::fmt::Debug for PredictionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionPipeline")
            .field("classifier", &"<Classifier>")
            .field("encoder", &format_args!("<TopicEncoder: {} topics>", self.encoder.len()))
            .field("config", &self.config)
            .finish()
    }
}

impl PredictionPipeline {
    /// Creates a PipelineBuilder for fluent construction
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Predicts every record independently, using the record's own marks
    /// and repetition count. A failing record does not affect the others.
    pub fn predict_batch(&self, records: &[QuestionRecord]) -> Vec<Result<PredictionResult, PipelineError>> {
        records.iter().map(|record| self.predict_record(record)).collect()
    }

    fn predict_record(&self, record: &QuestionRecord) -> Result<PredictionResult, PipelineError> {
        let topic_encoded = self.encode_topic(&record.topic)?;
        let features = build_feature_vector(topic_encoded, record.marks, record.repetition_count);
        self.classify(&features, None, None)
    }

    /// Validates an uploaded dataset and predicts all of its rows.
    ///
    /// Column validation comes first and fails the whole batch. Row failures
    /// are then handled according to the configured [`BatchPolicy`].
    ///
    /// # Errors
    /// - `MissingColumn` / `InvalidRecord` from dataset validation
    /// - the first row failure, when the policy is `AllOrNothing`
    pub fn predict_dataset(&self, dataset: &Dataset) -> Result<BatchReport, PipelineError> {
        let records = dataset.question_records(self.config.marks_range())?;
        let outcomes = match self.config.batch_policy {
            BatchPolicy::PartialSuccess => self.predict_batch(&records),
            BatchPolicy::AllOrNothing => records
                .iter()
                .enumerate()
                .map(|(i, record)| {
                    self.predict_record(record).map_err(|e| {
                        warn!("Row {} failed, discarding the whole batch: {}", i + 1, e);
                        e
                    })
                })
                .collect::<Result<Vec<_>, _>>()?
                .into_iter()
                .map(Ok)
                .collect(),
        };

        let report = BatchReport::new(dataset, outcomes);
        for (row, error) in report.failures() {
            warn!("Row {} was not predicted: {}", row, error);
        }
        info!("Predicted {}/{} rows", report.predicted_count(), records.len());
        Ok(report)
    }

    /// Predicts a single question from its text.
    ///
    /// The topic is the first topic of `records` that appears as a whole word
    /// in the question; its repetition count is the dataset average for that
    /// topic.
    ///
    /// # Errors
    /// - `NoDatasetLoaded` if `records` is `None`
    /// - `InvalidMarks` if `marks` is outside the configured range
    /// - `TopicNotFound` if no topic appears in the text, or the matched topic
    ///   is unknown to the encoder
    pub fn predict_from_text(
        &self,
        records: Option<&[QuestionRecord]>,
        question_text: &str,
        marks: u32,
    ) -> Result<PredictionResult, PipelineError> {
        let records = records.ok_or(PipelineError::NoDatasetLoaded)?;
        self.check_marks(marks)?;

        let vocabulary = TopicVocabulary::from_records(records);
        let question = question_text.to_lowercase();
        let matched_topic = resolve_topic(&vocabulary, None, Some(question.as_str()))?;
        let repetition_count =
            derive_repetition_count_or(records, &matched_topic, self.config.default_repetition_count);
        debug!(
            "Question matched topic '{}' with estimated repetition count {}",
            matched_topic, repetition_count
        );

        let topic_encoded = self.encode_topic(&matched_topic)?;
        let features = build_feature_vector(topic_encoded, marks, repetition_count);
        self.classify(&features, Some(matched_topic), Some(repetition_count))
    }

    fn check_marks(&self, marks: u32) -> Result<(), PipelineError> {
        if self.config.marks_range().contains(&marks) {
            Ok(())
        } else {
            Err(PipelineError::InvalidMarks {
                value: marks,
                min: self.config.min_marks,
                max: self.config.max_marks,
            })
        }
    }

    fn encode_topic(&self, topic: &str) -> Result<i64, PipelineError> {
        self.encoder
            .encode(topic)
            .ok_or_else(|| TopicNotFound::UnknownToEncoder(topic.to_string()).into())
    }

    fn classify(
        &self,
        features: &FeatureVector,
        matched_topic: Option<String>,
        estimated_repetition_count: Option<u32>,
    ) -> Result<PredictionResult, PipelineError> {
        debug!(
            "Classifying features {:?} (topic '{}')",
            features.as_slice(),
            self.encoder.decode(features.topic_encoded()).unwrap_or("<unknown>")
        );
        let (label, probabilities) = self.classifier.predict(features)?;

        let confidence = probabilities[usize::from(label.class())];
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ClassifierError::PredictionError(
                format!("Confidence {} is not a probability", confidence)
            ).into());
        }

        Ok(PredictionResult {
            label,
            confidence,
            matched_topic,
            estimated_repetition_count,
        })
    }
}
