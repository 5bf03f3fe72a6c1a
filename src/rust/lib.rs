//! Predicts whether a C programming exam question will reappear in an
//! upcoming exam.
//!
//! A question is described by three features: its encoded topic, its marks,
//! and how often the topic has been asked before. The library resolves the
//! topic of a question, derives the features and hands them to a pre-trained
//! classifier. The classifier and the topic encoder are injected, so any
//! implementation of [`Classifier`] and [`TopicEncoder`] can be used.
//!
//! # Basic Usage
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use pyq_predictor::{Dataset, LabelEncoder, LogisticModel, PredictionPipeline};
//!
//! let pipeline = PredictionPipeline::builder()
//!     .with_classifier(LogisticModel::new(vec![0.0, 0.1, 0.9], -2.0)?)
//!     .with_encoder(LabelEncoder::fit(["Arrays", "Loops", "Pointers"]))
//!     .build()?;
//!
//! let dataset = Dataset::from_reader("Topic,Marks,RepetitionCount\nLoops,10,4\nArrays,5,0\n".as_bytes())?;
//!
//! // Batch mode: one prediction per row
//! let report = pipeline.predict_dataset(&dataset)?;
//! assert_eq!(report.predicted_count(), 2);
//!
//! // Single-question mode: the topic is found in the question text
//! let records = dataset.topic_records(pipeline.config().marks_range())?;
//! let result = pipeline.predict_from_text(Some(records.as_slice()), "Write a program using loops", 5)?;
//! println!("{}", result);
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! Pipelines are read-only once built and can be shared across threads using `Arc`.

pub mod artifacts;
pub mod classifier;
pub mod config;
pub mod dataset;
pub mod pipeline;

pub use artifacts::{ArtifactError, ArtifactStore};
pub use classifier::{AppearanceLabel, ClassProbabilities, Classifier, ClassifierError, LabelEncoder, LogisticModel, TopicEncoder};
pub use config::{BatchPolicy, PipelineConfig};
pub use dataset::{Dataset, QuestionRecord};
pub use pipeline::{
    BatchReport, FeatureVector, PipelineBuilder, PipelineError, PredictionPipeline, PredictionResult,
    TopicNotFound, TopicVocabulary,
};

pub fn init_logger() {
    env_logger::init();
}
