mod error;
mod result;
pub mod builder;
pub mod features;
pub mod matcher;
#[allow(clippy::module_inception)]
mod pipeline;

pub use builder::PipelineBuilder;
pub use error::{PipelineError, TopicNotFound};
pub use features::{build_feature_vector, derive_repetition_count, FeatureVector};
pub use matcher::{resolve_topic, TopicVocabulary};
pub use pipeline::PredictionPipeline;
pub use result::{BatchReport, PredictionResult};
