mod error;
mod encoder;
mod model;
mod utils;

pub use error::ClassifierError;
pub use encoder::{LabelEncoder, TopicEncoder};
pub use model::{AppearanceLabel, ClassProbabilities, Classifier, LogisticModel};
