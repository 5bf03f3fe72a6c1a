use ndarray::Array1;
use serde::Serialize;

use crate::dataset::QuestionRecord;

/// Number of features the classifier consumes.
pub const FEATURE_COUNT: usize = 3;

/// Repetition count used when a topic has no history in the dataset.
pub const DEFAULT_REPETITION_COUNT: u32 = 1;

/// The feature row handed to the classifier, in the order
/// `[topic_encoded, marks, repetition_count]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeatureVector {
    topic_encoded: i64,
    marks: u32,
    repetition_count: u32,
}

impl FeatureVector {
    pub fn topic_encoded(&self) -> i64 {
        self.topic_encoded
    }

    pub fn marks(&self) -> u32 {
        self.marks
    }

    pub fn repetition_count(&self) -> u32 {
        self.repetition_count
    }

    /// Positional view of the features.
    pub fn as_slice(&self) -> [i64; FEATURE_COUNT] {
        [self.topic_encoded, i64::from(self.marks), i64::from(self.repetition_count)]
    }

    pub fn to_array(&self) -> Array1<f64> {
        Array1::from_iter(self.as_slice().iter().map(|&v| v as f64))
    }
}

/// Assembles a feature vector. Marks are expected to be range-checked by the caller.
pub fn build_feature_vector(topic_encoded: i64, marks: u32, repetition_count: u32) -> FeatureVector {
    FeatureVector {
        topic_encoded,
        marks,
        repetition_count,
    }
}

/// Mean repetition count of the records on `topic`, truncated toward zero.
///
/// Topics are compared case-insensitively after trimming. Returns
/// [`DEFAULT_REPETITION_COUNT`] when no record matches.
pub fn derive_repetition_count(records: &[QuestionRecord], topic: &str) -> u32 {
    derive_repetition_count_or(records, topic, DEFAULT_REPETITION_COUNT)
}

/// Same as [`derive_repetition_count`] with an explicit fallback.
pub fn derive_repetition_count_or(records: &[QuestionRecord], topic: &str, fallback: u32) -> u32 {
    let wanted = topic.trim().to_lowercase();
    let (sum, count) = records
        .iter()
        .filter(|record| record.topic.trim().to_lowercase() == wanted)
        .fold((0u64, 0u64), |(sum, count), record| {
            (sum + u64::from(record.repetition_count), count + 1)
        });

    if count == 0 {
        return fallback;
    }
    // Integer division truncates; the mean never exceeds the largest count.
    u32::try_from(sum / count).unwrap_or(u32::MAX)
}
