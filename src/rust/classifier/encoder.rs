use serde::{Deserialize, Serialize};

use super::error::ClassifierError;

/// Maps topic labels to the integer codes the classifier was trained with.
///
/// Codes are stable for the lifetime of the encoder. Labels that were not seen
/// when the encoder was fitted have no code.
pub trait TopicEncoder: Send + Sync {
    /// Returns the code of `label`, or `None` if the label is unknown.
    fn encode(&self, label: &str) -> Option<i64>;

    /// Returns the label of `code`, or `None` if the code is out of range.
    fn decode(&self, code: i64) -> Option<&str>;

    /// Number of known labels.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A label encoder whose codes are positions in the sorted list of classes.
///
/// Serialized as `{ "classes": ["Arrays", "Loops", "Pointers"] }`. Matching is
/// exact, the encoder never guesses a label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Fits an encoder on the given labels; duplicates are collapsed and the
    /// classes are sorted.
    pub fn fit<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut classes: Vec<String> = labels.into_iter().map(Into::into).collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    /// Validates a deserialized encoder: classes must be non-empty, unique and sorted.
    pub fn validate(&self) -> Result<(), ClassifierError> {
        if self.classes.is_empty() {
            return Err(ClassifierError::ValidationError("Topic encoder has no classes".into()));
        }
        if let Some(pos) = self.classes.iter().position(|c| c.is_empty()) {
            return Err(ClassifierError::ValidationError(
                format!("Topic encoder class {} is empty", pos)
            ));
        }
        if self.classes.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(ClassifierError::ValidationError(
                "Topic encoder classes must be sorted and unique".into()
            ));
        }
        Ok(())
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

impl TopicEncoder for LabelEncoder {
    fn encode(&self, label: &str) -> Option<i64> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(label))
            .ok()
            .and_then(|index| i64::try_from(index).ok())
    }

    fn decode(&self, code: i64) -> Option<&str> {
        usize::try_from(code)
            .ok()
            .and_then(|index| self.classes.get(index))
            .map(String::as_str)
    }

    fn len(&self) -> usize {
        self.classes.len()
    }
}
