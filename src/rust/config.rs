use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::pipeline::features::DEFAULT_REPETITION_COUNT;

/// How a batch treats rows that cannot be predicted, such as topics the
/// encoder has never seen. Missing columns always fail the whole batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPolicy {
    /// Predict every row that can be predicted and report the failures
    #[default]
    PartialSuccess,
    /// Fail the whole batch on the first row that cannot be predicted
    AllOrNothing,
}

impl fmt::Display for BatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PartialSuccess => write!(f, "partial"),
            Self::AllOrNothing => write!(f, "all-or-nothing"),
        }
    }
}

impl FromStr for BatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "partial" | "partial-success" => Ok(Self::PartialSuccess),
            "all-or-nothing" | "strict" => Ok(Self::AllOrNothing),
            other => Err(format!(
                "unknown batch policy '{}', expected 'partial' or 'all-or-nothing'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Repetition count assumed for a topic with no history in the dataset
    pub default_repetition_count: u32,
    pub min_marks: u32,
    pub max_marks: u32,
    pub batch_policy: BatchPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_repetition_count: DEFAULT_REPETITION_COUNT,
            min_marks: 1,
            max_marks: 20,
            batch_policy: BatchPolicy::default(),
        }
    }
}

impl PipelineConfig {
    pub fn with_batch_policy(mut self, policy: BatchPolicy) -> Self {
        self.batch_policy = policy;
        self
    }

    pub fn with_default_repetition_count(mut self, count: u32) -> Self {
        self.default_repetition_count = count;
        self
    }

    pub fn marks_range(&self) -> RangeInclusive<u32> {
        self.min_marks..=self.max_marks
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.min_marks == 0 || self.min_marks > self.max_marks {
            return Err(format!(
                "Invalid marks range {}..={}",
                self.min_marks, self.max_marks
            ));
        }
        Ok(())
    }
}
