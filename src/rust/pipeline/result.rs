use std::fmt;

use serde::Serialize;

use super::error::PipelineError;
use crate::classifier::AppearanceLabel;
use crate::dataset::Dataset;

/// The outcome of one prediction request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub label: AppearanceLabel,
    /// Probability the classifier assigns to `label`
    pub confidence: f64,
    /// Topic resolved from the question text, for single-question requests
    pub matched_topic: Option<String>,
    /// Repetition count estimated from the dataset, for single-question requests
    pub estimated_repetition_count: Option<u32>,
}

impl fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (", self.label.description())?;
        if let Some(topic) = &self.matched_topic {
            write!(f, "Topic: {}, ", topic)?;
        }
        write!(f, "Confidence: {:.2})", self.confidence)
    }
}

/// Predictions for an uploaded dataset, one outcome per row.
#[derive(Debug)]
pub struct BatchReport {
    table: Dataset,
    outcomes: Vec<Result<PredictionResult, PipelineError>>,
}

impl BatchReport {
    pub(crate) fn new(source: &Dataset, outcomes: Vec<Result<PredictionResult, PipelineError>>) -> Self {
        let labels: Vec<Option<AppearanceLabel>> = outcomes
            .iter()
            .map(|outcome| outcome.as_ref().ok().map(|r| r.label))
            .collect();
        Self {
            table: source.with_predictions(&labels),
            outcomes,
        }
    }

    /// The uploaded table with the `Prediction` column appended.
    pub fn table(&self) -> &Dataset {
        &self.table
    }

    pub fn outcomes(&self) -> &[Result<PredictionResult, PipelineError>] {
        &self.outcomes
    }

    pub fn predicted_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    /// Rows that could not be predicted, numbered from 1.
    pub fn failures(&self) -> impl Iterator<Item = (usize, &PipelineError)> {
        self.outcomes
            .iter()
            .enumerate()
            .filter_map(|(i, outcome)| outcome.as_ref().err().map(|e| (i + 1, e)))
    }
}
