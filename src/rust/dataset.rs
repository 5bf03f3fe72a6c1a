//! Uploaded question sets.
//!
//! A [`Dataset`] keeps the uploaded CSV as it was read, so predictions can be
//! appended next to the original columns. Typed [`QuestionRecord`]s are only
//! produced by [`Dataset::question_records`], which validates the required
//! columns before anything is parsed:
//!
//! ```csv
//! Topic,Marks,RepetitionCount
//! Arrays,5,3
//! Pointers,8,1
//! ```

use std::fs::File;
use std::io;
use std::ops::RangeInclusive;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::classifier::AppearanceLabel;
use crate::pipeline::PipelineError;

pub const TOPIC_COLUMN: &str = "Topic";
pub const MARKS_COLUMN: &str = "Marks";
pub const REPETITION_COLUMN: &str = "RepetitionCount";
pub const PREDICTION_COLUMN: &str = "Prediction";

/// One historical or uploaded question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    #[serde(rename = "Topic")]
    pub topic: String,
    #[serde(rename = "Marks")]
    pub marks: u32,
    #[serde(rename = "RepetitionCount")]
    pub repetition_count: u32,
}

impl QuestionRecord {
    pub fn new(topic: impl Into<String>, marks: u32, repetition_count: u32) -> Self {
        Self {
            topic: topic.into(),
            marks,
            repetition_count,
        }
    }
}

/// A question set as uploaded: header plus raw rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

impl Dataset {
    /// Reads a CSV whose first row is the header. Fields are trimmed.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, PipelineError> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let rows = reader.records().collect::<Result<Vec<_>, _>>()?;

        info!("Loaded dataset with {} rows and columns {:?}", rows.len(), headers.iter().collect::<Vec<_>>());
        Ok(Self { headers, rows })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let file = File::open(path.as_ref()).map_err(csv::Error::from)?;
        Self::from_reader(file)
    }

    /// Builds a dataset from typed records, with the three required columns.
    pub fn from_records(records: &[QuestionRecord]) -> Self {
        let headers = StringRecord::from(vec![TOPIC_COLUMN, MARKS_COLUMN, REPETITION_COLUMN]);
        let rows = records
            .iter()
            .map(|r| {
                StringRecord::from(vec![
                    r.topic.clone(),
                    r.marks.to_string(),
                    r.repetition_count.to_string(),
                ])
            })
            .collect();
        Self { headers, rows }
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.headers.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn require_column(&self, name: &str) -> Result<usize, PipelineError> {
        self.column_index(name)
            .ok_or_else(|| PipelineError::MissingColumn(name.to_string()))
    }

    /// Values of a column, in row order. Missing cells read as empty.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row.get(index).unwrap_or("")).collect())
    }

    /// Validates the required columns and parses every row.
    ///
    /// `Topic` is checked first, then `Marks` and `RepetitionCount`. Any
    /// missing column fails the whole dataset.
    ///
    /// # Errors
    /// - `MissingColumn` for the first required column that is absent
    /// - `InvalidRecord` for a blank topic, marks outside `marks_range`, or a
    ///   repetition count that is not a non-negative integer
    pub fn question_records(&self, marks_range: RangeInclusive<u32>) -> Result<Vec<QuestionRecord>, PipelineError> {
        self.parse_records(marks_range, false)
    }

    /// Like [`Dataset::question_records`], but rows with a blank topic are
    /// skipped instead of rejected. Used to build the topic vocabulary for
    /// single-question requests, where untagged history rows carry no topic
    /// to match.
    pub fn topic_records(&self, marks_range: RangeInclusive<u32>) -> Result<Vec<QuestionRecord>, PipelineError> {
        let records = self.parse_records(marks_range, true)?;
        if records.len() < self.rows.len() {
            debug!("Skipped {} rows with a blank {}", self.rows.len() - records.len(), TOPIC_COLUMN);
        }
        Ok(records)
    }

    fn parse_records(
        &self,
        marks_range: RangeInclusive<u32>,
        skip_blank_topics: bool,
    ) -> Result<Vec<QuestionRecord>, PipelineError> {
        let topic_idx = self.require_column(TOPIC_COLUMN)?;
        let marks_idx = self.require_column(MARKS_COLUMN)?;
        let repetition_idx = self.require_column(REPETITION_COLUMN)?;

        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| !(skip_blank_topics && row.get(topic_idx).unwrap_or("").is_empty()))
            .map(|(i, row)| {
                let row_number = i + 1;
                let invalid = |reason: String| PipelineError::InvalidRecord { row: row_number, reason };

                let topic = row.get(topic_idx).unwrap_or("");
                if topic.is_empty() {
                    return Err(invalid(format!("{} is empty", TOPIC_COLUMN)));
                }

                let marks_raw = row.get(marks_idx).unwrap_or("");
                let marks = marks_raw
                    .parse::<u32>()
                    .ok()
                    .filter(|m| marks_range.contains(m))
                    .ok_or_else(|| invalid(format!(
                        "{} must be an integer between {} and {}, got '{}'",
                        MARKS_COLUMN, marks_range.start(), marks_range.end(), marks_raw
                    )))?;

                let repetition_raw = row.get(repetition_idx).unwrap_or("");
                let repetition_count = repetition_raw
                    .parse::<u32>()
                    .map_err(|_| invalid(format!(
                        "{} must be a non-negative integer, got '{}'",
                        REPETITION_COLUMN, repetition_raw
                    )))?;

                Ok(QuestionRecord::new(topic, marks, repetition_count))
            })
            .collect()
    }

    /// Returns a copy with a `Prediction` column holding `1`/`0` per row, or an
    /// empty cell where no prediction was made. An existing `Prediction`
    /// column is overwritten.
    pub fn with_predictions(&self, predictions: &[Option<AppearanceLabel>]) -> Dataset {
        let existing = self.column_index(PREDICTION_COLUMN);

        let mut headers = self.headers.clone();
        if existing.is_none() {
            headers.push_field(PREDICTION_COLUMN);
        }

        let rows = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let cell = predictions
                    .get(i)
                    .copied()
                    .flatten()
                    .map(|label| label.class().to_string())
                    .unwrap_or_default();
                match existing {
                    Some(index) => row
                        .iter()
                        .enumerate()
                        .map(|(j, field)| if j == index { cell.as_str() } else { field })
                        .collect::<StringRecord>(),
                    None => {
                        let mut row = row.clone();
                        row.push_field(&cell);
                        row
                    }
                }
            })
            .collect();

        Dataset { headers, rows }
    }

    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), PipelineError> {
        let mut writer = WriterBuilder::new().flexible(true).from_writer(writer);
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}
