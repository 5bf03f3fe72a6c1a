use regex::Regex;
use log::{debug, warn};

use super::error::TopicNotFound;
use crate::dataset::QuestionRecord;

/// A topic known to the loaded dataset, with its free-text pattern.
#[derive(Debug, Clone)]
struct VocabularyEntry {
    topic: String,
    folded: String,
    pattern: Option<Regex>,
}

/// The distinct topics of a loaded dataset.
///
/// Topics keep their original spelling and the order in which they first
/// appear in the dataset; free-text resolution scans them in that order.
/// Blank topics are ignored.
#[derive(Debug, Clone, Default)]
pub struct TopicVocabulary {
    entries: Vec<VocabularyEntry>,
}

impl TopicVocabulary {
    pub fn new<I, S>(topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries: Vec<VocabularyEntry> = Vec::new();
        for topic in topics {
            let topic = topic.as_ref().trim();
            if topic.is_empty() || entries.iter().any(|e| e.topic == topic) {
                continue;
            }
            entries.push(VocabularyEntry {
                topic: topic.to_string(),
                folded: topic.to_lowercase(),
                pattern: whole_word_pattern(topic),
            });
        }
        Self { entries }
    }

    pub fn from_records(records: &[QuestionRecord]) -> Self {
        Self::new(records.iter().map(|record| record.topic.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Topics in resolution order.
    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.topic.as_str())
    }

    pub fn contains(&self, topic: &str) -> bool {
        self.entries.iter().any(|e| e.topic == topic)
    }
}

/// Builds a case-insensitive pattern that only matches `topic` as a whole
/// word. Inner whitespace matches any whitespace run.
///
/// The topic must be delimited by a non-word character or the text edge on
/// both sides, so "for" does not match inside "before" while "C++" still
/// matches in "explain C++ classes".
fn whole_word_pattern(topic: &str) -> Option<Regex> {
    let body = topic
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    let source = format!(r"(?i)(?:^|\W){}(?:\W|$)", body);
    match Regex::new(&source) {
        Ok(pattern) => Some(pattern),
        Err(e) => {
            warn!("Topic '{}' cannot be matched in free text: {}", topic, e);
            None
        }
    }
}

/// Resolves the topic of a question against `vocabulary`.
///
/// An explicit topic takes precedence: it is trimmed and must name a
/// vocabulary entry, exactly or ignoring case, and the entry's own spelling is
/// returned. Otherwise the free text is scanned for the first vocabulary topic
/// that appears in it as a whole word.
///
/// # Errors
/// - `EmptyVocabulary` if there is nothing to match against
/// - `NotInVocabulary` if the explicit topic is unknown
/// - `NotInText` if no topic appears in the free text, or no input was given
pub fn resolve_topic(
    vocabulary: &TopicVocabulary,
    explicit_topic: Option<&str>,
    free_text: Option<&str>,
) -> Result<String, TopicNotFound> {
    if vocabulary.is_empty() {
        return Err(TopicNotFound::EmptyVocabulary);
    }

    if let Some(explicit) = explicit_topic {
        let wanted = explicit.trim();
        let folded = wanted.to_lowercase();
        return vocabulary
            .entries
            .iter()
            .find(|e| e.topic == wanted)
            .or_else(|| vocabulary.entries.iter().find(|e| e.folded == folded))
            .map(|e| e.topic.clone())
            .ok_or_else(|| TopicNotFound::NotInVocabulary(wanted.to_string()));
    }

    let text = free_text.unwrap_or_default();
    if text.trim().is_empty() {
        return Err(TopicNotFound::NotInText);
    }

    let matched = vocabulary
        .entries
        .iter()
        .find(|e| e.pattern.as_ref().is_some_and(|p| p.is_match(text)))
        .map(|e| e.topic.clone());

    match matched {
        Some(topic) => {
            debug!("Resolved topic '{}' from question text", topic);
            Ok(topic)
        }
        None => Err(TopicNotFound::NotInText),
    }
}
