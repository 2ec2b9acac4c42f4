//! Common Types and Constants
//!
//! Shared data structures used by the store, the generator and the session controller.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ==================== Constants ====================

/// Maximum number of questions in one session
pub const MAX_SESSION_QUESTIONS: usize = 10;

/// Number of options shown for a multiple-choice question
pub const OPTION_COUNT: usize = 4;

/// Distractors per multiple-choice question
pub const DISTRACTOR_COUNT: usize = OPTION_COUNT - 1;

/// Minimum pool size for a multiple-choice session
pub const MIN_MULTIPLE_CHOICE_WORDS: usize = 4;

/// Minimum pool size for a writing session
pub const MIN_WRITING_WORDS: usize = 1;

// ==================== Status ====================

/// Position of a record on the mastery ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    ToLearn,
    Learning,
    Mastered,
}

impl Status {
    /// All statuses in ladder order
    pub const ALL: [Status; 3] = [Status::ToLearn, Status::Learning, Status::Mastered];

    pub const fn as_str(self) -> &'static str {
        match self {
            Status::ToLearn => "to_learn",
            Status::Learning => "learning",
            Status::Mastered => "mastered",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "to_learn" => Some(Status::ToLearn),
            "learning" => Some(Status::Learning),
            "mastered" => Some(Status::Mastered),
            _ => None,
        }
    }

    /// Display label (Vietnamese)
    pub const fn label(self) -> &'static str {
        match self {
            Status::ToLearn => "Cần học",
            Status::Learning => "Đang học",
            Status::Mastered => "Đã thuộc",
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::ToLearn
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored data written by older builds may carry a missing or unknown status.
/// Those records belong in the `to_learn` column.
fn deserialize_status_lenient<'de, D>(deserializer: D) -> Result<Status, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Status::parse).unwrap_or_default())
}

// ==================== Part of speech ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Preposition,
    Conjunction,
    Pronoun,
    Phrase,
}

impl PartOfSpeech {
    pub const ALL: [PartOfSpeech; 8] = [
        PartOfSpeech::Noun,
        PartOfSpeech::Verb,
        PartOfSpeech::Adjective,
        PartOfSpeech::Adverb,
        PartOfSpeech::Preposition,
        PartOfSpeech::Conjunction,
        PartOfSpeech::Pronoun,
        PartOfSpeech::Phrase,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            PartOfSpeech::Noun => "noun",
            PartOfSpeech::Verb => "verb",
            PartOfSpeech::Adjective => "adjective",
            PartOfSpeech::Adverb => "adverb",
            PartOfSpeech::Preposition => "preposition",
            PartOfSpeech::Conjunction => "conjunction",
            PartOfSpeech::Pronoun => "pronoun",
            PartOfSpeech::Phrase => "phrase",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|pos| pos.as_str() == s)
    }

    pub const fn label(self) -> &'static str {
        match self {
            PartOfSpeech::Noun => "Danh từ (Noun)",
            PartOfSpeech::Verb => "Động từ (Verb)",
            PartOfSpeech::Adjective => "Tính từ (Adjective)",
            PartOfSpeech::Adverb => "Trạng từ (Adverb)",
            PartOfSpeech::Preposition => "Giới từ (Preposition)",
            PartOfSpeech::Conjunction => "Liên từ (Conjunction)",
            PartOfSpeech::Pronoun => "Đại từ (Pronoun)",
            PartOfSpeech::Phrase => "Cụm từ (Phrase)",
        }
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn fallback_part_of_speech() -> PartOfSpeech {
    PartOfSpeech::Phrase
}

/// Older data stores the part of speech as free text. Known tags are matched
/// case-insensitively; anything else is read as `phrase` so one odd record
/// cannot make the whole list unreadable.
fn deserialize_part_of_speech_lenient<'de, D>(deserializer: D) -> Result<PartOfSpeech, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    let parsed = raw
        .as_deref()
        .and_then(|tag| PartOfSpeech::parse(&tag.trim().to_lowercase()));
    if parsed.is_none() {
        tracing::warn!(tag = ?raw, "unknown part of speech, reading as phrase");
    }
    Ok(parsed.unwrap_or_else(fallback_part_of_speech))
}

// ==================== Quiz mode ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizMode {
    MultipleChoice,
    Writing,
}

impl QuizMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            QuizMode::MultipleChoice => "multiple_choice",
            QuizMode::Writing => "writing",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "multiple_choice" => Some(QuizMode::MultipleChoice),
            "writing" => Some(QuizMode::Writing),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            QuizMode::MultipleChoice => "Trắc nghiệm",
            QuizMode::Writing => "Viết",
        }
    }

    /// Smallest pool a session in this mode can start with
    pub const fn min_pool_size(self) -> usize {
        match self {
            QuizMode::MultipleChoice => MIN_MULTIPLE_CHOICE_WORDS,
            QuizMode::Writing => MIN_WRITING_WORDS,
        }
    }
}

impl fmt::Display for QuizMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==================== Vocabulary ====================

/// One learnable word with its metadata and mastery status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyRecord {
    pub id: String,
    pub word: String,
    #[serde(default = "fallback_part_of_speech", deserialize_with = "deserialize_part_of_speech_lenient")]
    pub part_of_speech: PartOfSpeech,
    pub meaning: String,
    #[serde(default, deserialize_with = "deserialize_status_lenient")]
    pub status: Status,
    pub created_at: DateTime<Utc>,
}

impl VocabularyRecord {
    /// Rendered `"(type) meaning"` string, used both as the multiple-choice
    /// answer and as the writing clue. The part-of-speech prefix keeps
    /// homographs apart.
    pub fn rendered_meaning(&self) -> String {
        format!("({}) {}", self.part_of_speech, self.meaning)
    }

    pub fn with_status(&self, status: Status) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }
}

/// Form input for a new record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVocabulary {
    pub word: String,
    pub part_of_speech: PartOfSpeech,
    pub meaning: String,
}

impl NewVocabulary {
    pub fn new(word: impl Into<String>, part_of_speech: PartOfSpeech, meaning: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            part_of_speech,
            meaning: meaning.into(),
        }
    }

    /// Returns the first failing field message, if any
    pub fn validate(&self) -> Result<(), String> {
        if self.word.trim().is_empty() {
            return Err("word must not be empty".to_string());
        }
        if self.meaning.trim().is_empty() {
            return Err("meaning must not be empty".to_string());
        }
        Ok(())
    }
}

// ==================== Unit Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json(status: &str) -> String {
        format!(
            r#"{{"id":"1","word":"apple","partOfSpeech":"noun","meaning":"quả táo",{status}"createdAt":"2024-05-01T10:00:00Z"}}"#
        )
    }

    #[test]
    fn test_status_roundtrip_strings() {
        for status in Status::ALL {
            assert_eq!(Status::parse(status.as_str()), Some(status));
        }
        assert_eq!(Status::parse("done"), None);
    }

    #[test]
    fn test_record_deserializes_known_status() {
        let record: VocabularyRecord =
            serde_json::from_str(&sample_json(r#""status":"mastered","#)).unwrap();
        assert_eq!(record.status, Status::Mastered);
        assert_eq!(record.part_of_speech, PartOfSpeech::Noun);
    }

    #[test]
    fn test_record_unknown_status_reads_as_to_learn() {
        let record: VocabularyRecord =
            serde_json::from_str(&sample_json(r#""status":"archived","#)).unwrap();
        assert_eq!(record.status, Status::ToLearn);

        let missing: VocabularyRecord = serde_json::from_str(&sample_json("")).unwrap();
        assert_eq!(missing.status, Status::ToLearn);
    }

    #[test]
    fn test_record_unknown_part_of_speech_reads_as_phrase() {
        let json = sample_json("").replace(r#""partOfSpeech":"noun""#, r#""partOfSpeech":"article""#);
        let record: VocabularyRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record.part_of_speech, PartOfSpeech::Phrase);

        let json = sample_json("").replace(r#""partOfSpeech":"noun""#, r#""partOfSpeech":"Verb""#);
        let record: VocabularyRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record.part_of_speech, PartOfSpeech::Verb);

        let json = sample_json("").replace(r#""partOfSpeech":"noun","#, "");
        let record: VocabularyRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record.part_of_speech, PartOfSpeech::Phrase);
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record: VocabularyRecord =
            serde_json::from_str(&sample_json(r#""status":"learning","#)).unwrap();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["partOfSpeech"], "noun");
        assert_eq!(value["status"], "learning");
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn test_rendered_meaning() {
        let record: VocabularyRecord =
            serde_json::from_str(&sample_json(r#""status":"learning","#)).unwrap();
        assert_eq!(record.rendered_meaning(), "(noun) quả táo");
    }

    #[test]
    fn test_new_vocabulary_validation() {
        assert!(NewVocabulary::new("run", PartOfSpeech::Verb, "chạy").validate().is_ok());
        assert!(NewVocabulary::new("  ", PartOfSpeech::Verb, "chạy").validate().is_err());
        assert!(NewVocabulary::new("run", PartOfSpeech::Verb, "").validate().is_err());
    }

    #[test]
    fn test_part_of_speech_parse() {
        assert_eq!(PartOfSpeech::parse("phrase"), Some(PartOfSpeech::Phrase));
        assert_eq!(PartOfSpeech::parse("article"), None);
    }

    #[test]
    fn test_min_pool_size() {
        assert_eq!(QuizMode::MultipleChoice.min_pool_size(), 4);
        assert_eq!(QuizMode::Writing.min_pool_size(), 1);
    }
}
