//! Quiz Question Generator
//!
//! Builds the fixed question list of a session from a snapshot of the word pool.
//!
//! Multiple choice:
//! - shuffle the pool, keep at most `max_questions` words
//! - per word, draw 3 distractors from the rest of the corpus without replacement
//! - options are `"(type) meaning"` strings in random order
//!
//! Writing (fill-in-the-blank):
//! - same word selection
//! - reveal index 0, every space, plus `max(1, ceil(L/5))` random positions
//! - graded by case-insensitive equality, with per-letter matches for highlighting
//!
//! All randomness comes from an owned `ChaCha8Rng`, so a fixed seed gives a
//! reproducible session.

use std::collections::HashSet;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{QuizError, Requirement};
use crate::types::{
    QuizMode, VocabularyRecord, DISTRACTOR_COUNT, MAX_SESSION_QUESTIONS, MIN_MULTIPLE_CHOICE_WORDS,
    MIN_WRITING_WORDS, OPTION_COUNT,
};

/// Placeholder shown for a blank position
pub const BLANK: char = '_';

// ==================== Options ====================

/// Generator options
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuizOptions {
    /// Cap on questions per session, clamped to `1..=10` (default: 10)
    pub max_questions: usize,
    /// Random seed for reproducibility (optional)
    pub seed: Option<u64>,
}

impl Default for QuizOptions {
    fn default() -> Self {
        Self {
            max_questions: MAX_SESSION_QUESTIONS,
            seed: None,
        }
    }
}

// ==================== Questions ====================

/// Positions pre-filled for a writing question
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealScaffold {
    /// Word length in characters
    pub length: usize,
    /// Revealed character indices, ascending
    pub revealed: Vec<usize>,
}

impl RevealScaffold {
    pub fn is_revealed(&self, index: usize) -> bool {
        self.revealed.binary_search(&index).is_ok()
    }

    pub fn blank_count(&self) -> usize {
        self.length - self.revealed.len()
    }

    /// Render `word` with every hidden position replaced by [`BLANK`]
    pub fn masked(&self, word: &str) -> String {
        word.chars()
            .enumerate()
            .map(|(i, c)| if self.is_revealed(i) { c } else { BLANK })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice {
        options: Vec<String>,
    },
    Writing {
        /// `"(type) meaning"` shown in place of the word
        clue: String,
        scaffold: RevealScaffold,
    },
}

/// One generated question, read-only once built
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    /// Lookup key of the record this question came from
    pub source_record_id: String,
    /// The word being tested
    pub prompt: String,
    pub correct_answer: String,
    pub kind: QuestionKind,
}

/// Outcome of grading one answer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub correct: bool,
    /// Writing only: one entry per target character
    pub letter_matches: Option<Vec<bool>>,
}

impl QuizQuestion {
    pub fn mode(&self) -> QuizMode {
        match self.kind {
            QuestionKind::MultipleChoice { .. } => QuizMode::MultipleChoice,
            QuestionKind::Writing { .. } => QuizMode::Writing,
        }
    }

    pub fn options(&self) -> Option<&[String]> {
        match &self.kind {
            QuestionKind::MultipleChoice { options } => Some(options),
            QuestionKind::Writing { .. } => None,
        }
    }

    pub fn scaffold(&self) -> Option<&RevealScaffold> {
        match &self.kind {
            QuestionKind::Writing { scaffold, .. } => Some(scaffold),
            QuestionKind::MultipleChoice { .. } => None,
        }
    }

    pub fn grade(&self, answer: &str) -> Grade {
        match self.kind {
            QuestionKind::MultipleChoice { .. } => Grade {
                correct: answer == self.correct_answer,
                letter_matches: None,
            },
            QuestionKind::Writing { .. } => {
                let (correct, matches) = grade_writing(&self.correct_answer, answer);
                Grade {
                    correct,
                    letter_matches: Some(matches),
                }
            }
        }
    }
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Case-insensitive full-string check plus per-letter matches against `target`
pub fn grade_writing(target: &str, answer: &str) -> (bool, Vec<bool>) {
    let answer_chars: Vec<char> = answer.chars().collect();
    let matches: Vec<bool> = target
        .chars()
        .enumerate()
        .map(|(i, t)| answer_chars.get(i).is_some_and(|&a| chars_eq_ignore_case(a, t)))
        .collect();

    let correct = answer.to_lowercase() == target.to_lowercase();
    (correct, matches)
}

// ==================== Generator ====================

#[derive(Debug)]
pub struct QuestionGenerator {
    rng: ChaCha8Rng,
    max_questions: usize,
}

impl QuestionGenerator {
    pub fn new() -> Self {
        Self::with_options(QuizOptions::default())
    }

    pub fn with_options(options: QuizOptions) -> Self {
        let seed = options.seed.unwrap_or_else(|| {
            // Use system time as default seed
            use std::time::{SystemTime, UNIX_EPOCH};
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(42)
        });

        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            max_questions: options.max_questions.clamp(1, MAX_SESSION_QUESTIONS),
        }
    }

    /// Create a generator with a specific seed (for testing)
    pub fn with_seed(seed: u64) -> Self {
        Self::with_options(QuizOptions {
            seed: Some(seed),
            ..QuizOptions::default()
        })
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    pub fn max_questions(&self) -> usize {
        self.max_questions
    }

    /// Validate that a session in `mode` can be built from `pool` and `corpus`.
    ///
    /// Multiple choice needs 4 pool words and 4 distinct rendered meanings
    /// in the corpus, so every word has 3 distractors that differ from its
    /// own answer and from each other.
    pub fn check_preconditions(
        pool: &[VocabularyRecord],
        corpus: &[VocabularyRecord],
        mode: QuizMode,
    ) -> Result<(), QuizError> {
        match mode {
            QuizMode::MultipleChoice => {
                if pool.len() < MIN_MULTIPLE_CHOICE_WORDS {
                    return Err(QuizError::InsufficientData {
                        required: MIN_MULTIPLE_CHOICE_WORDS,
                        available: pool.len(),
                        requirement: Requirement::PoolWords,
                    });
                }
                let distinct = distinct_meanings(corpus);
                if distinct < OPTION_COUNT {
                    return Err(QuizError::InsufficientData {
                        required: OPTION_COUNT,
                        available: distinct,
                        requirement: Requirement::DistinctMeanings,
                    });
                }
            }
            QuizMode::Writing => {
                if pool.len() < MIN_WRITING_WORDS {
                    return Err(QuizError::InsufficientData {
                        required: MIN_WRITING_WORDS,
                        available: pool.len(),
                        requirement: Requirement::PoolWords,
                    });
                }
            }
        }
        Ok(())
    }

    /// Build the ordered question list for one session
    pub fn generate(
        &mut self,
        pool: &[VocabularyRecord],
        corpus: &[VocabularyRecord],
        mode: QuizMode,
    ) -> Result<Vec<QuizQuestion>, QuizError> {
        Self::check_preconditions(pool, corpus, mode)?;

        let selected = self.select_words(pool);
        selected
            .into_iter()
            .map(|word| match mode {
                QuizMode::MultipleChoice => self.multiple_choice(word, corpus),
                QuizMode::Writing => Ok(self.writing(word)),
            })
            .collect()
    }

    /// Shuffle the pool and keep at most `max_questions` words
    fn select_words<'a>(&mut self, pool: &'a [VocabularyRecord]) -> Vec<&'a VocabularyRecord> {
        let mut words: Vec<&VocabularyRecord> = pool.iter().collect();
        words.shuffle(&mut self.rng);
        words.truncate(self.max_questions);
        words
    }

    fn multiple_choice(
        &mut self,
        word: &VocabularyRecord,
        corpus: &[VocabularyRecord],
    ) -> Result<QuizQuestion, QuizError> {
        let correct_answer = word.rendered_meaning();

        // Identical renderings collapse to one candidate so no option repeats
        let mut seen = HashSet::new();
        let candidates: Vec<String> = corpus
            .iter()
            .filter(|r| r.id != word.id)
            .map(VocabularyRecord::rendered_meaning)
            .filter(|rendered| *rendered != correct_answer && seen.insert(rendered.clone()))
            .collect();

        if candidates.len() < DISTRACTOR_COUNT {
            return Err(QuizError::InsufficientData {
                required: OPTION_COUNT,
                available: candidates.len() + 1,
                requirement: Requirement::DistinctMeanings,
            });
        }

        let mut options: Vec<String> = candidates
            .choose_multiple(&mut self.rng, DISTRACTOR_COUNT)
            .cloned()
            .collect();
        options.push(correct_answer.clone());
        options.shuffle(&mut self.rng);

        Ok(QuizQuestion {
            source_record_id: word.id.clone(),
            prompt: word.word.clone(),
            correct_answer,
            kind: QuestionKind::MultipleChoice { options },
        })
    }

    fn writing(&mut self, word: &VocabularyRecord) -> QuizQuestion {
        let scaffold = self.reveal_scaffold(&word.word);
        QuizQuestion {
            source_record_id: word.id.clone(),
            prompt: word.word.clone(),
            correct_answer: word.word.clone(),
            kind: QuestionKind::Writing {
                clue: word.rendered_meaning(),
                scaffold,
            },
        }
    }

    /// Reveal index 0, every space, and `max(1, ceil(L/5))` more random
    /// positions (fewer when not enough hidden positions remain).
    pub fn reveal_scaffold(&mut self, word: &str) -> RevealScaffold {
        let chars: Vec<char> = word.chars().collect();
        let length = chars.len();
        if length == 0 {
            return RevealScaffold {
                length,
                revealed: Vec::new(),
            };
        }

        let mut revealed: Vec<usize> = chars
            .iter()
            .enumerate()
            .filter(|&(i, c)| i == 0 || c.is_whitespace())
            .map(|(i, _)| i)
            .collect();

        let hidden: Vec<usize> = (0..length).filter(|i| !revealed.contains(i)).collect();
        let extra = length.div_ceil(5).max(1);
        revealed.extend(hidden.choose_multiple(&mut self.rng, extra));
        revealed.sort_unstable();

        RevealScaffold { length, revealed }
    }
}

impl Default for QuestionGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn distinct_meanings(corpus: &[VocabularyRecord]) -> usize {
    corpus
        .iter()
        .map(VocabularyRecord::rendered_meaning)
        .collect::<HashSet<_>>()
        .len()
}

// ==================== Unit Tests ====================
