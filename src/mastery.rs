//! Mastery ladder
//!
//! Decides the next status of a record after a single quiz answer:
//! - correct answers climb one rung: `to_learn -> learning -> mastered`
//! - incorrect answers drop one rung: `mastered -> learning -> to_learn`
//! - calls at the top (correct) or bottom (incorrect) rung are no-ops

use crate::types::{QuizMode, Status};

/// Next status after one answer.
///
/// Both quiz modes currently share the same ladder.
pub fn next_status(current: Status, was_correct: bool, _mode: QuizMode) -> Status {
    match (current, was_correct) {
        (Status::ToLearn, true) => Status::Learning,
        (Status::Learning, true) => Status::Mastered,
        (Status::Mastered, true) => Status::Mastered,
        (Status::Mastered, false) => Status::Learning,
        (Status::Learning, false) => Status::ToLearn,
        (Status::ToLearn, false) => Status::ToLearn,
    }
}

/// Whether an answer would move the record at all
pub fn changes_status(current: Status, was_correct: bool, mode: QuizMode) -> bool {
    next_status(current, was_correct, mode) != current
}
