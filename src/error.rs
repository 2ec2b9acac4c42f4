use thiserror::Error;

use crate::session::SessionState;
use crate::storage::StorageError;

/// Which precondition a session start failed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Words in the selected status pool
    PoolWords,
    /// Distinct rendered meanings across the whole corpus (distractor source)
    DistinctMeanings,
}

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("need at least {required} words, found {available} ({requirement:?})")]
    InsufficientData {
        required: usize,
        available: usize,
        requirement: Requirement,
    },

    #[error("{operation} is not valid in state {state:?}: {reason}")]
    InvalidStateTransition {
        operation: &'static str,
        state: SessionState,
        reason: &'static str,
    },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl QuizError {
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, QuizError::InsufficientData { .. })
    }

    pub fn is_invalid_state(&self) -> bool {
        matches!(self, QuizError::InvalidStateTransition { .. })
    }
}
