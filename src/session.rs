//! Quiz Session Controller
//!
//! Owns the lifecycle of one quiz session:
//!
//! ```text
//! NotStarted --start--> InProgress --advance past last--> Completed
//!                           |
//!                           +--cancel--> Aborted
//! ```
//!
//! Each answer is graded, counted, and pushed through the mastery ladder.
//! The resulting status change is written to the store on a best-effort
//! basis: a failed write is reported but never stops the session.

use serde::{Deserialize, Serialize};

use crate::error::QuizError;
use crate::generator::{QuestionGenerator, QuizOptions, QuizQuestion};
use crate::mastery::next_status;
use crate::storage::{KeyValueStore, StorageError, VocabularyStore};
use crate::types::{QuizMode, Status, VocabularyRecord};

// ==================== State ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    NotStarted,
    InProgress,
    Completed,
    Aborted,
}

impl SessionState {
    pub const fn as_str(self) -> &'static str {
        match self {
            SessionState::NotStarted => "not_started",
            SessionState::InProgress => "in_progress",
            SessionState::Completed => "completed",
            SessionState::Aborted => "aborted",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, SessionState::Completed | SessionState::Aborted)
    }
}

/// Running answer counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub correct: usize,
    pub incorrect: usize,
}

impl Tally {
    pub fn answered(&self) -> usize {
        self.correct + self.incorrect
    }

    fn record(&mut self, correct: bool) {
        if correct {
            self.correct += 1;
        } else {
            self.incorrect += 1;
        }
    }
}

/// End-of-session report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
}

/// What happened when one answer was submitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnsweredQuestionResult {
    pub question_index: usize,
    pub source_record_id: String,
    pub submitted: String,
    pub correct_answer: String,
    pub correct: bool,
    /// Writing only: per-letter matches for highlighting
    pub letter_matches: Option<Vec<bool>>,
    /// Status read from the store before the transition, if the record was found
    pub previous_status: Option<Status>,
    /// Status written to the store; `None` when nothing changed or the write failed
    pub new_status: Option<Status>,
    /// Non-blocking notice when the status write failed
    pub persistence_error: Option<String>,
}

// ==================== Session ====================

/// One run of a quiz over a snapshot of records
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSession {
    mode: QuizMode,
    source_status: Status,
    items: Vec<QuizQuestion>,
    current_index: usize,
    tally: Tally,
    current_answer: Option<AnsweredQuestionResult>,
}

impl QuizSession {
    fn new(mode: QuizMode, source_status: Status, items: Vec<QuizQuestion>) -> Self {
        Self {
            mode,
            source_status,
            items,
            current_index: 0,
            tally: Tally::default(),
            current_answer: None,
        }
    }

    pub fn mode(&self) -> QuizMode {
        self.mode
    }

    pub fn source_status(&self) -> Status {
        self.source_status
    }

    pub fn items(&self) -> &[QuizQuestion] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn tally(&self) -> Tally {
        self.tally
    }

    /// `None` once the cursor has moved past the last question
    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.items.get(self.current_index)
    }

    /// Answer given to the current question, if any
    pub fn current_answer(&self) -> Option<&AnsweredQuestionResult> {
        self.current_answer.as_ref()
    }

    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 >= self.items.len()
    }

    fn result(&self) -> QuizResult {
        QuizResult {
            total: self.items.len(),
            correct: self.tally.correct,
            incorrect: self.tally.incorrect,
        }
    }

    fn check_invariants(&self) {
        debug_assert!(self.current_index <= self.items.len());
        debug_assert_eq!(
            self.tally.answered(),
            self.current_index + usize::from(self.current_answer.is_some())
        );
    }
}

// ==================== Events ====================

/// Notifications emitted to observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum QuizEvent {
    #[serde(rename = "SESSION_STARTED")]
    SessionStarted {
        mode: QuizMode,
        source_status: Status,
        total: usize,
    },

    #[serde(rename = "ANSWER_GRADED")]
    AnswerGraded {
        question_index: usize,
        record_id: String,
        correct: bool,
    },

    /// A record changed status; views listing records should refresh
    #[serde(rename = "RECORD_UPDATED")]
    RecordUpdated {
        record: VocabularyRecord,
        previous: Status,
    },

    #[serde(rename = "PERSISTENCE_FAILED")]
    PersistenceFailed { record_id: String, message: String },

    #[serde(rename = "SESSION_COMPLETED")]
    SessionCompleted(QuizResult),

    #[serde(rename = "SESSION_ABORTED")]
    SessionAborted { answered: usize, total: usize },
}

impl QuizEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            QuizEvent::SessionStarted { .. } => "SESSION_STARTED",
            QuizEvent::AnswerGraded { .. } => "ANSWER_GRADED",
            QuizEvent::RecordUpdated { .. } => "RECORD_UPDATED",
            QuizEvent::PersistenceFailed { .. } => "PERSISTENCE_FAILED",
            QuizEvent::SessionCompleted(_) => "SESSION_COMPLETED",
            QuizEvent::SessionAborted { .. } => "SESSION_ABORTED",
        }
    }
}

pub trait QuizObserver {
    fn notify(&mut self, event: &QuizEvent);
}

impl<F: FnMut(&QuizEvent)> QuizObserver for F {
    fn notify(&mut self, event: &QuizEvent) {
        self(event)
    }
}

// ==================== Controller ====================

/// Outcome of pushing one answer through the ladder and the store
struct Transition {
    previous: Option<Status>,
    written: Option<Status>,
    error: Option<String>,
}

pub struct QuizSessionController<S> {
    store: VocabularyStore<S>,
    generator: QuestionGenerator,
    state: SessionState,
    session: Option<QuizSession>,
    observers: Vec<Box<dyn QuizObserver>>,
}

impl<S: KeyValueStore> QuizSessionController<S> {
    pub fn new(store: VocabularyStore<S>, options: QuizOptions) -> Self {
        Self::with_generator(store, QuestionGenerator::with_options(options))
    }

    pub fn with_generator(store: VocabularyStore<S>, generator: QuestionGenerator) -> Self {
        Self {
            store,
            generator,
            state: SessionState::NotStarted,
            session: None,
            observers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, observer: impl QuizObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn session(&self) -> Option<&QuizSession> {
        self.session.as_ref()
    }

    pub fn store(&self) -> &VocabularyStore<S> {
        &self.store
    }

    fn notify(&mut self, event: QuizEvent) {
        for observer in self.observers.iter_mut() {
            observer.notify(&event);
        }
    }

    fn require(
        &self,
        expected: SessionState,
        operation: &'static str,
        reason: &'static str,
    ) -> Result<(), QuizError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(QuizError::InvalidStateTransition {
                operation,
                state: self.state,
                reason,
            })
        }
    }

    /// Start a session over every record currently in `source_status`.
    ///
    /// Allowed from any state except `InProgress`, so a finished or
    /// cancelled quiz can be restarted. Fails with `InsufficientData`
    /// without touching the store when the pool is too small.
    pub fn start(&mut self, source_status: Status, mode: QuizMode) -> Result<&QuizSession, QuizError> {
        if self.state == SessionState::InProgress {
            return Err(QuizError::InvalidStateTransition {
                operation: "start",
                state: self.state,
                reason: "a session is already in progress",
            });
        }

        let corpus = self.store.list()?;
        let pool: Vec<VocabularyRecord> = corpus
            .iter()
            .filter(|r| r.status == source_status)
            .cloned()
            .collect();

        let items = match self.generator.generate(&pool, &corpus, mode) {
            Ok(items) => items,
            Err(e) => {
                tracing::info!(status = %source_status, %mode, pool = pool.len(), error = %e, "quiz not started");
                return Err(e);
            }
        };

        let total = items.len();
        tracing::info!(status = %source_status, %mode, total, "quiz session started");

        self.session = Some(QuizSession::new(mode, source_status, items));
        self.state = SessionState::InProgress;
        self.notify(QuizEvent::SessionStarted {
            mode,
            source_status,
            total,
        });

        self.session
            .as_ref()
            .ok_or(QuizError::InvalidStateTransition {
                operation: "start",
                state: SessionState::NotStarted,
                reason: "session was not created",
            })
    }

    /// Grade `answer` against the current question.
    ///
    /// Only one answer per question is accepted; a second call before
    /// [`advance`](Self::advance) is rejected and leaves the tally untouched.
    pub fn submit_answer(&mut self, answer: &str) -> Result<AnsweredQuestionResult, QuizError> {
        self.require(SessionState::InProgress, "submit_answer", "no session in progress")?;

        let (question, index, mode) = {
            let session = self.session.as_ref().ok_or(QuizError::InvalidStateTransition {
                operation: "submit_answer",
                state: self.state,
                reason: "no session in progress",
            })?;
            if session.current_answer.is_some() {
                return Err(QuizError::InvalidStateTransition {
                    operation: "submit_answer",
                    state: self.state,
                    reason: "current question already answered",
                });
            }
            let question = session
                .current_question()
                .cloned()
                .ok_or(QuizError::InvalidStateTransition {
                    operation: "submit_answer",
                    state: self.state,
                    reason: "no current question",
                })?;
            (question, session.current_index, session.mode)
        };

        // Grade and count before touching the store
        let grade = question.grade(answer);
        if let Some(session) = self.session.as_mut() {
            session.tally.record(grade.correct);
        }
        tracing::debug!(index, record_id = %question.source_record_id, correct = grade.correct, "answer graded");

        let transition = self.apply_transition(&question.source_record_id, grade.correct, mode);

        let result = AnsweredQuestionResult {
            question_index: index,
            source_record_id: question.source_record_id.clone(),
            submitted: answer.to_string(),
            correct_answer: question.correct_answer.clone(),
            correct: grade.correct,
            letter_matches: grade.letter_matches,
            previous_status: transition.previous,
            new_status: transition.written,
            persistence_error: transition.error,
        };

        if let Some(session) = self.session.as_mut() {
            session.current_answer = Some(result.clone());
            session.check_invariants();
        }
        self.notify(QuizEvent::AnswerGraded {
            question_index: index,
            record_id: question.source_record_id,
            correct: grade.correct,
        });

        Ok(result)
    }

    /// Look up the record's current status, run the ladder, and write the
    /// new status when it changed. Store failures are reported, not raised.
    fn apply_transition(&mut self, record_id: &str, correct: bool, mode: QuizMode) -> Transition {
        let record = match self.store.get(record_id) {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::debug!(record_id, "record no longer exists, skipping status update");
                return Transition {
                    previous: None,
                    written: None,
                    error: None,
                };
            }
            Err(e) => return self.persistence_failed(record_id, None, e),
        };

        let previous = record.status;
        let next = next_status(previous, correct, mode);
        if next == previous {
            return Transition {
                previous: Some(previous),
                written: None,
                error: None,
            };
        }

        let updated = record.with_status(next);
        match self.store.update(&updated) {
            Ok(true) => {
                tracing::debug!(record_id, from = %previous, to = %next, "status updated");
                self.notify(QuizEvent::RecordUpdated {
                    record: updated,
                    previous,
                });
                Transition {
                    previous: Some(previous),
                    written: Some(next),
                    error: None,
                }
            }
            Ok(false) => Transition {
                previous: Some(previous),
                written: None,
                error: None,
            },
            Err(e) => self.persistence_failed(record_id, Some(previous), e),
        }
    }

    fn persistence_failed(
        &mut self,
        record_id: &str,
        previous: Option<Status>,
        error: StorageError,
    ) -> Transition {
        let message = error.to_string();
        tracing::warn!(record_id, error = %message, "failed to persist status change");
        self.notify(QuizEvent::PersistenceFailed {
            record_id: record_id.to_string(),
            message: message.clone(),
        });
        Transition {
            previous,
            written: None,
            error: Some(message),
        }
    }

    /// Move to the next question; completes the session after the last one
    pub fn advance(&mut self) -> Result<(), QuizError> {
        self.require(SessionState::InProgress, "advance", "no session in progress")?;

        let session = self.session.as_mut().ok_or(QuizError::InvalidStateTransition {
            operation: "advance",
            state: SessionState::InProgress,
            reason: "no session in progress",
        })?;
        if session.current_answer.is_none() {
            return Err(QuizError::InvalidStateTransition {
                operation: "advance",
                state: SessionState::InProgress,
                reason: "current question has not been answered",
            });
        }

        session.current_index += 1;
        session.current_answer = None;
        session.check_invariants();

        if session.current_index == session.items.len() {
            let result = session.result();
            self.state = SessionState::Completed;
            tracing::info!(
                total = result.total,
                correct = result.correct,
                incorrect = result.incorrect,
                "quiz session completed"
            );
            self.notify(QuizEvent::SessionCompleted(result));
        }

        Ok(())
    }

    /// Abandon the session; its tally is discarded
    pub fn cancel(&mut self) -> Result<(), QuizError> {
        self.require(SessionState::InProgress, "cancel", "no session in progress")?;

        let (answered, total) = self
            .session
            .take()
            .map(|s| (s.tally.answered(), s.items.len()))
            .unwrap_or_default();
        self.state = SessionState::Aborted;

        tracing::info!(answered, total, "quiz session cancelled");
        self.notify(QuizEvent::SessionAborted { answered, total });
        Ok(())
    }

    pub fn result(&self) -> Result<QuizResult, QuizError> {
        self.require(SessionState::Completed, "result", "session has not completed")?;
        self.session
            .as_ref()
            .map(QuizSession::result)
            .ok_or(QuizError::InvalidStateTransition {
                operation: "result",
                state: self.state,
                reason: "session has not completed",
            })
    }
}

// ==================== Unit Tests ====================
