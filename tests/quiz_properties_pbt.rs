//! Property-Based Tests for the quiz core
//!
//! Tests the following invariants:
//! - Ladder: one answer moves a record at most one rung, clamped at both ends
//! - Multiple choice: 4 unique options, exactly one correct, `min(10, n)` questions
//! - Reveal scaffold: index 0 and every space revealed, enough extra reveals
//! - Tally: answered count tracks the cursor through a whole session

mod common;

use proptest::prelude::*;

use common::{current_answer, memory_controller};
use tuvung_core::{
    next_status, QuestionGenerator, QuizMode, SessionState, Status, MAX_SESSION_QUESTIONS,
};

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_status() -> impl Strategy<Value = Status> {
    prop_oneof![
        Just(Status::ToLearn),
        Just(Status::Learning),
        Just(Status::Mastered),
    ]
}

fn arb_mode() -> impl Strategy<Value = QuizMode> {
    prop_oneof![Just(QuizMode::MultipleChoice), Just(QuizMode::Writing)]
}

fn rung(status: Status) -> i32 {
    match status {
        Status::ToLearn => 0,
        Status::Learning => 1,
        Status::Mastered => 2,
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn ladder_moves_one_rung_clamped(status in arb_status(), correct in any::<bool>(), mode in arb_mode()) {
        let step = if correct { 1 } else { -1 };
        let expected = (rung(status) + step).clamp(0, 2);
        prop_assert_eq!(rung(next_status(status, correct, mode)), expected);
    }

    #[test]
    fn multiple_choice_options_are_well_formed(n in 4usize..24, seed in any::<u64>()) {
        let mut controller = memory_controller(n, Status::ToLearn);
        controller.start(Status::ToLearn, QuizMode::MultipleChoice).unwrap();
        let session = controller.session().unwrap();

        prop_assert_eq!(session.len(), n.min(MAX_SESSION_QUESTIONS));

        let mut generator = QuestionGenerator::with_seed(seed);
        let corpus = controller.store().list().unwrap();
        let questions = generator.generate(&corpus, &corpus, QuizMode::MultipleChoice).unwrap();

        for question in session.items().iter().chain(questions.iter()) {
            let options = question.options().unwrap();
            prop_assert_eq!(options.len(), 4);
            prop_assert_eq!(options.iter().filter(|o| **o == question.correct_answer).count(), 1);

            let mut unique = options.to_vec();
            unique.sort();
            unique.dedup();
            prop_assert_eq!(unique.len(), 4);
        }
    }

    #[test]
    fn reveal_scaffold_covers_first_letter_and_spaces(word in "[a-z]{1,8}( [a-z]{1,8}){0,3}", seed in any::<u64>()) {
        let mut generator = QuestionGenerator::with_seed(seed);
        let scaffold = generator.reveal_scaffold(&word);

        prop_assert_eq!(scaffold.length, word.chars().count());
        prop_assert!(scaffold.is_revealed(0));
        for (i, c) in word.chars().enumerate() {
            if c == ' ' {
                prop_assert!(scaffold.is_revealed(i));
            }
        }
        prop_assert!(scaffold.revealed.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(scaffold.revealed.iter().all(|&i| i < scaffold.length));
        prop_assert_eq!(scaffold.masked(&word).chars().count(), scaffold.length);
    }

    #[test]
    fn reveal_count_without_spaces(word in "[a-z]{1,30}", seed in any::<u64>()) {
        let mut generator = QuestionGenerator::with_seed(seed);
        let scaffold = generator.reveal_scaffold(&word);
        let length = word.len();

        prop_assert!(scaffold.revealed.len() >= length.div_ceil(5));
        if length > 1 {
            prop_assert!(scaffold.revealed.len() >= 2);
        }
    }

    #[test]
    fn tally_tracks_cursor(n in 1usize..14, answers in proptest::collection::vec(any::<bool>(), 14)) {
        let mut controller = memory_controller(n, Status::ToLearn);
        controller.start(Status::ToLearn, QuizMode::Writing).unwrap();

        let mut step = 0;
        while controller.state() == SessionState::InProgress {
            let answer = if answers[step] { current_answer(&controller) } else { "?".to_string() };
            controller.submit_answer(&answer).unwrap();

            // A second submit is rejected and changes nothing
            let before = controller.session().unwrap().tally();
            prop_assert!(controller.submit_answer(&answer).is_err());
            prop_assert_eq!(controller.session().unwrap().tally(), before);

            controller.advance().unwrap();
            step += 1;

            let session = controller.session().unwrap();
            prop_assert_eq!(session.tally().answered(), session.current_index());
        }

        let result = controller.result().unwrap();
        let expected_correct = answers[..step].iter().filter(|&&a| a).count();
        prop_assert_eq!(result.total, n.min(MAX_SESSION_QUESTIONS));
        prop_assert_eq!(result.correct, expected_correct);
        prop_assert_eq!(result.correct + result.incorrect, result.total);
    }
}
