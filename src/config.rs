use crate::generator::QuizOptions;
use crate::types::MAX_SESSION_QUESTIONS;

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub log_level: String,
    pub max_questions: usize,
    pub quiz_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: "tuvung.db".to_string(),
            log_level: "info".to_string(),
            max_questions: MAX_SESSION_QUESTIONS,
            quiz_seed: None,
        }
    }
}

impl Config {
    /// Read settings from the environment; call `dotenvy::dotenv()` first to pick up `.env`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let db_path = lookup("TUVUNG_DB_PATH")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(defaults.db_path);

        let log_level = lookup("RUST_LOG").unwrap_or(defaults.log_level);

        let max_questions = lookup("TUVUNG_MAX_QUESTIONS")
            .and_then(|value| value.trim().parse::<usize>().ok())
            .filter(|&n| n >= 1)
            .map(|n| n.min(MAX_SESSION_QUESTIONS))
            .unwrap_or(defaults.max_questions);

        let quiz_seed = lookup("TUVUNG_QUIZ_SEED").and_then(|value| value.trim().parse::<u64>().ok());

        Self {
            db_path,
            log_level,
            max_questions,
            quiz_seed,
        }
    }

    pub fn quiz_options(&self) -> QuizOptions {
        QuizOptions {
            max_questions: self.max_questions,
            seed: self.quiz_seed,
        }
    }
}
