//! # tuvung-core - 词汇学习核心库
//!
//! 本 crate 提供词汇本与测验流程的纯 Rust 实现:
//!
//! - **Mastery Ladder** - 根据答题结果在 `to_learn → learning → mastered` 间升降
//! - **Question Generator** - 生成选择题与填空题，随机源可注入
//! - **Session Controller** - 测验会话的状态机、计分与状态回写
//! - **Storage** - 键值存储抽象，内存 / SQLite 两种后端
//!
//! ## 模块结构
//!
//! - [`mastery`] - 掌握度阶梯 (单步升降)
//! - [`generator`] - 题目生成 (干扰项、填空提示、评分)
//! - [`session`] - 测验会话控制器与事件
//! - [`board`] - 按状态分栏的词汇看板
//! - [`storage`] - 词汇、段落历史的本地持久化
//! - [`config`] - 环境变量配置
//! - [`logging`] - tracing 日志初始化
//! - [`types`] - 公共类型和常量
//!
//! ## 使用示例
//!
//! ```rust
//! use tuvung_core::{
//!     MemoryStore, NewVocabulary, PartOfSpeech, QuestionGenerator, QuizMode,
//!     QuizSessionController, SessionState, Status, VocabularyStore,
//! };
//!
//! let store = VocabularyStore::new(MemoryStore::new());
//! store.add(NewVocabulary::new("apple", PartOfSpeech::Noun, "quả táo")).unwrap();
//!
//! let mut controller = QuizSessionController::with_generator(store, QuestionGenerator::with_seed(7));
//! controller.start(Status::ToLearn, QuizMode::Writing).unwrap();
//!
//! let result = controller.submit_answer("Apple").unwrap();
//! assert!(result.correct);
//! assert_eq!(result.new_status, Some(Status::Learning));
//!
//! controller.advance().unwrap();
//! assert_eq!(controller.state(), SessionState::Completed);
//! ```

// ============================================================================
// 模块声明
// ============================================================================

pub mod board;
pub mod config;
pub mod error;
pub mod generator;
pub mod logging;
pub mod mastery;
pub mod session;
pub mod storage;
pub mod types;

// ============================================================================
// 重新导出
// ============================================================================

/// 重新导出所有公共类型
pub use types::*;

pub use board::{move_record, Column, MoveOutcome, StatusBoard};
pub use config::Config;
pub use error::{QuizError, Requirement};
pub use generator::{grade_writing, Grade, QuestionGenerator, QuestionKind, QuizOptions, QuizQuestion, RevealScaffold};
pub use mastery::next_status;
pub use session::{
    AnsweredQuestionResult, QuizEvent, QuizObserver, QuizResult, QuizSession, QuizSessionController, SessionState,
    Tally,
};
pub use storage::{
    HistoryKind, HistoryStore, KeyValueStore, MemoryStore, SqliteStore, StorageError, StorageResult, VocabularyStore,
};
