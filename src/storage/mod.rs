//! 本地存储模块
//!
//! 提供词汇记录的本地持久化，支持：
//! - 键值存储抽象（内存 / SQLite 两种后端）
//! - 词汇记录的 CRUD 操作
//! - 阅读 / 写作练习的段落历史

// ============================================================
// 子模块声明
// ============================================================

pub mod history;
pub mod memory;
pub mod migrations;
pub mod sqlite;
pub mod vocabulary;

// ============================================================
// 重新导出主要类型
// ============================================================

pub use history::{HistoryKind, HistoryStore};
pub use memory::MemoryStore;
pub use migrations::run_migrations;
pub use sqlite::SqliteStore;
pub use vocabulary::{VocabularyStore, VOCABULARY_KEY};

use thiserror::Error;

// ============================================================
// 错误类型定义
// ============================================================

/// 存储模块错误类型
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("数据库错误: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("迁移错误: {0}")]
    Migration(String),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("数据校验失败: {0}")]
    Validation(String),

    #[error("数据未找到: {0}")]
    NotFound(String),

    #[error("锁获取失败: {0}")]
    LockError(String),

    #[error("存储不可用: {0}")]
    Unavailable(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

// ============================================================
// KeyValueStore - 键值存储抽象
// ============================================================

/// 键值存储
///
/// 值为 JSON 文本，整体覆盖写入，不提供事务保证（最后写入者胜出）。
pub trait KeyValueStore: Send + Sync {
    /// 读取键对应的值，不存在时返回 `None`
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// 写入（覆盖）键对应的值
    fn put(&self, key: &str, value: &str) -> StorageResult<()>;

    /// 删除键，返回是否删除了记录
    fn remove(&self, key: &str) -> StorageResult<bool>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).put(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<bool> {
        (**self).remove(key)
    }
}

/// 读取 JSON 列表，不存在时返回空列表
pub(crate) fn read_json_list<T, S>(store: &S, key: &str) -> StorageResult<Vec<T>>
where
    T: serde::de::DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match store.get(key)? {
        Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
        _ => Ok(Vec::new()),
    }
}

/// 整体覆盖写入 JSON 列表
pub(crate) fn write_json_list<T, S>(store: &S, key: &str, items: &[T]) -> StorageResult<()>
where
    T: serde::Serialize,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(items)?;
    store.put(key, &raw)
}

// ============================================================
// 测试
// ============================================================
