//! 练习段落历史
//!
//! 阅读与写作练习各保存一份已生成段落的列表。

use crate::storage::{read_json_list, write_json_list, KeyValueStore, StorageResult};

/// 练习类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryKind {
    Reading,
    Writing,
}

impl HistoryKind {
    pub const fn key(self) -> &'static str {
        match self {
            HistoryKind::Reading => "reading_history_paragraph",
            HistoryKind::Writing => "writing_history_paragraph",
        }
    }
}

/// 段落历史仓库
#[derive(Debug, Clone)]
pub struct HistoryStore<S> {
    kv: S,
}

impl<S: KeyValueStore> HistoryStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    /// 获取历史段落，键不存在时返回空列表
    pub fn get(&self, kind: HistoryKind) -> StorageResult<Vec<String>> {
        read_json_list(&self.kv, kind.key())
    }

    /// 整体覆盖写入
    pub fn save(&self, kind: HistoryKind, paragraphs: &[String]) -> StorageResult<()> {
        write_json_list(&self.kv, kind.key(), paragraphs)
    }

    /// 追加一段，返回追加后的列表
    pub fn push(&self, kind: HistoryKind, paragraph: impl Into<String>) -> StorageResult<Vec<String>> {
        let mut paragraphs = self.get(kind)?;
        paragraphs.push(paragraph.into());
        self.save(kind, &paragraphs)?;
        Ok(paragraphs)
    }
}
