//! 词汇记录的 CRUD 操作
//!
//! 所有记录以 JSON 数组形式保存在单个键下，每次写入整体覆盖。

use chrono::Utc;
use uuid::Uuid;

use crate::storage::{read_json_list, write_json_list, KeyValueStore, StorageError, StorageResult};
use crate::types::{NewVocabulary, Status, VocabularyRecord};

/// 词汇列表所在的键
pub const VOCABULARY_KEY: &str = "vocabulary";

/// 词汇仓库
///
/// 包装任意 `KeyValueStore`，提供按 id 的增删改查。
#[derive(Debug, Clone)]
pub struct VocabularyStore<S> {
    kv: S,
}

impl<S: KeyValueStore> VocabularyStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    /// 底层键值存储
    pub fn kv(&self) -> &S {
        &self.kv
    }

    /// 获取所有记录，键不存在时返回空列表
    pub fn list(&self) -> StorageResult<Vec<VocabularyRecord>> {
        read_json_list(&self.kv, VOCABULARY_KEY)
    }

    /// 整体覆盖写入
    pub fn put_all(&self, records: &[VocabularyRecord]) -> StorageResult<()> {
        write_json_list(&self.kv, VOCABULARY_KEY, records)
    }

    /// 根据 ID 获取记录
    pub fn get(&self, id: &str) -> StorageResult<Option<VocabularyRecord>> {
        Ok(self.list()?.into_iter().find(|r| r.id == id))
    }

    /// 按状态筛选
    pub fn by_status(&self, status: Status) -> StorageResult<Vec<VocabularyRecord>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|r| r.status == status)
            .collect())
    }

    /// 新增记录
    ///
    /// 分配 id 与创建时间，初始状态为 `to_learn`。
    pub fn add(&self, input: NewVocabulary) -> StorageResult<VocabularyRecord> {
        input.validate().map_err(StorageError::Validation)?;

        let record = VocabularyRecord {
            id: Uuid::new_v4().to_string(),
            word: input.word.trim().to_string(),
            part_of_speech: input.part_of_speech,
            meaning: input.meaning.trim().to_string(),
            status: Status::ToLearn,
            created_at: Utc::now(),
        };

        let mut records = self.list()?;
        records.push(record.clone());
        self.put_all(&records)?;

        tracing::debug!(id = %record.id, word = %record.word, "vocabulary added");
        Ok(record)
    }

    /// 按 id 替换记录
    ///
    /// id 不存在时不做任何写入，返回 `false`。
    pub fn update(&self, record: &VocabularyRecord) -> StorageResult<bool> {
        let mut records = self.list()?;
        let Some(slot) = records.iter_mut().find(|r| r.id == record.id) else {
            return Ok(false);
        };
        *slot = record.clone();
        self.put_all(&records)?;
        Ok(true)
    }

    /// 编辑记录的表单字段，保留 id、状态与创建时间
    pub fn edit(&self, id: &str, input: NewVocabulary) -> StorageResult<VocabularyRecord> {
        input.validate().map_err(StorageError::Validation)?;

        let existing = self
            .get(id)?
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        let updated = VocabularyRecord {
            word: input.word.trim().to_string(),
            part_of_speech: input.part_of_speech,
            meaning: input.meaning.trim().to_string(),
            ..existing
        };
        self.update(&updated)?;
        Ok(updated)
    }

    /// 删除记录，返回是否删除了记录
    pub fn delete(&self, id: &str) -> StorageResult<bool> {
        let mut records = self.list()?;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Ok(false);
        }
        self.put_all(&records)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::types::PartOfSpeech;

    fn store() -> VocabularyStore<MemoryStore> {
        VocabularyStore::new(MemoryStore::new())
    }

    #[test]
    fn test_list_empty_when_absent() {
        assert!(store().list().unwrap().is_empty());
    }

    #[test]
    fn test_add_assigns_id_and_status() {
        let store = store();
        let a = store
            .add(NewVocabulary::new(" apple ", PartOfSpeech::Noun, "quả táo"))
            .unwrap();
        let b = store
            .add(NewVocabulary::new("run", PartOfSpeech::Verb, "chạy"))
            .unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(a.word, "apple");
        assert_eq!(a.status, Status::ToLearn);
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn test_add_rejects_empty_fields() {
        let store = store();
        let result = store.add(NewVocabulary::new("", PartOfSpeech::Noun, "x"));
        assert!(matches!(result, Err(StorageError::Validation(_))));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_update_replaces_by_id() {
        let store = store();
        let record = store
            .add(NewVocabulary::new("apple", PartOfSpeech::Noun, "quả táo"))
            .unwrap();

        assert!(store.update(&record.with_status(Status::Learning)).unwrap());
        assert_eq!(store.get(&record.id).unwrap().unwrap().status, Status::Learning);
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let store = store();
        let record = store
            .add(NewVocabulary::new("apple", PartOfSpeech::Noun, "quả táo"))
            .unwrap();
        let mut ghost = record.clone();
        ghost.id = "ghost".to_string();

        assert!(!store.update(&ghost).unwrap());
        assert_eq!(store.list().unwrap(), vec![record]);
    }

    #[test]
    fn test_edit_keeps_status_and_created_at() {
        let store = store();
        let record = store
            .add(NewVocabulary::new("aple", PartOfSpeech::Noun, "táo"))
            .unwrap();
        store.update(&record.with_status(Status::Mastered)).unwrap();

        let edited = store
            .edit(&record.id, NewVocabulary::new("apple", PartOfSpeech::Noun, "quả táo"))
            .unwrap();
        assert_eq!(edited.word, "apple");
        assert_eq!(edited.status, Status::Mastered);
        assert_eq!(edited.created_at, record.created_at);

        let missing = store.edit("nope", NewVocabulary::new("a", PartOfSpeech::Noun, "b"));
        assert!(matches!(missing, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_delete_and_by_status() {
        let store = store();
        let a = store
            .add(NewVocabulary::new("apple", PartOfSpeech::Noun, "quả táo"))
            .unwrap();
        let b = store
            .add(NewVocabulary::new("run", PartOfSpeech::Verb, "chạy"))
            .unwrap();
        store.update(&b.with_status(Status::Learning)).unwrap();

        assert_eq!(store.by_status(Status::ToLearn).unwrap(), vec![a.clone()]);
        assert!(store.delete(&a.id).unwrap());
        assert!(!store.delete(&a.id).unwrap());
        assert!(store.by_status(Status::ToLearn).unwrap().is_empty());
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_part_of_speech_keeps_list_usable() {
        let store = store();
        store
            .kv()
            .put(
                VOCABULARY_KEY,
                r#"[{"id":"1","word":"apple","partOfSpeech":"noun","meaning":"quả táo","status":"learning","createdAt":"2024-01-01T00:00:00Z"},
                    {"id":"2","word":"the","partOfSpeech":"article","meaning":"mạo từ","status":"to_learn","createdAt":"2024-01-01T00:00:00Z"}]"#,
            )
            .unwrap();

        let records = store.list().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].part_of_speech, PartOfSpeech::Phrase);

        store
            .add(NewVocabulary::new("bread", PartOfSpeech::Noun, "bánh mì"))
            .unwrap();
        assert!(store.delete("2").unwrap());
        assert_eq!(store.list().unwrap().len(), 2);
    }
}
