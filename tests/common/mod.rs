#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tuvung_core::{
    KeyValueStore, MemoryStore, NewVocabulary, PartOfSpeech, QuestionGenerator, QuizSessionController, Status,
    StorageError, StorageResult, VocabularyRecord, VocabularyStore,
};

pub const SEED: u64 = 20240601;

/// Add `count` distinct nouns, all in `status`
pub fn seed_words<S: KeyValueStore>(store: &VocabularyStore<S>, count: usize, status: Status) -> Vec<VocabularyRecord> {
    (0..count)
        .map(|i| {
            let record = store
                .add(NewVocabulary::new(
                    format!("word{i}"),
                    PartOfSpeech::Noun,
                    format!("nghĩa {i}"),
                ))
                .expect("add word");
            set_status(store, record, status)
        })
        .collect()
}

pub fn set_status<S: KeyValueStore>(
    store: &VocabularyStore<S>,
    record: VocabularyRecord,
    status: Status,
) -> VocabularyRecord {
    if record.status == status {
        return record;
    }
    let updated = record.with_status(status);
    assert!(store.update(&updated).expect("update status"));
    updated
}

pub fn memory_controller(count: usize, status: Status) -> QuizSessionController<Arc<MemoryStore>> {
    let kv = Arc::new(MemoryStore::new());
    let store = VocabularyStore::new(Arc::clone(&kv));
    seed_words(&store, count, status);
    QuizSessionController::with_generator(store, QuestionGenerator::with_seed(SEED))
}

pub fn current_answer<S: KeyValueStore>(controller: &QuizSessionController<S>) -> String {
    controller
        .session()
        .and_then(|s| s.current_question())
        .map(|q| q.correct_answer.clone())
        .expect("current question")
}

/// Key-value store whose writes can be switched off
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.inner.get(key)
    }

    fn put(&self, key: &str, value: &str) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("quota exceeded".to_string()));
        }
        self.inner.put(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<bool> {
        self.inner.remove(key)
    }
}
