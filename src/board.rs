//! Status Board
//!
//! Three-column view of the vocabulary, one column per ladder rung, plus the
//! manual move that lets a user override a record's status.

use serde::Serialize;

use crate::storage::{KeyValueStore, StorageResult, VocabularyStore};
use crate::types::{Status, VocabularyRecord};

/// Result of a manual move
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Status changed and was written
    Moved { from: Status, to: Status },
    /// Record already had the target status; nothing written
    Unchanged,
    NotFound,
}

#[derive(Debug, Clone, Serialize)]
pub struct Column {
    pub status: Status,
    pub records: Vec<VocabularyRecord>,
}

impl Column {
    pub fn title(&self) -> &'static str {
        self.status.label()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusBoard {
    columns: Vec<Column>,
}

impl StatusBoard {
    /// Group records by status in ladder order, keeping store order in each column
    pub fn from_records(records: &[VocabularyRecord]) -> Self {
        let columns = Status::ALL
            .iter()
            .map(|&status| Column {
                status,
                records: records
                    .iter()
                    .filter(|r| r.status == status)
                    .cloned()
                    .collect(),
            })
            .collect();
        Self { columns }
    }

    pub fn load<S: KeyValueStore>(store: &VocabularyStore<S>) -> StorageResult<Self> {
        Ok(Self::from_records(&store.list()?))
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, status: Status) -> Option<&Column> {
        self.columns.iter().find(|c| c.status == status)
    }

    /// `(status, count)` per column
    pub fn counts(&self) -> Vec<(Status, usize)> {
        self.columns.iter().map(|c| (c.status, c.len())).collect()
    }

    pub fn total(&self) -> usize {
        self.columns.iter().map(Column::len).sum()
    }
}

/// Move a record to `target`, writing only when the status differs
pub fn move_record<S: KeyValueStore>(
    store: &VocabularyStore<S>,
    id: &str,
    target: Status,
) -> StorageResult<MoveOutcome> {
    let Some(record) = store.get(id)? else {
        return Ok(MoveOutcome::NotFound);
    };
    if record.status == target {
        return Ok(MoveOutcome::Unchanged);
    }

    let from = record.status;
    if !store.update(&record.with_status(target))? {
        return Ok(MoveOutcome::NotFound);
    }
    tracing::info!(id, %from, to = %target, "record moved");
    Ok(MoveOutcome::Moved { from, to: target })
}
