#![allow(dead_code)]

use kanban_core::{BoardStore, SqliteBoardStore, StoreBatch, StoreOp, StoreResult};
use kanban_core::model::board::{ColumnRecord, Task};
use std::cell::Cell;
use uuid::Uuid;

/// SQLite store that counts writes and can be armed to fail the next batch
/// after its real operations ran inside the transaction.
pub struct FlakyStore {
    inner: SqliteBoardStore,
    applies: Cell<usize>,
    fail_next: Cell<bool>,
}

impl FlakyStore {
    pub fn new(inner: SqliteBoardStore) -> Self {
        Self {
            inner,
            applies: Cell::new(0),
            fail_next: Cell::new(false),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(SqliteBoardStore::open_in_memory().unwrap())
    }

    pub fn applies(&self) -> usize {
        self.applies.get()
    }

    pub fn fail_next_apply(&self) {
        self.fail_next.set(true);
    }
}

impl BoardStore for FlakyStore {
    fn fetch_columns(&self) -> StoreResult<Vec<ColumnRecord>> {
        self.inner.fetch_columns()
    }

    fn fetch_tasks(&self) -> StoreResult<Vec<Task>> {
        self.inner.fetch_tasks()
    }

    fn apply(&self, batch: &StoreBatch) -> StoreResult<()> {
        self.applies.set(self.applies.get() + 1);
        if self.fail_next.replace(false) {
            let mut poisoned = batch.clone();
            poisoned.push(StoreOp::DeleteTask(Uuid::new_v4()));
            return self.inner.apply(&poisoned);
        }
        self.inner.apply(batch)
    }

    fn close(&mut self) {
        self.inner.close();
    }
}

pub fn titles(board: &kanban_core::Board, column: &str) -> Vec<String> {
    board
        .column(&kanban_core::ColumnId::new(column))
        .unwrap()
        .tasks()
        .iter()
        .map(|task| task.title.clone())
        .collect()
}
