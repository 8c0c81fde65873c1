//! Board use-case service.
//!
//! # Responsibility
//! - Load a workspace board from its store, repairing bad ordering.
//! - Run every mutation on a working copy, persist the changed rows in one
//!   batch, and only then publish the new board.
//!
//! # Invariants
//! - A failed write leaves the published board untouched.
//! - Mutations that change nothing issue no store write.
//! - The published board always passes `Board::check_invariants`.

use crate::error::ErrorKind;
use crate::model::board::{default_columns, Board, ColumnId, ModelError, Task, TaskId};
use crate::repo::board_repo::{BoardStore, StoreBatch, StoreError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Result type used by board service operations.
pub type BoardResult<T> = Result<T, BoardError>;

/// Errors from board service operations.
#[derive(Debug)]
pub enum BoardError {
    /// Input rejected before any change.
    Validation(String),
    TaskNotFound(TaskId),
    ColumnNotFound(ColumnId),
    /// Store unreachable or the write failed and was rolled back.
    StorageUnavailable(StoreError),
    /// Stored rows cannot be decoded.
    CorruptState(String),
}

impl BoardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::TaskNotFound(_) | Self::ColumnNotFound(_) => ErrorKind::NotFound,
            Self::StorageUnavailable(_) => ErrorKind::StorageUnavailable,
            Self::CorruptState(_) => ErrorKind::CorruptState,
        }
    }
}

impl Display for BoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "{message}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::ColumnNotFound(id) => write!(f, "column not found: {id}"),
            Self::StorageUnavailable(err) => write!(f, "storage unavailable: {err}"),
            Self::CorruptState(message) => write!(f, "corrupt board state: {message}"),
        }
    }
}

impl Error for BoardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StorageUnavailable(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelError> for BoardError {
    fn from(value: ModelError) -> Self {
        match value {
            ModelError::EmptyTitle => Self::Validation(value.to_string()),
            ModelError::TaskNotFound(id) => Self::TaskNotFound(id),
            ModelError::ColumnNotFound(id) => Self::ColumnNotFound(id),
        }
    }
}

impl From<StoreError> for BoardError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::InvalidData(message) => Self::CorruptState(message),
            other => Self::StorageUnavailable(other),
        }
    }
}

/// Board facade over one workspace store.
pub struct BoardService<S: BoardStore> {
    store: S,
    board: Board,
}

impl<S: BoardStore> BoardService<S> {
    /// Loads the board held by `store`.
    ///
    /// An empty store gets the default column set. Gaps, duplicate positions
    /// and tasks pointing at unknown columns are repaired and the repair is
    /// written back in one batch.
    pub fn load(store: S) -> BoardResult<Self> {
        let mut columns = store.fetch_columns()?;
        if columns.is_empty() {
            let mut batch = StoreBatch::new();
            for column in default_columns() {
                batch.upsert_column(column);
            }
            store.apply(&batch)?;
            info!(
                "event=board_init module=service status=ok columns={}",
                batch.len()
            );
            columns = default_columns();
        }

        let tasks = store.fetch_tasks()?;
        let (board, report) = Board::from_records(columns, tasks);

        if !report.unplaced.is_empty() {
            return Err(BoardError::CorruptState(format!(
                "{} task(s) stored without any column",
                report.unplaced.len()
            )));
        }

        if !report.is_clean() {
            warn!(
                "event=board_repair module=service status=start columns={} tasks={} reparented={}",
                report.columns.len(),
                report.tasks.len(),
                report.reparented.len()
            );
            let mut batch = StoreBatch::new();
            for column in report.columns {
                batch.upsert_column(column);
            }
            for task in report.tasks {
                batch.upsert_task(task);
            }
            store.apply(&batch)?;
            warn!(
                "event=board_repair module=service status=ok writes={}",
                batch.len()
            );
        }

        board.check_invariants().map_err(BoardError::CorruptState)?;
        info!(
            "event=board_load module=service status=ok columns={} tasks={}",
            board.columns().len(),
            board.task_count()
        );
        Ok(Self { store, board })
    }

    /// Current published board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Releases the service, handing the open store back.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Closes the underlying store. Later writes fail as unavailable.
    pub fn close(&mut self) {
        self.store.close();
    }

    /// Appends a task to the end of `column_id`.
    pub fn add_task(&mut self, column_id: &ColumnId, title: &str) -> BoardResult<TaskId> {
        self.add_task_with(column_id, title, None)
    }

    /// Appends a task with an optional description in one write.
    pub fn add_task_with(
        &mut self,
        column_id: &ColumnId,
        title: &str,
        description: Option<&str>,
    ) -> BoardResult<TaskId> {
        let mut working = self.board.clone();
        let task = working.insert_task(column_id, Uuid::new_v4(), title, description)?;
        let id = task.id;

        let mut batch = StoreBatch::new();
        batch.upsert_task(task);
        self.publish(working, batch)?;
        Ok(id)
    }

    /// Replaces title and/or description of a task.
    ///
    /// `Some("")` as description clears it. Identical values write nothing.
    pub fn edit_task(
        &mut self,
        id: TaskId,
        title: Option<&str>,
        description: Option<&str>,
    ) -> BoardResult<()> {
        let mut working = self.board.clone();
        let Some(task) = working.edit_task(id, title, description)? else {
            return Ok(());
        };

        let mut batch = StoreBatch::new();
        batch.upsert_task(task);
        self.publish(working, batch)
    }

    /// Moves a task into `target_column` at `target_position` (clamped).
    pub fn move_task(
        &mut self,
        id: TaskId,
        target_column: &ColumnId,
        target_position: usize,
    ) -> BoardResult<()> {
        let mut working = self.board.clone();
        let rows = working.move_task(id, target_column, target_position)?;
        if rows.is_empty() {
            return Ok(());
        }
        self.publish(working, rows_batch(rows))
    }

    /// Moves a task within its own column.
    pub fn reorder_task(&mut self, id: TaskId, target_position: usize) -> BoardResult<()> {
        let (column, _) = self.board.locate(id).ok_or(BoardError::TaskNotFound(id))?;
        let column_id = self.board.columns()[column].id.clone();
        self.move_task(id, &column_id, target_position)
    }

    /// Hard-deletes a task and closes the gap; returns the removed task.
    pub fn delete_task(&mut self, id: TaskId) -> BoardResult<Task> {
        let mut working = self.board.clone();
        let (removed, shifted) = working.remove_task(id)?;

        let mut batch = StoreBatch::new();
        batch.delete_task(removed.id);
        for task in shifted {
            batch.upsert_task(task);
        }
        self.publish(working, batch)?;
        Ok(removed)
    }

    fn publish(&mut self, working: Board, batch: StoreBatch) -> BoardResult<()> {
        self.store.apply(&batch)?;
        self.board = working;
        Ok(())
    }
}

fn rows_batch(rows: Vec<Task>) -> StoreBatch {
    let mut batch = StoreBatch::new();
    for task in rows {
        batch.upsert_task(task);
    }
    batch
}

#[cfg(test)]
mod tests {
    use super::BoardError;
    use crate::error::ErrorKind;
    use crate::model::board::{ColumnId, ModelError};
    use crate::repo::board_repo::StoreError;
    use uuid::Uuid;

    #[test]
    fn model_errors_map_to_board_error_kinds() {
        assert_eq!(
            BoardError::from(ModelError::EmptyTitle).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            BoardError::from(ModelError::TaskNotFound(Uuid::new_v4())).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            BoardError::from(ModelError::ColumnNotFound(ColumnId::new("x"))).kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn store_errors_split_into_unavailable_and_corrupt() {
        assert_eq!(
            BoardError::from(StoreError::Closed).kind(),
            ErrorKind::StorageUnavailable
        );
        assert_eq!(
            BoardError::from(StoreError::InvalidData("bad uuid".to_string())).kind(),
            ErrorKind::CorruptState
        );
    }
}
