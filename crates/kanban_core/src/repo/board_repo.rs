//! Board store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide the narrow CRUD contract the board model persists through.
//! - Own transaction boundaries: one `StoreBatch` is one SQLite transaction.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `apply` is all-or-nothing; any failing operation rolls the batch back.
//! - Reads are ordered `position ASC, created_at ASC, id ASC` so ties keep a
//!   deterministic stored order.
//! - After `close`, every call fails with `StoreError::Closed`.

use crate::db::migrations::latest_version;
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::board::{ColumnId, ColumnRecord, Task, TaskId};
use log::{debug, error, warn};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Instant;
use uuid::Uuid;

/// Result type used by board store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from board store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// The store handle was closed.
    Closed,
    /// Backing file or directory could not be prepared.
    Io(std::io::Error),
    /// Delete targeted a task row that does not exist.
    TaskNotFound(TaskId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be converted to a valid board row.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Closed => write!(f, "board store is closed"),
            Self::Io(err) => write!(f, "board store i/o failed: {err}"),
            Self::TaskNotFound(id) => write!(f, "stored task not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "board store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "board store requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid board data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// One write inside a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    UpsertColumn(ColumnRecord),
    UpsertTask(Task),
    DeleteTask(TaskId),
}

/// Ordered writes applied as one atomic unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreBatch {
    ops: Vec<StoreOp>,
}

impl StoreBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: StoreOp) {
        self.ops.push(op);
    }

    pub fn upsert_column(&mut self, column: ColumnRecord) {
        self.push(StoreOp::UpsertColumn(column));
    }

    pub fn upsert_task(&mut self, task: Task) {
        self.push(StoreOp::UpsertTask(task));
    }

    pub fn delete_task(&mut self, id: TaskId) {
        self.push(StoreOp::DeleteTask(id));
    }

    pub fn ops(&self) -> &[StoreOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl FromIterator<StoreOp> for StoreBatch {
    fn from_iter<I: IntoIterator<Item = StoreOp>>(iter: I) -> Self {
        Self {
            ops: iter.into_iter().collect(),
        }
    }
}

/// Durable record store for one workspace.
pub trait BoardStore {
    /// Loads all columns in stored order.
    fn fetch_columns(&self) -> StoreResult<Vec<ColumnRecord>>;
    /// Loads all tasks in stored order.
    fn fetch_tasks(&self) -> StoreResult<Vec<Task>>;
    /// Applies every operation of `batch` in one transaction.
    fn apply(&self, batch: &StoreBatch) -> StoreResult<()>;
    /// Releases the handle. Calling it again is a no-op.
    fn close(&mut self);

    fn upsert_column(&self, column: &ColumnRecord) -> StoreResult<()> {
        self.apply(&StoreBatch::from_iter([StoreOp::UpsertColumn(
            column.clone(),
        )]))
    }

    fn upsert_task(&self, task: &Task) -> StoreResult<()> {
        self.apply(&StoreBatch::from_iter([StoreOp::UpsertTask(task.clone())]))
    }

    fn delete_task(&self, id: TaskId) -> StoreResult<()> {
        self.apply(&StoreBatch::from_iter([StoreOp::DeleteTask(id)]))
    }
}

/// SQLite-backed board store owning its connection.
pub struct SqliteBoardStore {
    conn: Option<Connection>,
}

impl SqliteBoardStore {
    /// Opens (creating when missing) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::try_new(open_db(path)?)
    }

    /// Opens a private in-memory store.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    /// Wraps an already migrated connection.
    pub fn try_new(conn: Connection) -> StoreResult<Self> {
        ensure_board_connection_ready(&conn)?;
        Ok(Self { conn: Some(conn) })
    }

    pub fn is_closed(&self) -> bool {
        self.conn.is_none()
    }

    fn conn(&self) -> StoreResult<&Connection> {
        self.conn.as_ref().ok_or(StoreError::Closed)
    }
}

impl BoardStore for SqliteBoardStore {
    fn fetch_columns(&self) -> StoreResult<Vec<ColumnRecord>> {
        let mut stmt = self.conn()?.prepare(
            "SELECT column_id, display_name, position
             FROM board_columns
             ORDER BY position ASC, created_at ASC, column_id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut columns = Vec::new();
        while let Some(row) = rows.next()? {
            columns.push(parse_column_row(row)?);
        }
        Ok(columns)
    }

    fn fetch_tasks(&self) -> StoreResult<Vec<Task>> {
        let mut stmt = self.conn()?.prepare(
            "SELECT task_uuid, column_id, title, description, position
             FROM tasks
             ORDER BY position ASC, created_at ASC, task_uuid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn apply(&self, batch: &StoreBatch) -> StoreResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let started_at = Instant::now();
        let conn = self.conn()?;
        let result = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
            .map_err(StoreError::from)
            .and_then(|tx| {
                for op in batch.ops() {
                    apply_op(&tx, op)?;
                }
                tx.commit()?;
                Ok(())
            });

        match &result {
            Ok(()) => debug!(
                "event=store_apply module=repo status=ok ops={} duration_ms={}",
                batch.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=store_apply module=repo status=error ops={} duration_ms={} error={}",
                batch.len(),
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Err((_, err)) = conn.close() {
                warn!("event=store_close module=repo status=error error={err}");
            } else {
                debug!("event=store_close module=repo status=ok");
            }
        }
    }
}

impl Drop for SqliteBoardStore {
    fn drop(&mut self) {
        self.close();
    }
}

fn apply_op(tx: &Transaction<'_>, op: &StoreOp) -> StoreResult<()> {
    match op {
        StoreOp::UpsertColumn(column) => {
            tx.execute(
                "INSERT INTO board_columns (column_id, display_name, position)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (column_id) DO UPDATE SET
                    display_name = excluded.display_name,
                    position = excluded.position,
                    updated_at = (strftime('%s', 'now') * 1000);",
                params![
                    column.id.as_str(),
                    column.name.as_str(),
                    position_to_db(column.position)?,
                ],
            )?;
        }
        StoreOp::UpsertTask(task) => {
            tx.execute(
                "INSERT INTO tasks (task_uuid, column_id, title, description, position)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (task_uuid) DO UPDATE SET
                    column_id = excluded.column_id,
                    title = excluded.title,
                    description = excluded.description,
                    position = excluded.position,
                    updated_at = (strftime('%s', 'now') * 1000);",
                params![
                    task.id.to_string(),
                    task.column_id.as_str(),
                    task.title.as_str(),
                    task.description.as_deref(),
                    position_to_db(task.position)?,
                ],
            )?;
        }
        StoreOp::DeleteTask(id) => {
            let changed = tx.execute(
                "DELETE FROM tasks WHERE task_uuid = ?1;",
                [id.to_string()],
            )?;
            if changed == 0 {
                return Err(StoreError::TaskNotFound(*id));
            }
        }
    }
    Ok(())
}

fn parse_column_row(row: &Row<'_>) -> StoreResult<ColumnRecord> {
    Ok(ColumnRecord {
        id: ColumnId::new(row.get::<_, String>("column_id")?),
        name: row.get("display_name")?,
        position: position_from_db(row.get("position")?, "board_columns.position")?,
    })
}

fn parse_task_row(row: &Row<'_>) -> StoreResult<Task> {
    let uuid_text: String = row.get("task_uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        StoreError::InvalidData(format!("invalid uuid `{uuid_text}` in tasks.task_uuid"))
    })?;

    Ok(Task {
        id,
        column_id: ColumnId::new(row.get::<_, String>("column_id")?),
        title: row.get("title")?,
        description: row.get("description")?,
        position: position_from_db(row.get("position")?, "tasks.position")?,
    })
}

fn position_to_db(position: usize) -> StoreResult<i64> {
    i64::try_from(position)
        .map_err(|_| StoreError::InvalidData(format!("position {position} out of range")))
}

fn position_from_db(value: i64, column: &'static str) -> StoreResult<usize> {
    usize::try_from(value)
        .map_err(|_| StoreError::InvalidData(format!("invalid position `{value}` in {column}")))
}

fn ensure_board_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in ["board_columns", "tasks"] {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(StoreError::MissingRequiredTable(table));
        }
    }

    Ok(())
}
