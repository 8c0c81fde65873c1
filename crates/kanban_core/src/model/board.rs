//! Board aggregate: columns and the tasks they own.
//!
//! # Responsibility
//! - Hold the in-memory column/task set of the active workspace.
//! - Apply structural mutations (insert, edit, move, remove) while keeping
//!   ordering invariants intact, and report which rows changed.
//! - Rebuild a consistent board from stored records, repairing bad ordering.
//!
//! # Invariants
//! - Column positions are `0..n-1` in board order.
//! - Task positions are `0..n-1` in column order, for every column.
//! - Every task is owned by exactly one column and `task.column_id` names it.
//! - Task titles are non-empty after trim; blank descriptions are `None`.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable task identifier.
pub type TaskId = Uuid;

/// Stable column identifier (slug).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ColumnId(String);

impl ColumnId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ColumnId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Column row as persisted, without its tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRecord {
    pub id: ColumnId,
    pub name: String,
    pub position: usize,
}

/// One unit of work owned by a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub column_id: ColumnId,
    pub title: String,
    pub description: Option<String>,
    pub position: usize,
}

/// A named, ordered bucket of tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub id: ColumnId,
    pub name: String,
    pub position: usize,
    tasks: Vec<Task>,
}

impl Column {
    /// Tasks in position order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn record(&self) -> ColumnRecord {
        ColumnRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            position: self.position,
        }
    }

    fn position_of(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }
}

/// Errors raised by in-memory board mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Title is empty after trimming whitespace.
    EmptyTitle,
    TaskNotFound(TaskId),
    ColumnNotFound(ColumnId),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title must not be empty"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::ColumnNotFound(id) => write!(f, "column not found: {id}"),
        }
    }
}

impl Error for ModelError {}

/// Writes needed to make stored records match a rebuilt board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Column rows whose position was resequenced.
    pub columns: Vec<ColumnRecord>,
    /// Task rows whose position or owning column was rewritten.
    pub tasks: Vec<Task>,
    /// Tasks whose stored column did not exist and were appended to the first column.
    pub reparented: Vec<TaskId>,
    /// Tasks that could not be placed because the board has no columns.
    pub unplaced: Vec<TaskId>,
}

impl RepairReport {
    pub fn is_clean(&self) -> bool {
        self.columns.is_empty()
            && self.tasks.is_empty()
            && self.reparented.is_empty()
            && self.unplaced.is_empty()
    }
}

/// In-memory board for one workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    columns: Vec<Column>,
}

/// Column set materialized for a new workspace.
pub fn default_columns() -> Vec<ColumnRecord> {
    [("todo", "Todo"), ("in_progress", "In Progress"), ("done", "Done")]
        .into_iter()
        .enumerate()
        .map(|(position, (id, name))| ColumnRecord {
            id: ColumnId::new(id),
            name: name.to_string(),
            position,
        })
        .collect()
}

/// Trims a title, rejecting blank input.
pub fn normalize_title(title: &str) -> Result<String, ModelError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ModelError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

/// Blank descriptions collapse to `None`; surrounding whitespace is dropped.
pub fn normalize_description(description: &str) -> Option<String> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl Board {
    /// Rebuilds a board from stored rows.
    ///
    /// Input order is the stored order: callers pass columns and tasks sorted
    /// by position with ties already broken. Sorting here is stable, so the
    /// resequenced positions follow that order.
    pub fn from_records(mut columns: Vec<ColumnRecord>, tasks: Vec<Task>) -> (Self, RepairReport) {
        let mut report = RepairReport::default();

        columns.sort_by_key(|column| column.position);
        let mut seen_columns = HashSet::new();
        columns.retain(|column| seen_columns.insert(column.id.clone()));

        let mut board = Board {
            columns: columns
                .into_iter()
                .enumerate()
                .map(|(index, record)| {
                    if record.position != index {
                        report.columns.push(ColumnRecord {
                            position: index,
                            ..record.clone()
                        });
                    }
                    Column {
                        id: record.id,
                        name: record.name,
                        position: index,
                        tasks: Vec::new(),
                    }
                })
                .collect(),
        };

        let index_by_column: HashMap<ColumnId, usize> = board
            .columns
            .iter()
            .enumerate()
            .map(|(index, column)| (column.id.clone(), index))
            .collect();

        let mut orphans = Vec::new();
        for task in tasks {
            match index_by_column.get(&task.column_id) {
                Some(&index) => board.columns[index].tasks.push(task),
                None => orphans.push(task),
            }
        }

        let mut touched: HashSet<TaskId> = HashSet::new();
        for column in &mut board.columns {
            column.tasks.sort_by_key(|task| task.position);
        }
        if let Some(first) = board.columns.first_mut() {
            for mut task in orphans {
                report.reparented.push(task.id);
                touched.insert(task.id);
                task.column_id = first.id.clone();
                task.position = usize::MAX;
                first.tasks.push(task);
            }
        } else {
            report.unplaced.extend(orphans.iter().map(|task| task.id));
        }

        for column in &mut board.columns {
            touched.extend(renumber(column));
        }
        report.tasks = board
            .columns
            .iter()
            .flat_map(|column| column.tasks.iter())
            .filter(|task| touched.contains(&task.id))
            .cloned()
            .collect();

        (board, report)
    }

    /// Columns in board order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.iter().find(|column| &column.id == id)
    }

    pub fn column_index(&self, id: &ColumnId) -> Option<usize> {
        self.columns.iter().position(|column| &column.id == id)
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.locate(id)
            .map(|(column, position)| &self.columns[column].tasks[position])
    }

    /// Finds `(column index, task position)` of a task.
    pub fn locate(&self, id: TaskId) -> Option<(usize, usize)> {
        self.columns
            .iter()
            .enumerate()
            .find_map(|(index, column)| column.position_of(id).map(|position| (index, position)))
    }

    pub fn task_count(&self) -> usize {
        self.columns.iter().map(Column::len).sum()
    }

    /// Appends a new task at the end of a column and returns the stored row.
    pub fn insert_task(
        &mut self,
        column_id: &ColumnId,
        id: TaskId,
        title: &str,
        description: Option<&str>,
    ) -> Result<Task, ModelError> {
        let title = normalize_title(title)?;
        let column = self
            .columns
            .iter_mut()
            .find(|column| &column.id == column_id)
            .ok_or_else(|| ModelError::ColumnNotFound(column_id.clone()))?;

        let task = Task {
            id,
            column_id: column.id.clone(),
            title,
            description: description.and_then(normalize_description),
            position: column.tasks.len(),
        };
        column.tasks.push(task.clone());
        Ok(task)
    }

    /// Replaces title and/or description.
    ///
    /// `description = Some("")` clears the description. Returns `None` when
    /// nothing changed.
    pub fn edit_task(
        &mut self,
        id: TaskId,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<Task>, ModelError> {
        let title = title.map(normalize_title).transpose()?;
        let (column, position) = self.locate(id).ok_or(ModelError::TaskNotFound(id))?;
        let task = &mut self.columns[column].tasks[position];

        let mut changed = false;
        if let Some(title) = title {
            if task.title != title {
                task.title = title;
                changed = true;
            }
        }
        if let Some(description) = description {
            let description = normalize_description(description);
            if task.description != description {
                task.description = description;
                changed = true;
            }
        }

        Ok(changed.then(|| task.clone()))
    }

    /// Moves a task to `target_position` inside `target_column`.
    ///
    /// The position is clamped to the insertion range of the target column
    /// once the task has been taken out. Returns every row whose column or
    /// position changed; an empty vector means the move was a no-op.
    pub fn move_task(
        &mut self,
        id: TaskId,
        target_column: &ColumnId,
        target_position: usize,
    ) -> Result<Vec<Task>, ModelError> {
        let (source, position) = self.locate(id).ok_or(ModelError::TaskNotFound(id))?;
        let target = self
            .column_index(target_column)
            .ok_or_else(|| ModelError::ColumnNotFound(target_column.clone()))?;

        let remaining = if source == target {
            self.columns[target].tasks.len() - 1
        } else {
            self.columns[target].tasks.len()
        };
        let insert_at = target_position.min(remaining);
        if source == target && insert_at == position {
            return Ok(Vec::new());
        }

        let mut task = self.columns[source].tasks.remove(position);
        task.column_id = self.columns[target].id.clone();
        self.columns[target].tasks.insert(insert_at, task);

        let mut touched: HashSet<TaskId> = HashSet::from([id]);
        touched.extend(renumber(&mut self.columns[source]));
        if source != target {
            touched.extend(renumber(&mut self.columns[target]));
        }

        Ok(self.collect_rows(&[source, target], &touched))
    }

    /// Removes a task and closes the gap it leaves.
    ///
    /// Returns the removed task and the rows whose position shifted.
    pub fn remove_task(&mut self, id: TaskId) -> Result<(Task, Vec<Task>), ModelError> {
        let (column, position) = self.locate(id).ok_or(ModelError::TaskNotFound(id))?;
        let removed = self.columns[column].tasks.remove(position);
        let touched: HashSet<TaskId> = renumber(&mut self.columns[column]).into_iter().collect();
        Ok((removed, self.collect_rows(&[column], &touched)))
    }

    /// Verifies ordering and ownership invariants.
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for (index, column) in self.columns.iter().enumerate() {
            if column.position != index {
                return Err(format!(
                    "column `{}` has position {} at index {index}",
                    column.id, column.position
                ));
            }
            for (position, task) in column.tasks.iter().enumerate() {
                if task.position != position {
                    return Err(format!(
                        "task {} has position {} at index {position} of column `{}`",
                        task.id, task.position, column.id
                    ));
                }
                if task.column_id != column.id {
                    return Err(format!(
                        "task {} claims column `{}` but lives in `{}`",
                        task.id, task.column_id, column.id
                    ));
                }
                if !seen.insert(task.id) {
                    return Err(format!("task {} appears more than once", task.id));
                }
                if task.title.trim().is_empty() {
                    return Err(format!("task {} has a blank title", task.id));
                }
            }
        }
        Ok(())
    }

    fn collect_rows(&self, columns: &[usize], touched: &HashSet<TaskId>) -> Vec<Task> {
        let mut visited = HashSet::new();
        columns
            .iter()
            .filter(|index| visited.insert(**index))
            .flat_map(|index| self.columns[*index].tasks.iter())
            .filter(|task| touched.contains(&task.id))
            .cloned()
            .collect()
    }
}

/// Rewrites positions to `0..n-1`, returning the tasks whose position moved.
fn renumber(column: &mut Column) -> Vec<TaskId> {
    let mut changed = Vec::new();
    for (index, task) in column.tasks.iter_mut().enumerate() {
        if task.position != index {
            task.position = index;
            changed.push(task.id);
        }
    }
    changed
}
