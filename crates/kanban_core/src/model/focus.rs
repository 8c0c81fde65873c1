//! Transient board cursor.
//!
//! # Invariants
//! - `column` names an existing column whenever the board has columns.
//! - `task`, when set, names a task inside the focused column.
//! - Navigation never wraps; it stops at the first/last column or task.

use crate::model::board::{Board, ColumnId, TaskId};
use serde::Serialize;

/// Which column and, optionally, which task is selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Focus {
    column: Option<ColumnId>,
    task: Option<TaskId>,
}

impl Focus {
    /// First column, first task.
    pub fn initial(board: &Board) -> Self {
        let mut focus = Self::default();
        focus.reconcile(board);
        focus
    }

    pub fn column_id(&self) -> Option<&ColumnId> {
        self.column.as_ref()
    }

    pub fn task_id(&self) -> Option<TaskId> {
        self.task
    }

    /// Restores the invariants after the board changed underneath.
    ///
    /// A missing column falls back to the first column; a task that is no
    /// longer in the focused column falls back to the column's first task.
    pub fn reconcile(&mut self, board: &Board) {
        let column = self
            .column
            .as_ref()
            .and_then(|id| board.column(id))
            .or_else(|| board.columns().first());

        let Some(column) = column else {
            self.column = None;
            self.task = None;
            return;
        };

        let task_still_here = self
            .task
            .is_some_and(|id| column.tasks().iter().any(|task| task.id == id));
        if !task_still_here {
            self.task = column.tasks().first().map(|task| task.id);
        }
        self.column = Some(column.id.clone());
    }

    pub fn next_column(&mut self, board: &Board) {
        self.step_column(board, 1);
    }

    pub fn prev_column(&mut self, board: &Board) {
        self.step_column(board, -1);
    }

    pub fn next_task(&mut self, board: &Board) {
        self.step_task(board, 1);
    }

    pub fn prev_task(&mut self, board: &Board) {
        self.step_task(board, -1);
    }

    /// Points focus at a task and its column.
    pub fn focus_task(&mut self, board: &Board, id: TaskId) {
        if let Some((column, _)) = board.locate(id) {
            self.column = Some(board.columns()[column].id.clone());
            self.task = Some(id);
        }
    }

    /// Focuses the task nearest to a slot that was just vacated.
    ///
    /// Prefers the task that slid into `position`, then the new last task,
    /// then the column itself.
    pub fn focus_nearest(&mut self, board: &Board, column_id: &ColumnId, position: usize) {
        let Some(column) = board.column(column_id) else {
            self.reconcile(board);
            return;
        };
        let tasks = column.tasks();
        self.column = Some(column.id.clone());
        self.task = tasks
            .get(position)
            .or_else(|| tasks.last())
            .map(|task| task.id);
    }

    fn step_column(&mut self, board: &Board, delta: isize) {
        let Some(current) = self.column.as_ref().and_then(|id| board.column_index(id)) else {
            self.reconcile(board);
            return;
        };
        let target = current
            .saturating_add_signed(delta)
            .min(board.columns().len().saturating_sub(1));
        if target == current {
            return;
        }

        let row = self.task_row(board).unwrap_or(0);
        let column = &board.columns()[target];
        self.column = Some(column.id.clone());
        self.task = column
            .tasks()
            .get(row)
            .or_else(|| column.tasks().last())
            .map(|task| task.id);
    }

    fn step_task(&mut self, board: &Board, delta: isize) {
        let Some(column) = self.column.as_ref().and_then(|id| board.column(id)) else {
            self.reconcile(board);
            return;
        };
        if column.is_empty() {
            self.task = None;
            return;
        }
        let target = match self.task_row(board) {
            Some(row) => row.saturating_add_signed(delta).min(column.len() - 1),
            None => 0,
        };
        self.task = Some(column.tasks()[target].id);
    }

    fn task_row(&self, board: &Board) -> Option<usize> {
        self.task
            .and_then(|id| board.locate(id))
            .map(|(_, position)| position)
    }
}
