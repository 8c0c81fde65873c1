//! Read-only render view of the engine state.

use super::mode::Mode;
use crate::model::board::{Board, ColumnId, TaskId};
use crate::model::focus::Focus;
use crate::model::workspace::WorkspaceName;
use serde::Serialize;

/// Severity of a transient status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageLevel {
    Info,
    Error,
}

/// One-event status line shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub level: MessageLevel,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskView {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub position: usize,
    pub focused: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnView {
    pub id: ColumnId,
    pub name: String,
    pub position: usize,
    pub focused: bool,
    pub tasks: Vec<TaskView>,
}

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardSnapshot {
    pub workspace: WorkspaceName,
    pub columns: Vec<ColumnView>,
    pub focus: Focus,
    pub interaction: Mode,
    pub message: Option<StatusMessage>,
}

impl BoardSnapshot {
    pub fn capture(
        workspace: &WorkspaceName,
        board: &Board,
        focus: &Focus,
        mode: &Mode,
        message: Option<&StatusMessage>,
    ) -> Self {
        let columns = board
            .columns()
            .iter()
            .map(|column| {
                let column_focused = focus.column_id() == Some(&column.id);
                ColumnView {
                    id: column.id.clone(),
                    name: column.name.clone(),
                    position: column.position,
                    focused: column_focused,
                    tasks: column
                        .tasks()
                        .iter()
                        .map(|task| TaskView {
                            id: task.id,
                            title: task.title.clone(),
                            description: task.description.clone(),
                            position: task.position,
                            focused: column_focused && focus.task_id() == Some(task.id),
                        })
                        .collect(),
                }
            })
            .collect();

        Self {
            workspace: workspace.clone(),
            columns,
            focus: focus.clone(),
            interaction: mode.clone(),
            message: message.cloned(),
        }
    }

    pub fn task_count(&self) -> usize {
        self.columns.iter().map(|column| column.tasks.len()).sum()
    }
}
