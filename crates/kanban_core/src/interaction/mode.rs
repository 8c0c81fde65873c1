//! Interaction modes.
//!
//! `Browsing` is the only resting state; every other mode carries exactly the
//! data its transitions need and is left through confirm or cancel.

use super::buffer::TextBuffer;
use crate::model::board::{ColumnId, Task, TaskId};
use serde::Serialize;

/// What a confirmed draft writes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DraftTarget {
    /// Append a new task to this column.
    NewTask { column_id: ColumnId },
    /// Overwrite fields of an existing task.
    Existing { task_id: TaskId },
}

/// Title and description buffers being edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Draft {
    pub target: DraftTarget,
    pub title: TextBuffer,
    pub description: TextBuffer,
}

impl Draft {
    pub fn new_task(column_id: ColumnId) -> Self {
        Self {
            target: DraftTarget::NewTask { column_id },
            title: TextBuffer::empty(),
            description: TextBuffer::empty(),
        }
    }

    /// Draft pre-populated from a stored task.
    pub fn existing(task: &Task) -> Self {
        Self {
            target: DraftTarget::Existing { task_id: task.id },
            title: TextBuffer::new(task.title.as_str()),
            description: TextBuffer::new(task.description.as_deref().unwrap_or_default()),
        }
    }

    pub fn is_new_task(&self) -> bool {
        matches!(self.target, DraftTarget::NewTask { .. })
    }
}

/// Current interaction mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Browsing,
    EditingTitle {
        draft: Draft,
    },
    EditingDescription {
        draft: Draft,
    },
    /// `target` is the index of the highlighted destination column.
    SelectingMoveTarget {
        task_id: TaskId,
        target: usize,
    },
    ConfirmingDelete {
        task_id: TaskId,
    },
}

impl Mode {
    /// Stable tag used in logs and snapshots.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Browsing => "browsing",
            Self::EditingTitle { .. } => "editing_title",
            Self::EditingDescription { .. } => "editing_description",
            Self::SelectingMoveTarget { .. } => "selecting_move_target",
            Self::ConfirmingDelete { .. } => "confirming_delete",
        }
    }

    pub fn is_browsing(&self) -> bool {
        matches!(self, Self::Browsing)
    }

    /// True while a text buffer has keyboard focus.
    pub fn is_editing(&self) -> bool {
        matches!(
            self,
            Self::EditingTitle { .. } | Self::EditingDescription { .. }
        )
    }
}
