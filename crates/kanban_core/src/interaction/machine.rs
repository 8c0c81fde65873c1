//! Interaction state machine.
//!
//! # Responsibility
//! - Turn semantic actions into focus changes, mode transitions and board
//!   mutations, and tell the caller whether to redraw.
//!
//! # Invariants
//! - Any board failure is reported as an error message and leaves the
//!   machine in `Browsing`; the board itself is never partially mutated.
//! - Actions that do not apply to the current mode change nothing, not even
//!   the status message.
//! - Focus is reconciled against the board after every handled action.

use super::action::Action;
use super::buffer::TextBuffer;
use super::mode::{Draft, DraftTarget, Mode};
use super::snapshot::StatusMessage;
use crate::model::board::{Board, Task, TaskId};
use crate::model::focus::Focus;
use crate::repo::board_repo::BoardStore;
use crate::service::board_service::{BoardError, BoardService};
use log::{debug, warn};

/// What the caller should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// State changed; redraw.
    Render,
    /// User asked to leave.
    Quit,
    /// Event did not apply to the current mode.
    Ignored,
}

const NO_TASK_SELECTED: &str = "No task selected";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Description,
}

/// Mode, focus and status line for one workspace view.
#[derive(Debug, Clone, Default)]
pub struct InteractionMachine {
    mode: Mode,
    focus: Focus,
    message: Option<StatusMessage>,
}

impl InteractionMachine {
    pub fn new(board: &Board) -> Self {
        Self {
            mode: Mode::Browsing,
            focus: Focus::initial(board),
            message: None,
        }
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn focus(&self) -> &Focus {
        &self.focus
    }

    pub fn message(&self) -> Option<&StatusMessage> {
        self.message.as_ref()
    }

    /// Drops any in-progress interaction and refocuses on a fresh board.
    pub fn reset(&mut self, board: &Board) {
        self.mode = Mode::Browsing;
        self.focus = Focus::initial(board);
        self.message = None;
    }

    /// Replaces the status line without touching mode or focus.
    pub fn set_message(&mut self, message: StatusMessage) {
        self.message = Some(message);
    }

    /// Processes one action against `service`.
    pub fn handle<S: BoardStore>(
        &mut self,
        service: &mut BoardService<S>,
        action: Action,
    ) -> Signal {
        let previous_message = self.message.take();
        let mode = std::mem::take(&mut self.mode);
        let from = mode.tag();

        let signal = match mode {
            Mode::Browsing => self.on_browsing(service, action),
            Mode::EditingTitle { draft } => self.on_editing(service, draft, Field::Title, action),
            Mode::EditingDescription { draft } => {
                self.on_editing(service, draft, Field::Description, action)
            }
            Mode::SelectingMoveTarget { task_id, target } => {
                self.on_selecting_target(service, task_id, target, action)
            }
            Mode::ConfirmingDelete { task_id } => {
                self.on_confirming_delete(service, task_id, action)
            }
        };

        let signal = match signal {
            Ok(signal) => signal,
            Err(err) => {
                warn!(
                    "event=interaction_failed module=interaction status=error mode={from} action={action:?} kind={} error={err}",
                    err.kind()
                );
                self.mode = Mode::Browsing;
                self.message = Some(StatusMessage::error(err.to_string()));
                Signal::Render
            }
        };

        if signal == Signal::Ignored {
            self.message = previous_message;
        } else {
            debug!(
                "event=interaction module=interaction status=ok from={from} to={} action={action:?}",
                self.mode.tag()
            );
        }
        self.focus.reconcile(service.board());
        signal
    }

    fn on_browsing<S: BoardStore>(
        &mut self,
        service: &mut BoardService<S>,
        action: Action,
    ) -> Result<Signal, BoardError> {
        let board = service.board();
        match action {
            Action::FocusPrevColumn => self.focus.prev_column(board),
            Action::FocusNextColumn => self.focus.next_column(board),
            Action::FocusPrevTask => self.focus.prev_task(board),
            Action::FocusNextTask => self.focus.next_task(board),
            Action::BeginAdd => {
                let Some(column_id) = self.focus.column_id().cloned() else {
                    return Ok(Signal::Ignored);
                };
                self.mode = Mode::EditingTitle {
                    draft: Draft::new_task(column_id),
                };
            }
            Action::BeginEditTitle => match self.focused_task(board) {
                Some(task) => {
                    self.mode = Mode::EditingTitle {
                        draft: Draft::existing(task),
                    }
                }
                None => self.message = Some(StatusMessage::info(NO_TASK_SELECTED)),
            },
            Action::BeginEditDescription => match self.focused_task(board) {
                Some(task) => {
                    self.mode = Mode::EditingDescription {
                        draft: Draft::existing(task),
                    }
                }
                None => self.message = Some(StatusMessage::info(NO_TASK_SELECTED)),
            },
            Action::BeginMove => match self.focused_task(board) {
                Some(task) => {
                    let target = board.column_index(&task.column_id).unwrap_or(0);
                    self.mode = Mode::SelectingMoveTarget {
                        task_id: task.id,
                        target,
                    };
                }
                None => self.message = Some(StatusMessage::info(NO_TASK_SELECTED)),
            },
            Action::BeginDelete => match self.focused_task(board) {
                Some(task) => self.mode = Mode::ConfirmingDelete { task_id: task.id },
                None => self.message = Some(StatusMessage::info(NO_TASK_SELECTED)),
            },
            Action::ReorderUp | Action::ReorderDown => {
                let Some(task) = self.focused_task(board) else {
                    self.message = Some(StatusMessage::info(NO_TASK_SELECTED));
                    return Ok(Signal::Render);
                };
                let id = task.id;
                let target = if action == Action::ReorderUp {
                    task.position.saturating_sub(1)
                } else {
                    task.position + 1
                };
                service.reorder_task(id, target)?;
                self.focus.focus_task(service.board(), id);
            }
            Action::Quit => return Ok(Signal::Quit),
            _ => return Ok(Signal::Ignored),
        }
        Ok(Signal::Render)
    }

    fn on_editing<S: BoardStore>(
        &mut self,
        service: &mut BoardService<S>,
        mut draft: Draft,
        field: Field,
        action: Action,
    ) -> Result<Signal, BoardError> {
        match action {
            Action::InputChar(c) => field_buffer(&mut draft, field).insert(c),
            Action::InputBackspace => field_buffer(&mut draft, field).backspace(),
            Action::InputLeft => field_buffer(&mut draft, field).move_left(),
            Action::InputRight => field_buffer(&mut draft, field).move_right(),
            Action::InputHome => field_buffer(&mut draft, field).home(),
            Action::InputEnd => field_buffer(&mut draft, field).end(),
            Action::AdvanceField if field == Field::Title && draft.is_new_task() => {
                self.mode = Mode::EditingDescription { draft };
                return Ok(Signal::Render);
            }
            Action::Confirm => {
                let id = commit_draft(service, &draft, field)?;
                self.focus.focus_task(service.board(), id);
                return Ok(Signal::Render);
            }
            Action::Cancel => return Ok(Signal::Render),
            _ => {
                self.mode = editing_mode(draft, field);
                return Ok(Signal::Ignored);
            }
        }
        self.mode = editing_mode(draft, field);
        Ok(Signal::Render)
    }

    fn on_selecting_target<S: BoardStore>(
        &mut self,
        service: &mut BoardService<S>,
        task_id: TaskId,
        target: usize,
        action: Action,
    ) -> Result<Signal, BoardError> {
        let column_count = service.board().columns().len();
        let next_target = match action {
            Action::TargetPrevColumn if column_count > 0 => {
                (target + column_count - 1) % column_count
            }
            Action::TargetNextColumn if column_count > 0 => (target + 1) % column_count,
            Action::JumpToColumn(index) if index < column_count => index,
            Action::Confirm => {
                let board = service.board();
                let column_id = board.columns().get(target).map(|column| column.id.clone());
                // Choosing the task's own column keeps its place.
                let same_column = board.locate(task_id).map(|(column, _)| column) == Some(target);
                if let Some(column_id) = column_id {
                    if !same_column {
                        service.move_task(task_id, &column_id, usize::MAX)?;
                    }
                    self.focus.focus_task(service.board(), task_id);
                }
                return Ok(Signal::Render);
            }
            Action::Cancel => return Ok(Signal::Render),
            _ => {
                self.mode = Mode::SelectingMoveTarget { task_id, target };
                return Ok(Signal::Ignored);
            }
        };
        self.mode = Mode::SelectingMoveTarget {
            task_id,
            target: next_target,
        };
        Ok(Signal::Render)
    }

    fn on_confirming_delete<S: BoardStore>(
        &mut self,
        service: &mut BoardService<S>,
        task_id: TaskId,
        action: Action,
    ) -> Result<Signal, BoardError> {
        match action {
            Action::Confirm => {
                let removed = service.delete_task(task_id)?;
                self.focus
                    .focus_nearest(service.board(), &removed.column_id, removed.position);
                Ok(Signal::Render)
            }
            Action::Cancel => Ok(Signal::Render),
            _ => {
                self.mode = Mode::ConfirmingDelete { task_id };
                Ok(Signal::Ignored)
            }
        }
    }

    fn focused_task<'a>(&self, board: &'a Board) -> Option<&'a Task> {
        self.focus.task_id().and_then(|id| board.task(id))
    }
}

fn field_buffer(draft: &mut Draft, field: Field) -> &mut TextBuffer {
    match field {
        Field::Title => &mut draft.title,
        Field::Description => &mut draft.description,
    }
}

fn editing_mode(draft: Draft, field: Field) -> Mode {
    match field {
        Field::Title => Mode::EditingTitle { draft },
        Field::Description => Mode::EditingDescription { draft },
    }
}

fn commit_draft<S: BoardStore>(
    service: &mut BoardService<S>,
    draft: &Draft,
    field: Field,
) -> Result<TaskId, BoardError> {
    match (&draft.target, field) {
        (DraftTarget::NewTask { column_id }, _) => service.add_task_with(
            column_id,
            draft.title.as_str(),
            Some(draft.description.as_str()),
        ),
        (DraftTarget::Existing { task_id }, Field::Title) => {
            service.edit_task(*task_id, Some(draft.title.as_str()), None)?;
            Ok(*task_id)
        }
        (DraftTarget::Existing { task_id }, Field::Description) => {
            service.edit_task(*task_id, None, Some(draft.description.as_str()))?;
            Ok(*task_id)
        }
    }
}
