//! Engine facade driven by a terminal front end.
//!
//! # Responsibility
//! - Bind the workspace session to the interaction machine.
//! - Offer the four entry points a renderer needs: key events, semantic
//!   actions, workspace switches and snapshots.

use crate::interaction::action::Action;
use crate::interaction::keymap::map_key;
use crate::interaction::machine::{InteractionMachine, Signal};
use crate::interaction::snapshot::{BoardSnapshot, StatusMessage};
use crate::session::{SessionResult, StoreOpener, WorkspaceSession};
use crossterm::event::KeyEvent;

/// One running board view over an active workspace.
pub struct KanbanApp<O: StoreOpener> {
    session: WorkspaceSession<O>,
    machine: InteractionMachine,
}

impl<O: StoreOpener> KanbanApp<O> {
    /// Opens `workspace` and starts in `Browsing` with initial focus.
    pub fn open(opener: O, workspace: &str) -> SessionResult<Self> {
        Ok(Self::from_session(WorkspaceSession::open(opener, workspace)?))
    }

    pub fn from_session(session: WorkspaceSession<O>) -> Self {
        let machine = InteractionMachine::new(session.board());
        Self { session, machine }
    }

    /// Maps a key through the current mode and handles the resulting action.
    pub fn handle_key(&mut self, key: KeyEvent) -> Signal {
        let action = map_key(key, self.machine.mode());
        if action == Action::None {
            return Signal::Ignored;
        }
        self.handle_action(action)
    }

    pub fn handle_action(&mut self, action: Action) -> Signal {
        self.machine.handle(self.session.service_mut(), action)
    }

    /// Switches the active workspace.
    ///
    /// On success any in-progress interaction is dropped and focus starts
    /// over. On failure the current workspace, mode and focus stay as they
    /// were and the error is shown as a status message.
    pub fn switch_workspace(&mut self, workspace: &str) -> SessionResult<()> {
        match self.session.switch_to(workspace) {
            Ok(()) => {
                self.machine.reset(self.session.board());
                Ok(())
            }
            Err(err) => {
                self.machine.set_message(StatusMessage::error(err.to_string()));
                Err(err)
            }
        }
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot::capture(
            self.session.workspace(),
            self.session.board(),
            self.machine.focus(),
            self.machine.mode(),
            self.machine.message(),
        )
    }

    pub fn session(&self) -> &WorkspaceSession<O> {
        &self.session
    }

    pub fn machine(&self) -> &InteractionMachine {
        &self.machine
    }

    /// Closes the active store.
    pub fn close(&mut self) {
        self.session.close();
    }
}
