//! Board interaction engine for a terminal kanban board.
//! This crate is the single source of truth for board invariants.

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod interaction;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod session;

pub use app::KanbanApp;
pub use config::{ConfigError, EngineConfig};
pub use error::ErrorKind;
pub use interaction::action::Action;
pub use interaction::machine::{InteractionMachine, Signal};
pub use interaction::mode::Mode;
pub use interaction::snapshot::{BoardSnapshot, MessageLevel, StatusMessage};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::board::{Board, Column, ColumnId, Task, TaskId};
pub use model::focus::Focus;
pub use model::workspace::{WorkspaceName, WorkspaceNameError, DEFAULT_WORKSPACE};
pub use repo::board_repo::{
    BoardStore, SqliteBoardStore, StoreBatch, StoreError, StoreOp, StoreResult,
};
pub use service::board_service::{BoardError, BoardResult, BoardService};
pub use session::locator::{WorkspaceEntry, WorkspaceLocator};
pub use session::{
    SessionError, SessionResult, SqliteStoreOpener, StoreOpener, WorkspaceSession,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
