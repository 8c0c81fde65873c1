//! Active workspace lifecycle.
//!
//! # Responsibility
//! - Own the one active workspace and its loaded board.
//! - Switch workspaces so that a failed open or load leaves the current
//!   workspace in place.
//!
//! # Invariants
//! - Names are validated before any store is opened.
//! - The previous store is closed only after the replacement board loaded.
//! - The active workspace file is never deleted through the session.

pub mod locator;

use crate::error::ErrorKind;
use crate::model::board::Board;
use crate::model::workspace::{WorkspaceName, WorkspaceNameError};
use crate::repo::board_repo::{BoardStore, SqliteBoardStore, StoreError, StoreResult};
use crate::service::board_service::{BoardError, BoardService};
use locator::{WorkspaceEntry, WorkspaceLocator};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Result type used by session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors from workspace session operations.
#[derive(Debug)]
pub enum SessionError {
    /// Workspace name failed validation; nothing was opened.
    Validation(WorkspaceNameError),
    /// Store could not be opened or its board could not be loaded.
    WorkspaceUnavailable {
        workspace: WorkspaceName,
        source: BoardError,
    },
    WorkspaceNotFound(WorkspaceName),
    /// Refused to delete the workspace currently in use.
    ActiveWorkspace(WorkspaceName),
    /// Data directory could not be read or modified.
    Io(std::io::Error),
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::ActiveWorkspace(_) => ErrorKind::Validation,
            Self::WorkspaceUnavailable { .. } => ErrorKind::WorkspaceUnavailable,
            Self::WorkspaceNotFound(_) => ErrorKind::NotFound,
            Self::Io(_) => ErrorKind::StorageUnavailable,
        }
    }
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::WorkspaceUnavailable { workspace, source } => {
                write!(f, "workspace `{workspace}` unavailable: {source}")
            }
            Self::WorkspaceNotFound(workspace) => write!(f, "workspace `{workspace}` not found"),
            Self::ActiveWorkspace(workspace) => {
                write!(f, "workspace `{workspace}` is active and cannot be deleted")
            }
            Self::Io(err) => write!(f, "workspace i/o failed: {err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::WorkspaceUnavailable { source, .. } => Some(source),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<WorkspaceNameError> for SessionError {
    fn from(value: WorkspaceNameError) -> Self {
        Self::Validation(value)
    }
}

impl From<std::io::Error> for SessionError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Resolves a workspace name to an open board store.
pub trait StoreOpener {
    type Store: BoardStore;

    /// Opens, creating when missing, the store backing `workspace`.
    fn open(&self, workspace: &WorkspaceName) -> StoreResult<Self::Store>;
}

/// Opens one SQLite file per workspace under a data directory.
#[derive(Debug, Clone)]
pub struct SqliteStoreOpener {
    locator: WorkspaceLocator,
}

impl SqliteStoreOpener {
    pub fn new(locator: WorkspaceLocator) -> Self {
        Self { locator }
    }

    pub fn locator(&self) -> &WorkspaceLocator {
        &self.locator
    }
}

impl StoreOpener for SqliteStoreOpener {
    type Store = SqliteBoardStore;

    fn open(&self, workspace: &WorkspaceName) -> StoreResult<SqliteBoardStore> {
        self.locator.ensure_data_dir()?;
        if workspace == &WorkspaceName::default_workspace() {
            match self.locator.migrate_legacy(check_legacy_copy) {
                Ok(_) => {}
                Err(err @ StoreError::Io(_)) => return Err(err),
                // The legacy file stays where it is; the default workspace starts empty.
                Err(err) => warn!(
                    "event=legacy_migrate module=session status=skip workspace={workspace} error={err}"
                ),
            }
        }
        SqliteBoardStore::open(self.locator.db_path(workspace))
    }
}

/// Opens a staged legacy copy, migrating it, and checks that its rows decode.
fn check_legacy_copy(path: &Path) -> StoreResult<()> {
    let mut store = SqliteBoardStore::open(path)?;
    store.fetch_columns()?;
    store.fetch_tasks()?;
    store.close();
    Ok(())
}

/// The active workspace and its board.
pub struct WorkspaceSession<O: StoreOpener> {
    opener: O,
    workspace: WorkspaceName,
    service: BoardService<O::Store>,
}

impl<O: StoreOpener> WorkspaceSession<O> {
    /// Opens `workspace` as the first active workspace.
    pub fn open(opener: O, workspace: &str) -> SessionResult<Self> {
        let workspace = WorkspaceName::parse(workspace)?;
        let service = load_workspace(&opener, &workspace)?;
        info!("event=workspace_open module=session status=ok workspace={workspace}");
        Ok(Self {
            opener,
            workspace,
            service,
        })
    }

    /// Makes `workspace` active.
    ///
    /// The name is validated before any storage access. The replacement board
    /// is fully loaded before the current one is released, so on error the
    /// session still points at the previous workspace.
    pub fn switch_to(&mut self, workspace: &str) -> SessionResult<()> {
        let workspace = WorkspaceName::parse(workspace)?;
        if workspace == self.workspace {
            return Ok(());
        }

        let service = load_workspace(&self.opener, &workspace)?;
        let mut previous = std::mem::replace(&mut self.service, service);
        previous.close();
        let from = std::mem::replace(&mut self.workspace, workspace);
        info!(
            "event=workspace_switch module=session status=ok from={from} to={}",
            self.workspace
        );
        Ok(())
    }

    /// Active workspace name and board.
    pub fn current(&self) -> (&WorkspaceName, &Board) {
        (&self.workspace, self.service.board())
    }

    pub fn workspace(&self) -> &WorkspaceName {
        &self.workspace
    }

    pub fn board(&self) -> &Board {
        self.service.board()
    }

    pub fn service(&self) -> &BoardService<O::Store> {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut BoardService<O::Store> {
        &mut self.service
    }

    pub fn opener(&self) -> &O {
        &self.opener
    }

    /// Closes the active store. The session is unusable for writes afterwards.
    pub fn close(&mut self) {
        self.service.close();
    }
}

impl WorkspaceSession<SqliteStoreOpener> {
    /// Workspaces on disk, sorted by name.
    pub fn list_workspaces(&self) -> SessionResult<Vec<WorkspaceEntry>> {
        Ok(self.opener.locator().list()?)
    }

    /// Deletes a workspace other than the active one.
    pub fn delete_workspace(&self, workspace: &str) -> SessionResult<()> {
        let workspace = WorkspaceName::parse(workspace)?;
        if workspace == self.workspace {
            return Err(SessionError::ActiveWorkspace(workspace));
        }
        delete_workspace_file(self.opener.locator(), &workspace)
    }
}

/// Deletes a workspace file without an open session.
pub fn delete_workspace(locator: &WorkspaceLocator, workspace: &str) -> SessionResult<()> {
    let workspace = WorkspaceName::parse(workspace)?;
    delete_workspace_file(locator, &workspace)
}

fn delete_workspace_file(locator: &WorkspaceLocator, workspace: &WorkspaceName) -> SessionResult<()> {
    if locator.delete(workspace)? {
        Ok(())
    } else {
        Err(SessionError::WorkspaceNotFound(workspace.clone()))
    }
}

fn load_workspace<O: StoreOpener>(
    opener: &O,
    workspace: &WorkspaceName,
) -> SessionResult<BoardService<O::Store>> {
    let unavailable = |source: BoardError| {
        error!(
            "event=workspace_open module=session status=error workspace={workspace} kind={} error={source}",
            source.kind()
        );
        SessionError::WorkspaceUnavailable {
            workspace: workspace.clone(),
            source,
        }
    };

    let store = opener
        .open(workspace)
        .map_err(|err| unavailable(err.into()))?;
    BoardService::load(store).map_err(unavailable)
}
