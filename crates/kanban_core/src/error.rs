//! Engine-wide error taxonomy.
//!
//! Each layer keeps its own error enum; `ErrorKind` is the coarse category
//! callers branch on without matching every variant.

use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Coarse failure category shared by board and session errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Input rejected before any state changed.
    Validation,
    /// Referenced task, column or workspace does not exist.
    NotFound,
    /// Durable store could not be reached or refused a write.
    StorageUnavailable,
    /// Stored rows cannot be decoded into a board.
    CorruptState,
    /// Workspace could not be opened or loaded.
    WorkspaceUnavailable,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::StorageUnavailable => "storage_unavailable",
            Self::CorruptState => "corrupt_state",
            Self::WorkspaceUnavailable => "workspace_unavailable",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
