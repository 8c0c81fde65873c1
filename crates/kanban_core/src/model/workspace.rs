//! Workspace identity.
//!
//! # Responsibility
//! - Validate workspace names before any storage access happens.
//!
//! # Invariants
//! - A `WorkspaceName` always matches `^[a-z0-9_-]{1,32}$`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Name used when no workspace is selected explicitly.
pub const DEFAULT_WORKSPACE: &str = "default";

/// Pattern every workspace name must match.
pub const WORKSPACE_NAME_PATTERN: &str = r"^[a-z0-9_-]{1,32}$";

static WORKSPACE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(WORKSPACE_NAME_PATTERN).expect("valid workspace name regex"));

/// Rejected workspace name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceNameError {
    pub name: String,
}

impl Display for WorkspaceNameError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid workspace name `{}`: must match {WORKSPACE_NAME_PATTERN}",
            self.name
        )
    }
}

impl Error for WorkspaceNameError {}

/// Validated workspace identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct WorkspaceName(String);

impl WorkspaceName {
    /// Validates `name` against the workspace pattern.
    pub fn parse(name: impl Into<String>) -> Result<Self, WorkspaceNameError> {
        let name = name.into();
        if WORKSPACE_NAME_RE.is_match(&name) {
            Ok(Self(name))
        } else {
            Err(WorkspaceNameError { name })
        }
    }

    pub fn default_workspace() -> Self {
        Self(DEFAULT_WORKSPACE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for WorkspaceName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
