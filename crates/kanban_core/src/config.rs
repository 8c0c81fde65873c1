//! Engine configuration.
//!
//! Defaults come first, then `CLI_KANBAN_HOME` / `CLI_KANBAN_LOG` from the
//! environment, then explicit overrides (CLI flags) through the `with_*`
//! builders.

use crate::logging::default_log_level;
use crate::model::workspace::DEFAULT_WORKSPACE;
use crate::session::locator::{default_data_dir, legacy_db_path, WorkspaceLocator};
use crate::session::SqliteStoreOpener;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Overrides the data directory.
pub const ENV_HOME: &str = "CLI_KANBAN_HOME";
/// Overrides the log level.
pub const ENV_LOG: &str = "CLI_KANBAN_LOG";

const LOG_DIR_NAME: &str = "logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Neither `CLI_KANBAN_HOME` nor a home directory is available.
    NoDataDir,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoDataDir => write!(
                f,
                "cannot determine data directory: set {ENV_HOME} or HOME"
            ),
        }
    }
}

impl Error for ConfigError {}

/// Resolved settings for one engine process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub data_dir: PathBuf,
    pub default_workspace: String,
    pub log_level: String,
    pub log_dir: PathBuf,
    /// Pre-workspace database copied into the default workspace once.
    pub legacy_db: Option<PathBuf>,
}

impl EngineConfig {
    /// Defaults rooted at `data_dir`, without legacy migration.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            log_dir: data_dir.join(LOG_DIR_NAME),
            data_dir,
            default_workspace: DEFAULT_WORKSPACE.to_string(),
            log_level: default_log_level().to_string(),
            legacy_db: None,
        }
    }

    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let explicit_home = lookup(ENV_HOME).filter(|value| !value.trim().is_empty());
        let mut config = match explicit_home {
            Some(dir) => Self::new(dir.trim()),
            None => {
                let mut config = Self::new(default_data_dir().ok_or(ConfigError::NoDataDir)?);
                config.legacy_db = legacy_db_path();
                config
            }
        };
        if let Some(level) = lookup(ENV_LOG).filter(|value| !value.trim().is_empty()) {
            config.log_level = level.trim().to_string();
        }
        Ok(config)
    }

    /// Moves data and logs under `data_dir` and turns legacy migration off.
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self.log_dir = self.data_dir.join(LOG_DIR_NAME);
        self.legacy_db = None;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn locator(&self) -> WorkspaceLocator {
        let locator = WorkspaceLocator::new(self.data_dir.clone());
        match &self.legacy_db {
            Some(legacy) => locator.with_legacy_db(legacy.clone()),
            None => locator,
        }
    }

    pub fn store_opener(&self) -> SqliteStoreOpener {
        SqliteStoreOpener::new(self.locator())
    }
}
