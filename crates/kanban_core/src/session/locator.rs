//! Workspace file layout on disk.
//!
//! # Responsibility
//! - Map workspace names to database files inside one data directory.
//! - List and delete workspace files.
//! - Copy the legacy single-file database into the default workspace once.
//!
//! # Invariants
//! - Workspace files are named `cli_kanban__<name>.db`.
//! - Names returned by `list` always pass workspace name validation.
//! - A legacy copy only becomes the default workspace file after it passed
//!   validation; a rejected copy leaves nothing behind.

use crate::model::workspace::{WorkspaceName, DEFAULT_WORKSPACE};
use log::{info, warn};
use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind as IoErrorKind};
use std::path::{Path, PathBuf};

const DATA_DIR_NAME: &str = ".cli_kanban";
const LEGACY_DB_FILE_NAME: &str = ".cli_kanban.db";
const DB_FILE_PREFIX: &str = "cli_kanban__";
const DB_FILE_SUFFIX: &str = ".db";
const STAGING_SUFFIX: &str = ".import";
/// SQLite sidecar files removed together with a workspace database.
const DB_SIDECAR_SUFFIXES: [&str; 3] = ["-journal", "-wal", "-shm"];

/// `~/.cli_kanban`, when a home directory is known.
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DATA_DIR_NAME))
}

/// `~/.cli_kanban.db`, the pre-workspace database location.
pub fn legacy_db_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(LEGACY_DB_FILE_NAME))
}

/// One workspace listed on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceEntry {
    pub name: WorkspaceName,
    pub path: PathBuf,
}

/// Locates workspace database files under a data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceLocator {
    data_dir: PathBuf,
    legacy_db: Option<PathBuf>,
}

impl WorkspaceLocator {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            legacy_db: None,
        }
    }

    /// Enables the one-time copy of `legacy_db` into the default workspace.
    pub fn with_legacy_db(mut self, legacy_db: impl Into<PathBuf>) -> Self {
        self.legacy_db = Some(legacy_db.into());
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn db_path(&self, workspace: &WorkspaceName) -> PathBuf {
        self.data_dir
            .join(format!("{DB_FILE_PREFIX}{workspace}{DB_FILE_SUFFIX}"))
    }

    pub fn exists(&self, workspace: &WorkspaceName) -> bool {
        self.db_path(workspace).is_file()
    }

    pub fn ensure_data_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.data_dir)
    }

    /// Workspaces present in the data directory, sorted by name.
    ///
    /// A missing data directory lists as empty.
    pub fn list(&self) -> io::Result<Vec<WorkspaceEntry>> {
        let entries = match fs::read_dir(&self.data_dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == IoErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };

        let mut workspaces = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(name) = file_name
                .to_str()
                .and_then(|name| name.strip_prefix(DB_FILE_PREFIX))
                .and_then(|name| name.strip_suffix(DB_FILE_SUFFIX))
            else {
                continue;
            };
            match WorkspaceName::parse(name) {
                Ok(name) => workspaces.push(WorkspaceEntry {
                    name,
                    path: entry.path(),
                }),
                Err(err) => warn!("event=workspace_list module=session status=skip error={err}"),
            }
        }

        workspaces.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(workspaces)
    }

    /// Removes a workspace database and its SQLite sidecar files.
    ///
    /// Returns `Ok(false)` when the workspace has no database file.
    pub fn delete(&self, workspace: &WorkspaceName) -> io::Result<bool> {
        let path = self.db_path(workspace);
        if !remove_db_files(&path)? {
            return Ok(false);
        }

        info!(
            "event=workspace_delete module=session status=ok workspace={workspace} path={}",
            path.display()
        );
        Ok(true)
    }

    /// Copies the legacy database into the default workspace file.
    ///
    /// Does nothing when no legacy path is configured, the legacy file is
    /// absent, or the default workspace already has a file. Otherwise the
    /// legacy file is copied next to the target, handed to `validate`, and
    /// renamed into place only when `validate` succeeds. A failed copy or a
    /// rejected one is removed before the error is returned. Returns whether
    /// the default workspace file was created.
    pub fn migrate_legacy<E>(
        &self,
        validate: impl FnOnce(&Path) -> Result<(), E>,
    ) -> Result<bool, E>
    where
        E: From<io::Error>,
    {
        let Some(legacy) = self.legacy_db.as_deref() else {
            return Ok(false);
        };
        let target = self.db_path(&WorkspaceName::default_workspace());
        if target.exists() || !legacy.is_file() {
            return Ok(false);
        }

        self.ensure_data_dir()?;
        let mut staged = target.clone().into_os_string();
        staged.push(STAGING_SUFFIX);
        let staged = PathBuf::from(staged);
        // Leftover from an interrupted import.
        remove_db_files(&staged)?;
        copy_new_file(legacy, &staged)?;

        if let Err(err) = validate(&staged) {
            remove_db_files(&staged)?;
            return Err(err);
        }
        if let Err(err) = fs::rename(&staged, &target) {
            remove_db_files(&staged)?;
            return Err(err.into());
        }
        info!(
            "event=legacy_migrate module=session status=ok workspace={DEFAULT_WORKSPACE} from={} to={}",
            legacy.display(),
            target.display()
        );
        Ok(true)
    }
}

/// Removes a database file and its SQLite sidecars.
///
/// Returns `Ok(false)` when the database file did not exist.
fn remove_db_files(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(err) if err.kind() == IoErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    }

    for suffix in DB_SIDECAR_SUFFIXES {
        let mut sidecar = path.to_path_buf().into_os_string();
        sidecar.push(suffix);
        match fs::remove_file(&sidecar) {
            Ok(()) => {}
            Err(err) if err.kind() == IoErrorKind::NotFound => {}
            Err(err) => return Err(err),
        }
    }
    Ok(true)
}

/// Copies `src` to a not-yet-existing `dst`, removing `dst` on failure.
fn copy_new_file(src: &Path, dst: &Path) -> io::Result<()> {
    let mut source = fs::File::open(src)?;
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut target = options.open(dst)?;

    let result = io::copy(&mut source, &mut target).and_then(|_| target.sync_all());
    if let Err(err) = result {
        drop(target);
        let _ = fs::remove_file(dst);
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{default_data_dir, legacy_db_path, WorkspaceLocator, DB_FILE_PREFIX};
    use crate::model::workspace::WorkspaceName;
    use std::fs;

    #[test]
    fn default_paths_hang_off_os_home_dir() {
        let home = dirs::home_dir();
        assert_eq!(default_data_dir(), home.as_ref().map(|home| home.join(".cli_kanban")));
        assert_eq!(legacy_db_path(), home.map(|home| home.join(".cli_kanban.db")));
    }

    #[test]
    fn db_path_uses_prefixed_file_name() {
        let locator = WorkspaceLocator::new("/data");
        let name = WorkspaceName::parse("side_project").unwrap();
        assert_eq!(
            locator.db_path(&name),
            std::path::Path::new("/data").join(format!("{DB_FILE_PREFIX}side_project.db"))
        );
    }

    #[test]
    fn list_skips_foreign_and_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        for file in [
            "cli_kanban__work.db",
            "cli_kanban__alpha.db",
            "cli_kanban__Bad Name.db",
            "cli_kanban__.db",
            "notes.db",
            "cli_kanban__work.db-wal",
        ] {
            fs::write(dir.path().join(file), b"").unwrap();
        }
        fs::create_dir(dir.path().join("cli_kanban__folder.db")).unwrap();

        let locator = WorkspaceLocator::new(dir.path());
        let names: Vec<String> = locator
            .list()
            .unwrap()
            .into_iter()
            .map(|entry| entry.name.to_string())
            .collect();
        assert_eq!(names, ["alpha", "work"]);
    }

    #[test]
    fn list_of_missing_data_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let locator = WorkspaceLocator::new(dir.path().join("absent"));
        assert!(locator.list().unwrap().is_empty());
    }
}
