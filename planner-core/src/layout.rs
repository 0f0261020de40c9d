//! On-disk layout of a planner data directory.
//!
//! ```text
//! <root>/auth/<username>.toml
//! <root>/users/<username>.toml
//! <root>/calendars/<owner>/<name>.toml
//! ```

use std::path::{Path, PathBuf};

use crate::codec::RECORD_EXTENSION;
use crate::error::{PlannerError, PlannerResult};

const AUTH_DIR: &str = "auth";
const USERS_DIR: &str = "users";
const CALENDARS_DIR: &str = "calendars";

#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DataLayout { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn auth_dir(&self) -> PathBuf {
        self.root.join(AUTH_DIR)
    }

    pub fn users_dir(&self) -> PathBuf {
        self.root.join(USERS_DIR)
    }

    pub fn calendars_dir(&self) -> PathBuf {
        self.root.join(CALENDARS_DIR)
    }

    /// Create the root and the three resource directories if missing.
    pub fn ensure(&self) -> PlannerResult<()> {
        for dir in [self.auth_dir(), self.users_dir(), self.calendars_dir()] {
            std::fs::create_dir_all(&dir).map_err(|e| PlannerError::storage(&dir, e))?;
        }
        Ok(())
    }

    pub fn login_path(&self, username: &str) -> PathBuf {
        self.auth_dir().join(record_file(username))
    }

    pub fn user_path(&self, username: &str) -> PathBuf {
        self.users_dir().join(record_file(username))
    }

    /// Directory holding every calendar owned by `owner`.
    pub fn owner_dir(&self, owner: &str) -> PathBuf {
        self.calendars_dir().join(owner)
    }

    pub fn calendar_path(&self, owner: &str, name: &str) -> PathBuf {
        self.owner_dir(owner).join(record_file(name))
    }
}

fn record_file(stem: &str) -> String {
    format!("{stem}.{RECORD_EXTENSION}")
}

/// Whether `path` names a record file (not a leftover temp file).
pub(crate) fn is_record_file(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|e| e == RECORD_EXTENSION)
}
