//! Exclusive ownership of a data directory.
//!
//! A store mirrors its directory in memory, so only one process may open a
//! directory for writing at a time. The server and the CLI both go through
//! `Store::open_exclusive`, which holds this lock for the store's lifetime.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::{PlannerError, PlannerResult};

const LOCK_FILE: &str = ".planner.lock";

/// A lock guard that releases the lock when dropped
#[derive(Debug)]
pub struct DirectoryLock {
    _file: File,
}

fn lock_path(data_dir: &Path) -> PlannerResult<PathBuf> {
    fs::create_dir_all(data_dir).map_err(|e| PlannerError::storage(data_dir, e))?;

    Ok(data_dir.join(LOCK_FILE))
}

/// Acquire an exclusive lock on `data_dir`, failing if another store holds it
pub fn acquire_lock(data_dir: &Path) -> PlannerResult<DirectoryLock> {
    let path = lock_path(data_dir)?;
    let file = File::create(&path).map_err(|e| PlannerError::storage(&path, e))?;

    file.try_lock_exclusive()
        .map_err(|_| PlannerError::DirectoryInUse { lock_file: path })?;

    Ok(DirectoryLock { _file: file })
}
