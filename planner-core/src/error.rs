//! Error types for the planner store.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// The kind of record an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Login,
    User,
    Calendar,
    Item,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ResourceKind::Login => "login",
            ResourceKind::User => "user",
            ResourceKind::Calendar => "calendar",
            ResourceKind::Item => "item",
        };
        f.write_str(name)
    }
}

/// Errors that can occur in planner operations.
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: ResourceKind, id: String },

    #[error("{kind} already exists: {id}")]
    AlreadyExists { kind: ResourceKind, id: String },

    #[error("Invalid name '{0}': only letters, digits, '+', '-' and '_' are allowed")]
    InvalidName(String),

    #[error("Storage failure at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt record {}: {reason}", path.display())]
    CorruptRecord { path: PathBuf, reason: String },

    #[error(
        "Data directory is in use by another planner process; if none is running, remove {}",
        lock_file.display()
    )]
    DirectoryInUse { lock_file: PathBuf },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Lock poisoned: {0}")]
    LockPoisoned(&'static str),
}

impl PlannerError {
    pub fn not_found(kind: ResourceKind, id: impl Into<String>) -> Self {
        PlannerError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn already_exists(kind: ResourceKind, id: impl Into<String>) -> Self {
        PlannerError::AlreadyExists {
            kind,
            id: id.into(),
        }
    }

    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PlannerError::Storage {
            path: path.into(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PlannerError::NotFound { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, PlannerError::AlreadyExists { .. })
    }
}

/// Result type alias for planner operations.
pub type PlannerResult<T> = Result<T, PlannerError>;
