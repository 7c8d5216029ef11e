//! Error model for lifecycle and transfer operations.
//!
//! # Invariants
//! - Every failed operation leaves the persisted snapshot untouched.
//! - `ErrorKind` codes are stable strings for presentation layers.

use crate::model::id::EntityId;
use crate::model::validation::ValidationError;
use crate::repo::snapshot_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub type EngineResult<T> = Result<T, EngineError>;

/// Which kind of entity an id referred to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Project,
    Task,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Project => write!(f, "project"),
            Self::Task => write!(f, "task"),
        }
    }
}

/// Target exists (or is referenced) but is in the wrong state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    /// Parent project does not exist.
    ProjectMissing(EntityId),
    /// Parent project exists but is not active.
    ProjectNotActive(EntityId),
}

impl Display for PreconditionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProjectMissing(id) => write!(f, "project {id} does not exist"),
            Self::ProjectNotActive(id) => write!(f, "project {id} is not active"),
        }
    }
}

/// Stable classification of [`EngineError`] for callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Precondition,
    NotFound,
    Format,
    EmptyState,
    Storage,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation_error",
            Self::Precondition => "precondition_error",
            Self::NotFound => "not_found",
            Self::Format => "format_error",
            Self::EmptyState => "empty_state",
            Self::Storage => "storage_error",
        }
    }
}

/// Error returned by lifecycle and transfer operations.
#[derive(Debug)]
pub enum EngineError {
    /// Required text is empty.
    Validation(ValidationError),
    /// Operation target is in the wrong state.
    Precondition(PreconditionError),
    /// Referenced id is absent.
    NotFound { kind: EntityKind, id: EntityId },
    /// Imported document does not have the snapshot shape.
    Format(String),
    /// Export requested with nothing to export.
    EmptyState,
    /// Snapshot persistence failed.
    Repo(RepoError),
    /// Backup file could not be read or written.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl EngineError {
    pub fn project_not_found(id: &EntityId) -> Self {
        Self::NotFound {
            kind: EntityKind::Project,
            id: id.clone(),
        }
    }

    pub fn task_not_found(id: &EntityId) -> Self {
        Self::NotFound {
            kind: EntityKind::Task,
            id: id.clone(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Precondition(_) => ErrorKind::Precondition,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Format(_) => ErrorKind::Format,
            Self::EmptyState => ErrorKind::EmptyState,
            Self::Repo(_) | Self::Io { .. } => ErrorKind::Storage,
        }
    }
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Precondition(err) => write!(f, "precondition failed: {err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::Format(message) => write!(f, "invalid snapshot format: {message}"),
            Self::EmptyState => write!(f, "nothing to export: no projects and no tasks"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Io { path, source } => write!(f, "backup file `{}`: {source}", path.display()),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ValidationError> for EngineError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<PreconditionError> for EngineError {
    fn from(value: PreconditionError) -> Self {
        Self::Precondition(value)
    }
}

impl From<RepoError> for EngineError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}
