//! Snapshot repository contracts and implementations.
//!
//! # Responsibility
//! - Own the single persisted `{ projects, tasks }` document.
//! - Expose whole-document load and replace primitives.
//!
//! # Invariants
//! - `replace` is all-or-nothing as observed by any later `load`.
//! - Only the configured version-qualified key is ever read; documents
//!   stored under other keys are invisible.
//! - A stored document that fails to decode is reported, not masked as empty.

use crate::db::DbError;
use crate::model::snapshot::Snapshot;
use log::{debug, error};
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key of the current persisted layout.
pub const STORAGE_KEY: &str = "projectManagementData_v3";

pub type RepoResult<T> = Result<T, RepoError>;

/// Error raised by snapshot persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Persisted payload exists but cannot be decoded.
    InvalidData(String),
    /// Snapshot could not be encoded for storage.
    Encode(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted snapshot: {message}"),
            Self::Encode(err) => write!(f, "failed to encode snapshot: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence contract for the snapshot document.
pub trait SnapshotRepository {
    /// Loads the current snapshot; an unwritten store yields the empty one.
    fn load(&self) -> RepoResult<Snapshot>;
    /// Replaces the stored snapshot as a whole.
    fn replace(&self, snapshot: &Snapshot) -> RepoResult<()>;
}

impl<R: SnapshotRepository + ?Sized> SnapshotRepository for &R {
    fn load(&self) -> RepoResult<Snapshot> {
        (**self).load()
    }

    fn replace(&self, snapshot: &Snapshot) -> RepoResult<()> {
        (**self).replace(snapshot)
    }
}

/// SQLite-backed snapshot repository keyed by storage key.
pub struct SqliteSnapshotRepository<'conn> {
    conn: &'conn Connection,
    storage_key: String,
}

impl<'conn> SqliteSnapshotRepository<'conn> {
    /// Creates a repository over a migrated connection using [`STORAGE_KEY`].
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_key(conn, STORAGE_KEY)
    }

    /// Creates a repository reading and writing under `storage_key`.
    pub fn with_key(conn: &'conn Connection, storage_key: impl Into<String>) -> Self {
        Self {
            conn,
            storage_key: storage_key.into(),
        }
    }

    pub fn storage_key(&self) -> &str {
        self.storage_key.as_str()
    }
}

impl SnapshotRepository for SqliteSnapshotRepository<'_> {
    fn load(&self) -> RepoResult<Snapshot> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM snapshots WHERE storage_key = ?1;",
                [self.storage_key.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        let Some(payload) = payload else {
            debug!(
                "event=snapshot_load module=repo status=ok key={} found=false",
                self.storage_key
            );
            return Ok(Snapshot::default());
        };

        let snapshot = serde_json::from_str::<Snapshot>(&payload).map_err(|err| {
            error!(
                "event=snapshot_load module=repo status=error key={} error_code=decode_failed",
                self.storage_key
            );
            RepoError::InvalidData(format!("{err} in snapshots.payload"))
        })?;

        debug!(
            "event=snapshot_load module=repo status=ok key={} projects={} tasks={}",
            self.storage_key,
            snapshot.projects.len(),
            snapshot.tasks.len()
        );
        Ok(snapshot)
    }

    fn replace(&self, snapshot: &Snapshot) -> RepoResult<()> {
        let payload = serde_json::to_string(snapshot).map_err(RepoError::Encode)?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO snapshots (storage_key, payload, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(storage_key) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at;",
            params![self.storage_key.as_str(), payload],
        )?;
        tx.commit()?;

        debug!(
            "event=snapshot_replace module=repo status=ok key={} projects={} tasks={}",
            self.storage_key,
            snapshot.projects.len(),
            snapshot.tasks.len()
        );
        Ok(())
    }
}

/// In-process snapshot repository.
#[derive(Debug, Default)]
pub struct MemorySnapshotRepository {
    snapshot: RefCell<Snapshot>,
}

impl MemorySnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-seeded with `snapshot`.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            snapshot: RefCell::new(snapshot),
        }
    }
}

impl SnapshotRepository for MemorySnapshotRepository {
    fn load(&self) -> RepoResult<Snapshot> {
        Ok(self.snapshot.borrow().clone())
    }

    fn replace(&self, snapshot: &Snapshot) -> RepoResult<()> {
        *self.snapshot.borrow_mut() = snapshot.clone();
        Ok(())
    }
}
