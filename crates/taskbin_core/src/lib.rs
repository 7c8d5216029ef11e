//! Core domain logic for taskbin.
//! This crate is the single source of truth for project/task lifecycle rules.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::AppConfig;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::id::EntityId;
pub use model::project::{Project, ProjectStatus};
pub use model::snapshot::{InvariantViolation, Snapshot};
pub use model::task::{DeletedReason, Task, TaskStatus};
pub use model::validation::ValidationError;
pub use repo::snapshot_repo::{
    MemorySnapshotRepository, RepoError, RepoResult, SnapshotRepository,
    SqliteSnapshotRepository, STORAGE_KEY,
};
pub use service::error::{EngineError, EngineResult, EntityKind, ErrorKind, PreconditionError};
pub use service::lifecycle_service::{Clock, LifecycleService, Outcome, SubscriptionId};
pub use service::transfer::{backup_file_name, ImportSummary, SnapshotExport};
pub use service::transitions::{CascadeReport, PurgeReport};
pub use service::views::{BinLabel, TaskBinEntry};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
