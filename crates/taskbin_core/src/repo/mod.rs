//! Repository layer for snapshot persistence.
//!
//! # Responsibility
//! - Define the whole-document load/replace contract used by services.
//! - Isolate SQLite details from lifecycle orchestration.
//!
//! # Invariants
//! - Repositories never enforce referential integrity; services do.

pub mod snapshot_repo;
