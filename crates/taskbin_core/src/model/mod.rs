//! Domain model for projects, tasks and the snapshot that holds them.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep status as explicit enumerations mutated in place.
//!
//! # Invariants
//! - Every entity is identified by a stable `EntityId`.
//! - Removal to the bin is a status change, never a copy.

pub mod id;
pub(crate) mod lenient;
pub mod project;
pub mod snapshot;
pub mod task;
pub mod validation;
