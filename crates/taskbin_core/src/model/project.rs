//! Project domain model.
//!
//! # Responsibility
//! - Define the project record and its two-state lifecycle.
//! - Provide in-place soft-delete and recover helpers.
//!
//! # Invariants
//! - `id` and `created_at` never change after creation.
//! - `status == Deleted` if and only if `deleted_at` is set.
//! - Projects have no completed state.
//! - Decoding never rejects a project object over a field value; missing or
//!   mistyped fields take their defaults and show up in the invariant audit.

use crate::model::id::EntityId;
use crate::model::lenient::or_default;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a project.
///
/// Unknown values read from imported snapshots are kept in `Other` so they
/// survive a later export unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProjectStatus {
    Active,
    Deleted,
    Other(String),
}

impl ProjectStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::Deleted => "deleted",
            Self::Other(value) => value.as_str(),
        }
    }
}

/// A project decoded without a usable status carries an empty `Other`.
impl Default for ProjectStatus {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for ProjectStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "active" => Self::Active,
            "deleted" => Self::Deleted,
            _ => Self::Other(value),
        }
    }
}

impl From<ProjectStatus> for String {
    fn from(value: ProjectStatus) -> Self {
        match value {
            ProjectStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// A named container of tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default, deserialize_with = "or_default")]
    pub id: EntityId,
    /// Display name, trimmed at creation.
    #[serde(default, deserialize_with = "or_default")]
    pub name: String,
    #[serde(default, deserialize_with = "or_default")]
    pub status: ProjectStatus,
    /// Always set for projects created here; may be absent after an import.
    #[serde(
        default,
        deserialize_with = "or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Project {
    /// Creates an active project with a freshly generated id.
    ///
    /// Callers are expected to have validated `name` already.
    pub fn new(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: EntityId::generate(),
            name: name.into(),
            status: ProjectStatus::Active,
            created_at: Some(now),
            deleted_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ProjectStatus::Active
    }

    pub fn is_deleted(&self) -> bool {
        self.status == ProjectStatus::Deleted
    }

    /// Moves the project into the bin.
    pub fn soft_delete(&mut self, now: DateTime<Utc>) {
        self.status = ProjectStatus::Deleted;
        self.deleted_at = Some(now);
    }

    /// Brings the project back from the bin.
    pub fn recover(&mut self) {
        self.status = ProjectStatus::Active;
        self.deleted_at = None;
    }
}
