//! Task domain model.
//!
//! # Responsibility
//! - Define the task record, its three-state lifecycle and deletion reasons.
//! - Provide the single-task transitions used by lifecycle services.
//!
//! # Invariants
//! - `status == Deleted` if and only if `deleted_reason` is set.
//! - `deleted_at` is set only while the task is deleted.
//! - Completing a task never sets a deletion timestamp.
//! - Decoding never rejects a task object over a field value; missing or
//!   mistyped fields take their defaults and show up in the invariant audit.
//!
//! # State machine
//! - `active <-> completed` through the completion toggle.
//! - `active | completed -> deleted` through either soft-delete path.
//! - `deleted -> active` through recovery.

use crate::model::id::EntityId;
use crate::model::lenient::or_default;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    Active,
    /// Finished; shown in the task bin rather than the active list.
    Completed,
    Deleted,
    /// Unrecognized value carried over from an imported snapshot.
    Other(String),
}

impl TaskStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Deleted => "deleted",
            Self::Other(value) => value.as_str(),
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for TaskStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "active" => Self::Active,
            "completed" => Self::Completed,
            "deleted" => Self::Deleted,
            _ => Self::Other(value),
        }
    }
}

impl From<TaskStatus> for String {
    fn from(value: TaskStatus) -> Self {
        match value {
            TaskStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// Why a task landed in the bin.
///
/// Project recovery only restores tasks deleted by the project cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeletedReason {
    IndividualDeletion,
    ProjectSoftDeleted,
    Other(String),
}

impl DeletedReason {
    pub fn as_str(&self) -> &str {
        match self {
            Self::IndividualDeletion => "individual_deletion",
            Self::ProjectSoftDeleted => "project_soft_deleted",
            Self::Other(value) => value.as_str(),
        }
    }
}

impl From<String> for DeletedReason {
    fn from(value: String) -> Self {
        match value.as_str() {
            "individual_deletion" => Self::IndividualDeletion,
            "project_soft_deleted" => Self::ProjectSoftDeleted,
            _ => Self::Other(value),
        }
    }
}

impl From<DeletedReason> for String {
    fn from(value: DeletedReason) -> Self {
        match value {
            DeletedReason::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// A unit of work owned by one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default, deserialize_with = "or_default")]
    pub id: EntityId,
    /// Owning project. May dangle after a relaxed import.
    #[serde(default, deserialize_with = "or_default")]
    pub project_id: EntityId,
    #[serde(default, deserialize_with = "or_default")]
    pub description: String,
    #[serde(default, deserialize_with = "or_default")]
    pub is_completed: bool,
    #[serde(default, deserialize_with = "or_default")]
    pub status: TaskStatus,
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
    pub deleted_reason: Option<DeletedReason>,
    #[serde(
        default,
        deserialize_with = "or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates an active, not completed task under `project_id`.
    pub fn new(project_id: EntityId, description: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: EntityId::generate(),
            project_id,
            description: description.into(),
            is_completed: false,
            status: TaskStatus::Active,
            created_at: Some(now),
            deleted_reason: None,
            deleted_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == TaskStatus::Active
    }

    pub fn is_deleted(&self) -> bool {
        self.status == TaskStatus::Deleted
    }

    /// Whether the task belongs in the task bin view.
    pub fn is_binned(&self) -> bool {
        matches!(self.status, TaskStatus::Completed | TaskStatus::Deleted)
    }

    /// Applies the completion toggle.
    ///
    /// Only `active -> completed` and `completed -> active` change status;
    /// every other combination only records the flag. Returns whether the
    /// status moved.
    pub fn set_completion(&mut self, completed: bool) -> bool {
        self.is_completed = completed;
        match (completed, &self.status) {
            (true, TaskStatus::Active) => {
                self.status = TaskStatus::Completed;
                true
            }
            (false, TaskStatus::Completed) => {
                self.status = TaskStatus::Active;
                true
            }
            _ => false,
        }
    }

    /// Moves the task into the bin with the given reason.
    ///
    /// A binned task is no longer considered done, so the completion flag is
    /// cleared on every deletion path.
    pub fn soft_delete(&mut self, reason: DeletedReason, now: DateTime<Utc>) {
        self.status = TaskStatus::Deleted;
        self.is_completed = false;
        self.deleted_reason = Some(reason);
        self.deleted_at = Some(now);
    }

    /// Returns the task to the active list, keeping `is_completed` as is.
    pub fn recover(&mut self) {
        self.status = TaskStatus::Active;
        self.deleted_reason = None;
        self.deleted_at = None;
    }
}
