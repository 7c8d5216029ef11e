//! Read-only projections for the three presentation views.
//!
//! # Responsibility
//! - Derive the active list, project bin and task bin from a snapshot.
//! - Keep list ordering rules in core so every caller renders alike.
//!
//! # Invariants
//! - Active projects keep snapshot order; focus resolution uses the same order.
//! - Active tasks are oldest first; both bins are newest first.

use crate::model::id::EntityId;
use crate::model::project::Project;
use crate::model::snapshot::Snapshot;
use crate::model::task::{DeletedReason, Task, TaskStatus};
use crate::model::validation::project_is_usable;
use crate::repo::snapshot_repo::SnapshotRepository;
use crate::service::error::EngineResult;
use crate::service::lifecycle_service::LifecycleService;
use std::cmp::Reverse;
use std::fmt::{Display, Formatter};

/// Label shown next to a task in the task bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinLabel {
    Finished,
    Deleted,
    DeletedWithProject,
}

impl Display for BinLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Finished => write!(f, "Finished"),
            Self::Deleted => write!(f, "Deleted"),
            Self::DeletedWithProject => write!(f, "Deleted (Project in Bin)"),
        }
    }
}

/// One row of the task bin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskBinEntry {
    pub task: Task,
    pub label: BinLabel,
    /// Parent project exists and is active, so recovery would succeed.
    pub recoverable: bool,
}

pub fn active_projects(snapshot: &Snapshot) -> Vec<Project> {
    snapshot
        .projects
        .iter()
        .filter(|project| project.is_active())
        .cloned()
        .collect()
}

pub fn active_tasks(snapshot: &Snapshot, project_id: &EntityId) -> Vec<Task> {
    let mut tasks: Vec<Task> = snapshot
        .tasks_of(project_id)
        .filter(|task| task.is_active())
        .cloned()
        .collect();
    tasks.sort_by_key(|task| task.created_at);
    tasks
}

pub fn project_bin(snapshot: &Snapshot) -> Vec<Project> {
    let mut projects: Vec<Project> = snapshot
        .projects
        .iter()
        .filter(|project| project.is_deleted())
        .cloned()
        .collect();
    projects.sort_by_key(|project| Reverse(project.deleted_at));
    projects
}

pub fn task_bin(snapshot: &Snapshot) -> Vec<TaskBinEntry> {
    let mut entries: Vec<TaskBinEntry> = snapshot
        .tasks
        .iter()
        .filter(|task| task.is_binned())
        .map(|task| TaskBinEntry {
            task: task.clone(),
            label: bin_label(task),
            recoverable: snapshot
                .project(&task.project_id)
                .is_some_and(project_is_usable),
        })
        .collect();
    entries.sort_by_key(|entry| Reverse(entry.task.deleted_at.or(entry.task.created_at)));
    entries
}

fn bin_label(task: &Task) -> BinLabel {
    match (&task.status, &task.deleted_reason) {
        (TaskStatus::Completed, _) => BinLabel::Finished,
        (_, Some(DeletedReason::ProjectSoftDeleted)) => BinLabel::DeletedWithProject,
        _ => BinLabel::Deleted,
    }
}

impl<R: SnapshotRepository> LifecycleService<R> {
    pub fn active_projects(&self) -> EngineResult<Vec<Project>> {
        Ok(active_projects(&self.snapshot()?))
    }

    pub fn active_tasks(&self, project_id: &EntityId) -> EngineResult<Vec<Task>> {
        Ok(active_tasks(&self.snapshot()?, project_id))
    }

    pub fn project_bin(&self) -> EngineResult<Vec<Project>> {
        Ok(project_bin(&self.snapshot()?))
    }

    pub fn task_bin(&self) -> EngineResult<Vec<TaskBinEntry>> {
        Ok(task_bin(&self.snapshot()?))
    }

    /// The focused project, if focus is set and the project still exists.
    pub fn focused_project(&self) -> EngineResult<Option<Project>> {
        let Some(focus) = self.session.focus() else {
            return Ok(None);
        };
        Ok(self.snapshot()?.project(focus).cloned())
    }
}
