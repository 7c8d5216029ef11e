//! Pure lifecycle transitions over a snapshot.
//!
//! # Responsibility
//! - Compute the next snapshot for every lifecycle operation.
//! - Encode project-to-task cascade rules in one place.
//!
//! # Invariants
//! - Inputs are never mutated; a failed transition yields no snapshot.
//! - Project soft-delete overwrites every owned task's state except tasks
//!   already binned by an individual deletion.
//! - Project recovery only restores tasks deleted by the project cascade.
//! - Tasks are created in or recovered into active projects only.

use crate::model::id::EntityId;
use crate::model::project::Project;
use crate::model::snapshot::Snapshot;
use crate::model::task::{DeletedReason, Task};
use crate::model::validation::{
    normalize_project_name, normalize_task_description, project_is_usable,
};
use crate::service::error::{EngineError, EngineResult, PreconditionError};
use chrono::{DateTime, Utc};

/// Next snapshot plus the operation-specific result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition<T> {
    pub snapshot: Snapshot,
    pub value: T,
}

/// Result of a project soft-delete or recovery cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeReport {
    /// Project state after the transition.
    pub project: Project,
    /// Ids of tasks whose state the cascade changed.
    pub affected_tasks: Vec<EntityId>,
}

/// Result of a permanent project delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeReport {
    pub project: Project,
    pub removed_tasks: usize,
}

pub fn create_project(
    snapshot: &Snapshot,
    name: &str,
    now: DateTime<Utc>,
) -> EngineResult<Transition<Project>> {
    let name = normalize_project_name(name)?;
    let project = Project::new(name, now);

    let mut next = snapshot.clone();
    next.projects.push(project.clone());
    Ok(Transition {
        snapshot: next,
        value: project,
    })
}

pub fn create_task(
    snapshot: &Snapshot,
    project_id: &EntityId,
    description: &str,
    now: DateTime<Utc>,
) -> EngineResult<Transition<Task>> {
    let description = normalize_task_description(description)?;
    ensure_project_usable(snapshot, project_id)?;
    let task = Task::new(project_id.clone(), description, now);

    let mut next = snapshot.clone();
    next.tasks.push(task.clone());
    Ok(Transition {
        snapshot: next,
        value: task,
    })
}

pub fn set_task_completion(
    snapshot: &Snapshot,
    task_id: &EntityId,
    completed: bool,
) -> EngineResult<Transition<Task>> {
    update_task(snapshot, task_id, |task| {
        task.set_completion(completed);
    })
}

pub fn soft_delete_task(
    snapshot: &Snapshot,
    task_id: &EntityId,
    now: DateTime<Utc>,
) -> EngineResult<Transition<Task>> {
    update_task(snapshot, task_id, |task| {
        task.soft_delete(DeletedReason::IndividualDeletion, now);
    })
}

pub fn recover_task(snapshot: &Snapshot, task_id: &EntityId) -> EngineResult<Transition<Task>> {
    let task = snapshot
        .task(task_id)
        .ok_or_else(|| EngineError::task_not_found(task_id))?;
    ensure_project_usable(snapshot, &task.project_id)?;

    update_task(snapshot, task_id, Task::recover)
}

pub fn permanently_delete_task(
    snapshot: &Snapshot,
    task_id: &EntityId,
) -> EngineResult<Transition<Task>> {
    let position = snapshot
        .tasks
        .iter()
        .position(|task| &task.id == task_id)
        .ok_or_else(|| EngineError::task_not_found(task_id))?;

    let mut next = snapshot.clone();
    let removed = next.tasks.remove(position);
    Ok(Transition {
        snapshot: next,
        value: removed,
    })
}

pub fn soft_delete_project(
    snapshot: &Snapshot,
    project_id: &EntityId,
    now: DateTime<Utc>,
) -> EngineResult<Transition<CascadeReport>> {
    let mut next = snapshot.clone();
    let project = next
        .project_mut(project_id)
        .ok_or_else(|| EngineError::project_not_found(project_id))?;
    project.soft_delete(now);
    let project = project.clone();

    let mut affected_tasks = Vec::new();
    for task in next.tasks.iter_mut().filter(|task| {
        &task.project_id == project_id
            && !(task.is_deleted()
                && task.deleted_reason == Some(DeletedReason::IndividualDeletion))
    }) {
        task.soft_delete(DeletedReason::ProjectSoftDeleted, now);
        affected_tasks.push(task.id.clone());
    }

    Ok(Transition {
        snapshot: next,
        value: CascadeReport {
            project,
            affected_tasks,
        },
    })
}

pub fn recover_project(
    snapshot: &Snapshot,
    project_id: &EntityId,
) -> EngineResult<Transition<CascadeReport>> {
    let mut next = snapshot.clone();
    let project = next
        .project_mut(project_id)
        .ok_or_else(|| EngineError::project_not_found(project_id))?;
    project.recover();
    let project = project.clone();

    let mut affected_tasks = Vec::new();
    for task in next.tasks.iter_mut().filter(|task| {
        &task.project_id == project_id
            && task.deleted_reason == Some(DeletedReason::ProjectSoftDeleted)
    }) {
        task.recover();
        affected_tasks.push(task.id.clone());
    }

    Ok(Transition {
        snapshot: next,
        value: CascadeReport {
            project,
            affected_tasks,
        },
    })
}

pub fn permanently_delete_project(
    snapshot: &Snapshot,
    project_id: &EntityId,
) -> EngineResult<Transition<PurgeReport>> {
    let project = snapshot
        .project(project_id)
        .cloned()
        .ok_or_else(|| EngineError::project_not_found(project_id))?;

    let mut next = snapshot.clone();
    next.projects.retain(|candidate| &candidate.id != project_id);
    let before = next.tasks.len();
    next.tasks.retain(|task| &task.project_id != project_id);
    let removed_tasks = before - next.tasks.len();

    Ok(Transition {
        snapshot: next,
        value: PurgeReport {
            project,
            removed_tasks,
        },
    })
}

fn update_task(
    snapshot: &Snapshot,
    task_id: &EntityId,
    apply: impl FnOnce(&mut Task),
) -> EngineResult<Transition<Task>> {
    let mut next = snapshot.clone();
    let task = next
        .task_mut(task_id)
        .ok_or_else(|| EngineError::task_not_found(task_id))?;
    apply(task);
    let task = task.clone();
    Ok(Transition {
        snapshot: next,
        value: task,
    })
}

fn ensure_project_usable(snapshot: &Snapshot, project_id: &EntityId) -> EngineResult<()> {
    match snapshot.project(project_id) {
        None => Err(PreconditionError::ProjectMissing(project_id.clone()).into()),
        Some(project) if !project_is_usable(project) => {
            Err(PreconditionError::ProjectNotActive(project_id.clone()).into())
        }
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::TaskStatus;
    use crate::service::error::ErrorKind;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, minute, 0).unwrap()
    }

    fn seeded() -> (Snapshot, EntityId, EntityId) {
        let created = create_project(&Snapshot::default(), "A", at(0)).unwrap();
        let project_id = created.value.id.clone();
        let with_task = create_task(&created.snapshot, &project_id, "X", at(1)).unwrap();
        (with_task.snapshot, project_id, with_task.value.id)
    }

    #[test]
    fn transitions_do_not_touch_their_input() {
        let (snapshot, project_id, _) = seeded();
        let before = snapshot.clone();

        let _ = soft_delete_project(&snapshot, &project_id, at(2)).unwrap();
        assert_eq!(snapshot, before);
    }

    #[test]
    fn project_cascade_overrides_completed_but_keeps_individually_deleted_tasks() {
        let (snapshot, project_id, task_id) = seeded();
        let snapshot = set_task_completion(&snapshot, &task_id, true)
            .unwrap()
            .snapshot;
        let second = create_task(&snapshot, &project_id, "Y", at(3)).unwrap();
        let second_id = second.value.id.clone();
        let snapshot = soft_delete_task(&second.snapshot, &second_id, at(4))
            .unwrap()
            .snapshot;

        let deleted = soft_delete_project(&snapshot, &project_id, at(5)).unwrap();
        assert_eq!(deleted.value.affected_tasks, vec![task_id.clone()]);

        let completed = deleted.snapshot.task(&task_id).unwrap();
        assert_eq!(completed.status, TaskStatus::Deleted);
        assert!(!completed.is_completed);
        assert_eq!(completed.deleted_reason, Some(DeletedReason::ProjectSoftDeleted));
        assert_eq!(completed.deleted_at, Some(at(5)));

        let individual = deleted.snapshot.task(&second_id).unwrap();
        assert_eq!(individual.deleted_reason, Some(DeletedReason::IndividualDeletion));
        assert_eq!(individual.deleted_at, Some(at(4)));

        let recovered = recover_project(&deleted.snapshot, &project_id).unwrap();
        assert_eq!(recovered.value.affected_tasks, vec![task_id]);
        assert_eq!(
            recovered.snapshot.task(&second_id).unwrap().status,
            TaskStatus::Deleted
        );
    }

    #[test]
    fn create_task_checks_text_before_project_state() {
        let (snapshot, _, _) = seeded();
        let missing = EntityId::from("nope");

        let err = create_task(&snapshot, &missing, "  ", at(2)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = create_task(&snapshot, &missing, "real", at(2)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Precondition(PreconditionError::ProjectMissing(ref id)) if id == &missing
        ));
    }

    #[test]
    fn completion_toggle_on_deleted_task_only_records_flag() {
        let (snapshot, _, task_id) = seeded();
        let snapshot = soft_delete_task(&snapshot, &task_id, at(2))
            .unwrap()
            .snapshot;

        let toggled = set_task_completion(&snapshot, &task_id, true).unwrap();
        assert_eq!(toggled.value.status, TaskStatus::Deleted);
        assert!(toggled.value.is_completed);
        assert_eq!(
            toggled.value.deleted_reason,
            Some(DeletedReason::IndividualDeletion)
        );
    }

    #[test]
    fn permanent_project_delete_reports_removed_tasks() {
        let (snapshot, project_id, _) = seeded();
        let purged = permanently_delete_project(&snapshot, &project_id).unwrap();

        assert_eq!(purged.value.removed_tasks, 1);
        assert!(purged.snapshot.is_empty());
    }
}
