//! Snapshot root aggregate.
//!
//! # Responsibility
//! - Hold every project and task regardless of status.
//! - Offer lookups and an invariant audit over the whole aggregate.
//!
//! # Invariants
//! - The snapshot itself enforces no referential integrity; lifecycle
//!   services keep it consistent, relaxed imports may not.
//! - Element order is meaningful: it is the presentation order of lists.

use crate::model::id::EntityId;
use crate::model::project::{Project, ProjectStatus};
use crate::model::task::{Task, TaskStatus};
use crate::model::validation::is_non_empty_text;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};

/// Complete persisted state: `{ projects, tasks }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
}

/// One broken consistency rule found by [`Snapshot::check_invariants`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Project status and `deletedAt` disagree.
    ProjectDeletionMismatch(EntityId),
    /// Task status and `deletedReason` disagree.
    TaskDeletionMismatch(EntityId),
    /// Task points at a project that does not exist.
    OrphanTask {
        task_id: EntityId,
        project_id: EntityId,
    },
    /// Status value outside the known set.
    UnknownStatus { entity_id: EntityId, value: String },
    /// Required field was absent, blank or undecodable.
    IncompleteEntity {
        entity_id: EntityId,
        field: &'static str,
    },
}

impl Display for InvariantViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProjectDeletionMismatch(id) => {
                write!(f, "project {id}: status and deletedAt disagree")
            }
            Self::TaskDeletionMismatch(id) => {
                write!(f, "task {id}: status and deletedReason disagree")
            }
            Self::OrphanTask {
                task_id,
                project_id,
            } => write!(f, "task {task_id}: project {project_id} does not exist"),
            Self::UnknownStatus { entity_id, value } => {
                write!(f, "entity {entity_id}: unknown status `{value}`")
            }
            Self::IncompleteEntity { entity_id, field } => {
                write!(f, "entity {entity_id}: `{field}` is missing or unusable")
            }
        }
    }
}

impl Snapshot {
    /// Returns true when there is nothing to transfer.
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty() && self.tasks.is_empty()
    }

    pub fn project(&self, id: &EntityId) -> Option<&Project> {
        self.projects.iter().find(|project| &project.id == id)
    }

    pub fn project_mut(&mut self, id: &EntityId) -> Option<&mut Project> {
        self.projects.iter_mut().find(|project| &project.id == id)
    }

    pub fn task(&self, id: &EntityId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    pub fn task_mut(&mut self, id: &EntityId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| &task.id == id)
    }

    /// Iterates over all tasks owned by `project_id`, in snapshot order.
    pub fn tasks_of<'a>(&'a self, project_id: &'a EntityId) -> impl Iterator<Item = &'a Task> {
        self.tasks
            .iter()
            .filter(move |task| &task.project_id == project_id)
    }

    /// Audits the aggregate and returns every violation found.
    pub fn check_invariants(&self) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();
        let project_ids: HashSet<&EntityId> =
            self.projects.iter().map(|project| &project.id).collect();

        for project in &self.projects {
            audit_fields(
                &project.id,
                &[
                    ("name", is_non_empty_text(&project.name)),
                    ("createdAt", project.created_at.is_some()),
                ],
                &mut violations,
            );
            if let ProjectStatus::Other(value) = &project.status {
                violations.push(InvariantViolation::UnknownStatus {
                    entity_id: project.id.clone(),
                    value: value.clone(),
                });
            }
            if project.is_deleted() != project.deleted_at.is_some() {
                violations.push(InvariantViolation::ProjectDeletionMismatch(
                    project.id.clone(),
                ));
            }
        }

        for task in &self.tasks {
            audit_fields(
                &task.id,
                &[
                    ("description", is_non_empty_text(&task.description)),
                    ("createdAt", task.created_at.is_some()),
                ],
                &mut violations,
            );
            if let TaskStatus::Other(value) = &task.status {
                violations.push(InvariantViolation::UnknownStatus {
                    entity_id: task.id.clone(),
                    value: value.clone(),
                });
            }
            if task.is_deleted() != task.deleted_reason.is_some() {
                violations.push(InvariantViolation::TaskDeletionMismatch(task.id.clone()));
            }
            if !project_ids.contains(&task.project_id) {
                violations.push(InvariantViolation::OrphanTask {
                    task_id: task.id.clone(),
                    project_id: task.project_id.clone(),
                });
            }
        }

        violations
    }
}

fn audit_fields(
    entity_id: &EntityId,
    checks: &[(&'static str, bool)],
    violations: &mut Vec<InvariantViolation>,
) {
    let id_check = ("id", !entity_id.as_str().is_empty());
    for &(field, ok) in std::iter::once(&id_check).chain(checks) {
        if !ok {
            violations.push(InvariantViolation::IncompleteEntity {
                entity_id: entity_id.clone(),
                field,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{InvariantViolation, Snapshot};
    use crate::model::id::EntityId;
    use crate::model::project::Project;
    use crate::model::task::{DeletedReason, Task, TaskStatus};
    use chrono::Utc;

    #[test]
    fn empty_snapshot_is_empty_and_consistent() {
        let snapshot = Snapshot::default();
        assert!(snapshot.is_empty());
        assert!(snapshot.check_invariants().is_empty());
    }

    #[test]
    fn audit_reports_orphans_and_reason_mismatch() {
        let now = Utc::now();
        let project = Project::new("A", now);
        let mut orphan = Task::new(EntityId::from("missing"), "x", now);
        orphan.status = TaskStatus::Deleted;
        let mut reasoned = Task::new(project.id.clone(), "y", now);
        reasoned.deleted_reason = Some(DeletedReason::IndividualDeletion);

        let snapshot = Snapshot {
            projects: vec![project],
            tasks: vec![orphan.clone(), reasoned.clone()],
        };
        let violations = snapshot.check_invariants();

        assert!(violations.contains(&InvariantViolation::TaskDeletionMismatch(
            orphan.id.clone()
        )));
        assert!(violations.contains(&InvariantViolation::OrphanTask {
            task_id: orphan.id,
            project_id: EntityId::from("missing"),
        }));
        assert!(violations.contains(&InvariantViolation::TaskDeletionMismatch(reasoned.id)));
    }

    #[test]
    fn audit_reports_fields_an_import_left_empty() {
        let snapshot: Snapshot = serde_json::from_value(serde_json::json!({
            "projects": [{ "id": "p", "status": "active" }],
            "tasks": [{ "projectId": "p", "description": "  ", "status": "active",
                        "createdAt": "2026-01-01T00:00:00Z" }]
        }))
        .unwrap();

        let incomplete: Vec<(String, &str)> = snapshot
            .check_invariants()
            .into_iter()
            .filter_map(|violation| match violation {
                InvariantViolation::IncompleteEntity { entity_id, field } => {
                    Some((entity_id.to_string(), field))
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            incomplete,
            vec![
                ("p".to_string(), "name"),
                ("p".to_string(), "createdAt"),
                (String::new(), "id"),
                (String::new(), "description"),
            ]
        );
    }
}
