//! Transient per-session state.
//!
//! # Invariants
//! - Focus is never persisted.
//! - After `resolve`, focus is either an active project or `None`.

use crate::model::id::EntityId;
use crate::model::snapshot::Snapshot;

/// In-memory session owned by one lifecycle service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    focus: Option<EntityId>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Project currently presented to the user.
    pub fn focus(&self) -> Option<&EntityId> {
        self.focus.as_ref()
    }

    pub fn set_focus(&mut self, project_id: EntityId) {
        self.focus = Some(project_id);
    }

    pub fn clear_focus(&mut self) {
        self.focus = None;
    }

    /// Clears focus when it points at `project_id`.
    pub fn release(&mut self, project_id: &EntityId) {
        if self.focus.as_ref() == Some(project_id) {
            self.focus = None;
        }
    }

    /// Keeps focus on an active project, else moves it to the first active
    /// project in snapshot order, else clears it.
    pub fn resolve(&mut self, snapshot: &Snapshot) -> Option<&EntityId> {
        let still_active = self
            .focus
            .as_ref()
            .and_then(|id| snapshot.project(id))
            .is_some_and(|project| project.is_active());

        if !still_active {
            self.focus = snapshot
                .projects
                .iter()
                .find(|project| project.is_active())
                .map(|project| project.id.clone());
        }
        self.focus.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::Session;
    use crate::model::project::Project;
    use crate::model::snapshot::Snapshot;
    use chrono::Utc;

    #[test]
    fn resolve_moves_to_first_active_project() {
        let now = Utc::now();
        let mut gone = Project::new("gone", now);
        gone.soft_delete(now);
        let first = Project::new("first", now);
        let second = Project::new("second", now);
        let snapshot = Snapshot {
            projects: vec![gone.clone(), first.clone(), second],
            tasks: Vec::new(),
        };

        let mut session = Session::new();
        session.set_focus(gone.id.clone());
        assert_eq!(session.resolve(&snapshot), Some(&first.id));
    }

    #[test]
    fn resolve_keeps_active_focus_and_clears_when_nothing_active() {
        let now = Utc::now();
        let first = Project::new("first", now);
        let second = Project::new("second", now);
        let mut snapshot = Snapshot {
            projects: vec![first, second.clone()],
            tasks: Vec::new(),
        };

        let mut session = Session::new();
        session.set_focus(second.id.clone());
        assert_eq!(session.resolve(&snapshot), Some(&second.id));

        for project in &mut snapshot.projects {
            project.soft_delete(now);
        }
        assert_eq!(session.resolve(&snapshot), None);
    }
}
