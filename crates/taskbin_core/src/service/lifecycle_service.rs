//! Lifecycle use-case service.
//!
//! # Responsibility
//! - Run every lifecycle operation as load, transition, persist, notify.
//! - Maintain session focus across mutations that change the active set.
//!
//! # Invariants
//! - A failed operation never writes and never notifies subscribers.
//! - Mutations take `&mut self`, so read-modify-write cycles never interleave.
//! - Subscribers observe the snapshot exactly as persisted.

use crate::model::id::EntityId;
use crate::model::project::Project;
use crate::model::snapshot::Snapshot;
use crate::model::task::Task;
use crate::repo::snapshot_repo::SnapshotRepository;
use crate::service::error::{EngineError, EngineResult};
use crate::service::session::Session;
use crate::service::transitions::{self, CascadeReport, PurgeReport, Transition};
use chrono::{DateTime, Utc};
use log::{error, info, warn};

/// Source of "now" for timestamps.
pub type Clock = Box<dyn Fn() -> DateTime<Utc>>;

/// Change callback receiving the persisted snapshot and the resulting focus.
pub type Subscriber = Box<dyn FnMut(&Snapshot, Option<&EntityId>)>;

/// Handle returned by [`LifecycleService::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Operation result paired with the focus after the operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<T> {
    pub value: T,
    pub focus: Option<EntityId>,
}

/// Lifecycle engine facade over a snapshot repository.
pub struct LifecycleService<R: SnapshotRepository> {
    pub(crate) repo: R,
    pub(crate) session: Session,
    clock: Clock,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl<R: SnapshotRepository> LifecycleService<R> {
    /// Creates a service with an empty session and the system clock.
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, Box::new(Utc::now))
    }

    /// Creates a service that stamps transitions with `clock`.
    pub fn with_clock(repo: R, clock: Clock) -> Self {
        Self {
            repo,
            session: Session::new(),
            clock,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Current focus without touching storage.
    pub fn focus(&self) -> Option<&EntityId> {
        self.session.focus()
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Loads the persisted snapshot.
    pub fn snapshot(&self) -> EngineResult<Snapshot> {
        self.repo.load().map_err(Into::into)
    }

    /// Registers a callback run after every successful mutation.
    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&Snapshot, Option<&EntityId>) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Removes a callback; returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(candidate, _)| *candidate != id);
        self.subscribers.len() != before
    }

    /// Creates an active project and focuses it.
    pub fn create_project(&mut self, name: &str) -> EngineResult<Outcome<Project>> {
        let transition = self.apply("project_create", |snapshot, now| {
            transitions::create_project(snapshot, name, now)
        })?;
        info!(
            "event=project_create module=lifecycle status=ok project_id={}",
            transition.value.id
        );
        self.session.set_focus(transition.value.id.clone());
        Ok(self.publish(transition))
    }

    /// Focuses an existing active project.
    pub fn select_project(&mut self, project_id: &EntityId) -> EngineResult<Project> {
        let snapshot = self.snapshot()?;
        let project = snapshot
            .project(project_id)
            .filter(|project| project.is_active())
            .cloned()
            .ok_or_else(|| EngineError::project_not_found(project_id))?;
        self.session.set_focus(project.id.clone());
        Ok(project)
    }

    /// Re-derives focus from the persisted active project set.
    pub fn resolve_focus(&mut self) -> EngineResult<Option<EntityId>> {
        let snapshot = self.snapshot()?;
        Ok(self.session.resolve(&snapshot).cloned())
    }

    /// Creates an active task under an active project.
    pub fn create_task(
        &mut self,
        project_id: &EntityId,
        description: &str,
    ) -> EngineResult<Outcome<Task>> {
        let transition = self.apply("task_create", |snapshot, now| {
            transitions::create_task(snapshot, project_id, description, now)
        })?;
        info!(
            "event=task_create module=lifecycle status=ok task_id={} project_id={}",
            transition.value.id, project_id
        );
        Ok(self.publish(transition))
    }

    /// Applies the completion toggle as a status transition.
    pub fn set_task_completion(
        &mut self,
        task_id: &EntityId,
        completed: bool,
    ) -> EngineResult<Outcome<Task>> {
        let transition = self.apply("task_completion", |snapshot, _| {
            transitions::set_task_completion(snapshot, task_id, completed)
        })?;
        info!(
            "event=task_completion module=lifecycle status=ok task_id={} completed={} task_status={}",
            task_id,
            completed,
            transition.value.status.as_str()
        );
        Ok(self.publish(transition))
    }

    /// Moves one task to the bin.
    pub fn soft_delete_task(&mut self, task_id: &EntityId) -> EngineResult<Outcome<Task>> {
        let transition = self.apply("task_soft_delete", |snapshot, now| {
            transitions::soft_delete_task(snapshot, task_id, now)
        })?;
        info!("event=task_soft_delete module=lifecycle status=ok task_id={task_id}");
        Ok(self.publish(transition))
    }

    /// Moves a project and all its tasks to the bin.
    pub fn soft_delete_project(
        &mut self,
        project_id: &EntityId,
    ) -> EngineResult<Outcome<CascadeReport>> {
        let transition = self.apply("project_soft_delete", |snapshot, now| {
            transitions::soft_delete_project(snapshot, project_id, now)
        })?;
        info!(
            "event=project_soft_delete module=lifecycle status=ok project_id={} cascaded_tasks={}",
            project_id,
            transition.value.affected_tasks.len()
        );
        self.session.release(project_id);
        self.session.resolve(&transition.snapshot);
        Ok(self.publish(transition))
    }

    /// Brings a project back along with the tasks its deletion cascaded to.
    pub fn recover_project(
        &mut self,
        project_id: &EntityId,
    ) -> EngineResult<Outcome<CascadeReport>> {
        let transition = self.apply("project_recover", |snapshot, _| {
            transitions::recover_project(snapshot, project_id)
        })?;
        info!(
            "event=project_recover module=lifecycle status=ok project_id={} restored_tasks={}",
            project_id,
            transition.value.affected_tasks.len()
        );
        if self.session.focus().is_none() {
            self.session.set_focus(project_id.clone());
        }
        self.session.resolve(&transition.snapshot);
        Ok(self.publish(transition))
    }

    /// Returns a binned task to its active project.
    pub fn recover_task(&mut self, task_id: &EntityId) -> EngineResult<Outcome<Task>> {
        let transition = self.apply("task_recover", |snapshot, _| {
            transitions::recover_task(snapshot, task_id)
        })?;
        info!("event=task_recover module=lifecycle status=ok task_id={task_id}");
        Ok(self.publish(transition))
    }

    /// Irrevocably removes a project and every task referencing it.
    pub fn permanently_delete_project(
        &mut self,
        project_id: &EntityId,
    ) -> EngineResult<Outcome<PurgeReport>> {
        let transition = self.apply("project_purge", |snapshot, _| {
            transitions::permanently_delete_project(snapshot, project_id)
        })?;
        info!(
            "event=project_purge module=lifecycle status=ok project_id={} removed_tasks={}",
            project_id, transition.value.removed_tasks
        );
        self.session.release(project_id);
        self.session.resolve(&transition.snapshot);
        Ok(self.publish(transition))
    }

    /// Irrevocably removes one task.
    pub fn permanently_delete_task(&mut self, task_id: &EntityId) -> EngineResult<Outcome<Task>> {
        let transition = self.apply("task_purge", |snapshot, _| {
            transitions::permanently_delete_task(snapshot, task_id)
        })?;
        info!("event=task_purge module=lifecycle status=ok task_id={task_id}");
        Ok(self.publish(transition))
    }

    /// Loads, transitions and persists. Nothing is written on error.
    pub(crate) fn apply<T>(
        &mut self,
        operation: &'static str,
        transition: impl FnOnce(&Snapshot, DateTime<Utc>) -> EngineResult<Transition<T>>,
    ) -> EngineResult<Transition<T>> {
        let current = self.snapshot().inspect_err(|err| {
            error!(
                "event={operation} module=lifecycle status=error error_code=load_failed error={err}"
            );
        })?;

        let next = transition(&current, self.now()).inspect_err(|err| {
            warn!(
                "event={operation} module=lifecycle status=error error_code={} error={err}",
                err.kind().as_str()
            );
        })?;

        if let Err(err) = self.repo.replace(&next.snapshot) {
            error!(
                "event={operation} module=lifecycle status=error error_code=persist_failed error={err}"
            );
            return Err(err.into());
        }
        Ok(next)
    }

    /// Notifies subscribers and wraps the value with the current focus.
    pub(crate) fn publish<T>(&mut self, transition: Transition<T>) -> Outcome<T> {
        let focus = self.session.focus().cloned();
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&transition.snapshot, focus.as_ref());
        }
        Outcome {
            value: transition.value,
            focus,
        }
    }
}
