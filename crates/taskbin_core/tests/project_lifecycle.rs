use chrono::{DateTime, Duration, TimeZone, Utc};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use taskbin_core::{
    DeletedReason, EngineError, EntityId, EntityKind, LifecycleService, MemorySnapshotRepository,
    ProjectStatus, Snapshot, TaskStatus,
};

fn ticking_service() -> LifecycleService<MemorySnapshotRepository> {
    let start = Utc.with_ymd_and_hms(2026, 4, 1, 8, 0, 0).unwrap();
    let tick = Cell::new(0_i64);
    LifecycleService::with_clock(
        MemorySnapshotRepository::new(),
        Box::new(move || {
            tick.set(tick.get() + 1);
            start + Duration::minutes(tick.get())
        }),
    )
}

fn assert_consistent(snapshot: &Snapshot) {
    let violations = snapshot.check_invariants();
    assert!(violations.is_empty(), "unexpected violations: {violations:?}");
}

#[test]
fn create_project_trims_name_and_takes_focus() {
    let mut service = ticking_service();

    let first = service.create_project("  Launch  ").unwrap();
    assert_eq!(first.value.name, "Launch");
    assert_eq!(first.value.status, ProjectStatus::Active);
    assert_eq!(first.focus.as_ref(), Some(&first.value.id));

    let second = service.create_project("Hiring").unwrap();
    assert_eq!(second.focus.as_ref(), Some(&second.value.id));
    assert_eq!(service.active_projects().unwrap().len(), 2);
}

#[test]
fn create_project_rejects_blank_name_without_writing() {
    let mut service = ticking_service();

    let err = service.create_project(" \t ").unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    assert!(service.snapshot().unwrap().is_empty());
    assert_eq!(service.focus(), None);
}

#[test]
fn select_project_requires_existing_active_project() {
    let mut service = ticking_service();
    let a = service.create_project("A").unwrap().value;
    let b = service.create_project("B").unwrap().value;

    service.select_project(&a.id).unwrap();
    assert_eq!(service.focus(), Some(&a.id));

    service.soft_delete_project(&b.id).unwrap();
    let err = service.select_project(&b.id).unwrap_err();
    assert!(matches!(
        err,
        EngineError::NotFound { kind: EntityKind::Project, ref id } if id == &b.id
    ));
    let err = service.select_project(&EntityId::from("ghost")).unwrap_err();
    assert!(matches!(err, EngineError::NotFound { .. }));
    assert_eq!(service.focus(), Some(&a.id));
}

#[test]
fn soft_delete_project_cascades_to_every_task() {
    let mut service = ticking_service();
    let project = service.create_project("A").unwrap().value;
    let x = service.create_task(&project.id, "X").unwrap().value;
    assert_eq!(x.status, TaskStatus::Active);

    let outcome = service.soft_delete_project(&project.id).unwrap();
    assert_eq!(outcome.value.affected_tasks, vec![x.id.clone()]);
    assert_eq!(outcome.value.project.status, ProjectStatus::Deleted);
    assert!(outcome.value.project.deleted_at.is_some());

    let snapshot = service.snapshot().unwrap();
    let task = snapshot.task(&x.id).unwrap();
    assert_eq!(task.status, TaskStatus::Deleted);
    assert_eq!(task.deleted_reason, Some(DeletedReason::ProjectSoftDeleted));
    assert!(!task.is_completed);
    assert_consistent(&snapshot);

    service.recover_project(&project.id).unwrap();
    let snapshot = service.snapshot().unwrap();
    let task = snapshot.task(&x.id).unwrap();
    assert_eq!(task.status, TaskStatus::Active);
    assert!(!task.is_completed);
    assert_eq!(task.deleted_reason, None);
    assert_eq!(task.deleted_at, None);
    assert_eq!(snapshot.project(&project.id).unwrap().deleted_at, None);
    assert_consistent(&snapshot);
}

#[test]
fn recover_project_leaves_individually_deleted_tasks_in_bin() {
    let mut service = ticking_service();
    let launch = service.create_project("Launch").unwrap().value;
    let copy = service.create_task(&launch.id, "Write copy").unwrap().value;
    let other = service.create_task(&launch.id, "Ship").unwrap().value;

    service.soft_delete_task(&copy.id).unwrap();
    service.soft_delete_project(&launch.id).unwrap();
    let outcome = service.recover_project(&launch.id).unwrap();
    assert_eq!(outcome.value.affected_tasks, vec![other.id.clone()]);

    let snapshot = service.snapshot().unwrap();
    let copy = snapshot.task(&copy.id).unwrap();
    assert_eq!(copy.status, TaskStatus::Deleted);
    assert_eq!(copy.deleted_reason, Some(DeletedReason::IndividualDeletion));
    assert_eq!(snapshot.task(&other.id).unwrap().status, TaskStatus::Active);
}

#[test]
fn project_cascade_then_recover_returns_completed_tasks_as_active() {
    let mut service = ticking_service();
    let project = service.create_project("A").unwrap().value;
    let task = service.create_task(&project.id, "done already").unwrap().value;
    service.set_task_completion(&task.id, true).unwrap();

    service.soft_delete_project(&project.id).unwrap();
    service.recover_project(&project.id).unwrap();

    let snapshot = service.snapshot().unwrap();
    let task = snapshot.task(&task.id).unwrap();
    assert_eq!(task.status, TaskStatus::Active);
    assert!(!task.is_completed);
}

#[test]
fn soft_delete_of_focused_project_moves_focus_to_first_active() {
    let mut service = ticking_service();
    let a = service.create_project("A").unwrap().value;
    let b = service.create_project("B").unwrap().value;
    let c = service.create_project("C").unwrap().value;
    assert_eq!(service.focus(), Some(&c.id));

    let outcome = service.soft_delete_project(&c.id).unwrap();
    assert_eq!(outcome.focus.as_ref(), Some(&a.id));

    service.select_project(&b.id).unwrap();
    let outcome = service.soft_delete_project(&a.id).unwrap();
    assert_eq!(outcome.focus.as_ref(), Some(&b.id));

    let outcome = service.soft_delete_project(&b.id).unwrap();
    assert_eq!(outcome.focus, None);
}

#[test]
fn recover_project_takes_focus_only_when_nothing_is_focused() {
    let mut service = ticking_service();
    let a = service.create_project("A").unwrap().value;
    service.soft_delete_project(&a.id).unwrap();
    assert_eq!(service.focus(), None);

    let outcome = service.recover_project(&a.id).unwrap();
    assert_eq!(outcome.focus.as_ref(), Some(&a.id));

    let b = service.create_project("B").unwrap().value;
    service.soft_delete_project(&a.id).unwrap();
    assert_eq!(service.focus(), Some(&b.id));
    let outcome = service.recover_project(&a.id).unwrap();
    assert_eq!(outcome.focus.as_ref(), Some(&b.id));
}

#[test]
fn permanently_delete_project_removes_all_referencing_tasks() {
    let mut service = ticking_service();
    let keep = service.create_project("Keep").unwrap().value;
    let kept_task = service.create_task(&keep.id, "stay").unwrap().value;
    let doomed = service.create_project("Doomed").unwrap().value;
    service.create_task(&doomed.id, "active").unwrap();
    let completed = service.create_task(&doomed.id, "completed").unwrap().value;
    let deleted = service.create_task(&doomed.id, "deleted").unwrap().value;
    service.set_task_completion(&completed.id, true).unwrap();
    service.soft_delete_task(&deleted.id).unwrap();

    let outcome = service.permanently_delete_project(&doomed.id).unwrap();
    assert_eq!(outcome.value.removed_tasks, 3);
    assert_eq!(outcome.focus.as_ref(), Some(&keep.id));

    let snapshot = service.snapshot().unwrap();
    assert!(snapshot.project(&doomed.id).is_none());
    assert_eq!(snapshot.tasks_of(&doomed.id).count(), 0);
    assert!(snapshot.task(&kept_task.id).is_some());

    let err = service.permanently_delete_project(&doomed.id).unwrap_err();
    assert!(matches!(err, EngineError::NotFound { kind: EntityKind::Project, .. }));
}

#[test]
fn project_operations_on_missing_ids_fail_without_writing() {
    let mut service = ticking_service();
    service.create_project("A").unwrap();
    let before = service.snapshot().unwrap();
    let ghost = EntityId::from("ghost");

    assert!(matches!(
        service.soft_delete_project(&ghost),
        Err(EngineError::NotFound { .. })
    ));
    assert!(matches!(
        service.recover_project(&ghost),
        Err(EngineError::NotFound { .. })
    ));
    assert_eq!(service.snapshot().unwrap(), before);
}

#[test]
fn subscribers_see_each_successful_mutation_only() {
    let mut service = ticking_service();
    let seen: Rc<RefCell<Vec<(usize, Option<EntityId>)>>> = Rc::default();
    let sink = Rc::clone(&seen);
    let subscription = service.subscribe(move |snapshot, focus| {
        sink.borrow_mut()
            .push((snapshot.projects.len(), focus.cloned()));
    });

    let a = service.create_project("A").unwrap().value;
    let _ = service.create_project("");
    service.soft_delete_project(&a.id).unwrap();
    assert_eq!(
        *seen.borrow(),
        vec![(1, Some(a.id.clone())), (1, None)]
    );

    assert!(service.unsubscribe(subscription));
    service.recover_project(&a.id).unwrap();
    assert_eq!(seen.borrow().len(), 2);
    assert!(!service.unsubscribe(subscription));
}

#[test]
fn deletion_timestamps_come_from_the_service_clock() {
    let at = Utc.with_ymd_and_hms(2026, 5, 5, 5, 5, 5).unwrap();
    let mut service = LifecycleService::with_clock(
        MemorySnapshotRepository::new(),
        Box::new(move || -> DateTime<Utc> { at }),
    );
    let project = service.create_project("A").unwrap().value;
    assert_eq!(project.created_at, Some(at));

    let deleted = service.soft_delete_project(&project.id).unwrap().value.project;
    assert_eq!(deleted.deleted_at, Some(at));
}
