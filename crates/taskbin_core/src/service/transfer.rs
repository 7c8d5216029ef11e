//! Snapshot export and import.
//!
//! # Responsibility
//! - Serialize the full snapshot for backup files.
//! - Replace the full snapshot from a backup after a structural check.
//!
//! # Invariants
//! - Export never transforms content; bins and active lists travel together.
//! - Import checks shape only: an object with `projects` and `tasks` arrays
//!   of objects. Orphaned tasks, unknown status values and entities with
//!   missing or mistyped fields are accepted and only counted.
//! - A rejected import leaves the stored snapshot and focus untouched.

use crate::model::snapshot::Snapshot;
use crate::repo::snapshot_repo::{RepoError, SnapshotRepository};
use crate::service::error::{EngineError, EngineResult};
use crate::service::lifecycle_service::{LifecycleService, Outcome};
use crate::service::transitions::Transition;
use chrono::NaiveDate;
use log::{error, info, warn};
use serde_json::Value;
use std::path::{Path, PathBuf};

const BACKUP_FILE_PREFIX: &str = "taskbin-backup";

/// Serialized snapshot ready to be written or downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotExport {
    /// Pretty-printed JSON in the persisted layout.
    pub json: String,
    /// Suggested file name embedding the export date.
    pub file_name: String,
}

/// Counts describing an applied import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub projects: usize,
    pub tasks: usize,
    /// Consistency findings in the imported data; informational only.
    pub invariant_violations: usize,
}

/// Returns the backup file name for `date`.
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("{BACKUP_FILE_PREFIX}-{}.json", date.format("%Y-%m-%d"))
}

/// Checks the candidate shape and decodes it.
///
/// Entity fields are decoded leniently, so only a non-object entry fails.
pub fn decode_candidate(candidate: Value) -> EngineResult<Snapshot> {
    let Value::Object(map) = &candidate else {
        return Err(EngineError::Format(
            "expected a JSON object with `projects` and `tasks`".to_string(),
        ));
    };
    for field in ["projects", "tasks"] {
        if !map.get(field).is_some_and(Value::is_array) {
            return Err(EngineError::Format(format!(
                "`{field}` must be present and be an array"
            )));
        }
    }

    serde_json::from_value::<Snapshot>(candidate)
        .map_err(|err| EngineError::Format(format!("entries must be JSON objects: {err}")))
}

impl<R: SnapshotRepository> LifecycleService<R> {
    /// Serializes the full current snapshot.
    pub fn export_snapshot(&self) -> EngineResult<SnapshotExport> {
        let snapshot = self.snapshot()?;
        if snapshot.is_empty() {
            warn!("event=snapshot_export module=transfer status=error error_code=empty_state");
            return Err(EngineError::EmptyState);
        }

        let json = serde_json::to_string_pretty(&snapshot)
            .map_err(|err| EngineError::Repo(RepoError::Encode(err)))?;
        info!(
            "event=snapshot_export module=transfer status=ok projects={} tasks={}",
            snapshot.projects.len(),
            snapshot.tasks.len()
        );
        Ok(SnapshotExport {
            json,
            file_name: backup_file_name(self.now().date_naive()),
        })
    }

    /// Imports JSON text; unparsable text is a format error.
    pub fn import_snapshot(&mut self, json: &str) -> EngineResult<Outcome<ImportSummary>> {
        let candidate = serde_json::from_str::<Value>(json).map_err(|err| {
            warn!("event=snapshot_import module=transfer status=error error_code=format_error");
            EngineError::Format(format!("not valid JSON: {err}"))
        })?;
        self.import_snapshot_value(candidate)
    }

    /// Replaces the whole snapshot with `candidate` and re-resolves focus.
    ///
    /// The current snapshot is not read, so a store holding an undecodable
    /// document can still be restored from a backup.
    pub fn import_snapshot_value(
        &mut self,
        candidate: Value,
    ) -> EngineResult<Outcome<ImportSummary>> {
        let snapshot = decode_candidate(candidate).inspect_err(|err| {
            warn!(
                "event=snapshot_import module=transfer status=error error_code={} error={err}",
                err.kind().as_str()
            );
        })?;
        let value = ImportSummary {
            projects: snapshot.projects.len(),
            tasks: snapshot.tasks.len(),
            invariant_violations: snapshot.check_invariants().len(),
        };

        if let Err(err) = self.repo.replace(&snapshot) {
            error!(
                "event=snapshot_import module=transfer status=error error_code=persist_failed error={err}"
            );
            return Err(err.into());
        }
        info!(
            "event=snapshot_import module=transfer status=ok projects={} tasks={} invariant_violations={}",
            value.projects, value.tasks, value.invariant_violations
        );

        self.session.clear_focus();
        self.session.resolve(&snapshot);
        Ok(self.publish(Transition { snapshot, value }))
    }

    /// Writes an export into `dir` and returns the file path.
    pub fn write_backup(&self, dir: impl AsRef<Path>) -> EngineResult<PathBuf> {
        let export = self.export_snapshot()?;
        let path = dir.as_ref().join(&export.file_name);
        std::fs::write(&path, export.json.as_bytes()).map_err(|source| EngineError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    /// Imports a backup file.
    pub fn read_backup(&mut self, path: impl AsRef<Path>) -> EngineResult<Outcome<ImportSummary>> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.import_snapshot(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::{backup_file_name, decode_candidate};
    use crate::service::error::ErrorKind;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn backup_file_name_embeds_date() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(backup_file_name(date), "taskbin-backup-2026-10-19.json");
    }

    #[test]
    fn shape_check_rejects_missing_or_non_array_sections() {
        for candidate in [
            json!([]),
            json!({ "projects": [] }),
            json!({ "projects": {}, "tasks": [] }),
            json!({ "projects": [], "tasks": "none" }),
        ] {
            let err = decode_candidate(candidate).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Format);
        }
    }

    #[test]
    fn entities_with_missing_fields_still_decode() {
        let snapshot = decode_candidate(json!({
            "projects": [{ "id": 1, "name": "Legacy", "status": "active" }],
            "tasks": [{ "id": 2, "projectId": 1, "description": "x", "isCompleted": "no" }]
        }))
        .unwrap();

        assert_eq!(snapshot.projects[0].created_at, None);
        assert!(snapshot.projects[0].is_active());
        assert!(!snapshot.tasks[0].is_completed);
        assert_eq!(snapshot.tasks[0].status.as_str(), "");

        let err = decode_candidate(json!({ "projects": ["Legacy"], "tasks": [] })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn shape_check_accepts_unknown_status_values() {
        let snapshot = decode_candidate(json!({
            "projects": [{
                "id": 1,
                "name": "Legacy",
                "status": "archived",
                "createdAt": "2024-05-01T10:00:00.000Z"
            }],
            "tasks": []
        }))
        .unwrap();

        assert_eq!(snapshot.projects[0].status.as_str(), "archived");
        assert_eq!(snapshot.projects[0].id.as_str(), "1");
    }
}
