//! Validation predicates shared by every mutating operation.
//!
//! # Invariants
//! - Required text is checked after trimming.
//! - Only active projects accept new or recovered tasks.

use crate::model::project::Project;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation failure for user-supplied entity fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Project name is blank after trim.
    EmptyProjectName,
    /// Task description is blank after trim.
    EmptyTaskDescription,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyProjectName => write!(f, "project name cannot be empty"),
            Self::EmptyTaskDescription => write!(f, "task description cannot be empty"),
        }
    }
}

impl Error for ValidationError {}

/// Returns whether `value` has visible content.
pub fn is_non_empty_text(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Returns whether tasks may be created in or recovered into `project`.
pub fn project_is_usable(project: &Project) -> bool {
    project.is_active()
}

/// Trims a project name, rejecting blank input.
pub fn normalize_project_name(name: &str) -> Result<String, ValidationError> {
    if !is_non_empty_text(name) {
        return Err(ValidationError::EmptyProjectName);
    }
    Ok(name.trim().to_string())
}

/// Trims a task description, rejecting blank input.
pub fn normalize_task_description(description: &str) -> Result<String, ValidationError> {
    if !is_non_empty_text(description) {
        return Err(ValidationError::EmptyTaskDescription);
    }
    Ok(description.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::{is_non_empty_text, normalize_project_name, ValidationError};

    #[test]
    fn whitespace_only_text_is_empty() {
        assert!(!is_non_empty_text(" \t\n"));
        assert!(is_non_empty_text(" x "));
    }

    #[test]
    fn project_name_is_trimmed() {
        assert_eq!(normalize_project_name("  Launch ").unwrap(), "Launch");
        assert_eq!(
            normalize_project_name("   ").unwrap_err(),
            ValidationError::EmptyProjectName
        );
    }
}
