//! Error types shared across storage, the graph engine, and the CLI.

use crate::domain::{ProjectId, TaskId, TaskListId};

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors this crate can produce.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Underlying I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization or deserialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Workspace configuration is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend failure that is not a lookup miss.
    #[error("storage error: {0}")]
    Storage(String),

    /// No project with the given id exists.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// No task list with the given id exists.
    #[error("task list not found: {0}")]
    TaskListNotFound(TaskListId),

    /// No task with the given id exists.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// A scope type other than `project` or `task_list` was requested.
    #[error("invalid scope type '{0}': expected 'project' or 'task_list'")]
    InvalidScope(String),

    /// A declared dependency does not resolve to a real task, or names the
    /// wrong task list for its target.
    #[error("invalid dependency on {task_id}: {reason}")]
    InvalidDependency {
        /// The dependency target that failed validation.
        task_id: TaskId,
        /// Human-readable explanation of the failure.
        reason: String,
    },

    /// Accepting a set of dependencies would make the graph cyclic.
    #[error("dependencies of {task_id} would create a cycle")]
    DependencyCycle {
        /// The task whose dependencies were rejected.
        task_id: TaskId,
    },

    /// A dependency set names the same target task more than once.
    #[error("duplicate dependency on {target} for task {task_id}")]
    DuplicateDependency {
        /// The task whose dependencies were rejected.
        task_id: TaskId,
        /// The target named more than once.
        target: TaskId,
    },

    /// The task cannot be deleted because other tasks depend on it.
    #[error("cannot delete {task_id}: {dependent_count} task(s) depend on it")]
    HasDependents {
        /// The deletion target.
        task_id: TaskId,
        /// Number of tasks that reference it.
        dependent_count: usize,
        /// The referencing tasks.
        dependents: Vec<TaskId>,
    },

    /// Priority outside the supported range.
    #[error("invalid priority {0}: must be 0-4")]
    InvalidPriority(u8),

    /// A create or update payload failed domain validation.
    #[error("validation error: {0}")]
    Validation(String),
}

impl From<trellis_jsonl::Error> for Error {
    fn from(err: trellis_jsonl::Error) -> Self {
        match err {
            trellis_jsonl::Error::Io(io) => Error::Io(io),
            trellis_jsonl::Error::Json(json) => Error::Json(json),
            other => Error::Storage(other.to_string()),
        }
    }
}

impl Error {
    /// True when the error is a lookup miss for a project, task list, or task.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::ProjectNotFound(_) | Error::TaskListNotFound(_) | Error::TaskNotFound(_)
        )
    }

    /// True when the error rejects a proposed mutation while leaving stored
    /// state untouched.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Error::InvalidDependency { .. }
                | Error::DependencyCycle { .. }
                | Error::DuplicateDependency { .. }
                | Error::HasDependents { .. }
                | Error::InvalidPriority(_)
                | Error::Validation(_)
        )
    }
}
