//! Core domain model: projects, task lists, tasks, and the dependency edges
//! between tasks.
//!
//! A [`Project`] groups [`TaskList`]s, a task list groups [`Task`]s, and each
//! task carries the [`Dependency`] edges it is blocked on. Entities are plain
//! serde-friendly data; behavior lives in the storage and graph layers.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length for titles and project names.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length for free-form descriptions.
pub const MAX_DESCRIPTION_LENGTH: usize = 10_000;

/// Lowest (most urgent) priority value.
pub const MIN_PRIORITY: u8 = 0;

/// Highest (least urgent) priority value.
pub const MAX_PRIORITY: u8 = 4;

/// Priority assigned when a task is created without one.
pub const DEFAULT_PRIORITY: u8 = 2;

macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Wraps a raw identifier string.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrows the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

id_newtype! {
    /// Identifier of a [`Project`].
    ProjectId
}

id_newtype! {
    /// Identifier of a [`TaskList`].
    TaskListId
}

id_newtype! {
    /// Identifier of a [`Task`].
    TaskId
}

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Work has not begun.
    #[default]
    NotStarted,
    /// Work is underway.
    InProgress,
    /// Work is stalled on something outside the dependency graph.
    Blocked,
    /// Work is finished.
    Completed,
}

impl TaskStatus {
    /// All states, in lifecycle order.
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::NotStarted,
        TaskStatus::InProgress,
        TaskStatus::Blocked,
        TaskStatus::Completed,
    ];

    /// The wire label for this state, matching the serde representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "not_started",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Blocked => "blocked",
            TaskStatus::Completed => "completed",
        }
    }

    /// True once the task is finished.
    #[must_use]
    pub fn is_completed(self) -> bool {
        self == TaskStatus::Completed
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(TaskStatus::NotStarted),
            "in_progress" => Ok(TaskStatus::InProgress),
            "blocked" => Ok(TaskStatus::Blocked),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(format!(
                "unknown status '{other}': expected one of not_started, in_progress, blocked, completed"
            )),
        }
    }
}

/// A directed edge declaring that the owning task is blocked on `task_id`.
///
/// The `task_list_id` records which list the target belonged to when the edge
/// was declared; dependency validation rejects edges whose declared list no
/// longer matches the target's actual list.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Dependency {
    /// The prerequisite task.
    pub task_id: TaskId,
    /// The task list the prerequisite is declared to live in.
    pub task_list_id: TaskListId,
}

impl Dependency {
    /// Builds an edge to `task_id` in `task_list_id`.
    #[must_use]
    pub fn new(task_id: impl Into<TaskId>, task_list_id: impl Into<TaskListId>) -> Self {
        Self {
            task_id: task_id.into(),
            task_list_id: task_list_id.into(),
        }
    }
}

/// A checkable condition that must hold before a task counts as done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitCriterion {
    /// What must be true.
    pub description: String,
    /// Whether it currently holds.
    #[serde(default)]
    pub met: bool,
}

impl ExitCriterion {
    /// An unmet criterion with the given description.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            met: false,
        }
    }
}

/// Top-level grouping of task lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier.
    pub id: ProjectId,
    /// Short human-readable name.
    pub name: String,
    /// Longer free-form description.
    #[serde(default)]
    pub description: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// An ordered collection of tasks, optionally owned by a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskList {
    /// Unique identifier.
    pub id: TaskListId,
    /// Owning project, if any. Free-standing lists are allowed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    /// Short human-readable title.
    pub title: String,
    /// Longer free-form description.
    #[serde(default)]
    pub description: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// A single unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier.
    pub id: TaskId,
    /// The list this task belongs to.
    pub task_list_id: TaskListId,
    /// Short human-readable title.
    pub title: String,
    /// Longer free-form description.
    #[serde(default)]
    pub description: String,
    /// Lifecycle state.
    #[serde(default)]
    pub status: TaskStatus,
    /// Urgency from 0 (highest) to 4 (lowest).
    pub priority: u8,
    /// Tasks this one is blocked on.
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    /// Conditions that must hold before completion.
    #[serde(default)]
    pub exit_criteria: Vec<ExitCriterion>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
    /// Set when the task enters `Completed`, cleared when it leaves it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// True when every declared exit criterion is met (vacuously true when
    /// none are declared).
    #[must_use]
    pub fn exit_criteria_met(&self) -> bool {
        self.exit_criteria.iter().all(|c| c.met)
    }
}

pub(crate) fn validate_title(kind: &str, title: &str) -> Result<(), String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(format!("{kind} title cannot be empty"));
    }
    if trimmed.len() > MAX_TITLE_LENGTH {
        return Err(format!(
            "{kind} title exceeds {MAX_TITLE_LENGTH} characters"
        ));
    }
    Ok(())
}

pub(crate) fn validate_description(description: &str) -> Result<(), String> {
    if description.len() > MAX_DESCRIPTION_LENGTH {
        return Err(format!(
            "description exceeds {MAX_DESCRIPTION_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Payload for creating a [`Project`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProject {
    /// Project name.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: String,
}

impl NewProject {
    /// Checks field-level constraints before the store assigns an id.
    pub fn validate(&self) -> Result<(), String> {
        validate_title("project", &self.name)?;
        validate_description(&self.description)
    }
}

/// Payload for creating a [`TaskList`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTaskList {
    /// Owning project, if any.
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    /// List title.
    pub title: String,
    /// Optional description.
    #[serde(default)]
    pub description: String,
}

impl NewTaskList {
    /// Checks field-level constraints before the store assigns an id.
    pub fn validate(&self) -> Result<(), String> {
        validate_title("task list", &self.title)?;
        validate_description(&self.description)
    }
}

/// Payload for creating a [`Task`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    /// The list the task belongs to.
    pub task_list_id: TaskListId,
    /// Task title.
    pub title: String,
    /// Optional description.
    #[serde(default)]
    pub description: String,
    /// Urgency; defaults to [`DEFAULT_PRIORITY`] when omitted.
    #[serde(default)]
    pub priority: Option<u8>,
    /// Dependencies to declare at creation.
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    /// Exit criteria descriptions, all initially unmet.
    #[serde(default)]
    pub exit_criteria: Vec<String>,
}

impl NewTask {
    /// A task in `task_list_id` titled `title` with defaults everywhere else.
    #[must_use]
    pub fn new(task_list_id: impl Into<TaskListId>, title: impl Into<String>) -> Self {
        Self {
            task_list_id: task_list_id.into(),
            title: title.into(),
            description: String::new(),
            priority: None,
            dependencies: Vec::new(),
            exit_criteria: Vec::new(),
        }
    }

    /// Checks field-level constraints before the store assigns an id.
    pub fn validate(&self) -> Result<(), String> {
        validate_title("task", &self.title)?;
        validate_description(&self.description)
    }
}

/// Field-by-field patch for [`Task`]; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskUpdate {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// New lifecycle state.
    #[serde(default)]
    pub status: Option<TaskStatus>,
    /// New priority.
    #[serde(default)]
    pub priority: Option<u8>,
    /// Replacement exit criteria.
    #[serde(default)]
    pub exit_criteria: Option<Vec<ExitCriterion>>,
}

impl TaskUpdate {
    /// True when the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.exit_criteria.is_none()
    }
}

/// Field-by-field patch for [`Project`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectUpdate {
    /// New name.
    #[serde(default)]
    pub name: Option<String>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Field-by-field patch for [`TaskList`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskListUpdate {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
}
