//! MCP request and response models.
//!
//! Request structs derive `Deserialize + JsonSchema` so rmcp can publish
//! their schemas; response types are thin serializable views over the
//! trellis domain types, optimized for MCP transport.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use trellis::domain::{
    Dependency, ExitCriterion, Project, Task, TaskList, TaskStatus,
};
use trellis::graph::{ReadinessMode, RenderFormat};

// ============================================================================
// Request parameters
// ============================================================================

/// Parameters for the `set_context` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SetContextParams {
    /// Path to the workspace root (the directory containing `.trellis/`).
    pub workspace_root: String,
}

/// Parameters for `create_project`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateProjectParams {
    /// Project name.
    pub name: String,
    /// Longer description.
    pub description: Option<String>,
    /// Workspace to operate on; defaults to the current context.
    pub workspace_root: Option<String>,
}

/// Parameters for `list_projects`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListProjectsParams {
    /// Workspace to operate on; defaults to the current context.
    pub workspace_root: Option<String>,
}

/// Parameters naming a single project.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ProjectIdParams {
    /// Project id.
    pub project_id: String,
    /// Workspace to operate on; defaults to the current context.
    pub workspace_root: Option<String>,
}

/// Parameters for `create_task_list`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateTaskListParams {
    /// List title.
    pub title: String,
    /// Owning project id; omit for a free-standing list.
    pub project_id: Option<String>,
    /// Longer description.
    pub description: Option<String>,
    /// Workspace to operate on; defaults to the current context.
    pub workspace_root: Option<String>,
}

/// Parameters for `list_task_lists`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListTaskListsParams {
    /// Restrict to lists owned by this project.
    pub project_id: Option<String>,
    /// Workspace to operate on; defaults to the current context.
    pub workspace_root: Option<String>,
}

/// Parameters naming a single task list.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TaskListIdParams {
    /// Task list id.
    pub task_list_id: String,
    /// Workspace to operate on; defaults to the current context.
    pub workspace_root: Option<String>,
}

/// Parameters for `create_task`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateTaskParams {
    /// Task list the task belongs to.
    pub task_list_id: String,
    /// Task title.
    pub title: String,
    /// Longer description.
    pub description: Option<String>,
    /// Priority 0 (highest) to 4 (lowest); defaults to 2.
    pub priority: Option<u8>,
    /// Ids of tasks this one depends on.
    pub depends_on: Option<Vec<String>>,
    /// Exit criteria that must hold before completion.
    pub exit_criteria: Option<Vec<String>>,
    /// Workspace to operate on; defaults to the current context.
    pub workspace_root: Option<String>,
}

/// Parameters naming a single task.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TaskIdParams {
    /// Task id.
    pub task_id: String,
    /// Workspace to operate on; defaults to the current context.
    pub workspace_root: Option<String>,
}

/// Parameters for `update_task`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdateTaskParams {
    /// Task id.
    pub task_id: String,
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New status: not_started, in_progress, blocked, or completed.
    pub status: Option<String>,
    /// New priority 0-4.
    pub priority: Option<u8>,
    /// Workspace to operate on; defaults to the current context.
    pub workspace_root: Option<String>,
}

/// Parameters for `set_task_dependencies`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SetTaskDependenciesParams {
    /// Task whose dependencies are being replaced.
    pub task_id: String,
    /// Ids of the tasks it now depends on; empty clears the set.
    pub depends_on: Vec<String>,
    /// Workspace to operate on; defaults to the current context.
    pub workspace_root: Option<String>,
}

/// Parameters for `get_ready_tasks`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ReadyParams {
    /// Scope type: `project` or `task_list`.
    pub scope_type: String,
    /// Id of the scoped entity.
    pub scope_id: String,
    /// Readiness mode: `single_agent` (default) or `multi_agent`.
    pub mode: Option<String>,
    /// Workspace to operate on; defaults to the current context.
    pub workspace_root: Option<String>,
}

/// Parameters for `analyze_graph`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AnalyzeParams {
    /// Scope type: `project` or `task_list`.
    pub scope_type: String,
    /// Id of the scoped entity.
    pub scope_id: String,
    /// Workspace to operate on; defaults to the current context.
    pub workspace_root: Option<String>,
}

/// Parameters for `render_graph`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RenderParams {
    /// Scope type: `project` or `task_list`.
    pub scope_type: String,
    /// Id of the scoped entity.
    pub scope_id: String,
    /// Output format: `ascii` (default), `dot`, or `mermaid`.
    pub format: Option<String>,
    /// Workspace to operate on; defaults to the current context.
    pub workspace_root: Option<String>,
}

// ============================================================================
// Responses
// ============================================================================

/// Response from the `set_context` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SetContextResponse {
    /// The workspace root that was set.
    pub workspace_root: String,
    /// The path to the data file.
    pub data_path: String,
    /// Status message.
    pub message: String,
}

/// Response from the `where_am_i` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WhereAmIResponse {
    /// The current workspace root, if set.
    pub workspace_root: Option<String>,
    /// The current data file path, if set.
    pub data_path: Option<String>,
    /// Whether a context is currently set.
    pub context_set: bool,
}

/// Response from the delete tools.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DeletedResponse {
    /// Id of the deleted entity.
    pub deleted: String,
}

/// Response from `render_graph`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RenderResponse {
    /// The format that was rendered.
    pub format: String,
    /// The rendered graph.
    pub graph: String,
}

/// Project representation for MCP responses.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpProject {
    /// Unique identifier.
    pub id: String,
    /// Project name.
    pub name: String,
    /// Project description.
    pub description: String,
    /// Creation timestamp (ISO 8601).
    pub created_at: String,
    /// Last update timestamp (ISO 8601).
    pub updated_at: String,
}

impl From<Project> for McpProject {
    fn from(project: Project) -> Self {
        Self {
            id: project.id.to_string(),
            name: project.name,
            description: project.description,
            created_at: project.created_at.to_rfc3339(),
            updated_at: project.updated_at.to_rfc3339(),
        }
    }
}

/// Task list representation for MCP responses.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpTaskList {
    /// Unique identifier.
    pub id: String,
    /// Owning project, if any.
    pub project_id: Option<String>,
    /// List title.
    pub title: String,
    /// List description.
    pub description: String,
    /// Creation timestamp (ISO 8601).
    pub created_at: String,
    /// Last update timestamp (ISO 8601).
    pub updated_at: String,
}

impl From<TaskList> for McpTaskList {
    fn from(list: TaskList) -> Self {
        Self {
            id: list.id.to_string(),
            project_id: list.project_id.map(|id| id.to_string()),
            title: list.title,
            description: list.description,
            created_at: list.created_at.to_rfc3339(),
            updated_at: list.updated_at.to_rfc3339(),
        }
    }
}

/// Task representation for MCP responses.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpTask {
    /// Unique identifier.
    pub id: String,
    /// The list this task belongs to.
    pub task_list_id: String,
    /// Task title.
    pub title: String,
    /// Task description.
    pub description: String,
    /// Current status.
    pub status: String,
    /// Priority level (0-4).
    pub priority: u8,
    /// Dependencies.
    pub dependencies: Vec<McpDependency>,
    /// Exit criteria.
    pub exit_criteria: Vec<McpExitCriterion>,
    /// Creation timestamp (ISO 8601).
    pub created_at: String,
    /// Last update timestamp (ISO 8601).
    pub updated_at: String,
    /// Completion timestamp (ISO 8601), if completed.
    pub completed_at: Option<String>,
}

impl From<Task> for McpTask {
    fn from(task: Task) -> Self {
        Self {
            id: task.id.to_string(),
            task_list_id: task.task_list_id.to_string(),
            title: task.title,
            description: task.description,
            status: task.status.as_str().to_string(),
            priority: task.priority,
            dependencies: task.dependencies.into_iter().map(Into::into).collect(),
            exit_criteria: task.exit_criteria.into_iter().map(Into::into).collect(),
            created_at: task.created_at.to_rfc3339(),
            updated_at: task.updated_at.to_rfc3339(),
            completed_at: task.completed_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Dependency representation for MCP responses.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpDependency {
    /// Id of the prerequisite task.
    pub task_id: String,
    /// Task list the prerequisite lives in.
    pub task_list_id: String,
}

impl From<Dependency> for McpDependency {
    fn from(dep: Dependency) -> Self {
        Self {
            task_id: dep.task_id.to_string(),
            task_list_id: dep.task_list_id.to_string(),
        }
    }
}

/// Exit criterion representation for MCP responses.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpExitCriterion {
    /// What must be true.
    pub description: String,
    /// Whether it currently holds.
    pub met: bool,
}

impl From<ExitCriterion> for McpExitCriterion {
    fn from(criterion: ExitCriterion) -> Self {
        Self {
            description: criterion.description,
            met: criterion.met,
        }
    }
}

// ============================================================================
// Wire-string parsing
// ============================================================================

/// Parse a status string into a `TaskStatus`, accepting hyphenated variants.
#[must_use]
pub fn parse_status(s: &str) -> Option<TaskStatus> {
    match s.to_lowercase().as_str() {
        "not_started" | "not-started" => Some(TaskStatus::NotStarted),
        "in_progress" | "in-progress" => Some(TaskStatus::InProgress),
        "blocked" => Some(TaskStatus::Blocked),
        "completed" => Some(TaskStatus::Completed),
        _ => None,
    }
}

/// Parse a readiness mode string into a `ReadinessMode`.
#[must_use]
pub fn parse_mode(s: &str) -> Option<ReadinessMode> {
    match s.to_lowercase().as_str() {
        "single_agent" | "single-agent" => Some(ReadinessMode::SingleAgent),
        "multi_agent" | "multi-agent" => Some(ReadinessMode::MultiAgent),
        _ => None,
    }
}

/// Parse a render format string into a `RenderFormat`.
#[must_use]
pub fn parse_format(s: &str) -> Option<RenderFormat> {
    match s.to_lowercase().as_str() {
        "ascii" => Some(RenderFormat::Ascii),
        "dot" => Some(RenderFormat::Dot),
        "mermaid" => Some(RenderFormat::Mermaid),
        _ => None,
    }
}
