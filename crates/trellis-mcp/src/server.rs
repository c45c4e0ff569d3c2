//! MCP server implementation.
//!
//! This module contains the main server setup using rmcp.

use crate::context::Context;
use crate::error::Error;
use crate::models::{
    AnalyzeParams, CreateProjectParams, CreateTaskListParams, CreateTaskParams, ListProjectsParams,
    ListTaskListsParams, ProjectIdParams, ReadyParams, RenderParams, SetContextParams,
    SetTaskDependenciesParams, TaskIdParams, TaskListIdParams, UpdateTaskParams,
};
use crate::tools::Tools;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{
    handler::server::ServerHandler, tool, tool_handler, tool_router, ErrorData as McpError,
};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Maps a tool error onto the MCP error space: caller mistakes (bad
/// arguments, rejected edges, unknown ids) become `invalid_params`,
/// everything else is an internal error.
fn to_mcp_error(e: &Error) -> McpError {
    if e.is_caller_fault() {
        McpError::invalid_params(e.to_string(), None)
    } else {
        McpError::internal_error(e.to_string(), None)
    }
}

/// The trellis MCP server.
///
/// Provides MCP protocol handling over stdio transport.
#[derive(Clone)]
pub struct TrellisMcpServer {
    /// Shared context for workspace management.
    context: Arc<RwLock<Context>>,
    /// Tool implementations.
    tools: Arc<Tools>,
    /// Tool router for MCP dispatch.
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl TrellisMcpServer {
    /// Set the workspace context for subsequent operations.
    #[tool(
        description = "Set the workspace root directory for all subsequent operations. Call this first before using other tools."
    )]
    async fn set_context(
        &self,
        Parameters(params): Parameters<SetContextParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.tools.set_context(&params.workspace_root).await {
            Ok(response) => Ok(CallToolResult::success(vec![Content::json(response)?])),
            Err(e) => Err(to_mcp_error(&e)),
        }
    }

    /// Get current workspace context information.
    #[tool(description = "Show current workspace context and data file path. Useful for debugging.")]
    async fn where_am_i(&self) -> Result<CallToolResult, McpError> {
        let response = self.tools.where_am_i().await;
        Ok(CallToolResult::success(vec![Content::json(response)?]))
    }

    /// Create a new project.
    #[tool(description = "Create a project, the top-level grouping for task lists.")]
    async fn create_project(
        &self,
        Parameters(params): Parameters<CreateProjectParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .tools
            .create_project(
                params.name,
                params.description,
                params.workspace_root.as_deref(),
            )
            .await
        {
            Ok(project) => Ok(CallToolResult::success(vec![Content::json(project)?])),
            Err(e) => Err(to_mcp_error(&e)),
        }
    }

    /// List all projects.
    #[tool(description = "List all projects in the workspace.")]
    async fn list_projects(
        &self,
        Parameters(params): Parameters<ListProjectsParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .tools
            .list_projects(params.workspace_root.as_deref())
            .await
        {
            Ok(projects) => Ok(CallToolResult::success(vec![Content::json(projects)?])),
            Err(e) => Err(to_mcp_error(&e)),
        }
    }

    /// Show a single project.
    #[tool(description = "Get a project by id.")]
    async fn get_project(
        &self,
        Parameters(params): Parameters<ProjectIdParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .tools
            .get_project(&params.project_id, params.workspace_root.as_deref())
            .await
        {
            Ok(project) => Ok(CallToolResult::success(vec![Content::json(project)?])),
            Err(e) => Err(to_mcp_error(&e)),
        }
    }

    /// Delete a project.
    #[tool(description = "Delete a project along with its task lists and their tasks.")]
    async fn delete_project(
        &self,
        Parameters(params): Parameters<ProjectIdParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .tools
            .delete_project(&params.project_id, params.workspace_root.as_deref())
            .await
        {
            Ok(deleted) => Ok(CallToolResult::success(vec![Content::json(deleted)?])),
            Err(e) => Err(to_mcp_error(&e)),
        }
    }

    /// Create a new task list.
    #[tool(
        description = "Create a task list, optionally under a project. Tasks always live in a task list."
    )]
    async fn create_task_list(
        &self,
        Parameters(params): Parameters<CreateTaskListParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .tools
            .create_task_list(
                params.title,
                params.project_id,
                params.description,
                params.workspace_root.as_deref(),
            )
            .await
        {
            Ok(list) => Ok(CallToolResult::success(vec![Content::json(list)?])),
            Err(e) => Err(to_mcp_error(&e)),
        }
    }

    /// List task lists.
    #[tool(description = "List task lists, optionally restricted to one project.")]
    async fn list_task_lists(
        &self,
        Parameters(params): Parameters<ListTaskListsParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .tools
            .list_task_lists(
                params.project_id.as_deref(),
                params.workspace_root.as_deref(),
            )
            .await
        {
            Ok(lists) => Ok(CallToolResult::success(vec![Content::json(lists)?])),
            Err(e) => Err(to_mcp_error(&e)),
        }
    }

    /// Show a single task list.
    #[tool(description = "Get a task list by id.")]
    async fn get_task_list(
        &self,
        Parameters(params): Parameters<TaskListIdParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .tools
            .get_task_list(&params.task_list_id, params.workspace_root.as_deref())
            .await
        {
            Ok(list) => Ok(CallToolResult::success(vec![Content::json(list)?])),
            Err(e) => Err(to_mcp_error(&e)),
        }
    }

    /// Delete a task list.
    #[tool(description = "Delete a task list and all of its tasks.")]
    async fn delete_task_list(
        &self,
        Parameters(params): Parameters<TaskListIdParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .tools
            .delete_task_list(&params.task_list_id, params.workspace_root.as_deref())
            .await
        {
            Ok(deleted) => Ok(CallToolResult::success(vec![Content::json(deleted)?])),
            Err(e) => Err(to_mcp_error(&e)),
        }
    }

    /// Create a new task.
    #[tool(
        description = "Create a task in a task list with optional priority, exit criteria, and dependencies. Dependencies are checked for validity and cycles before the task is created."
    )]
    async fn create_task(
        &self,
        Parameters(params): Parameters<CreateTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .tools
            .create_task(
                params.task_list_id,
                params.title,
                params.description,
                params.priority,
                params.depends_on,
                params.exit_criteria,
                params.workspace_root.as_deref(),
            )
            .await
        {
            Ok(task) => Ok(CallToolResult::success(vec![Content::json(task)?])),
            Err(e) => Err(to_mcp_error(&e)),
        }
    }

    /// Show a single task.
    #[tool(description = "Get a task by id, including its dependencies and exit criteria.")]
    async fn get_task(
        &self,
        Parameters(params): Parameters<TaskIdParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .tools
            .get_task(&params.task_id, params.workspace_root.as_deref())
            .await
        {
            Ok(task) => Ok(CallToolResult::success(vec![Content::json(task)?])),
            Err(e) => Err(to_mcp_error(&e)),
        }
    }

    /// Update a task's fields.
    #[tool(
        description = "Update a task's title, description, status (not_started, in_progress, blocked, completed), or priority."
    )]
    async fn update_task(
        &self,
        Parameters(params): Parameters<UpdateTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .tools
            .update_task(
                &params.task_id,
                params.title,
                params.description,
                params.status.as_deref(),
                params.priority,
                params.workspace_root.as_deref(),
            )
            .await
        {
            Ok(task) => Ok(CallToolResult::success(vec![Content::json(task)?])),
            Err(e) => Err(to_mcp_error(&e)),
        }
    }

    /// Delete a task.
    #[tool(
        description = "Delete a task. Fails if other tasks still depend on it; clear those edges first."
    )]
    async fn delete_task(
        &self,
        Parameters(params): Parameters<TaskIdParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .tools
            .delete_task(&params.task_id, params.workspace_root.as_deref())
            .await
        {
            Ok(deleted) => Ok(CallToolResult::success(vec![Content::json(deleted)?])),
            Err(e) => Err(to_mcp_error(&e)),
        }
    }

    /// List tasks in a task list.
    #[tool(description = "List the tasks in a task list in creation order.")]
    async fn list_tasks(
        &self,
        Parameters(params): Parameters<TaskListIdParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .tools
            .list_tasks(&params.task_list_id, params.workspace_root.as_deref())
            .await
        {
            Ok(tasks) => Ok(CallToolResult::success(vec![Content::json(tasks)?])),
            Err(e) => Err(to_mcp_error(&e)),
        }
    }

    /// Replace a task's dependency set.
    #[tool(
        description = "Replace a task's dependency set. The new set is checked for validity and cycles first; on rejection the existing dependencies are left unchanged. An empty set clears all dependencies."
    )]
    async fn set_task_dependencies(
        &self,
        Parameters(params): Parameters<SetTaskDependenciesParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .tools
            .set_task_dependencies(
                &params.task_id,
                &params.depends_on,
                params.workspace_root.as_deref(),
            )
            .await
        {
            Ok(task) => Ok(CallToolResult::success(vec![Content::json(task)?])),
            Err(e) => Err(to_mcp_error(&e)),
        }
    }

    /// Find tasks ready to work on.
    #[tool(
        description = "Find tasks in a project or task_list scope whose prerequisites are all completed. Mode single_agent (default) includes in-progress and blocked tasks; multi_agent only returns untouched tasks."
    )]
    async fn get_ready_tasks(
        &self,
        Parameters(params): Parameters<ReadyParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .tools
            .get_ready_tasks(
                &params.scope_type,
                &params.scope_id,
                params.mode.as_deref(),
                params.workspace_root.as_deref(),
            )
            .await
        {
            Ok(tasks) => Ok(CallToolResult::success(vec![Content::json(tasks)?])),
            Err(e) => Err(to_mcp_error(&e)),
        }
    }

    /// Analyze a dependency graph.
    #[tool(
        description = "Analyze the dependency graph of a project or task_list scope: completion progress, critical path, bottlenecks, leaf tasks, and any cycles."
    )]
    async fn analyze_graph(
        &self,
        Parameters(params): Parameters<AnalyzeParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .tools
            .analyze_graph(
                &params.scope_type,
                &params.scope_id,
                params.workspace_root.as_deref(),
            )
            .await
        {
            Ok(report) => Ok(CallToolResult::success(vec![Content::json(report)?])),
            Err(e) => Err(to_mcp_error(&e)),
        }
    }

    /// Render a dependency graph.
    #[tool(
        description = "Render the dependency graph of a project or task_list scope as ascii (default), dot, or mermaid."
    )]
    async fn render_graph(
        &self,
        Parameters(params): Parameters<RenderParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .tools
            .render_graph(
                &params.scope_type,
                &params.scope_id,
                params.format.as_deref(),
                params.workspace_root.as_deref(),
            )
            .await
        {
            Ok(rendered) => Ok(CallToolResult::success(vec![Content::json(rendered)?])),
            Err(e) => Err(to_mcp_error(&e)),
        }
    }
}

impl TrellisMcpServer {
    /// Create a new trellis MCP server.
    #[must_use]
    pub fn new() -> Self {
        let context = Arc::new(RwLock::new(Context::new()));
        let tools = Arc::new(Tools::new(Arc::clone(&context)));

        Self {
            context,
            tools,
            tool_router: Self::tool_router(),
        }
    }

    /// Get a reference to the context.
    #[must_use]
    pub fn context(&self) -> &Arc<RwLock<Context>> {
        &self.context
    }

    /// Serve MCP over stdio until the client disconnects.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails to initialize or the
    /// session ends abnormally.
    pub async fn run(self) -> anyhow::Result<()> {
        use rmcp::{transport::stdio, ServiceExt};

        tracing::info!("starting trellis MCP server on stdio");
        let service = self.serve(stdio()).await?;
        service.waiting().await?;
        Ok(())
    }
}

impl Default for TrellisMcpServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_handler]
impl ServerHandler for TrellisMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "trellis-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Trellis MCP server for dependency-aware task tracking. Call set_context first to set the workspace, then manage projects, task lists, and tasks; use get_ready_tasks to find unblocked work."
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::handler::server::ServerHandler;

    #[test]
    fn server_creation() {
        let server = TrellisMcpServer::new();
        assert!(server.context().try_read().is_ok());
    }

    #[test]
    fn server_default() {
        let server = TrellisMcpServer::default();
        assert!(server.context().try_read().is_ok());
    }

    #[test]
    fn server_info_names_the_server() {
        let server = TrellisMcpServer::new();
        let info = server.get_info();
        assert_eq!(info.server_info.name, "trellis-mcp");
        assert!(!info.server_info.version.is_empty());
        assert!(info.instructions.is_some());
    }

    #[test]
    fn tool_router_has_all_tools() {
        let server = TrellisMcpServer::new();
        let tools = server.tool_router.list_all();
        let tool_names: Vec<&str> = tools.iter().map(|t| &*t.name).collect();

        for expected in [
            "set_context",
            "where_am_i",
            "create_project",
            "list_projects",
            "get_project",
            "delete_project",
            "create_task_list",
            "list_task_lists",
            "get_task_list",
            "delete_task_list",
            "create_task",
            "get_task",
            "update_task",
            "delete_task",
            "list_tasks",
            "set_task_dependencies",
            "get_ready_tasks",
            "analyze_graph",
            "render_graph",
        ] {
            assert!(tool_names.contains(&expected), "missing tool: {expected}");
        }
        assert_eq!(tools.len(), 19);
    }
}
