//! MCP tool implementations.
//!
//! Each method resolves the target workspace through [`Context`], performs
//! the operation through the core `App`, and converts the result into the
//! wire views in [`crate::models`]. Dependency mutations go through the
//! app's gated helpers, so the graph engine's admission checks run exactly
//! as they do for the CLI and REST surfaces.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::RwLock;
use trellis::domain::{
    Dependency, NewProject, NewTask, NewTaskList, ProjectId, TaskId, TaskListId, TaskUpdate,
};
use trellis::graph::{GraphReport, ReadinessMode, RenderFormat, Scope};
use trellis::store::{GraphRepository, TaskStore};
use trellis::App;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::models::{
    parse_format, parse_mode, parse_status, DeletedResponse, McpProject, McpTask, McpTaskList,
    RenderResponse, SetContextResponse, WhereAmIResponse,
};

/// Tool implementations for the trellis MCP server.
pub struct Tools {
    context: Arc<RwLock<Context>>,
}

impl Tools {
    /// Create a new Tools instance with the given context.
    #[must_use]
    pub fn new(context: Arc<RwLock<Context>>) -> Self {
        Self { context }
    }

    async fn app(&self, workspace_root: Option<&str>) -> Result<Arc<RwLock<App>>> {
        let context = self.context.read().await;
        context.app_for(workspace_root.map(Path::new))
    }

    /// Set the workspace context.
    pub async fn set_context(&self, workspace_root: &str) -> Result<SetContextResponse> {
        let mut context = self.context.write().await;
        let info = context.set_workspace(Path::new(workspace_root)).await?;
        Ok(SetContextResponse {
            workspace_root: info.workspace_root.display().to_string(),
            data_path: info.data_path.display().to_string(),
            message: "Context set successfully".to_string(),
        })
    }

    /// Get current workspace information.
    pub async fn where_am_i(&self) -> WhereAmIResponse {
        let context = self.context.read().await;
        match context.current_workspace() {
            Some(workspace) => WhereAmIResponse {
                workspace_root: Some(workspace.display().to_string()),
                data_path: context
                    .current_data_path()
                    .map(|p| p.display().to_string()),
                context_set: true,
            },
            None => WhereAmIResponse {
                workspace_root: None,
                data_path: None,
                context_set: false,
            },
        }
    }

    // ------------------------------------------------------------------
    // Projects
    // ------------------------------------------------------------------

    /// Create a project.
    pub async fn create_project(
        &self,
        name: String,
        description: Option<String>,
        workspace_root: Option<&str>,
    ) -> Result<McpProject> {
        let app = self.app(workspace_root).await?;
        let mut app = app.write().await;
        let project = app
            .store_mut()
            .create_project(NewProject {
                name,
                description: description.unwrap_or_default(),
            })
            .await?;
        app.save().await?;
        Ok(project.into())
    }

    /// List all projects.
    pub async fn list_projects(&self, workspace_root: Option<&str>) -> Result<Vec<McpProject>> {
        let app = self.app(workspace_root).await?;
        let app = app.read().await;
        let projects = app.store().list_projects().await?;
        Ok(projects.into_iter().map(Into::into).collect())
    }

    /// Fetch one project.
    pub async fn get_project(
        &self,
        project_id: &str,
        workspace_root: Option<&str>,
    ) -> Result<McpProject> {
        let app = self.app(workspace_root).await?;
        let app = app.read().await;
        let id = ProjectId::from(project_id);
        let project = app
            .store()
            .get_project(&id)
            .await?
            .ok_or(trellis::Error::ProjectNotFound(id))?;
        Ok(project.into())
    }

    /// Delete a project and everything in it.
    pub async fn delete_project(
        &self,
        project_id: &str,
        workspace_root: Option<&str>,
    ) -> Result<DeletedResponse> {
        let app = self.app(workspace_root).await?;
        let mut app = app.write().await;
        let id = ProjectId::from(project_id);
        app.store_mut().delete_project(&id).await?;
        app.save().await?;
        Ok(DeletedResponse {
            deleted: id.to_string(),
        })
    }

    // ------------------------------------------------------------------
    // Task lists
    // ------------------------------------------------------------------

    /// Create a task list.
    pub async fn create_task_list(
        &self,
        title: String,
        project_id: Option<String>,
        description: Option<String>,
        workspace_root: Option<&str>,
    ) -> Result<McpTaskList> {
        let app = self.app(workspace_root).await?;
        let mut app = app.write().await;
        let list = app
            .store_mut()
            .create_task_list(NewTaskList {
                project_id: project_id.map(ProjectId::from),
                title,
                description: description.unwrap_or_default(),
            })
            .await?;
        app.save().await?;
        Ok(list.into())
    }

    /// List task lists, optionally restricted to one project.
    pub async fn list_task_lists(
        &self,
        project_id: Option<&str>,
        workspace_root: Option<&str>,
    ) -> Result<Vec<McpTaskList>> {
        let app = self.app(workspace_root).await?;
        let app = app.read().await;
        let lists = match project_id {
            Some(project_id) => {
                let id = ProjectId::from(project_id);
                if app.store().get_project(&id).await?.is_none() {
                    return Err(trellis::Error::ProjectNotFound(id).into());
                }
                app.store().list_task_lists(&id).await?
            }
            None => app.store().list_all_task_lists().await?,
        };
        Ok(lists.into_iter().map(Into::into).collect())
    }

    /// Fetch one task list.
    pub async fn get_task_list(
        &self,
        task_list_id: &str,
        workspace_root: Option<&str>,
    ) -> Result<McpTaskList> {
        let app = self.app(workspace_root).await?;
        let app = app.read().await;
        let id = TaskListId::from(task_list_id);
        let list = app
            .store()
            .get_task_list(&id)
            .await?
            .ok_or(trellis::Error::TaskListNotFound(id))?;
        Ok(list.into())
    }

    /// Delete a task list and its tasks.
    pub async fn delete_task_list(
        &self,
        task_list_id: &str,
        workspace_root: Option<&str>,
    ) -> Result<DeletedResponse> {
        let app = self.app(workspace_root).await?;
        let mut app = app.write().await;
        let id = TaskListId::from(task_list_id);
        app.store_mut().delete_task_list(&id).await?;
        app.save().await?;
        Ok(DeletedResponse {
            deleted: id.to_string(),
        })
    }

    // ------------------------------------------------------------------
    // Tasks
    // ------------------------------------------------------------------

    /// Create a task, gating any declared dependencies.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_task(
        &self,
        task_list_id: String,
        title: String,
        description: Option<String>,
        priority: Option<u8>,
        depends_on: Option<Vec<String>>,
        exit_criteria: Option<Vec<String>>,
        workspace_root: Option<&str>,
    ) -> Result<McpTask> {
        let app = self.app(workspace_root).await?;
        let mut app = app.write().await;
        let dependencies =
            resolve_dependency_targets(app.store(), &depends_on.unwrap_or_default()).await?;
        let task = app
            .create_task_gated(NewTask {
                task_list_id: TaskListId::from(task_list_id),
                title,
                description: description.unwrap_or_default(),
                priority,
                dependencies,
                exit_criteria: exit_criteria.unwrap_or_default(),
            })
            .await?;
        app.save().await?;
        Ok(task.into())
    }

    /// Fetch one task.
    pub async fn get_task(&self, task_id: &str, workspace_root: Option<&str>) -> Result<McpTask> {
        let app = self.app(workspace_root).await?;
        let app = app.read().await;
        let id = TaskId::from(task_id);
        let task = app
            .store()
            .get_task(&id)
            .await?
            .ok_or(trellis::Error::TaskNotFound(id))?;
        Ok(task.into())
    }

    /// Update a task's fields.
    pub async fn update_task(
        &self,
        task_id: &str,
        title: Option<String>,
        description: Option<String>,
        status: Option<&str>,
        priority: Option<u8>,
        workspace_root: Option<&str>,
    ) -> Result<McpTask> {
        let status = match status {
            Some(raw) => Some(parse_status(raw).ok_or_else(|| Error::InvalidArgument {
                field: "status",
                value: raw.to_string(),
                valid_values: "not_started, in_progress, blocked, completed",
            })?),
            None => None,
        };

        let app = self.app(workspace_root).await?;
        let mut app = app.write().await;
        let id = TaskId::from(task_id);
        let task = app
            .store_mut()
            .update_task(
                &id,
                TaskUpdate {
                    title,
                    description,
                    status,
                    priority,
                    exit_criteria: None,
                },
            )
            .await?;
        app.save().await?;
        Ok(task.into())
    }

    /// Delete a task.
    pub async fn delete_task(
        &self,
        task_id: &str,
        workspace_root: Option<&str>,
    ) -> Result<DeletedResponse> {
        let app = self.app(workspace_root).await?;
        let mut app = app.write().await;
        let id = TaskId::from(task_id);
        app.store_mut().delete_task(&id).await?;
        app.save().await?;
        Ok(DeletedResponse {
            deleted: id.to_string(),
        })
    }

    /// List the tasks in one task list.
    pub async fn list_tasks(
        &self,
        task_list_id: &str,
        workspace_root: Option<&str>,
    ) -> Result<Vec<McpTask>> {
        let app = self.app(workspace_root).await?;
        let app = app.read().await;
        let id = TaskListId::from(task_list_id);
        if app.store().get_task_list(&id).await?.is_none() {
            return Err(trellis::Error::TaskListNotFound(id).into());
        }
        let tasks = app.store().list_tasks(&id).await?;
        Ok(tasks.into_iter().map(Into::into).collect())
    }

    /// Replace a task's dependency set, gated by the graph engine.
    pub async fn set_task_dependencies(
        &self,
        task_id: &str,
        depends_on: &[String],
        workspace_root: Option<&str>,
    ) -> Result<McpTask> {
        let app = self.app(workspace_root).await?;
        let mut app = app.write().await;
        let dependencies = resolve_dependency_targets(app.store(), depends_on).await?;
        let id = TaskId::from(task_id);
        let task = app.set_dependencies_gated(&id, dependencies).await?;
        app.save().await?;
        Ok(task.into())
    }

    // ------------------------------------------------------------------
    // Graph queries
    // ------------------------------------------------------------------

    /// All ready tasks in a scope.
    pub async fn get_ready_tasks(
        &self,
        scope_type: &str,
        scope_id: &str,
        mode: Option<&str>,
        workspace_root: Option<&str>,
    ) -> Result<Vec<McpTask>> {
        let scope = Scope::parse(scope_type, scope_id).map_err(Error::Core)?;
        let mode = match mode {
            Some(raw) => parse_mode(raw).ok_or_else(|| Error::InvalidArgument {
                field: "mode",
                value: raw.to_string(),
                valid_values: "single_agent, multi_agent",
            })?,
            None => ReadinessMode::default(),
        };

        let app = self.app(workspace_root).await?;
        let app = app.read().await;
        let tasks = app.engine().get_ready_tasks(&scope, mode).await?;
        Ok(tasks.into_iter().map(Into::into).collect())
    }

    /// Structural analysis of a scope.
    pub async fn analyze_graph(
        &self,
        scope_type: &str,
        scope_id: &str,
        workspace_root: Option<&str>,
    ) -> Result<GraphReport> {
        let scope = Scope::parse(scope_type, scope_id).map_err(Error::Core)?;
        let app = self.app(workspace_root).await?;
        let app = app.read().await;
        Ok(app.engine().analyze(&scope).await?)
    }

    /// Render a scope's dependency graph.
    pub async fn render_graph(
        &self,
        scope_type: &str,
        scope_id: &str,
        format: Option<&str>,
        workspace_root: Option<&str>,
    ) -> Result<RenderResponse> {
        let scope = Scope::parse(scope_type, scope_id).map_err(Error::Core)?;
        let format = match format {
            Some(raw) => parse_format(raw).ok_or_else(|| Error::InvalidArgument {
                field: "format",
                value: raw.to_string(),
                valid_values: "ascii, dot, mermaid",
            })?,
            None => RenderFormat::Ascii,
        };

        let app = self.app(workspace_root).await?;
        let app = app.read().await;
        let graph = app.engine().render(&scope, format).await?;
        Ok(RenderResponse {
            format: format.as_str().to_string(),
            graph,
        })
    }
}

/// Resolves raw task ids into dependency edges carrying each target's
/// actual list.
async fn resolve_dependency_targets(
    store: &dyn TaskStore,
    ids: &[String],
) -> Result<Vec<Dependency>> {
    let mut dependencies = Vec::with_capacity(ids.len());
    for id in ids {
        let task_id = TaskId::from(id.as_str());
        let Some(target) = store.get_task(&task_id).await? else {
            return Err(trellis::Error::InvalidDependency {
                task_id,
                reason: "task does not exist".to_string(),
            }
            .into());
        };
        dependencies.push(Dependency::new(target.id, target.task_list_id));
    }
    Ok(dependencies)
}
