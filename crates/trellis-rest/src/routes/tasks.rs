//! Task routes, including the gated dependency mutation.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use trellis::domain::{Dependency, NewTask, TaskId, TaskListId, TaskUpdate};
use trellis::store::{GraphRepository, TaskStore};

use crate::error::{bad_request, error_response, ErrorResponse};
use crate::state::AppState;

/// Body of `POST /api/v1/tasks`.
#[derive(Deserialize)]
pub struct CreateTaskRequest {
    /// Task list the task belongs to.
    pub task_list_id: String,
    /// Task title.
    pub title: String,
    /// Longer description.
    #[serde(default)]
    pub description: String,
    /// Priority 0 (highest) to 4 (lowest); defaults to 2.
    #[serde(default)]
    pub priority: Option<u8>,
    /// Ids of tasks this one depends on.
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// Exit criteria that must hold before completion.
    #[serde(default)]
    pub exit_criteria: Vec<String>,
}

/// Body of `PATCH /api/v1/tasks/{id}`.
#[derive(Deserialize)]
pub struct UpdateTaskRequest {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// New status: not_started, in_progress, blocked, or completed.
    #[serde(default)]
    pub status: Option<String>,
    /// New priority 0-4.
    #[serde(default)]
    pub priority: Option<u8>,
}

/// Body of `PUT /api/v1/tasks/{id}/dependencies`.
#[derive(Deserialize)]
pub struct SetDependenciesRequest {
    /// Ids of the tasks this one now depends on; empty clears the set.
    pub depends_on: Vec<String>,
}

/// `POST /api/v1/tasks`
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateTaskRequest>,
) -> Result<Json<Value>, ErrorResponse> {
    let mut app = state.app.write().await;
    let dependencies = resolve_dependency_targets(app.store(), &body.depends_on).await?;
    let task = app
        .create_task_gated(NewTask {
            task_list_id: TaskListId::from(body.task_list_id.as_str()),
            title: body.title,
            description: body.description,
            priority: body.priority,
            dependencies,
            exit_criteria: body.exit_criteria,
        })
        .await
        .map_err(|e| error_response(&e))?;
    app.save().await.map_err(|e| error_response(&e))?;
    Ok(Json(json!(task)))
}

/// `GET /api/v1/tasks/{id}`
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ErrorResponse> {
    let app = state.app.read().await;
    let id = TaskId::from(id.as_str());
    let task = app
        .store()
        .get_task(&id)
        .await
        .map_err(|e| error_response(&e))?
        .ok_or_else(|| error_response(&trellis::Error::TaskNotFound(id)))?;
    Ok(Json(json!(task)))
}

/// `PATCH /api/v1/tasks/{id}`
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<UpdateTaskRequest>,
) -> Result<Json<Value>, ErrorResponse> {
    let status = match body.status {
        Some(raw) => Some(trellis::domain::TaskStatus::from_str(&raw).map_err(bad_request)?),
        None => None,
    };

    let mut app = state.app.write().await;
    let id = TaskId::from(id.as_str());
    let task = app
        .store_mut()
        .update_task(
            &id,
            TaskUpdate {
                title: body.title,
                description: body.description,
                status,
                priority: body.priority,
                exit_criteria: None,
            },
        )
        .await
        .map_err(|e| error_response(&e))?;
    app.save().await.map_err(|e| error_response(&e))?;
    Ok(Json(json!(task)))
}

/// `DELETE /api/v1/tasks/{id}`
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ErrorResponse> {
    let mut app = state.app.write().await;
    let id = TaskId::from(id.as_str());
    app.store_mut()
        .delete_task(&id)
        .await
        .map_err(|e| error_response(&e))?;
    app.save().await.map_err(|e| error_response(&e))?;
    Ok(Json(json!({ "deleted": id })))
}

/// `PUT /api/v1/tasks/{id}/dependencies`
pub async fn set_dependencies(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<SetDependenciesRequest>,
) -> Result<Json<Value>, ErrorResponse> {
    let mut app = state.app.write().await;
    let dependencies = resolve_dependency_targets(app.store(), &body.depends_on).await?;
    let id = TaskId::from(id.as_str());
    let task = app
        .set_dependencies_gated(&id, dependencies)
        .await
        .map_err(|e| error_response(&e))?;
    app.save().await.map_err(|e| error_response(&e))?;
    Ok(Json(json!(task)))
}

/// Resolves raw task ids into dependency edges carrying each target's
/// actual list.
async fn resolve_dependency_targets(
    store: &dyn TaskStore,
    ids: &[String],
) -> Result<Vec<Dependency>, ErrorResponse> {
    let mut dependencies = Vec::with_capacity(ids.len());
    for id in ids {
        let task_id = TaskId::from(id.as_str());
        let target = store
            .get_task(&task_id)
            .await
            .map_err(|e| error_response(&e))?
            .ok_or_else(|| {
                error_response(&trellis::Error::InvalidDependency {
                    task_id: task_id.clone(),
                    reason: "task does not exist".to_string(),
                })
            })?;
        dependencies.push(Dependency::new(target.id, target.task_list_id));
    }
    Ok(dependencies)
}
