//! Task list routes.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use trellis::domain::{NewTaskList, ProjectId, TaskListId};
use trellis::store::{GraphRepository, TaskStore};

use crate::error::{error_response, ErrorResponse};
use crate::state::AppState;

/// Body of `POST /api/v1/task-lists`.
#[derive(Deserialize)]
pub struct CreateTaskListRequest {
    /// List title.
    pub title: String,
    /// Owning project id; omit for a free-standing list.
    #[serde(default)]
    pub project_id: Option<String>,
    /// Longer description.
    #[serde(default)]
    pub description: String,
}

/// Query string of `GET /api/v1/task-lists`.
#[derive(Deserialize)]
pub struct TaskListFilter {
    /// Restrict to lists owned by this project.
    pub project_id: Option<String>,
}

/// `POST /api/v1/task-lists`
pub async fn create_task_list(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateTaskListRequest>,
) -> Result<Json<Value>, ErrorResponse> {
    let mut app = state.app.write().await;
    let list = app
        .store_mut()
        .create_task_list(NewTaskList {
            project_id: body.project_id.map(|id| ProjectId::from(id.as_str())),
            title: body.title,
            description: body.description,
        })
        .await
        .map_err(|e| error_response(&e))?;
    app.save().await.map_err(|e| error_response(&e))?;
    Ok(Json(json!(list)))
}

/// `GET /api/v1/task-lists`
pub async fn list_task_lists(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<TaskListFilter>,
) -> Result<Json<Value>, ErrorResponse> {
    let app = state.app.read().await;
    let lists = match filter.project_id {
        Some(project_id) => {
            let id = ProjectId::from(project_id.as_str());
            if app
                .store()
                .get_project(&id)
                .await
                .map_err(|e| error_response(&e))?
                .is_none()
            {
                return Err(error_response(&trellis::Error::ProjectNotFound(id)));
            }
            app.store()
                .list_task_lists(&id)
                .await
                .map_err(|e| error_response(&e))?
        }
        None => app
            .store()
            .list_all_task_lists()
            .await
            .map_err(|e| error_response(&e))?,
    };
    Ok(Json(json!({ "task_lists": lists })))
}

/// `GET /api/v1/task-lists/{id}`
pub async fn get_task_list(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ErrorResponse> {
    let app = state.app.read().await;
    let id = TaskListId::from(id.as_str());
    let list = app
        .store()
        .get_task_list(&id)
        .await
        .map_err(|e| error_response(&e))?
        .ok_or_else(|| error_response(&trellis::Error::TaskListNotFound(id)))?;
    Ok(Json(json!(list)))
}

/// `DELETE /api/v1/task-lists/{id}`
pub async fn delete_task_list(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ErrorResponse> {
    let mut app = state.app.write().await;
    let id = TaskListId::from(id.as_str());
    app.store_mut()
        .delete_task_list(&id)
        .await
        .map_err(|e| error_response(&e))?;
    app.save().await.map_err(|e| error_response(&e))?;
    Ok(Json(json!({ "deleted": id })))
}

/// `GET /api/v1/task-lists/{id}/tasks`
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ErrorResponse> {
    let app = state.app.read().await;
    let id = TaskListId::from(id.as_str());
    if app
        .store()
        .get_task_list(&id)
        .await
        .map_err(|e| error_response(&e))?
        .is_none()
    {
        return Err(error_response(&trellis::Error::TaskListNotFound(id)));
    }
    let tasks = app
        .store()
        .list_tasks(&id)
        .await
        .map_err(|e| error_response(&e))?;
    Ok(Json(json!({ "tasks": tasks })))
}
