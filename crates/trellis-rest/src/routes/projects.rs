//! Project routes.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use trellis::domain::{NewProject, ProjectId};
use trellis::store::{GraphRepository, TaskStore};

use crate::error::{error_response, ErrorResponse};
use crate::state::AppState;

/// Body of `POST /api/v1/projects`.
#[derive(Deserialize)]
pub struct CreateProjectRequest {
    /// Project name.
    pub name: String,
    /// Longer description.
    #[serde(default)]
    pub description: String,
}

/// `POST /api/v1/projects`
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateProjectRequest>,
) -> Result<Json<Value>, ErrorResponse> {
    let mut app = state.app.write().await;
    let project = app
        .store_mut()
        .create_project(NewProject {
            name: body.name,
            description: body.description,
        })
        .await
        .map_err(|e| error_response(&e))?;
    app.save().await.map_err(|e| error_response(&e))?;
    Ok(Json(json!(project)))
}

/// `GET /api/v1/projects`
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ErrorResponse> {
    let app = state.app.read().await;
    let projects = app
        .store()
        .list_projects()
        .await
        .map_err(|e| error_response(&e))?;
    Ok(Json(json!({ "projects": projects })))
}

/// `GET /api/v1/projects/{id}`
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ErrorResponse> {
    let app = state.app.read().await;
    let id = ProjectId::from(id.as_str());
    let project = app
        .store()
        .get_project(&id)
        .await
        .map_err(|e| error_response(&e))?
        .ok_or_else(|| error_response(&trellis::Error::ProjectNotFound(id)))?;
    Ok(Json(json!(project)))
}

/// `DELETE /api/v1/projects/{id}`
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ErrorResponse> {
    let mut app = state.app.write().await;
    let id = ProjectId::from(id.as_str());
    app.store_mut()
        .delete_project(&id)
        .await
        .map_err(|e| error_response(&e))?;
    app.save().await.map_err(|e| error_response(&e))?;
    Ok(Json(json!({ "deleted": id })))
}
