//! REST API server for trellis task tracking.
//!
//! Exposes the core operations over HTTP under `/api/v1`:
//!
//! - `GET /health`
//! - `POST|GET /projects`, `GET|DELETE /projects/{id}`
//! - `POST|GET /task-lists` (`?project_id=` filter),
//!   `GET|DELETE /task-lists/{id}`, `GET /task-lists/{id}/tasks`
//! - `POST /tasks`, `GET|PATCH|DELETE /tasks/{id}`
//! - `PUT /tasks/{id}/dependencies` — gated by the graph engine
//! - `GET /scopes/{scope_type}/{scope_id}/ready?mode=`
//! - `GET /scopes/{scope_type}/{scope_id}/analysis`
//! - `GET /scopes/{scope_type}/{scope_id}/graph?format=` (text/plain)
//!
//! Dependency mutations run through the same admission gate as the CLI and
//! MCP surfaces: a cycle comes back as 409 and an edge to a nonexistent
//! task as 422, with stored state untouched either way.

pub mod error;
pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::info;

pub use state::AppState;

/// Builds the full `/api/v1` router over the given state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(routes::health::health))
        .route(
            "/api/v1/projects",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route(
            "/api/v1/projects/{id}",
            get(routes::projects::get_project).delete(routes::projects::delete_project),
        )
        .route(
            "/api/v1/task-lists",
            get(routes::task_lists::list_task_lists).post(routes::task_lists::create_task_list),
        )
        .route(
            "/api/v1/task-lists/{id}",
            get(routes::task_lists::get_task_list).delete(routes::task_lists::delete_task_list),
        )
        .route(
            "/api/v1/task-lists/{id}/tasks",
            get(routes::task_lists::list_tasks),
        )
        .route("/api/v1/tasks", post(routes::tasks::create_task))
        .route(
            "/api/v1/tasks/{id}",
            get(routes::tasks::get_task)
                .patch(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route(
            "/api/v1/tasks/{id}/dependencies",
            put(routes::tasks::set_dependencies),
        )
        .route(
            "/api/v1/scopes/{scope_type}/{scope_id}/ready",
            get(routes::scopes::ready_tasks),
        )
        .route(
            "/api/v1/scopes/{scope_type}/{scope_id}/analysis",
            get(routes::scopes::analyze),
        )
        .route(
            "/api/v1/scopes/{scope_type}/{scope_id}/graph",
            get(routes::scopes::render_graph),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `addr` and serves the API until the process is stopped.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails
/// while running.
pub async fn start_rest_server(state: Arc<AppState>, addr: SocketAddr) -> Result<()> {
    let router = build_router(state);
    info!("REST API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorResponse;
    use axum::extract::{Path, Query, State};
    use axum::http::StatusCode;
    use axum::Json;
    use serde_json::Value;

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState::in_memory("test"))
    }

    async fn make_list(state: &Arc<AppState>, title: &str) -> String {
        let Json(list) = routes::task_lists::create_task_list(
            State(Arc::clone(state)),
            Json(routes::task_lists::CreateTaskListRequest {
                title: title.to_string(),
                project_id: None,
                description: String::new(),
            }),
        )
        .await
        .expect("list creation should succeed");
        list["id"].as_str().expect("list has an id").to_string()
    }

    async fn make_task(
        state: &Arc<AppState>,
        list_id: &str,
        title: &str,
        depends_on: Vec<String>,
    ) -> Result<Value, ErrorResponse> {
        let Json(task) = routes::tasks::create_task(
            State(Arc::clone(state)),
            Json(routes::tasks::CreateTaskRequest {
                task_list_id: list_id.to_string(),
                title: title.to_string(),
                description: String::new(),
                priority: None,
                depends_on,
                exit_criteria: Vec::new(),
            }),
        )
        .await?;
        Ok(task)
    }

    #[test]
    fn router_builds() {
        let _router = build_router(test_state());
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let Json(body) = routes::health::health().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn project_round_trip() {
        let state = test_state();
        let Json(created) = routes::projects::create_project(
            State(Arc::clone(&state)),
            Json(routes::projects::CreateProjectRequest {
                name: "API".to_string(),
                description: String::new(),
            }),
        )
        .await
        .unwrap();
        let id = created["id"].as_str().unwrap().to_string();

        let Json(fetched) =
            routes::projects::get_project(State(Arc::clone(&state)), Path(id.clone()))
                .await
                .unwrap();
        assert_eq!(fetched["name"], "API");

        routes::projects::delete_project(State(Arc::clone(&state)), Path(id.clone()))
            .await
            .unwrap();
        let (status, _) = routes::projects::get_project(State(state), Path(id))
            .await
            .expect_err("deleted project should be gone");
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn ghost_dependency_is_unprocessable() {
        let state = test_state();
        let list = make_list(&state, "sprint").await;
        let (status, body) = make_task(&state, &list, "doomed", vec!["test-t-zz".to_string()])
            .await
            .expect_err("dependency on a ghost task should be rejected");
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.0["error"].is_string());
    }

    #[tokio::test]
    async fn dependency_cycle_is_a_conflict_and_changes_nothing() {
        let state = test_state();
        let list = make_list(&state, "sprint").await;
        let a = make_task(&state, &list, "a", Vec::new()).await.unwrap();
        let a_id = a["id"].as_str().unwrap().to_string();
        let b = make_task(&state, &list, "b", vec![a_id.clone()])
            .await
            .unwrap();
        let b_id = b["id"].as_str().unwrap().to_string();

        let (status, _) = routes::tasks::set_dependencies(
            State(Arc::clone(&state)),
            Path(a_id.clone()),
            Json(routes::tasks::SetDependenciesRequest {
                depends_on: vec![b_id.clone()],
            }),
        )
        .await
        .expect_err("a -> b -> a is a cycle");
        assert_eq!(status, StatusCode::CONFLICT);

        let Json(a_after) = routes::tasks::get_task(State(Arc::clone(&state)), Path(a_id))
            .await
            .unwrap();
        assert_eq!(a_after["dependencies"].as_array().unwrap().len(), 0);
        let Json(b_after) = routes::tasks::get_task(State(state), Path(b_id)).await.unwrap();
        assert_eq!(b_after["dependencies"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_scope_type_is_a_bad_request() {
        let state = test_state();
        let (status, _) = routes::scopes::ready_tasks(
            State(state),
            Path(("sprint".to_string(), "test-l-1".to_string())),
            Query(routes::scopes::ReadyQuery { mode: None }),
        )
        .await
        .expect_err("sprint is not a scope type");
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn ready_follows_completion_through_patch() {
        let state = test_state();
        let list = make_list(&state, "sprint").await;
        let a = make_task(&state, &list, "a", Vec::new()).await.unwrap();
        let a_id = a["id"].as_str().unwrap().to_string();
        let b = make_task(&state, &list, "b", vec![a_id.clone()])
            .await
            .unwrap();
        let b_id = b["id"].as_str().unwrap().to_string();

        let Json(ready) = routes::scopes::ready_tasks(
            State(Arc::clone(&state)),
            Path(("task_list".to_string(), list.clone())),
            Query(routes::scopes::ReadyQuery { mode: None }),
        )
        .await
        .unwrap();
        assert_eq!(ready["ready"].as_array().unwrap().len(), 1);
        assert_eq!(ready["ready"][0]["id"], a_id.as_str());

        routes::tasks::update_task(
            State(Arc::clone(&state)),
            Path(a_id),
            Json(routes::tasks::UpdateTaskRequest {
                title: None,
                description: None,
                status: Some("completed".to_string()),
                priority: None,
            }),
        )
        .await
        .unwrap();

        let Json(ready) = routes::scopes::ready_tasks(
            State(state),
            Path(("task_list".to_string(), list)),
            Query(routes::scopes::ReadyQuery { mode: None }),
        )
        .await
        .unwrap();
        assert_eq!(ready["ready"].as_array().unwrap().len(), 1);
        assert_eq!(ready["ready"][0]["id"], b_id.as_str());
    }

    #[tokio::test]
    async fn unknown_status_in_patch_is_a_bad_request() {
        let state = test_state();
        let list = make_list(&state, "sprint").await;
        let a = make_task(&state, &list, "a", Vec::new()).await.unwrap();
        let a_id = a["id"].as_str().unwrap().to_string();

        let (status, _) = routes::tasks::update_task(
            State(state),
            Path(a_id),
            Json(routes::tasks::UpdateTaskRequest {
                title: None,
                description: None,
                status: Some("done".to_string()),
                priority: None,
            }),
        )
        .await
        .expect_err("done is not a status");
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn graph_renders_as_plain_text() {
        let state = test_state();
        let list = make_list(&state, "sprint").await;
        make_task(&state, &list, "only", Vec::new()).await.unwrap();

        let (headers, body) = routes::scopes::render_graph(
            State(Arc::clone(&state)),
            Path(("task_list".to_string(), list.clone())),
            Query(routes::scopes::GraphQuery {
                format: Some("dot".to_string()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(headers[0].1, "text/plain; charset=utf-8");
        assert!(body.contains("digraph"));

        let (status, _) = routes::scopes::render_graph(
            State(state),
            Path(("task_list".to_string(), list)),
            Query(routes::scopes::GraphQuery {
                format: Some("svg".to_string()),
            }),
        )
        .await
        .expect_err("svg is not a render format");
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
