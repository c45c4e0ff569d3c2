//! Graph query routes, scoped to a project or a task list.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::http::HeaderName;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use trellis::graph::{ReadinessMode, RenderFormat, Scope};

use crate::error::{bad_request, error_response, ErrorResponse};
use crate::state::AppState;

/// Query string of `GET /api/v1/scopes/{scope_type}/{scope_id}/ready`.
#[derive(Deserialize)]
pub struct ReadyQuery {
    /// Readiness mode: `single_agent` (default) or `multi_agent`.
    pub mode: Option<String>,
}

/// Query string of `GET /api/v1/scopes/{scope_type}/{scope_id}/graph`.
#[derive(Deserialize)]
pub struct GraphQuery {
    /// Output format: `ascii` (default), `dot`, or `mermaid`.
    pub format: Option<String>,
}

/// `GET /api/v1/scopes/{scope_type}/{scope_id}/ready`
pub async fn ready_tasks(
    State(state): State<Arc<AppState>>,
    Path((scope_type, scope_id)): Path<(String, String)>,
    Query(query): Query<ReadyQuery>,
) -> Result<Json<Value>, ErrorResponse> {
    let scope = Scope::parse(&scope_type, &scope_id).map_err(|e| error_response(&e))?;
    let mode = match query.mode {
        Some(raw) => ReadinessMode::from_str(&raw).map_err(bad_request)?,
        None => ReadinessMode::default(),
    };

    let app = state.app.read().await;
    let tasks = app
        .engine()
        .get_ready_tasks(&scope, mode)
        .await
        .map_err(|e| error_response(&e))?;
    Ok(Json(json!({ "ready": tasks })))
}

/// `GET /api/v1/scopes/{scope_type}/{scope_id}/analysis`
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Path((scope_type, scope_id)): Path<(String, String)>,
) -> Result<Json<Value>, ErrorResponse> {
    let scope = Scope::parse(&scope_type, &scope_id).map_err(|e| error_response(&e))?;

    let app = state.app.read().await;
    let report = app
        .engine()
        .analyze(&scope)
        .await
        .map_err(|e| error_response(&e))?;
    Ok(Json(json!(report)))
}

/// `GET /api/v1/scopes/{scope_type}/{scope_id}/graph`
///
/// The body is the rendered graph itself, served as plain text so it can be
/// piped straight into `dot` or a Mermaid renderer.
pub async fn render_graph(
    State(state): State<Arc<AppState>>,
    Path((scope_type, scope_id)): Path<(String, String)>,
    Query(query): Query<GraphQuery>,
) -> Result<([(HeaderName, &'static str); 1], String), ErrorResponse> {
    let scope = Scope::parse(&scope_type, &scope_id).map_err(|e| error_response(&e))?;
    let format = match query.format {
        Some(raw) => RenderFormat::from_str(&raw).map_err(bad_request)?,
        None => RenderFormat::Ascii,
    };

    let app = state.app.read().await;
    let rendered = app
        .engine()
        .render(&scope, format)
        .await
        .map_err(|e| error_response(&e))?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        rendered,
    ))
}
