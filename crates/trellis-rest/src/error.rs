//! Mapping from core errors onto HTTP responses.

use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use trellis::Error;

/// The error half of every handler's return type.
pub type ErrorResponse = (StatusCode, Json<Value>);

/// Maps a core error onto a status code and a JSON error body.
///
/// Lookup misses are 404, rejected mutations that leave stored state
/// untouched are 409, dependency references that do not resolve are 422,
/// and malformed requests are 400. Anything else is a server fault.
#[must_use]
pub fn error_response(err: &Error) -> ErrorResponse {
    let status = match err {
        Error::InvalidScope(_) | Error::Validation(_) | Error::InvalidPriority(_) => {
            StatusCode::BAD_REQUEST
        }
        Error::ProjectNotFound(_) | Error::TaskListNotFound(_) | Error::TaskNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        Error::InvalidDependency { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        Error::DependencyCycle { .. }
        | Error::HasDependents { .. }
        | Error::DuplicateDependency { .. } => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() })))
}

/// A 400 with the given message, for wire-level parse failures the core
/// never sees.
#[must_use]
pub fn bad_request(message: String) -> ErrorResponse {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis::domain::TaskId;

    #[test]
    fn status_codes_follow_error_class() {
        let cases = [
            (Error::InvalidScope("sprint".into()), StatusCode::BAD_REQUEST),
            (
                Error::TaskNotFound(TaskId::from("t-1")),
                StatusCode::NOT_FOUND,
            ),
            (
                Error::InvalidDependency {
                    task_id: TaskId::from("t-1"),
                    reason: "task does not exist".into(),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                Error::DependencyCycle {
                    task_id: TaskId::from("t-1"),
                },
                StatusCode::CONFLICT,
            ),
            (
                Error::HasDependents {
                    task_id: TaskId::from("t-1"),
                    dependent_count: 1,
                    dependents: vec![TaskId::from("t-2")],
                },
                StatusCode::CONFLICT,
            ),
            (Error::Storage("disk on fire".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            let (status, body) = error_response(&err);
            assert_eq!(status, expected, "for {err}");
            assert!(body.0["error"].is_string());
        }
    }
}
