//! Error types for the trellis MCP server.

use thiserror::Error;

/// Errors that can occur in the trellis MCP server.
#[derive(Debug, Error)]
pub enum Error {
    /// No workspace context has been set.
    #[error("No workspace context set. Call set_context first.")]
    NoContext,

    /// Invalid argument value provided.
    #[error("Invalid {field}: '{value}'. Valid values: {valid_values}")]
    InvalidArgument {
        /// The field name that had an invalid value.
        field: &'static str,
        /// The invalid value that was provided.
        value: String,
        /// Description of valid values.
        valid_values: &'static str,
    },

    /// The specified workspace was not found or path is invalid.
    #[error("Workspace not found: {path}")]
    WorkspaceNotFound {
        /// The path that was not found.
        path: String,
        /// The underlying IO error, if any.
        #[source]
        source: Option<std::io::Error>,
    },

    /// Workspace exists but was not initialized via `set_context`.
    #[error("Workspace not initialized: {0}. Call set_context first.")]
    WorkspaceNotInitialized(String),

    /// Failed to discover a trellis workspace.
    #[error("No .trellis directory found in {0} or parent directories")]
    NoTrellisDirectory(String),

    /// An error from the trellis core.
    #[error(transparent)]
    Core(#[from] trellis::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True when the caller supplied something wrong, as opposed to the
    /// server failing. These map to `invalid_params` on the wire.
    #[must_use]
    pub fn is_caller_fault(&self) -> bool {
        match self {
            Error::InvalidArgument { .. }
            | Error::NoContext
            | Error::WorkspaceNotFound { .. }
            | Error::WorkspaceNotInitialized(_)
            | Error::NoTrellisDirectory(_) => true,
            Error::Core(core) => {
                core.is_rejection()
                    || core.is_not_found()
                    || matches!(core, trellis::Error::InvalidScope(_))
            }
            _ => false,
        }
    }
}

/// Result type for trellis MCP operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_and_argument_errors_are_caller_fault() {
        let cases = [
            Error::NoContext,
            Error::InvalidArgument {
                field: "format",
                value: "svg".to_string(),
                valid_values: "ascii, dot, mermaid",
            },
            Error::WorkspaceNotFound {
                path: "/no/such/workspace".to_string(),
                source: None,
            },
            Error::WorkspaceNotInitialized("/no/such/workspace".to_string()),
            Error::NoTrellisDirectory("/no/such/workspace".to_string()),
        ];
        for err in cases {
            assert!(err.is_caller_fault(), "expected caller fault for {err}");
        }
    }

    #[test]
    fn core_rejections_and_misses_are_caller_fault() {
        use trellis::domain::TaskId;

        let not_found = Error::Core(trellis::Error::TaskNotFound(TaskId::from("t-1")));
        assert!(not_found.is_caller_fault());
        let cycle = Error::Core(trellis::Error::DependencyCycle {
            task_id: TaskId::from("t-1"),
        });
        assert!(cycle.is_caller_fault());
        let scope = Error::Core(trellis::Error::InvalidScope("sprint".to_string()));
        assert!(scope.is_caller_fault());
    }

    #[test]
    fn server_side_failures_are_not_caller_fault() {
        let io = Error::Io(std::io::Error::other("disk failure"));
        assert!(!io.is_caller_fault());
        let storage = Error::Core(trellis::Error::Storage("backend down".to_string()));
        assert!(!storage.is_caller_fault());
    }
}
