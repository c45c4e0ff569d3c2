//! Shared server state.

use std::path::Path;

use tokio::sync::RwLock;
use trellis::App;

/// State shared by all request handlers: one open workspace.
///
/// Handlers take the lock for the duration of a request; mutations hold the
/// write half so the admission gate always sees a consistent graph.
pub struct AppState {
    /// The open workspace.
    pub app: RwLock<App>,
}

impl AppState {
    /// Opens the workspace containing `start`.
    ///
    /// # Errors
    ///
    /// Returns an error if `start` is not inside an initialized trellis
    /// workspace or the store cannot be loaded.
    pub async fn from_directory(start: &Path) -> trellis::Result<Self> {
        let app = App::from_directory(start).await?;
        Ok(Self {
            app: RwLock::new(app),
        })
    }

    /// State over a volatile in-memory store, for tests.
    #[must_use]
    pub fn in_memory(prefix: &str) -> Self {
        Self {
            app: RwLock::new(App::in_memory(prefix)),
        }
    }
}
