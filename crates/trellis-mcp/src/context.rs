//! Workspace context management for the MCP server.
//!
//! This module handles workspace detection (walking up to find `.trellis/`),
//! path canonicalization, and per-workspace `App` instance management.
//!
//! # Lock Ordering
//!
//! When using `Context` with `Tools`, locks must be acquired in this order:
//! 1. `Context` read/write lock (via `Arc<RwLock<Context>>`)
//! 2. App read/write lock (via `Arc<RwLock<App>>`)
//!
//! Never attempt to acquire a context lock while holding an app lock.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;
use trellis::workspace::{find_workspace_root, DATA_FILE, TRELLIS_DIR};
use trellis::App;

use crate::error::{Error, Result};

/// Maximum number of cached workspaces to prevent resource exhaustion.
///
/// When this limit is reached, the oldest workspace is evicted from cache.
const MAX_CACHED_WORKSPACES: usize = 32;

/// Global context state for the MCP server.
///
/// Manages workspace contexts and app instances for multi-workspace support.
pub struct Context {
    /// The current active workspace root.
    current_workspace: Option<PathBuf>,

    /// Per-workspace app instances (limited to [`MAX_CACHED_WORKSPACES`]).
    app_cache: HashMap<PathBuf, Arc<RwLock<App>>>,

    /// Per-workspace data file paths.
    data_paths: HashMap<PathBuf, PathBuf>,

    /// Insertion order for FIFO cache eviction.
    cache_order: VecDeque<PathBuf>,
}

impl Context {
    /// Create a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current_workspace: None,
            app_cache: HashMap::new(),
            data_paths: HashMap::new(),
            cache_order: VecDeque::new(),
        }
    }

    /// Set the current workspace root.
    ///
    /// Canonicalizes the path, verifies a `.trellis/` directory exists, and
    /// creates or retrieves an app instance for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the workspace path doesn't exist, has no
    /// `.trellis/` directory, or if the store cannot be opened.
    pub async fn set_workspace(&mut self, workspace_root: &Path) -> Result<WorkspaceInfo> {
        debug!(path = %workspace_root.display(), "setting workspace");

        // Canonicalize to resolve symlinks and `..`.
        let canonical = workspace_root
            .canonicalize()
            .map_err(|e| Error::WorkspaceNotFound {
                path: workspace_root.display().to_string(),
                source: Some(e),
            })?;
        validate_path(&canonical)?;

        let trellis_dir = canonical.join(TRELLIS_DIR);
        if !trellis_dir.exists() {
            debug!(path = %trellis_dir.display(), "no .trellis directory found");
            return Err(Error::NoTrellisDirectory(canonical.display().to_string()));
        }

        let data_path = trellis_dir.join(DATA_FILE);
        self.current_workspace = Some(canonical.clone());
        self.data_paths.insert(canonical.clone(), data_path.clone());

        if self.app_cache.contains_key(&canonical) {
            debug!("using cached app instance");
        } else {
            debug!("opening new app instance");
            while self.app_cache.len() >= MAX_CACHED_WORKSPACES {
                self.evict_oldest();
            }
            let app = App::from_directory(&canonical).await?;
            self.app_cache
                .insert(canonical.clone(), Arc::new(RwLock::new(app)));
            self.cache_order.push_back(canonical.clone());
        }

        Ok(WorkspaceInfo {
            workspace_root: canonical,
            data_path,
        })
    }

    /// Evict the oldest cached workspace to make room for new entries.
    fn evict_oldest(&mut self) {
        if let Some(oldest) = self.cache_order.pop_front() {
            self.app_cache.remove(&oldest);
            self.data_paths.remove(&oldest);
            debug!(workspace = %oldest.display(), "evicted workspace from cache");
        }
    }

    /// Get the current workspace root.
    #[must_use]
    pub fn current_workspace(&self) -> Option<&PathBuf> {
        self.current_workspace.as_ref()
    }

    /// Get the data file path for the current workspace.
    #[must_use]
    pub fn current_data_path(&self) -> Option<&PathBuf> {
        self.current_workspace
            .as_ref()
            .and_then(|ws| self.data_paths.get(ws))
    }

    /// Get the app for a specific workspace, or the current one if not
    /// specified.
    ///
    /// # Errors
    ///
    /// Returns an error if no context is set and no workspace path is
    /// provided, the path doesn't exist, or the workspace was never
    /// initialized via [`Context::set_workspace`].
    pub fn app_for(&self, workspace_root: Option<&Path>) -> Result<Arc<RwLock<App>>> {
        let workspace = match workspace_root {
            Some(path) => path.canonicalize().map_err(|e| Error::WorkspaceNotFound {
                path: path.display().to_string(),
                source: Some(e),
            })?,
            None => self.current_workspace.clone().ok_or(Error::NoContext)?,
        };

        self.app_cache
            .get(&workspace)
            .cloned()
            .ok_or_else(|| Error::WorkspaceNotInitialized(workspace.display().to_string()))
    }

    /// Discover and set the workspace by walking up from the given directory.
    ///
    /// # Errors
    ///
    /// Returns an error if no `.trellis/` directory is found in the path
    /// hierarchy, or if the store cannot be opened.
    pub async fn discover_and_set_workspace(&mut self, start: &Path) -> Result<WorkspaceInfo> {
        let workspace_root = discover_workspace(start)?;
        self.set_workspace(&workspace_root).await
    }

    /// Set up a workspace with an injected in-memory app for testing.
    pub fn set_test_workspace(&mut self, workspace_root: PathBuf, app: App) {
        self.current_workspace = Some(workspace_root.clone());
        self.data_paths
            .insert(workspace_root.clone(), PathBuf::from("test://memory"));
        self.app_cache
            .insert(workspace_root.clone(), Arc::new(RwLock::new(app)));
        self.cache_order.push_back(workspace_root);
    }

    /// Get the number of cached workspaces.
    #[must_use]
    pub fn cache_size(&self) -> usize {
        self.app_cache.len()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

/// Information about a workspace.
#[derive(Debug, Clone)]
pub struct WorkspaceInfo {
    /// The canonical path to the workspace root.
    pub workspace_root: PathBuf,

    /// The path to the data file.
    pub data_path: PathBuf,
}

/// Validate that a path is safe to use as a workspace.
fn validate_path(path: &Path) -> Result<()> {
    // Canonicalized paths should always be absolute.
    if !path.is_absolute() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "workspace path must be absolute",
        )));
    }

    // Null bytes could be used for injection.
    let path_str = path.to_string_lossy();
    if path_str.contains('\0') {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "workspace path contains invalid characters",
        )));
    }

    // After canonicalization there should be no `..` components left.
    for component in path.components() {
        if let std::path::Component::ParentDir = component {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "workspace path contains parent directory references",
            )));
        }
    }

    Ok(())
}

/// Discover a trellis workspace by walking up from the given directory.
///
/// Returns the canonicalized workspace root (directory containing
/// `.trellis/`).
///
/// # Errors
///
/// Returns [`Error::NoTrellisDirectory`] if no `.trellis/` directory is
/// found, or [`Error::WorkspaceNotFound`] if the path cannot be
/// canonicalized.
pub fn discover_workspace(start: &Path) -> Result<PathBuf> {
    let Some(root) = find_workspace_root(start) else {
        return Err(Error::NoTrellisDirectory(start.display().to_string()));
    };
    root.canonicalize().map_err(|e| Error::WorkspaceNotFound {
        path: root.display().to_string(),
        source: Some(e),
    })
}
