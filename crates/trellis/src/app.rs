//! Application context: one loaded workspace plus its store.
//!
//! `App` is what every surface (CLI, MCP, REST) holds onto. Mutations that
//! touch dependency edges go through the gated helpers here so that the
//! graph engine's admission checks run before anything is written,
//! regardless of which surface initiated the change.

use std::path::{Path, PathBuf};

use crate::domain::{Dependency, NewTask, Task, TaskId};
use crate::error::{Error, Result};
use crate::graph::GraphEngine;
use crate::store::{create_store, memory::new_memory_store, GraphRepository, TaskStore};
use crate::workspace::{find_workspace_root, WorkspaceConfig, TRELLIS_DIR};

/// A loaded workspace.
pub struct App {
    store: Box<dyn TaskStore>,
    trellis_dir: PathBuf,
    config: WorkspaceConfig,
}

impl App {
    /// Opens the workspace containing `start`, walking up the directory tree
    /// to find it.
    pub async fn from_directory(start: &Path) -> Result<Self> {
        let root = find_workspace_root(start).ok_or_else(|| {
            Error::Config("not inside a trellis workspace (run `trellis init` first)".to_string())
        })?;
        let trellis_dir = root.join(TRELLIS_DIR);
        let config = WorkspaceConfig::load(&trellis_dir)?;
        let backend = config.backend(&trellis_dir)?;
        let store = create_store(&backend, &config.id_prefix).await?;
        tracing::debug!(dir = %trellis_dir.display(), "opened workspace");
        Ok(Self {
            store,
            trellis_dir,
            config,
        })
    }

    /// An app over a volatile in-memory store, for tests and embedding.
    #[must_use]
    pub fn in_memory(prefix: &str) -> Self {
        Self::with_store(Box::new(new_memory_store(prefix)), prefix)
    }

    /// An app over an already-constructed store.
    #[must_use]
    pub fn with_store(store: Box<dyn TaskStore>, prefix: &str) -> Self {
        Self {
            store,
            trellis_dir: PathBuf::new(),
            config: WorkspaceConfig::new(prefix),
        }
    }

    /// The workspace's `.trellis` directory; empty for in-memory apps.
    #[must_use]
    pub fn trellis_dir(&self) -> &Path {
        &self.trellis_dir
    }

    /// The id prefix this workspace stamps.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.config.id_prefix
    }

    /// Read access to the store.
    #[must_use]
    pub fn store(&self) -> &dyn TaskStore {
        self.store.as_ref()
    }

    /// Write access to the store. Dependency-edge mutations should prefer
    /// the gated helpers on `App`.
    pub fn store_mut(&mut self) -> &mut dyn TaskStore {
        self.store.as_mut()
    }

    /// A graph engine reading this app's store.
    #[must_use]
    pub fn engine(&self) -> GraphEngine<'_> {
        GraphEngine::new(self.store.as_ref())
    }

    /// Creates a task, running any declared dependencies through the
    /// admission gate.
    ///
    /// The task is inserted bare first so the gate can reason about a real
    /// id, then its edges are attached; if the gate rejects them the bare
    /// task is removed again, leaving the store as it was.
    pub async fn create_task_gated(&mut self, mut new: NewTask) -> Result<Task> {
        let dependencies = std::mem::take(&mut new.dependencies);
        let task = self.store.create_task(new).await?;
        if dependencies.is_empty() {
            return Ok(task);
        }
        let admitted = GraphEngine::new(self.store.as_ref())
            .admit_dependencies(&task.id, &task.task_list_id, &dependencies)
            .await;
        match admitted {
            Ok(()) => self.store.set_task_dependencies(&task.id, dependencies).await,
            Err(err) => {
                if let Err(rollback) = self.store.delete_task(&task.id).await {
                    tracing::warn!(task_id = %task.id, error = %rollback, "rollback failed");
                }
                Err(err)
            }
        }
    }

    /// Replaces a task's dependencies, running the new set through the
    /// admission gate first. Rejection leaves the existing set untouched.
    pub async fn set_dependencies_gated(
        &mut self,
        task_id: &TaskId,
        dependencies: Vec<Dependency>,
    ) -> Result<Task> {
        let Some(task) = self.store.get_task(task_id).await? else {
            return Err(Error::TaskNotFound(task_id.clone()));
        };
        GraphEngine::new(self.store.as_ref())
            .admit_dependencies(&task.id, &task.task_list_id, &dependencies)
            .await?;
        self.store.set_task_dependencies(task_id, dependencies).await
    }

    /// Flushes the store to its backing medium.
    pub async fn save(&self) -> Result<()> {
        self.store.save().await
    }
}
