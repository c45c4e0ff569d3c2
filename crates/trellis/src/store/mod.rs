//! Storage abstractions and backends.
//!
//! [`GraphRepository`] is the read-only surface the graph engine traverses;
//! [`TaskStore`] layers the full CRUD surface on top of it. The in-memory
//! backend is the canonical implementation, the JSONL backend wraps it with
//! file persistence, and a SQL backend is reserved but not yet implemented.
//!
//! The store deliberately does no dependency-graph reasoning: edges are
//! persisted exactly as given. Reference validation and cycle rejection
//! happen in [`crate::graph`] before a mutation reaches the store, so bulk
//! writes through [`TaskStore::import`] can introduce edges the engine would
//! refuse. [`crate::graph::GraphEngine::analyze`] surfaces such damage
//! instead of the store hiding it.

pub mod jsonl;
pub mod memory;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::{
    Dependency, NewProject, NewTask, NewTaskList, Project, ProjectId, ProjectUpdate, Task,
    TaskId, TaskList, TaskListId, TaskListUpdate, TaskUpdate,
};
use crate::error::Result;

pub use jsonl::LoadWarning;

/// Read-only lookups the dependency graph engine is built on.
#[async_trait]
pub trait GraphRepository: Send + Sync {
    /// Fetches a task by id, `None` when absent.
    async fn get_task(&self, id: &TaskId) -> Result<Option<Task>>;

    /// All tasks in a task list, in creation order.
    async fn list_tasks(&self, task_list_id: &TaskListId) -> Result<Vec<Task>>;

    /// Fetches a task list by id, `None` when absent.
    async fn get_task_list(&self, id: &TaskListId) -> Result<Option<TaskList>>;

    /// Fetches a project by id, `None` when absent.
    async fn get_project(&self, id: &ProjectId) -> Result<Option<Project>>;

    /// All task lists owned by a project, in creation order.
    async fn list_task_lists(&self, project_id: &ProjectId) -> Result<Vec<TaskList>>;
}

/// Everything loaded from or written to a backend in one piece.
#[derive(Debug, Clone, Default)]
pub struct StoreContents {
    /// All projects, in creation order.
    pub projects: Vec<Project>,
    /// All task lists, in creation order.
    pub task_lists: Vec<TaskList>,
    /// All tasks, in creation order.
    pub tasks: Vec<Task>,
}

/// Full read/write storage surface.
#[async_trait]
pub trait TaskStore: GraphRepository {
    /// Creates a project with a freshly generated id.
    async fn create_project(&mut self, new: NewProject) -> Result<Project>;

    /// Applies a patch to a project.
    async fn update_project(&mut self, id: &ProjectId, updates: ProjectUpdate) -> Result<Project>;

    /// Deletes a project and cascades to its task lists and their tasks.
    async fn delete_project(&mut self, id: &ProjectId) -> Result<()>;

    /// All projects, in creation order.
    async fn list_projects(&self) -> Result<Vec<Project>>;

    /// Creates a task list with a freshly generated id.
    async fn create_task_list(&mut self, new: NewTaskList) -> Result<TaskList>;

    /// Applies a patch to a task list.
    async fn update_task_list(
        &mut self,
        id: &TaskListId,
        updates: TaskListUpdate,
    ) -> Result<TaskList>;

    /// Deletes a task list and cascades to its tasks.
    ///
    /// Dependencies that tasks in other lists held on the deleted tasks are
    /// left in place; they surface as unresolved edges in readiness checks
    /// and as orphans on the next reload.
    async fn delete_task_list(&mut self, id: &TaskListId) -> Result<()>;

    /// All task lists across every project, in creation order.
    async fn list_all_task_lists(&self) -> Result<Vec<TaskList>>;

    /// Creates a task with a freshly generated id.
    ///
    /// Dependency edges in the payload are stored as given. Callers are
    /// expected to run them through the graph engine's validation and cycle
    /// check first; the CLI, MCP, and REST layers all do.
    async fn create_task(&mut self, new: NewTask) -> Result<Task>;

    /// Applies a patch to a task, maintaining `completed_at` as the status
    /// moves into or out of `Completed`.
    async fn update_task(&mut self, id: &TaskId, updates: TaskUpdate) -> Result<Task>;

    /// Deletes a task, refusing with [`crate::Error::HasDependents`] when
    /// other tasks still depend on it.
    async fn delete_task(&mut self, id: &TaskId) -> Result<()>;

    /// Replaces a task's dependency set wholesale.
    ///
    /// The set must not name the same target twice. As with
    /// [`TaskStore::create_task`], graph-level gating happens upstream.
    async fn set_task_dependencies(
        &mut self,
        id: &TaskId,
        dependencies: Vec<Dependency>,
    ) -> Result<Task>;

    /// Total number of tasks across all lists.
    async fn count_tasks(&self) -> Result<usize>;

    /// Snapshot of everything the store holds.
    async fn export(&self) -> Result<StoreContents>;

    /// Replaces the store's contents wholesale.
    ///
    /// This is the bulk path used by reload; it performs no reference or
    /// cycle checking.
    async fn import(&mut self, contents: StoreContents) -> Result<()>;

    /// Flushes to the backing medium; a no-op for purely in-memory stores.
    async fn save(&self) -> Result<()>;

    /// Re-reads the backing medium, discarding in-memory state; a no-op for
    /// purely in-memory stores.
    async fn reload(&mut self) -> Result<()>;
}

/// Which storage backend a workspace uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// Volatile in-memory storage.
    Memory,
    /// In-memory storage persisted to a JSONL file.
    Jsonl(PathBuf),
    /// SQL database, reserved for a future release.
    Sql(String),
}

/// Builds a store for the given backend.
///
/// Load warnings from file-backed stores are logged at `warn`; use
/// [`jsonl::load_from_jsonl`] directly when the caller needs them.
pub async fn create_store(backend: &StoreBackend, prefix: &str) -> Result<Box<dyn TaskStore>> {
    match backend {
        StoreBackend::Memory => Ok(Box::new(memory::new_memory_store(prefix))),
        StoreBackend::Jsonl(path) => {
            let store = JsonlStore::load(path.clone(), prefix).await?;
            Ok(Box::new(store))
        }
        StoreBackend::Sql(_) => Err(crate::Error::Storage(
            "SQL backend is not yet implemented".to_string(),
        )),
    }
}

/// In-memory store that persists itself to a JSONL file on [`TaskStore::save`]
/// and re-reads the file on [`TaskStore::reload`].
pub struct JsonlStore {
    inner: memory::MemoryStore,
    path: PathBuf,
    prefix: String,
}

impl JsonlStore {
    /// Loads (or freshly creates, when the file is absent) a store backed by
    /// `path`.
    pub async fn load(path: PathBuf, prefix: &str) -> Result<Self> {
        let (inner, warnings) = jsonl::load_from_jsonl(&path, prefix).await?;
        for warning in &warnings {
            tracing::warn!(file = %path.display(), "{warning}");
        }
        Ok(Self {
            inner,
            path,
            prefix: prefix.to_string(),
        })
    }

    /// The file this store persists to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl GraphRepository for JsonlStore {
    async fn get_task(&self, id: &TaskId) -> Result<Option<Task>> {
        self.inner.get_task(id).await
    }

    async fn list_tasks(&self, task_list_id: &TaskListId) -> Result<Vec<Task>> {
        self.inner.list_tasks(task_list_id).await
    }

    async fn get_task_list(&self, id: &TaskListId) -> Result<Option<TaskList>> {
        self.inner.get_task_list(id).await
    }

    async fn get_project(&self, id: &ProjectId) -> Result<Option<Project>> {
        self.inner.get_project(id).await
    }

    async fn list_task_lists(&self, project_id: &ProjectId) -> Result<Vec<TaskList>> {
        self.inner.list_task_lists(project_id).await
    }
}

#[async_trait]
impl TaskStore for JsonlStore {
    async fn create_project(&mut self, new: NewProject) -> Result<Project> {
        self.inner.create_project(new).await
    }

    async fn update_project(&mut self, id: &ProjectId, updates: ProjectUpdate) -> Result<Project> {
        self.inner.update_project(id, updates).await
    }

    async fn delete_project(&mut self, id: &ProjectId) -> Result<()> {
        self.inner.delete_project(id).await
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        self.inner.list_projects().await
    }

    async fn create_task_list(&mut self, new: NewTaskList) -> Result<TaskList> {
        self.inner.create_task_list(new).await
    }

    async fn update_task_list(
        &mut self,
        id: &TaskListId,
        updates: TaskListUpdate,
    ) -> Result<TaskList> {
        self.inner.update_task_list(id, updates).await
    }

    async fn delete_task_list(&mut self, id: &TaskListId) -> Result<()> {
        self.inner.delete_task_list(id).await
    }

    async fn list_all_task_lists(&self) -> Result<Vec<TaskList>> {
        self.inner.list_all_task_lists().await
    }

    async fn create_task(&mut self, new: NewTask) -> Result<Task> {
        self.inner.create_task(new).await
    }

    async fn update_task(&mut self, id: &TaskId, updates: TaskUpdate) -> Result<Task> {
        self.inner.update_task(id, updates).await
    }

    async fn delete_task(&mut self, id: &TaskId) -> Result<()> {
        self.inner.delete_task(id).await
    }

    async fn set_task_dependencies(
        &mut self,
        id: &TaskId,
        dependencies: Vec<Dependency>,
    ) -> Result<Task> {
        self.inner.set_task_dependencies(id, dependencies).await
    }

    async fn count_tasks(&self) -> Result<usize> {
        self.inner.count_tasks().await
    }

    async fn export(&self) -> Result<StoreContents> {
        self.inner.export().await
    }

    async fn import(&mut self, contents: StoreContents) -> Result<()> {
        self.inner.import(contents).await
    }

    async fn save(&self) -> Result<()> {
        jsonl::save_to_jsonl(&self.inner, &self.path).await
    }

    async fn reload(&mut self) -> Result<()> {
        let (inner, warnings) = jsonl::load_from_jsonl(&self.path, &self.prefix).await?;
        for warning in &warnings {
            tracing::warn!(file = %self.path.display(), "{warning}");
        }
        self.inner = inner;
        Ok(())
    }
}
