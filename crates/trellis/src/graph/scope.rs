//! Analysis scopes and the task snapshot they resolve to.

use std::collections::HashMap;
use std::fmt;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::domain::{ProjectId, Task, TaskId, TaskListId};
use crate::error::{Error, Result};
use crate::store::GraphRepository;

/// What portion of the graph an operation works over: one task list, or
/// every list in a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// All tasks in all task lists of a project.
    Project(ProjectId),
    /// All tasks in a single task list.
    TaskList(TaskListId),
}

impl Scope {
    /// Parses the `(scope_type, scope_id)` pair used by the wire surfaces.
    ///
    /// Only the literal scope types `project` and `task_list` are accepted;
    /// anything else is an [`Error::InvalidScope`]. Whether the id actually
    /// resolves is checked later, when the scope is materialized.
    pub fn parse(scope_type: &str, scope_id: &str) -> Result<Self> {
        match scope_type {
            "project" => Ok(Scope::Project(ProjectId::from(scope_id))),
            "task_list" => Ok(Scope::TaskList(TaskListId::from(scope_id))),
            other => Err(Error::InvalidScope(other.to_string())),
        }
    }

    /// The scope type literal, as accepted by [`Scope::parse`].
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Scope::Project(_) => "project",
            Scope::TaskList(_) => "task_list",
        }
    }

    /// The scoped entity's id.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Scope::Project(id) => id.as_str(),
            Scope::TaskList(id) => id.as_str(),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.type_name(), self.id())
    }
}

/// Materializes the tasks a scope covers, in repository iteration order.
///
/// For a project scope that is the concatenation of its task lists' tasks,
/// lists in creation order. Fails with the appropriate not-found error when
/// the scoped entity itself is missing; an existing but empty scope is fine.
pub(crate) async fn resolve_scope_tasks(
    repo: &dyn GraphRepository,
    scope: &Scope,
) -> Result<Vec<Task>> {
    match scope {
        Scope::Project(id) => {
            if repo.get_project(id).await?.is_none() {
                return Err(Error::ProjectNotFound(id.clone()));
            }
            let mut tasks = Vec::new();
            for list in repo.list_task_lists(id).await? {
                tasks.extend(repo.list_tasks(&list.id).await?);
            }
            Ok(tasks)
        }
        Scope::TaskList(id) => {
            if repo.get_task_list(id).await?.is_none() {
                return Err(Error::TaskListNotFound(id.clone()));
            }
            repo.list_tasks(id).await
        }
    }
}

/// An immutable view of one scope's tasks and their in-scope dependency
/// edges, built once per operation and shared by everything downstream.
///
/// Tasks keep their materialization order ("discovery order"); positions
/// into that order double as graph node indices. Edges run dependent to
/// prerequisite and are deduplicated; edges leaving the scope are not
/// represented.
pub(crate) struct ScopeSnapshot {
    tasks: Vec<Task>,
    index: HashMap<TaskId, usize>,
    graph: DiGraph<TaskId, ()>,
}

impl ScopeSnapshot {
    /// Resolves `scope` against `repo` and builds the snapshot.
    pub(crate) async fn load(repo: &dyn GraphRepository, scope: &Scope) -> Result<Self> {
        Ok(Self::build(resolve_scope_tasks(repo, scope).await?))
    }

    /// Builds a snapshot from already-materialized tasks.
    pub(crate) fn build(tasks: Vec<Task>) -> Self {
        let mut index = HashMap::with_capacity(tasks.len());
        let mut graph = DiGraph::with_capacity(tasks.len(), tasks.len());
        for (pos, task) in tasks.iter().enumerate() {
            graph.add_node(task.id.clone());
            index.insert(task.id.clone(), pos);
        }
        for (pos, task) in tasks.iter().enumerate() {
            for dep in &task.dependencies {
                let Some(&target) = index.get(&dep.task_id) else {
                    continue;
                };
                let from = NodeIndex::new(pos);
                let to = NodeIndex::new(target);
                if graph.find_edge(from, to).is_none() {
                    graph.add_edge(from, to, ());
                }
            }
        }
        Self {
            tasks,
            index,
            graph,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.tasks.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub(crate) fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub(crate) fn task(&self, pos: usize) -> &Task {
        &self.tasks[pos]
    }

    pub(crate) fn position(&self, id: &TaskId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// In-scope prerequisites of the task at `pos`, in declaration order.
    pub(crate) fn prerequisites_of(&self, pos: usize) -> Vec<usize> {
        self.neighbors(pos, Direction::Outgoing)
    }

    /// In-scope dependents of the task at `pos`, in discovery order.
    pub(crate) fn dependents_of(&self, pos: usize) -> Vec<usize> {
        self.neighbors(pos, Direction::Incoming)
    }

    /// Number of in-scope prerequisites of the task at `pos`.
    pub(crate) fn prerequisite_count(&self, pos: usize) -> usize {
        self.graph
            .neighbors_directed(NodeIndex::new(pos), Direction::Outgoing)
            .count()
    }

    /// Fan-in of the task at `pos`: how many in-scope tasks depend on it.
    pub(crate) fn dependent_count(&self, pos: usize) -> usize {
        self.graph
            .neighbors_directed(NodeIndex::new(pos), Direction::Incoming)
            .count()
    }

    fn neighbors(&self, pos: usize, direction: Direction) -> Vec<usize> {
        // petgraph yields neighbors most-recently-added first; reverse to
        // recover insertion order, which matches declaration/discovery order.
        let mut neighbors: Vec<usize> = self
            .graph
            .neighbors_directed(NodeIndex::new(pos), direction)
            .map(NodeIndex::index)
            .collect();
        neighbors.reverse();
        neighbors
    }
}
