//! JSONL serialization for store contents.
//!
//! The whole workspace lives in one file of newline-delimited JSON records,
//! tagged by entity kind. Loading is resilient: damaged lines, tasks whose
//! list vanished, and dependency edges pointing at missing tasks are reported
//! as [`LoadWarning`]s and skipped rather than failing the load. Edges are
//! otherwise loaded exactly as written; consistency with the dependency
//! graph's invariants is the engine's concern, not this file's.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{Project, Task, TaskId, TaskList, TaskListId};
use crate::error::Result;
use crate::store::{StoreContents, TaskStore};

use super::memory::{new_memory_store, MemoryStore};

/// One line of the data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum Record {
    /// A project entity.
    Project(Project),
    /// A task list entity.
    TaskList(TaskList),
    /// A task entity.
    Task(Task),
}

/// A recoverable problem encountered while loading the data file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// A line was not valid JSON for any record kind.
    MalformedRecord {
        /// 1-based line number in the data file.
        line_number: usize,
        /// Parser detail.
        error: String,
    },
    /// A task referenced a task list that is not in the file; the task was
    /// skipped.
    MissingTaskList {
        /// The skipped task.
        task_id: TaskId,
        /// The list it claimed to belong to.
        task_list_id: TaskListId,
    },
    /// A dependency edge pointed at a task that is not in the file; the edge
    /// was dropped.
    OrphanedDependency {
        /// The task declaring the edge.
        task_id: TaskId,
        /// The missing target.
        target: TaskId,
    },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::MalformedRecord { line_number, error } => {
                write!(f, "line {line_number}: malformed record: {error}")
            }
            LoadWarning::MissingTaskList {
                task_id,
                task_list_id,
            } => write!(
                f,
                "task {task_id} skipped: task list {task_list_id} not found"
            ),
            LoadWarning::OrphanedDependency { task_id, target } => write!(
                f,
                "dropped dependency of {task_id} on missing task {target}"
            ),
        }
    }
}

/// Reads `path` into a fresh in-memory store.
///
/// A missing file yields an empty store, matching a freshly initialized
/// workspace whose data file has not been written yet.
pub async fn load_from_jsonl(
    path: &Path,
    prefix: &str,
) -> Result<(MemoryStore, Vec<LoadWarning>)> {
    let store = new_memory_store(prefix);
    if !path.exists() {
        return Ok((store, Vec::new()));
    }

    let (records, read_warnings) =
        trellis_jsonl::read_jsonl_resilient::<Record, _>(path).await?;
    let mut warnings: Vec<LoadWarning> = read_warnings
        .iter()
        .map(|w| LoadWarning::MalformedRecord {
            line_number: w.line_number(),
            error: w.description(),
        })
        .collect();

    let mut contents = StoreContents::default();
    for record in records {
        match record {
            Record::Project(project) => contents.projects.push(project),
            Record::TaskList(list) => contents.task_lists.push(list),
            Record::Task(task) => contents.tasks.push(task),
        }
    }

    let known_lists: HashSet<TaskListId> =
        contents.task_lists.iter().map(|l| l.id.clone()).collect();
    contents.tasks.retain(|task| {
        if known_lists.contains(&task.task_list_id) {
            true
        } else {
            warnings.push(LoadWarning::MissingTaskList {
                task_id: task.id.clone(),
                task_list_id: task.task_list_id.clone(),
            });
            false
        }
    });

    let known_tasks: HashSet<TaskId> = contents.tasks.iter().map(|t| t.id.clone()).collect();
    for task in &mut contents.tasks {
        let task_id = task.id.clone();
        task.dependencies.retain(|dep| {
            if known_tasks.contains(&dep.task_id) {
                true
            } else {
                warnings.push(LoadWarning::OrphanedDependency {
                    task_id: task_id.clone(),
                    target: dep.task_id.clone(),
                });
                false
            }
        });
    }

    store.lock().await.replace(contents);
    Ok((store, warnings))
}

/// Writes the store's entire contents to `path` atomically.
///
/// Output is deterministic: entities are ordered by id and each task's
/// dependencies are sorted, so unchanged workspaces produce byte-identical
/// files.
pub async fn save_to_jsonl(store: &dyn TaskStore, path: &Path) -> Result<()> {
    let mut contents = store.export().await?;
    contents.projects.sort_by(|a, b| a.id.cmp(&b.id));
    contents.task_lists.sort_by(|a, b| a.id.cmp(&b.id));
    contents.tasks.sort_by(|a, b| a.id.cmp(&b.id));
    for task in &mut contents.tasks {
        task.dependencies.sort();
    }

    let records = contents
        .projects
        .into_iter()
        .map(Record::Project)
        .chain(contents.task_lists.into_iter().map(Record::TaskList))
        .chain(contents.tasks.into_iter().map(Record::Task));
    trellis_jsonl::write_jsonl_atomic_iter(path, records).await?;
    tracing::debug!(file = %path.display(), "saved workspace data");
    Ok(())
}
