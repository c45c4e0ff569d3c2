//! Shared helpers for trellis integration tests.

// Not every test binary uses every helper.
#![allow(dead_code)]

use trellis::domain::{
    Dependency, NewTask, NewTaskList, Task, TaskList, TaskStatus, TaskUpdate,
};
use trellis::store::memory::{new_memory_store, MemoryStore};
use trellis::store::TaskStore;

/// A fresh in-memory store stamping ids with `test`.
pub fn test_store() -> MemoryStore {
    new_memory_store("test")
}

/// Creates a free-standing task list titled `title`.
pub async fn create_list(store: &mut MemoryStore, title: &str) -> TaskList {
    store
        .create_task_list(NewTaskList {
            project_id: None,
            title: title.to_string(),
            description: String::new(),
        })
        .await
        .expect("task list creation should succeed")
}

/// Creates a task in `list` with no dependencies.
pub async fn create_task(store: &mut MemoryStore, list: &TaskList, title: &str) -> Task {
    create_task_with_deps(store, list, title, &[]).await
}

/// Creates a task in `list` depending on each task in `deps`.
pub async fn create_task_with_deps(
    store: &mut MemoryStore,
    list: &TaskList,
    title: &str,
    deps: &[&Task],
) -> Task {
    store
        .create_task(NewTask {
            dependencies: deps
                .iter()
                .map(|d| Dependency::new(d.id.clone(), d.task_list_id.clone()))
                .collect(),
            ..NewTask::new(list.id.clone(), title)
        })
        .await
        .expect("task creation should succeed")
}

/// Marks a task completed.
pub async fn complete(store: &mut MemoryStore, task: &Task) {
    store
        .update_task(
            &task.id,
            TaskUpdate {
                status: Some(TaskStatus::Completed),
                ..TaskUpdate::default()
            },
        )
        .await
        .expect("completion should succeed");
}
