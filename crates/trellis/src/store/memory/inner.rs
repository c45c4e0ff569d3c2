//! Data layout for the in-memory backend.

use std::collections::HashMap;

use crate::domain::{Project, ProjectId, Task, TaskId, TaskList, TaskListId};
use crate::id::IdGenerator;
use crate::store::StoreContents;

/// Owning state of the in-memory store.
///
/// Entities live in hash maps keyed by id; the parallel `*_order` vectors
/// record creation order, which every listing operation preserves.
#[derive(Debug)]
pub struct MemoryStoreInner {
    pub(super) projects: HashMap<ProjectId, Project>,
    pub(super) project_order: Vec<ProjectId>,
    pub(super) task_lists: HashMap<TaskListId, TaskList>,
    pub(super) task_list_order: Vec<TaskListId>,
    pub(super) tasks: HashMap<TaskId, Task>,
    pub(super) task_order: Vec<TaskId>,
    pub(super) id_generator: IdGenerator,
}

impl MemoryStoreInner {
    /// An empty store stamping ids with `prefix`.
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        Self {
            projects: HashMap::new(),
            project_order: Vec::new(),
            task_lists: HashMap::new(),
            task_list_order: Vec::new(),
            tasks: HashMap::new(),
            task_order: Vec::new(),
            id_generator: IdGenerator::new(prefix),
        }
    }

    /// Ids of every task that declares a dependency on `id`, in creation
    /// order.
    pub(super) fn dependents_of(&self, id: &TaskId) -> Vec<TaskId> {
        self.task_order
            .iter()
            .filter_map(|tid| self.tasks.get(tid))
            .filter(|task| {
                task.id != *id && task.dependencies.iter().any(|dep| dep.task_id == *id)
            })
            .map(|task| task.id.clone())
            .collect()
    }

    /// Removes a task list and all of its tasks. Lookups the caller has
    /// already done are not repeated; a missing id is a no-op.
    pub(super) fn remove_task_list_cascade(&mut self, id: &TaskListId) {
        let doomed: Vec<TaskId> = self
            .task_order
            .iter()
            .filter(|tid| {
                self.tasks
                    .get(*tid)
                    .is_some_and(|task| task.task_list_id == *id)
            })
            .cloned()
            .collect();
        for tid in &doomed {
            self.tasks.remove(tid);
        }
        self.task_order.retain(|tid| !doomed.contains(tid));
        self.task_lists.remove(id);
        self.task_list_order.retain(|lid| lid != id);
    }

    /// Everything the store holds, in creation order.
    pub(super) fn snapshot(&self) -> StoreContents {
        StoreContents {
            projects: self
                .project_order
                .iter()
                .filter_map(|id| self.projects.get(id))
                .cloned()
                .collect(),
            task_lists: self
                .task_list_order
                .iter()
                .filter_map(|id| self.task_lists.get(id))
                .cloned()
                .collect(),
            tasks: self
                .task_order
                .iter()
                .filter_map(|id| self.tasks.get(id))
                .cloned()
                .collect(),
        }
    }

    /// Replaces all state with `contents`, registering every id with the
    /// generator. No reference or cycle checking happens here.
    pub(crate) fn replace(&mut self, contents: StoreContents) {
        self.projects.clear();
        self.project_order.clear();
        self.task_lists.clear();
        self.task_list_order.clear();
        self.tasks.clear();
        self.task_order.clear();

        for project in contents.projects {
            self.id_generator.register(project.id.as_str());
            self.project_order.push(project.id.clone());
            self.projects.insert(project.id.clone(), project);
        }
        for list in contents.task_lists {
            self.id_generator.register(list.id.as_str());
            self.task_list_order.push(list.id.clone());
            self.task_lists.insert(list.id.clone(), list);
        }
        for task in contents.tasks {
            self.id_generator.register(task.id.as_str());
            self.task_order.push(task.id.clone());
            self.tasks.insert(task.id.clone(), task);
        }
    }
}
