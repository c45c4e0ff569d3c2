//! [`GraphRepository`] and [`TaskStore`] implementations for the in-memory
//! backend.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{
    self, Dependency, NewProject, NewTask, NewTaskList, Project, ProjectId, ProjectUpdate, Task,
    TaskId, TaskList, TaskListId, TaskListUpdate, TaskUpdate, DEFAULT_PRIORITY, MAX_PRIORITY,
};
use crate::error::{Error, Result};
use crate::id::EntityKind;
use crate::store::{GraphRepository, StoreContents, TaskStore};

use super::MemoryStore;

fn check_priority(priority: u8) -> Result<u8> {
    if priority > MAX_PRIORITY {
        return Err(Error::InvalidPriority(priority));
    }
    Ok(priority)
}

fn check_unique_targets(task_id: &TaskId, dependencies: &[Dependency]) -> Result<()> {
    let mut seen = HashSet::new();
    for dep in dependencies {
        if !seen.insert(&dep.task_id) {
            return Err(Error::DuplicateDependency {
                task_id: task_id.clone(),
                target: dep.task_id.clone(),
            });
        }
    }
    Ok(())
}

#[async_trait]
impl GraphRepository for MemoryStore {
    async fn get_task(&self, id: &TaskId) -> Result<Option<Task>> {
        Ok(self.lock().await.tasks.get(id).cloned())
    }

    async fn list_tasks(&self, task_list_id: &TaskListId) -> Result<Vec<Task>> {
        let inner = self.lock().await;
        Ok(inner
            .task_order
            .iter()
            .filter_map(|tid| inner.tasks.get(tid))
            .filter(|task| task.task_list_id == *task_list_id)
            .cloned()
            .collect())
    }

    async fn get_task_list(&self, id: &TaskListId) -> Result<Option<TaskList>> {
        Ok(self.lock().await.task_lists.get(id).cloned())
    }

    async fn get_project(&self, id: &ProjectId) -> Result<Option<Project>> {
        Ok(self.lock().await.projects.get(id).cloned())
    }

    async fn list_task_lists(&self, project_id: &ProjectId) -> Result<Vec<TaskList>> {
        let inner = self.lock().await;
        Ok(inner
            .task_list_order
            .iter()
            .filter_map(|lid| inner.task_lists.get(lid))
            .filter(|list| list.project_id.as_ref() == Some(project_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn create_project(&mut self, new: NewProject) -> Result<Project> {
        new.validate().map_err(Error::Validation)?;
        let mut inner = self.lock().await;
        let id = ProjectId::from(inner.id_generator.generate(EntityKind::Project, &new.name)?);
        let now = Utc::now();
        let project = Project {
            id: id.clone(),
            name: new.name.trim().to_string(),
            description: new.description,
            created_at: now,
            updated_at: now,
        };
        inner.project_order.push(id.clone());
        inner.projects.insert(id, project.clone());
        tracing::debug!(project_id = %project.id, "created project");
        Ok(project)
    }

    async fn update_project(&mut self, id: &ProjectId, updates: ProjectUpdate) -> Result<Project> {
        let mut inner = self.lock().await;
        let Some(project) = inner.projects.get_mut(id) else {
            return Err(Error::ProjectNotFound(id.clone()));
        };
        if let Some(name) = updates.name {
            domain::validate_title("project", &name).map_err(Error::Validation)?;
            project.name = name.trim().to_string();
        }
        if let Some(description) = updates.description {
            domain::validate_description(&description).map_err(Error::Validation)?;
            project.description = description;
        }
        project.updated_at = Utc::now();
        Ok(project.clone())
    }

    async fn delete_project(&mut self, id: &ProjectId) -> Result<()> {
        let mut inner = self.lock().await;
        if !inner.projects.contains_key(id) {
            return Err(Error::ProjectNotFound(id.clone()));
        }
        let owned_lists: Vec<TaskListId> = inner
            .task_list_order
            .iter()
            .filter(|lid| {
                inner
                    .task_lists
                    .get(*lid)
                    .is_some_and(|list| list.project_id.as_ref() == Some(id))
            })
            .cloned()
            .collect();
        for lid in &owned_lists {
            inner.remove_task_list_cascade(lid);
        }
        inner.projects.remove(id);
        inner.project_order.retain(|pid| pid != id);
        tracing::debug!(project_id = %id, cascaded_lists = owned_lists.len(), "deleted project");
        Ok(())
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        let inner = self.lock().await;
        Ok(inner
            .project_order
            .iter()
            .filter_map(|pid| inner.projects.get(pid))
            .cloned()
            .collect())
    }

    async fn create_task_list(&mut self, new: NewTaskList) -> Result<TaskList> {
        new.validate().map_err(Error::Validation)?;
        let mut inner = self.lock().await;
        if let Some(project_id) = &new.project_id {
            if !inner.projects.contains_key(project_id) {
                return Err(Error::ProjectNotFound(project_id.clone()));
            }
        }
        let id = TaskListId::from(inner.id_generator.generate(EntityKind::TaskList, &new.title)?);
        let now = Utc::now();
        let list = TaskList {
            id: id.clone(),
            project_id: new.project_id,
            title: new.title.trim().to_string(),
            description: new.description,
            created_at: now,
            updated_at: now,
        };
        inner.task_list_order.push(id.clone());
        inner.task_lists.insert(id, list.clone());
        tracing::debug!(task_list_id = %list.id, "created task list");
        Ok(list)
    }

    async fn update_task_list(
        &mut self,
        id: &TaskListId,
        updates: TaskListUpdate,
    ) -> Result<TaskList> {
        let mut inner = self.lock().await;
        let Some(list) = inner.task_lists.get_mut(id) else {
            return Err(Error::TaskListNotFound(id.clone()));
        };
        if let Some(title) = updates.title {
            domain::validate_title("task list", &title).map_err(Error::Validation)?;
            list.title = title.trim().to_string();
        }
        if let Some(description) = updates.description {
            domain::validate_description(&description).map_err(Error::Validation)?;
            list.description = description;
        }
        list.updated_at = Utc::now();
        Ok(list.clone())
    }

    async fn delete_task_list(&mut self, id: &TaskListId) -> Result<()> {
        let mut inner = self.lock().await;
        if !inner.task_lists.contains_key(id) {
            return Err(Error::TaskListNotFound(id.clone()));
        }
        inner.remove_task_list_cascade(id);
        tracing::debug!(task_list_id = %id, "deleted task list");
        Ok(())
    }

    async fn list_all_task_lists(&self) -> Result<Vec<TaskList>> {
        let inner = self.lock().await;
        Ok(inner
            .task_list_order
            .iter()
            .filter_map(|lid| inner.task_lists.get(lid))
            .cloned()
            .collect())
    }

    async fn create_task(&mut self, new: NewTask) -> Result<Task> {
        new.validate().map_err(Error::Validation)?;
        let priority = check_priority(new.priority.unwrap_or(DEFAULT_PRIORITY))?;
        let mut inner = self.lock().await;
        if !inner.task_lists.contains_key(&new.task_list_id) {
            return Err(Error::TaskListNotFound(new.task_list_id));
        }
        let id = TaskId::from(inner.id_generator.generate(EntityKind::Task, &new.title)?);
        check_unique_targets(&id, &new.dependencies)?;
        let now = Utc::now();
        let task = Task {
            id: id.clone(),
            task_list_id: new.task_list_id,
            title: new.title.trim().to_string(),
            description: new.description,
            status: domain::TaskStatus::NotStarted,
            priority,
            dependencies: new.dependencies,
            exit_criteria: new
                .exit_criteria
                .into_iter()
                .map(domain::ExitCriterion::new)
                .collect(),
            created_at: now,
            updated_at: now,
            completed_at: None,
        };
        inner.task_order.push(id.clone());
        inner.tasks.insert(id, task.clone());
        tracing::debug!(task_id = %task.id, "created task");
        Ok(task)
    }

    async fn update_task(&mut self, id: &TaskId, updates: TaskUpdate) -> Result<Task> {
        if let Some(priority) = updates.priority {
            check_priority(priority)?;
        }
        let mut inner = self.lock().await;
        let Some(task) = inner.tasks.get_mut(id) else {
            return Err(Error::TaskNotFound(id.clone()));
        };
        if let Some(title) = updates.title {
            domain::validate_title("task", &title).map_err(Error::Validation)?;
            task.title = title.trim().to_string();
        }
        if let Some(description) = updates.description {
            domain::validate_description(&description).map_err(Error::Validation)?;
            task.description = description;
        }
        if let Some(priority) = updates.priority {
            task.priority = priority;
        }
        if let Some(criteria) = updates.exit_criteria {
            task.exit_criteria = criteria;
        }
        if let Some(status) = updates.status {
            if status != task.status {
                task.completed_at = status.is_completed().then(Utc::now);
                task.status = status;
            }
        }
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn delete_task(&mut self, id: &TaskId) -> Result<()> {
        let mut inner = self.lock().await;
        if !inner.tasks.contains_key(id) {
            return Err(Error::TaskNotFound(id.clone()));
        }
        let dependents = inner.dependents_of(id);
        if !dependents.is_empty() {
            return Err(Error::HasDependents {
                task_id: id.clone(),
                dependent_count: dependents.len(),
                dependents,
            });
        }
        inner.tasks.remove(id);
        inner.task_order.retain(|tid| tid != id);
        tracing::debug!(task_id = %id, "deleted task");
        Ok(())
    }

    async fn set_task_dependencies(
        &mut self,
        id: &TaskId,
        dependencies: Vec<Dependency>,
    ) -> Result<Task> {
        check_unique_targets(id, &dependencies)?;
        let mut inner = self.lock().await;
        let Some(task) = inner.tasks.get_mut(id) else {
            return Err(Error::TaskNotFound(id.clone()));
        };
        task.dependencies = dependencies;
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn count_tasks(&self) -> Result<usize> {
        Ok(self.lock().await.tasks.len())
    }

    async fn export(&self) -> Result<StoreContents> {
        Ok(self.lock().await.snapshot())
    }

    async fn import(&mut self, contents: StoreContents) -> Result<()> {
        self.lock().await.replace(contents);
        Ok(())
    }

    async fn save(&self) -> Result<()> {
        Ok(())
    }

    async fn reload(&mut self) -> Result<()> {
        Ok(())
    }
}
