//! Integration tests for the in-memory storage backend.

mod common;

use common::{complete, create_list, create_task, create_task_with_deps, test_store};
use trellis::domain::{
    Dependency, NewProject, NewTask, NewTaskList, ProjectId, TaskStatus, TaskUpdate,
    DEFAULT_PRIORITY,
};
use trellis::store::{GraphRepository, TaskStore};
use trellis::Error;

// ============================================================================
// Projects and task lists
// ============================================================================

#[tokio::test]
async fn created_entities_carry_prefixed_ids() {
    let mut store = test_store();
    let project = store
        .create_project(NewProject {
            name: "Alpha".to_string(),
            description: String::new(),
        })
        .await
        .unwrap();
    assert!(project.id.as_str().starts_with("test-p-"));

    let list = create_list(&mut store, "Backlog").await;
    assert!(list.id.as_str().starts_with("test-l-"));

    let task = create_task(&mut store, &list, "First").await;
    assert!(task.id.as_str().starts_with("test-t-"));
}

#[tokio::test]
async fn task_list_creation_requires_an_existing_project() {
    let mut store = test_store();
    let result = store
        .create_task_list(NewTaskList {
            project_id: Some(ProjectId::from("test-p-missing")),
            title: "Backlog".to_string(),
            description: String::new(),
        })
        .await;
    assert!(matches!(result, Err(Error::ProjectNotFound(_))));
}

#[tokio::test]
async fn empty_names_are_rejected() {
    let mut store = test_store();
    let result = store
        .create_project(NewProject {
            name: "   ".to_string(),
            description: String::new(),
        })
        .await;
    assert!(matches!(result, Err(Error::Validation(_))));
}

#[tokio::test]
async fn deleting_a_project_cascades_to_lists_and_tasks() {
    let mut store = test_store();
    let project = store
        .create_project(NewProject {
            name: "Alpha".to_string(),
            description: String::new(),
        })
        .await
        .unwrap();
    let list = store
        .create_task_list(NewTaskList {
            project_id: Some(project.id.clone()),
            title: "Backlog".to_string(),
            description: String::new(),
        })
        .await
        .unwrap();
    create_task_with_deps(&mut store, &list, "Only", &[]).await;

    store.delete_project(&project.id).await.unwrap();

    assert!(store.get_project(&project.id).await.unwrap().is_none());
    assert!(store.get_task_list(&list.id).await.unwrap().is_none());
    assert_eq!(store.count_tasks().await.unwrap(), 0);
}

#[tokio::test]
async fn deleting_a_task_list_leaves_cross_list_edges_dangling() {
    let mut store = test_store();
    let doomed = create_list(&mut store, "Doomed").await;
    let survivor = create_list(&mut store, "Survivor").await;
    let prereq = create_task(&mut store, &doomed, "Prereq").await;
    let dependent = create_task_with_deps(&mut store, &survivor, "Dependent", &[&prereq]).await;

    store.delete_task_list(&doomed.id).await.unwrap();

    // The edge survives as an unresolved reference; readiness treats it as
    // unmet rather than silently unblocking the dependent.
    let dependent = store.get_task(&dependent.id).await.unwrap().unwrap();
    assert_eq!(dependent.dependencies.len(), 1);
    assert!(store.get_task(&prereq.id).await.unwrap().is_none());
}

// ============================================================================
// Tasks
// ============================================================================

#[tokio::test]
async fn new_tasks_start_not_started_with_default_priority() {
    let mut store = test_store();
    let list = create_list(&mut store, "Backlog").await;
    let task = create_task(&mut store, &list, "First").await;
    assert_eq!(task.status, TaskStatus::NotStarted);
    assert_eq!(task.priority, DEFAULT_PRIORITY);
    assert!(task.completed_at.is_none());
}

#[tokio::test]
async fn out_of_range_priority_is_rejected() {
    let mut store = test_store();
    let list = create_list(&mut store, "Backlog").await;
    let result = store
        .create_task(NewTask {
            priority: Some(5),
            ..NewTask::new(list.id.clone(), "Too hot")
        })
        .await;
    assert!(matches!(result, Err(Error::InvalidPriority(5))));
}

#[tokio::test]
async fn completion_timestamps_follow_status_transitions() {
    let mut store = test_store();
    let list = create_list(&mut store, "Backlog").await;
    let task = create_task(&mut store, &list, "First").await;

    complete(&mut store, &task).await;
    let done = store.get_task(&task.id).await.unwrap().unwrap();
    assert!(done.completed_at.is_some());

    let reopened = store
        .update_task(
            &task.id,
            TaskUpdate {
                status: Some(TaskStatus::InProgress),
                ..TaskUpdate::default()
            },
        )
        .await
        .unwrap();
    assert!(reopened.completed_at.is_none());
    assert_eq!(reopened.status, TaskStatus::InProgress);
}

#[tokio::test]
async fn tasks_with_dependents_cannot_be_deleted() {
    let mut store = test_store();
    let list = create_list(&mut store, "Backlog").await;
    let prereq = create_task(&mut store, &list, "Prereq").await;
    let dependent = create_task_with_deps(&mut store, &list, "Dependent", &[&prereq]).await;

    let result = store.delete_task(&prereq.id).await;
    match result {
        Err(Error::HasDependents {
            dependent_count,
            dependents,
            ..
        }) => {
            assert_eq!(dependent_count, 1);
            assert_eq!(dependents, vec![dependent.id.clone()]);
        }
        other => panic!("expected HasDependents, got {other:?}"),
    }

    // Clearing the edge makes the deletion legal.
    store
        .set_task_dependencies(&dependent.id, Vec::new())
        .await
        .unwrap();
    store.delete_task(&prereq.id).await.unwrap();
}

#[tokio::test]
async fn duplicate_dependency_targets_are_rejected() {
    let mut store = test_store();
    let list = create_list(&mut store, "Backlog").await;
    let prereq = create_task(&mut store, &list, "Prereq").await;
    let task = create_task(&mut store, &list, "Task").await;

    let dup = Dependency::new(prereq.id.clone(), prereq.task_list_id.clone());
    let result = store
        .set_task_dependencies(&task.id, vec![dup.clone(), dup])
        .await;
    assert!(matches!(result, Err(Error::DuplicateDependency { .. })));
}

#[tokio::test]
async fn list_tasks_preserves_creation_order() {
    let mut store = test_store();
    let list = create_list(&mut store, "Backlog").await;
    let a = create_task(&mut store, &list, "A").await;
    let b = create_task(&mut store, &list, "B").await;
    let c = create_task(&mut store, &list, "C").await;

    let tasks = store.list_tasks(&list.id).await.unwrap();
    let ids: Vec<_> = tasks.iter().map(|t| t.id.clone()).collect();
    assert_eq!(ids, vec![a.id, b.id, c.id]);
}

// ============================================================================
// Export / import
// ============================================================================

#[tokio::test]
async fn export_import_round_trips_all_contents() {
    let mut store = test_store();
    let list = create_list(&mut store, "Backlog").await;
    let prereq = create_task(&mut store, &list, "Prereq").await;
    create_task_with_deps(&mut store, &list, "Dependent", &[&prereq]).await;

    let contents = store.export().await.unwrap();
    let mut other = test_store();
    other.import(contents).await.unwrap();

    assert_eq!(other.count_tasks().await.unwrap(), 2);
    let tasks = other.list_tasks(&list.id).await.unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[1].dependencies.len(), 1);
}
