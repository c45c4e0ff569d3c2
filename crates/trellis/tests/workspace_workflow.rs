//! End-to-end tests: workspace init, gated mutations through `App`, JSONL
//! persistence, and resilient reloads.

use trellis::app::App;
use trellis::domain::{Dependency, NewProject, NewTask, NewTaskList, TaskStatus, TaskUpdate};
use trellis::store::{GraphRepository, TaskStore};
use trellis::graph::{ReadinessMode, Scope};
use trellis::workspace::{init_workspace, InitOutcome, DATA_FILE};
use trellis::Error;

async fn workspace_app(dir: &std::path::Path) -> App {
    let outcome = init_workspace(dir, "demo").expect("init should succeed");
    assert!(matches!(
        outcome,
        InitOutcome::Created(_) | InitOutcome::AlreadyInitialized(_)
    ));
    App::from_directory(dir).await.expect("open should succeed")
}

#[tokio::test]
async fn state_survives_a_save_and_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = workspace_app(dir.path()).await;

    let project = app
        .store_mut()
        .create_project(NewProject {
            name: "Alpha".to_string(),
            description: "demo project".to_string(),
        })
        .await
        .unwrap();
    let list = app
        .store_mut()
        .create_task_list(NewTaskList {
            project_id: Some(project.id.clone()),
            title: "Backlog".to_string(),
            description: String::new(),
        })
        .await
        .unwrap();
    let prereq = app
        .create_task_gated(NewTask::new(list.id.clone(), "Prereq"))
        .await
        .unwrap();
    let dependent = app
        .create_task_gated(NewTask {
            dependencies: vec![Dependency::new(prereq.id.clone(), list.id.clone())],
            ..NewTask::new(list.id.clone(), "Dependent")
        })
        .await
        .unwrap();
    app.save().await.unwrap();

    // Discovery also works from a nested directory.
    let nested = dir.path().join("src/deep");
    std::fs::create_dir_all(&nested).unwrap();
    let reopened = App::from_directory(&nested).await.unwrap();

    assert_eq!(reopened.prefix(), "demo");
    assert_eq!(reopened.store().count_tasks().await.unwrap(), 2);
    let restored = reopened
        .store()
        .get_task(&dependent.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(restored.dependencies.len(), 1);
    assert_eq!(restored.dependencies[0].task_id, prereq.id);
}

#[tokio::test]
async fn opening_outside_a_workspace_fails() {
    let dir = tempfile::tempdir().unwrap();
    let result = App::from_directory(dir.path()).await;
    assert!(matches!(result, Err(Error::Config(_))));
}

#[tokio::test]
async fn rejected_creation_rolls_the_task_back() {
    let mut app = App::in_memory("demo");
    let list = app
        .store_mut()
        .create_task_list(NewTaskList {
            project_id: None,
            title: "Backlog".to_string(),
            description: String::new(),
        })
        .await
        .unwrap();

    let result = app
        .create_task_gated(NewTask {
            dependencies: vec![Dependency::new("demo-t-ghost", list.id.clone())],
            ..NewTask::new(list.id.clone(), "Doomed")
        })
        .await;
    assert!(matches!(result, Err(Error::InvalidDependency { .. })));
    assert_eq!(app.store().count_tasks().await.unwrap(), 0);
}

#[tokio::test]
async fn rejected_replacement_keeps_the_existing_edges() {
    let mut app = App::in_memory("demo");
    let list = app
        .store_mut()
        .create_task_list(NewTaskList {
            project_id: None,
            title: "Backlog".to_string(),
            description: String::new(),
        })
        .await
        .unwrap();
    let a = app
        .create_task_gated(NewTask::new(list.id.clone(), "A"))
        .await
        .unwrap();
    let b = app
        .create_task_gated(NewTask {
            dependencies: vec![Dependency::new(a.id.clone(), list.id.clone())],
            ..NewTask::new(list.id.clone(), "B")
        })
        .await
        .unwrap();

    // Closing the loop is refused and B keeps nothing; A keeps no edges.
    let result = app
        .set_dependencies_gated(&a.id, vec![Dependency::new(b.id.clone(), list.id.clone())])
        .await;
    assert!(matches!(result, Err(Error::DependencyCycle { .. })));

    let a = app.store().get_task(&a.id).await.unwrap().unwrap();
    assert!(a.dependencies.is_empty());
    let b = app.store().get_task(&b.id).await.unwrap().unwrap();
    assert_eq!(b.dependencies.len(), 1);
}

#[tokio::test]
async fn readiness_progresses_as_work_completes() {
    let mut app = App::in_memory("demo");
    let list = app
        .store_mut()
        .create_task_list(NewTaskList {
            project_id: None,
            title: "Backlog".to_string(),
            description: String::new(),
        })
        .await
        .unwrap();
    let a = app
        .create_task_gated(NewTask::new(list.id.clone(), "A"))
        .await
        .unwrap();
    let b = app
        .create_task_gated(NewTask {
            dependencies: vec![Dependency::new(a.id.clone(), list.id.clone())],
            ..NewTask::new(list.id.clone(), "B")
        })
        .await
        .unwrap();

    let scope = Scope::TaskList(list.id.clone());
    let ready = app
        .engine()
        .get_ready_tasks(&scope, ReadinessMode::SingleAgent)
        .await
        .unwrap();
    assert_eq!(ready.iter().map(|t| &t.id).collect::<Vec<_>>(), vec![&a.id]);

    app.store_mut()
        .update_task(
            &a.id,
            TaskUpdate {
                status: Some(TaskStatus::Completed),
                ..TaskUpdate::default()
            },
        )
        .await
        .unwrap();

    let ready = app
        .engine()
        .get_ready_tasks(&scope, ReadinessMode::SingleAgent)
        .await
        .unwrap();
    assert_eq!(ready.iter().map(|t| &t.id).collect::<Vec<_>>(), vec![&b.id]);
}

#[tokio::test]
async fn malformed_lines_do_not_block_a_reload() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = workspace_app(dir.path()).await;
    let list = app
        .store_mut()
        .create_task_list(NewTaskList {
            project_id: None,
            title: "Backlog".to_string(),
            description: String::new(),
        })
        .await
        .unwrap();
    app.create_task_gated(NewTask::new(list.id.clone(), "Kept"))
        .await
        .unwrap();
    app.save().await.unwrap();

    // Corrupt the data file with a non-JSON line.
    let data_file = dir.path().join(".trellis").join(DATA_FILE);
    let mut raw = std::fs::read_to_string(&data_file).unwrap();
    raw.push_str("this is not json\n");
    std::fs::write(&data_file, raw).unwrap();

    let reopened = App::from_directory(dir.path()).await.unwrap();
    assert_eq!(reopened.store().count_tasks().await.unwrap(), 1);
    assert_eq!(reopened.store().list_all_task_lists().await.unwrap().len(), 1);
}
