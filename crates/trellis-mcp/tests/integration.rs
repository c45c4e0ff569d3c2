//! Integration tests for the trellis MCP server.
//!
//! These tests exercise the MCP tools against real JSONL-backed workspaces
//! to verify end-to-end behavior including:
//! - Full project / task list / task lifecycles
//! - Gated dependency mutations (rejections leave the store untouched)
//! - Graph queries (ready tasks, analysis, rendering)
//! - Multi-workspace context switching and persistence across reopens

use rstest::rstest;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::RwLock;
use trellis_mcp::context::Context;
use trellis_mcp::error::Error;
use trellis_mcp::models::{McpTask, McpTaskList};
use trellis_mcp::tools::Tools;

mod helpers {
    use super::*;
    use std::path::Path;
    use trellis::workspace::init_workspace;

    /// Create a temporary directory initialized as a trellis workspace.
    pub fn create_temp_workspace() -> TempDir {
        let temp = TempDir::new().expect("Failed to create temp dir");
        init_workspace(temp.path(), "test").expect("Failed to initialize workspace");
        temp
    }

    /// Create a Tools instance with an empty context.
    pub fn create_tools() -> Tools {
        let context = Arc::new(RwLock::new(Context::new()));
        Tools::new(context)
    }

    /// Point the tools at the given workspace path.
    pub async fn set_context(tools: &Tools, path: &Path) {
        tools
            .set_context(&path.display().to_string())
            .await
            .expect("set_context should succeed");
    }

    /// Create a free-standing task list.
    pub async fn create_list(tools: &Tools, title: &str) -> McpTaskList {
        tools
            .create_task_list(title.to_string(), None, None, None)
            .await
            .expect("create_task_list should succeed")
    }

    /// Create a task depending on the given task ids.
    pub async fn create_task(
        tools: &Tools,
        list: &McpTaskList,
        title: &str,
        depends_on: &[&str],
    ) -> McpTask {
        tools
            .create_task(
                list.id.clone(),
                title.to_string(),
                None,
                None,
                Some(depends_on.iter().map(ToString::to_string).collect()),
                None,
                None,
            )
            .await
            .expect("create_task should succeed")
    }

    /// Mark a task completed.
    pub async fn complete(tools: &Tools, task_id: &str) {
        tools
            .update_task(task_id, None, None, Some("completed"), None, None)
            .await
            .expect("update_task should succeed");
    }
}

use helpers::*;

// ============================================================================
// Context
// ============================================================================

#[tokio::test]
async fn where_am_i_reflects_context_state() {
    let temp = create_temp_workspace();
    let tools = create_tools();

    let before = tools.where_am_i().await;
    assert!(!before.context_set);
    assert!(before.workspace_root.is_none());

    set_context(&tools, temp.path()).await;

    let after = tools.where_am_i().await;
    assert!(after.context_set);
    let root = after.workspace_root.expect("workspace root should be set");
    assert!(root.ends_with(
        temp.path()
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    ));
    assert!(after
        .data_path
        .expect("data path should be set")
        .ends_with("tasks.jsonl"));
}

#[tokio::test]
async fn operations_without_context_fail() {
    let tools = create_tools();
    let err = tools
        .create_project("orphan".to_string(), None, None)
        .await
        .expect_err("should fail without context");
    assert!(matches!(err, Error::NoContext));
}

#[tokio::test]
async fn set_context_rejects_uninitialized_directories() {
    let temp = TempDir::new().unwrap();
    let tools = create_tools();
    let err = tools
        .set_context(&temp.path().display().to_string())
        .await
        .expect_err("bare directory is not a workspace");
    assert!(matches!(err, Error::NoTrellisDirectory(_)));
    // A bad path is the caller's mistake, so it maps to invalid_params.
    assert!(err.is_caller_fault());
}

#[tokio::test]
async fn explicit_workspace_root_targets_another_workspace() {
    let first = create_temp_workspace();
    let second = create_temp_workspace();
    let tools = create_tools();
    set_context(&tools, first.path()).await;
    set_context(&tools, second.path()).await;

    // Context now points at the second workspace; write to the first by
    // naming it explicitly.
    let first_root = first.path().display().to_string();
    tools
        .create_project("first only".to_string(), None, Some(&first_root))
        .await
        .unwrap();

    let in_first = tools.list_projects(Some(&first_root)).await.unwrap();
    let in_second = tools.list_projects(None).await.unwrap();
    assert_eq!(in_first.len(), 1);
    assert!(in_second.is_empty());
}

// ============================================================================
// Projects and task lists
// ============================================================================

#[tokio::test]
async fn project_lifecycle() {
    let temp = create_temp_workspace();
    let tools = create_tools();
    set_context(&tools, temp.path()).await;

    let project = tools
        .create_project(
            "Migration".to_string(),
            Some("Move everything".to_string()),
            None,
        )
        .await
        .unwrap();
    assert!(project.id.starts_with("test-p-"));
    assert_eq!(project.description, "Move everything");

    let listed = tools.list_projects(None).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, project.id);

    let fetched = tools.get_project(&project.id, None).await.unwrap();
    assert_eq!(fetched.name, "Migration");

    let deleted = tools.delete_project(&project.id, None).await.unwrap();
    assert_eq!(deleted.deleted, project.id);

    let err = tools
        .get_project(&project.id, None)
        .await
        .expect_err("deleted project should be gone");
    assert!(err.is_caller_fault());
}

#[tokio::test]
async fn task_lists_filter_by_project() {
    let temp = create_temp_workspace();
    let tools = create_tools();
    set_context(&tools, temp.path()).await;

    let project = tools
        .create_project("API".to_string(), None, None)
        .await
        .unwrap();
    tools
        .create_task_list(
            "endpoints".to_string(),
            Some(project.id.clone()),
            None,
            None,
        )
        .await
        .unwrap();
    create_list(&tools, "free-standing").await;

    let all = tools.list_task_lists(None, None).await.unwrap();
    assert_eq!(all.len(), 2);

    let scoped = tools
        .list_task_lists(Some(&project.id), None)
        .await
        .unwrap();
    assert_eq!(scoped.len(), 1);
    assert_eq!(scoped[0].title, "endpoints");

    let err = tools
        .list_task_lists(Some("test-p-zz"), None)
        .await
        .expect_err("unknown project should be rejected");
    assert!(err.is_caller_fault());
}

// ============================================================================
// Tasks and persistence
// ============================================================================

#[tokio::test]
async fn task_lifecycle_persists_across_reopen() {
    let temp = create_temp_workspace();
    let tools = create_tools();
    set_context(&tools, temp.path()).await;

    let list = create_list(&tools, "sprint").await;
    let task = create_task(&tools, &list, "write parser", &[]).await;
    assert_eq!(task.status, "not_started");
    assert!(task.completed_at.is_none());

    let updated = tools
        .update_task(
            &task.id,
            Some("write the parser".to_string()),
            None,
            Some("completed"),
            Some(1),
            None,
        )
        .await
        .unwrap();
    assert_eq!(updated.status, "completed");
    assert_eq!(updated.priority, 1);
    assert!(updated.completed_at.is_some());

    // A fresh Tools instance reads the same state back from disk.
    let reopened = create_tools();
    set_context(&reopened, temp.path()).await;
    let fetched = reopened.get_task(&task.id, None).await.unwrap();
    assert_eq!(fetched.title, "write the parser");
    assert_eq!(fetched.status, "completed");
}

#[tokio::test]
async fn update_task_rejects_unknown_status() {
    let temp = create_temp_workspace();
    let tools = create_tools();
    set_context(&tools, temp.path()).await;

    let list = create_list(&tools, "sprint").await;
    let task = create_task(&tools, &list, "a", &[]).await;

    let err = tools
        .update_task(&task.id, None, None, Some("done"), None, None)
        .await
        .expect_err("unknown status should be rejected");
    assert!(err.is_caller_fault());
    assert!(err.to_string().contains("not_started"));
}

#[tokio::test]
async fn create_task_with_bad_dependency_leaves_no_trace() {
    let temp = create_temp_workspace();
    let tools = create_tools();
    set_context(&tools, temp.path()).await;

    let list = create_list(&tools, "sprint").await;
    let err = tools
        .create_task(
            list.id.clone(),
            "doomed".to_string(),
            None,
            None,
            Some(vec!["test-t-zz".to_string()]),
            None,
            None,
        )
        .await
        .expect_err("dependency on a ghost task should be rejected");
    assert!(err.is_caller_fault());

    let tasks = tools.list_tasks(&list.id, None).await.unwrap();
    assert!(tasks.is_empty(), "rejected task should have been rolled back");
}

#[tokio::test]
async fn cycle_rejection_keeps_existing_dependencies() {
    let temp = create_temp_workspace();
    let tools = create_tools();
    set_context(&tools, temp.path()).await;

    let list = create_list(&tools, "sprint").await;
    let a = create_task(&tools, &list, "a", &[]).await;
    let b = create_task(&tools, &list, "b", &[&a.id]).await;

    let err = tools
        .set_task_dependencies(&a.id, &[b.id.clone()], None)
        .await
        .expect_err("a -> b -> a is a cycle");
    assert!(err.is_caller_fault());

    let a_after = tools.get_task(&a.id, None).await.unwrap();
    assert!(a_after.dependencies.is_empty());
    let b_after = tools.get_task(&b.id, None).await.unwrap();
    assert_eq!(b_after.dependencies.len(), 1);
}

#[tokio::test]
async fn clearing_dependencies_unblocks_deletion() {
    let temp = create_temp_workspace();
    let tools = create_tools();
    set_context(&tools, temp.path()).await;

    let list = create_list(&tools, "sprint").await;
    let a = create_task(&tools, &list, "a", &[]).await;
    let b = create_task(&tools, &list, "b", &[&a.id]).await;

    let err = tools
        .delete_task(&a.id, None)
        .await
        .expect_err("a still has a dependent");
    assert!(err.is_caller_fault());

    tools.set_task_dependencies(&b.id, &[], None).await.unwrap();
    tools.delete_task(&a.id, None).await.unwrap();
}

// ============================================================================
// Graph queries
// ============================================================================

#[tokio::test]
async fn ready_tasks_follow_completion() {
    let temp = create_temp_workspace();
    let tools = create_tools();
    set_context(&tools, temp.path()).await;

    let list = create_list(&tools, "sprint").await;
    let a = create_task(&tools, &list, "a", &[]).await;
    let b = create_task(&tools, &list, "b", &[&a.id]).await;

    let ready = tools
        .get_ready_tasks("task_list", &list.id, None, None)
        .await
        .unwrap();
    assert_eq!(ready.len(), 1);
    assert_eq!(ready[0].id, a.id);

    complete(&tools, &a.id).await;

    let ready = tools
        .get_ready_tasks("task_list", &list.id, None, None)
        .await
        .unwrap();
    assert_eq!(ready.len(), 1);
    assert_eq!(ready[0].id, b.id);
}

#[tokio::test]
async fn ready_tasks_reject_bad_scope_and_mode() {
    let temp = create_temp_workspace();
    let tools = create_tools();
    set_context(&tools, temp.path()).await;
    let list = create_list(&tools, "sprint").await;

    let err = tools
        .get_ready_tasks("sprint", &list.id, None, None)
        .await
        .expect_err("unknown scope type");
    assert!(err.is_caller_fault());

    let err = tools
        .get_ready_tasks("task_list", &list.id, Some("solo"), None)
        .await
        .expect_err("unknown mode");
    assert!(err.is_caller_fault());
    assert!(err.to_string().contains("single_agent, multi_agent"));
}

#[tokio::test]
async fn analyze_reports_progress_and_structure() {
    let temp = create_temp_workspace();
    let tools = create_tools();
    set_context(&tools, temp.path()).await;

    let list = create_list(&tools, "sprint").await;
    let a = create_task(&tools, &list, "a", &[]).await;
    let b = create_task(&tools, &list, "b", &[&a.id]).await;
    let _c = create_task(&tools, &list, "c", &[&b.id]).await;
    let _d = create_task(&tools, &list, "d", &[&a.id]).await;
    complete(&tools, &a.id).await;

    let report = tools
        .analyze_graph("task_list", &list.id, None)
        .await
        .unwrap();
    assert_eq!(report.total_tasks, 4);
    assert_eq!(report.completed_tasks, 1);
    assert!((report.completion_progress - 25.0).abs() < f64::EPSILON);
    assert_eq!(report.critical_path_length, 3);
    assert_eq!(report.bottlenecks.len(), 1);
    assert_eq!(report.bottlenecks[0].task_id.as_str(), a.id);
    assert!(report.cycles.is_empty());
}

#[rstest]
#[case::ascii(None)]
#[case::dot(Some("dot"))]
#[case::mermaid(Some("mermaid"))]
#[tokio::test]
async fn render_produces_requested_format(#[case] format: Option<&str>) {
    let temp = create_temp_workspace();
    let tools = create_tools();
    set_context(&tools, temp.path()).await;

    let list = create_list(&tools, "sprint").await;
    let a = create_task(&tools, &list, "first", &[]).await;
    create_task(&tools, &list, "second", &[&a.id]).await;

    let rendered = tools
        .render_graph("task_list", &list.id, format, None)
        .await
        .unwrap();
    assert_eq!(rendered.format, format.unwrap_or("ascii"));
    match rendered.format.as_str() {
        "dot" => assert!(rendered.graph.contains("digraph")),
        "mermaid" => assert!(rendered.graph.contains("flowchart")),
        _ => assert!(rendered.graph.contains("first")),
    }
}

#[tokio::test]
async fn render_rejects_unknown_format_naming_the_valid_ones() {
    let temp = create_temp_workspace();
    let tools = create_tools();
    set_context(&tools, temp.path()).await;
    let list = create_list(&tools, "sprint").await;

    let err = tools
        .render_graph("task_list", &list.id, Some("svg"), None)
        .await
        .expect_err("svg is not a supported format");
    assert!(err.is_caller_fault());
    let message = err.to_string();
    assert!(message.contains("ascii"));
    assert!(message.contains("dot"));
    assert!(message.contains("mermaid"));
}
