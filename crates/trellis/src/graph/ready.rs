//! Readiness: which tasks can be picked up right now.

use crate::domain::{Task, TaskStatus};
use crate::error::Result;
use crate::store::GraphRepository;

use super::scope::{resolve_scope_tasks, Scope};

/// How strictly readiness treats tasks that are already claimed.
///
/// The mode is passed explicitly on every call; nothing about it is stored,
/// so the same graph can serve both styles of consumer concurrently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadinessMode {
    /// One worker drives the board: tasks already in progress or blocked
    /// still count as workable.
    #[default]
    SingleAgent,
    /// Many workers pull from the board: only untouched tasks are offered,
    /// so two workers never pick up the same task.
    MultiAgent,
}

impl ReadinessMode {
    /// The wire label for this mode.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ReadinessMode::SingleAgent => "single_agent",
            ReadinessMode::MultiAgent => "multi_agent",
        }
    }
}

impl std::fmt::Display for ReadinessMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReadinessMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "single_agent" => Ok(ReadinessMode::SingleAgent),
            "multi_agent" => Ok(ReadinessMode::MultiAgent),
            other => Err(format!(
                "unknown readiness mode '{other}': expected single_agent or multi_agent"
            )),
        }
    }
}

/// Is this task workable right now?
///
/// Completed tasks are never ready. In [`ReadinessMode::MultiAgent`] only
/// `NotStarted` tasks qualify. Beyond status, every declared dependency must
/// resolve to a completed task; a dependency that no longer resolves keeps
/// the task not ready rather than silently unblocking it. Dependency targets
/// are looked up globally, so edges into other task lists are honored even
/// when the readiness query is scoped to one list.
pub(crate) async fn is_ready(
    repo: &dyn GraphRepository,
    task: &Task,
    mode: ReadinessMode,
) -> Result<bool> {
    if task.status.is_completed() {
        return Ok(false);
    }
    if mode == ReadinessMode::MultiAgent && task.status != TaskStatus::NotStarted {
        return Ok(false);
    }
    for dep in &task.dependencies {
        match repo.get_task(&dep.task_id).await? {
            Some(target) if target.status.is_completed() => {}
            _ => return Ok(false),
        }
    }
    Ok(true)
}

/// All ready tasks in a scope, in the scope's task order.
pub(crate) async fn get_ready_tasks(
    repo: &dyn GraphRepository,
    scope: &Scope,
    mode: ReadinessMode,
) -> Result<Vec<Task>> {
    let tasks = resolve_scope_tasks(repo, scope).await?;
    let mut ready = Vec::new();
    for task in tasks {
        if is_ready(repo, &task, mode).await? {
            ready.push(task);
        }
    }
    Ok(ready)
}
