//! Cycle admission control for proposed dependency edges.

use std::collections::HashSet;

use crate::domain::{Dependency, TaskId};
use crate::error::Result;
use crate::store::GraphRepository;

/// Would adding every edge in `candidates` to `task_id` make the persisted
/// graph cyclic?
///
/// A candidate pointing back at `task_id` itself is an immediate yes.
/// Otherwise each candidate target is walked depth-first along the already
/// stored edges; finding a path back to `task_id` means the new edge would
/// close a loop. The check treats the batch atomically: one bad edge
/// condemns the whole set. The walk follows edges wherever they lead,
/// including across task lists, and simply stops at edges whose target no
/// longer exists.
///
/// The stored graph is assumed acyclic on entry, which every write through
/// this gate preserves; a visited set bounds the walk regardless.
pub(crate) async fn would_create_cycle(
    repo: &dyn GraphRepository,
    task_id: &TaskId,
    candidates: &[Dependency],
) -> Result<bool> {
    for dep in candidates {
        if dep.task_id == *task_id {
            tracing::debug!(task_id = %task_id, "rejected self-dependency");
            return Ok(true);
        }
        if reaches(repo, &dep.task_id, task_id).await? {
            tracing::debug!(task_id = %task_id, via = %dep.task_id, "rejected cyclic dependency");
            return Ok(true);
        }
    }
    Ok(false)
}

/// Iterative DFS over persisted edges: is `target` reachable from `from`?
async fn reaches(repo: &dyn GraphRepository, from: &TaskId, target: &TaskId) -> Result<bool> {
    let mut visited: HashSet<TaskId> = HashSet::new();
    let mut stack = vec![from.clone()];
    while let Some(current) = stack.pop() {
        if current == *target {
            return Ok(true);
        }
        if !visited.insert(current.clone()) {
            continue;
        }
        if let Some(task) = repo.get_task(&current).await? {
            for dep in &task.dependencies {
                if !visited.contains(&dep.task_id) {
                    stack.push(dep.task_id.clone());
                }
            }
        }
    }
    Ok(false)
}
