//! Reference validation for proposed dependency sets.

use crate::domain::{Dependency, TaskId, TaskListId};
use crate::error::{Error, Result};
use crate::store::GraphRepository;

/// Checks that every proposed dependency points at a real task and declares
/// that task's actual list.
///
/// The whole set must pass before any of it is accepted; the first failure
/// rejects the batch. An empty set trivially passes. Cross-list edges are
/// legal as long as the declared list is the right one.
pub(crate) async fn validate_dependencies(
    repo: &dyn GraphRepository,
    task_id: &TaskId,
    task_list_id: &TaskListId,
    dependencies: &[Dependency],
) -> Result<()> {
    tracing::debug!(
        task_id = %task_id,
        task_list_id = %task_list_id,
        count = dependencies.len(),
        "validating dependencies"
    );
    for dep in dependencies {
        let Some(target) = repo.get_task(&dep.task_id).await? else {
            return Err(Error::InvalidDependency {
                task_id: dep.task_id.clone(),
                reason: "task does not exist".to_string(),
            });
        };
        if target.task_list_id != dep.task_list_id {
            return Err(Error::InvalidDependency {
                task_id: dep.task_id.clone(),
                reason: format!(
                    "declared in task list {} but belongs to {}",
                    dep.task_list_id, target.task_list_id
                ),
            });
        }
    }
    Ok(())
}
