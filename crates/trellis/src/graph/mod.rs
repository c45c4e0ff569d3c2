//! The dependency graph engine.
//!
//! Storage persists edges verbatim; this module owns every graph judgment
//! made about them. Writes are gated through [`GraphEngine::admit_dependencies`]
//! (reference validation, then cycle rejection) before they reach the store,
//! and reads — readiness, analysis, rendering — materialize the requested
//! [`Scope`] into a snapshot once per call and never mutate anything.
//!
//! Batches are atomic: a dependency set is accepted or rejected as a whole,
//! so a failed mutation leaves the stored set untouched.

mod analyze;
mod cycle;
mod ready;
mod render;
mod scope;
mod validate;

pub use analyze::{Bottleneck, GraphReport};
pub use ready::ReadinessMode;
pub use render::{status_glyph, RenderFormat, EMPTY_SCOPE_NOTE};
pub use scope::Scope;

use crate::domain::{Dependency, Task, TaskId, TaskListId};
use crate::error::{Error, Result};
use crate::store::GraphRepository;

use scope::ScopeSnapshot;

/// Graph operations over a repository.
///
/// The engine borrows the repository for the duration of a call and holds no
/// state of its own, so it is cheap to construct wherever one is needed.
pub struct GraphEngine<'a> {
    repo: &'a dyn GraphRepository,
}

impl<'a> GraphEngine<'a> {
    /// An engine reading through `repo`.
    #[must_use]
    pub fn new(repo: &'a dyn GraphRepository) -> Self {
        Self { repo }
    }

    /// Checks that every proposed dependency resolves to a real task in the
    /// task list it declares. Empty sets pass trivially; the first bad edge
    /// rejects the whole set.
    pub async fn validate_dependencies(
        &self,
        task_id: &TaskId,
        task_list_id: &TaskListId,
        dependencies: &[Dependency],
    ) -> Result<()> {
        validate::validate_dependencies(self.repo, task_id, task_list_id, dependencies).await
    }

    /// Would attaching `candidates` to `task_id` close a loop in the stored
    /// graph? Self-references answer yes immediately.
    pub async fn would_create_cycle(
        &self,
        task_id: &TaskId,
        candidates: &[Dependency],
    ) -> Result<bool> {
        cycle::would_create_cycle(self.repo, task_id, candidates).await
    }

    /// The full admission gate for dependency writes: reference validation
    /// followed by cycle rejection. Callers mutate the store only after this
    /// returns `Ok`.
    pub async fn admit_dependencies(
        &self,
        task_id: &TaskId,
        task_list_id: &TaskListId,
        dependencies: &[Dependency],
    ) -> Result<()> {
        self.validate_dependencies(task_id, task_list_id, dependencies)
            .await?;
        if self.would_create_cycle(task_id, dependencies).await? {
            return Err(Error::DependencyCycle {
                task_id: task_id.clone(),
            });
        }
        Ok(())
    }

    /// Is this task workable right now under the given mode?
    pub async fn is_ready(&self, task: &Task, mode: ReadinessMode) -> Result<bool> {
        ready::is_ready(self.repo, task, mode).await
    }

    /// All ready tasks in `scope`, in the scope's task order.
    pub async fn get_ready_tasks(&self, scope: &Scope, mode: ReadinessMode) -> Result<Vec<Task>> {
        ready::get_ready_tasks(self.repo, scope, mode).await
    }

    /// Computes the full structural report for `scope`.
    pub async fn analyze(&self, scope: &Scope) -> Result<GraphReport> {
        let snapshot = ScopeSnapshot::load(self.repo, scope).await?;
        Ok(analyze::analyze_snapshot(&snapshot))
    }

    /// Renders `scope` in the requested format. An empty scope renders as
    /// [`EMPTY_SCOPE_NOTE`] in every format.
    pub async fn render(&self, scope: &Scope, format: RenderFormat) -> Result<String> {
        let snapshot = ScopeSnapshot::load(self.repo, scope).await?;
        Ok(match format {
            RenderFormat::Ascii => render::render_ascii(&snapshot),
            RenderFormat::Dot => render::render_dot(&snapshot),
            RenderFormat::Mermaid => render::render_mermaid(&snapshot),
        })
    }
}
