//! Structural analysis: critical path, bottlenecks, leaves, progress, and
//! cycle diagnostics.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::domain::TaskId;

use super::scope::ScopeSnapshot;

/// A prerequisite that two or more in-scope tasks are waiting on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bottleneck {
    /// The contended prerequisite.
    pub task_id: TaskId,
    /// How many in-scope tasks depend on it.
    pub dependent_count: usize,
}

/// Everything the analyzer knows about one scope, computed in a single pass
/// over one snapshot so the numbers are mutually consistent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphReport {
    /// Number of tasks in scope.
    pub total_tasks: usize,
    /// Number of completed tasks in scope.
    pub completed_tasks: usize,
    /// Percentage of tasks completed, `0.0` for an empty scope.
    pub completion_progress: f64,
    /// Longest prerequisite chain, listed prerequisite-first.
    pub critical_path: Vec<TaskId>,
    /// Number of tasks on the critical path.
    pub critical_path_length: usize,
    /// High fan-in prerequisites, most contended first.
    pub bottlenecks: Vec<Bottleneck>,
    /// Tasks with no dependencies at all, the natural starting points.
    pub leaf_tasks: Vec<TaskId>,
    /// Dependency cycles, present only when out-of-band writes have damaged
    /// the graph; the admission gate never lets one in.
    pub cycles: Vec<Vec<TaskId>>,
}

/// Runs every analysis over one snapshot and bundles the results.
pub(crate) fn analyze_snapshot(snapshot: &ScopeSnapshot) -> GraphReport {
    let path = critical_path(snapshot);
    let completed = snapshot
        .tasks()
        .iter()
        .filter(|t| t.status.is_completed())
        .count();
    GraphReport {
        total_tasks: snapshot.len(),
        completed_tasks: completed,
        completion_progress: completion_progress(snapshot),
        critical_path_length: path.len(),
        critical_path: path,
        bottlenecks: bottleneck_tasks(snapshot),
        leaf_tasks: leaf_tasks(snapshot),
        cycles: detect_cycles(snapshot),
    }
}

/// Longest dependency chain in the scope, prerequisite-first.
///
/// Kahn's algorithm over the in-scope edges, with a longest-path relaxation:
/// processing a task in topological order relaxes each of its dependents to
/// `length(task) + 1`, recording a parent pointer on improvement. The path is
/// recovered by walking parents back from the task with the greatest length.
/// Tasks trapped in a cycle never enter the queue and simply keep their
/// initial length of one.
pub(crate) fn critical_path(snapshot: &ScopeSnapshot) -> Vec<TaskId> {
    let n = snapshot.len();
    if n == 0 {
        return Vec::new();
    }

    let mut indegree: Vec<usize> = (0..n).map(|i| snapshot.prerequisite_count(i)).collect();
    let mut queue: VecDeque<usize> = (0..n).filter(|&i| indegree[i] == 0).collect();
    let mut length = vec![1usize; n];
    let mut parent: Vec<Option<usize>> = vec![None; n];

    while let Some(pos) = queue.pop_front() {
        for dependent in snapshot.dependents_of(pos) {
            if length[pos] + 1 > length[dependent] {
                length[dependent] = length[pos] + 1;
                parent[dependent] = Some(pos);
            }
            indegree[dependent] -= 1;
            if indegree[dependent] == 0 {
                queue.push_back(dependent);
            }
        }
    }

    let mut end = 0;
    for pos in 1..n {
        if length[pos] > length[end] {
            end = pos;
        }
    }

    let mut path = Vec::new();
    let mut cursor = Some(end);
    while let Some(pos) = cursor {
        path.push(snapshot.task(pos).id.clone());
        cursor = parent[pos];
    }
    path.reverse();
    path
}

/// Prerequisites with fan-in of two or more, sorted by fan-in descending.
/// The sort is stable, so equal fan-ins stay in discovery order.
pub(crate) fn bottleneck_tasks(snapshot: &ScopeSnapshot) -> Vec<Bottleneck> {
    let mut bottlenecks: Vec<Bottleneck> = (0..snapshot.len())
        .filter_map(|pos| {
            let fan_in = snapshot.dependent_count(pos);
            (fan_in >= 2).then(|| Bottleneck {
                task_id: snapshot.task(pos).id.clone(),
                dependent_count: fan_in,
            })
        })
        .collect();
    bottlenecks.sort_by(|a, b| b.dependent_count.cmp(&a.dependent_count));
    bottlenecks
}

/// Tasks that declare no dependencies, in discovery order. Declared edges
/// count even when their target is outside the scope.
pub(crate) fn leaf_tasks(snapshot: &ScopeSnapshot) -> Vec<TaskId> {
    snapshot
        .tasks()
        .iter()
        .filter(|task| task.dependencies.is_empty())
        .map(|task| task.id.clone())
        .collect()
}

/// Percentage of in-scope tasks completed; `0.0` for an empty scope.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn completion_progress(snapshot: &ScopeSnapshot) -> f64 {
    let total = snapshot.len();
    if total == 0 {
        return 0.0;
    }
    let completed = snapshot
        .tasks()
        .iter()
        .filter(|task| task.status.is_completed())
        .count();
    (completed as f64 / total as f64) * 100.0
}

#[derive(Clone, Copy, PartialEq)]
enum Color {
    White,
    Gray,
    Black,
}

enum Frame {
    Enter(usize),
    Exit(usize),
}

/// Finds dependency cycles with an iterative three-color depth-first search.
///
/// Every back edge (an edge into a gray node) reports one cycle, traced by
/// walking parent pointers from the edge's source back to its target,
/// inclusive. Overlapping cycles are reported as seen, without
/// deduplication; an acyclic scope reports none.
pub(crate) fn detect_cycles(snapshot: &ScopeSnapshot) -> Vec<Vec<TaskId>> {
    let n = snapshot.len();
    let mut color = vec![Color::White; n];
    let mut parent: Vec<Option<usize>> = vec![None; n];
    let mut cycles = Vec::new();

    for start in 0..n {
        if color[start] != Color::White {
            continue;
        }
        let mut stack = vec![Frame::Enter(start)];
        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter(pos) => {
                    if color[pos] != Color::White {
                        continue;
                    }
                    color[pos] = Color::Gray;
                    stack.push(Frame::Exit(pos));
                    let prerequisites = snapshot.prerequisites_of(pos);
                    // Reversed so the first declared prerequisite is explored
                    // first, as a recursive walk would.
                    for &next in prerequisites.iter().rev() {
                        match color[next] {
                            Color::White => {
                                parent[next] = Some(pos);
                                stack.push(Frame::Enter(next));
                            }
                            Color::Gray => cycles.push(trace_cycle(snapshot, pos, next, &parent)),
                            Color::Black => {}
                        }
                    }
                }
                Frame::Exit(pos) => color[pos] = Color::Black,
            }
        }
    }
    cycles
}

fn trace_cycle(
    snapshot: &ScopeSnapshot,
    source: usize,
    target: usize,
    parent: &[Option<usize>],
) -> Vec<TaskId> {
    let mut positions = vec![source];
    let mut cursor = source;
    while cursor != target {
        match parent[cursor] {
            Some(p) => {
                positions.push(p);
                cursor = p;
            }
            None => break,
        }
    }
    positions.reverse();
    positions
        .into_iter()
        .map(|pos| snapshot.task(pos).id.clone())
        .collect()
}
