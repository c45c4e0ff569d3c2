//! Box-drawing tree renderer.

use std::collections::HashSet;

use crate::graph::scope::ScopeSnapshot;

use super::{status_glyph, EMPTY_SCOPE_NOTE};

/// Renders the scope as a dependency tree.
///
/// Roots are tasks nothing else in scope depends on; each root's subtree
/// descends through its prerequisites. When every task is a prerequisite of
/// something (only possible in a damaged, cyclic scope) all tasks are
/// treated as roots so nothing is silently omitted. A task reached more than
/// once renders once in full and afterwards as a one-line `(see above)`
/// backreference, which also terminates any cycle.
pub(crate) fn render_ascii(snapshot: &ScopeSnapshot) -> String {
    if snapshot.is_empty() {
        return EMPTY_SCOPE_NOTE.to_string();
    }

    let mut roots: Vec<usize> = (0..snapshot.len())
        .filter(|&pos| snapshot.dependent_count(pos) == 0)
        .collect();
    if roots.is_empty() {
        roots = (0..snapshot.len()).collect();
    }

    let mut out = String::new();
    let mut rendered: HashSet<usize> = HashSet::new();
    for &root in &roots {
        write_node(snapshot, root, &[], None, &mut rendered, &mut out);
    }
    out
}

fn node_line(snapshot: &ScopeSnapshot, pos: usize) -> String {
    let task = snapshot.task(pos);
    format!("{} {} {}", status_glyph(task.status), task.id, task.title)
}

fn write_node(
    snapshot: &ScopeSnapshot,
    pos: usize,
    ancestors: &[bool],
    connector: Option<bool>,
    rendered: &mut HashSet<usize>,
    out: &mut String,
) {
    for &has_more_siblings in ancestors {
        out.push_str(if has_more_siblings { "│   " } else { "    " });
    }
    if let Some(is_last) = connector {
        out.push_str(if is_last { "└── " } else { "├── " });
    }

    if !rendered.insert(pos) {
        out.push_str(&node_line(snapshot, pos));
        out.push_str(" (see above)\n");
        return;
    }
    out.push_str(&node_line(snapshot, pos));
    out.push('\n');

    let prerequisites = snapshot.prerequisites_of(pos);
    for (i, &child) in prerequisites.iter().enumerate() {
        let is_last = i == prerequisites.len() - 1;
        let mut child_ancestors = ancestors.to_vec();
        if let Some(parent_is_last) = connector {
            child_ancestors.push(!parent_is_last);
        }
        write_node(snapshot, child, &child_ancestors, Some(is_last), rendered, out);
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::{Dependency, Task, TaskId, TaskListId, TaskStatus};

    fn task(id: &str, deps: &[&str], status: TaskStatus) -> Task {
        Task {
            id: TaskId::from(id),
            task_list_id: TaskListId::from("list-1"),
            title: format!("title of {id}"),
            description: String::new(),
            status,
            priority: 2,
            dependencies: deps
                .iter()
                .map(|d| Dependency::new(*d, "list-1"))
                .collect(),
            exit_criteria: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            completed_at: None,
        }
    }

    #[test]
    fn empty_scope_renders_the_sentinel() {
        assert_eq!(render_ascii(&ScopeSnapshot::build(Vec::new())), EMPTY_SCOPE_NOTE);
    }

    #[test]
    fn chain_renders_nested_prerequisites() {
        let snapshot = ScopeSnapshot::build(vec![
            task("a", &["b"], TaskStatus::InProgress),
            task("b", &["c"], TaskStatus::NotStarted),
            task("c", &[], TaskStatus::Completed),
        ]);
        let tree = render_ascii(&snapshot);
        assert_eq!(
            tree,
            "▶ a title of a\n\
             └── ○ b title of b\n\
             \u{20}   └── ✓ c title of c\n"
        );
    }

    #[test]
    fn shared_prerequisite_renders_once_then_backrefs() {
        let snapshot = ScopeSnapshot::build(vec![
            task("root", &["x", "y"], TaskStatus::NotStarted),
            task("x", &["shared"], TaskStatus::NotStarted),
            task("y", &["shared"], TaskStatus::NotStarted),
            task("shared", &[], TaskStatus::NotStarted),
        ]);
        let tree = render_ascii(&snapshot);
        assert_eq!(tree.matches("shared").count(), 2);
        assert_eq!(tree.matches("(see above)").count(), 1);
    }

    #[test]
    fn cyclic_scope_falls_back_to_all_roots_and_terminates() {
        let snapshot = ScopeSnapshot::build(vec![
            task("x", &["y"], TaskStatus::NotStarted),
            task("y", &["x"], TaskStatus::NotStarted),
        ]);
        let tree = render_ascii(&snapshot);
        assert!(tree.contains("x title of x"));
        assert!(tree.contains("y title of y"));
        assert!(tree.contains("(see above)"));
    }

    #[test]
    fn two_roots_render_at_top_level() {
        let snapshot = ScopeSnapshot::build(vec![
            task("a", &["c"], TaskStatus::NotStarted),
            task("b", &["c"], TaskStatus::NotStarted),
            task("c", &[], TaskStatus::NotStarted),
        ]);
        let tree = render_ascii(&snapshot);
        let top_level: Vec<&str> = tree
            .lines()
            .filter(|l| !l.starts_with(' ') && !l.starts_with('│') && !l.starts_with('├') && !l.starts_with('└'))
            .collect();
        assert_eq!(top_level.len(), 2);
    }
}
