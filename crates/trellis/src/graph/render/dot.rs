//! Graphviz DOT renderer.

use crate::domain::TaskStatus;
use crate::graph::scope::ScopeSnapshot;

use super::{sanitize_identifier, EMPTY_SCOPE_NOTE};

fn fill_color(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::NotStarted => "lightgray",
        TaskStatus::InProgress => "lightblue",
        TaskStatus::Blocked => "lightcoral",
        TaskStatus::Completed => "palegreen",
    }
}

/// Renders the scope as a DOT digraph.
///
/// One filled node per task, colored by status, and one edge per in-scope
/// dependency, drawn prerequisite to dependent so the arrows point in the
/// direction work flows. Node identifiers are sanitized task ids; labels are
/// the task titles with embedded quotes escaped.
pub(crate) fn render_dot(snapshot: &ScopeSnapshot) -> String {
    if snapshot.is_empty() {
        return EMPTY_SCOPE_NOTE.to_string();
    }

    let mut out = String::from("digraph dependencies {\n");
    out.push_str("    rankdir=LR;\n");
    out.push_str("    node [shape=box, style=filled];\n");

    for task in snapshot.tasks() {
        let node = sanitize_identifier(task.id.as_str());
        let label = task.title.replace('"', "\\\"");
        out.push_str(&format!(
            "    {node} [label=\"{label}\", fillcolor={}];\n",
            fill_color(task.status)
        ));
    }

    for pos in 0..snapshot.len() {
        let dependent = sanitize_identifier(snapshot.task(pos).id.as_str());
        for prerequisite in snapshot.prerequisites_of(pos) {
            let prerequisite = sanitize_identifier(snapshot.task(prerequisite).id.as_str());
            out.push_str(&format!("    {prerequisite} -> {dependent};\n"));
        }
    }

    out.push_str("}\n");
    out
}
