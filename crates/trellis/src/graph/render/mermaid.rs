//! Mermaid flowchart renderer.

use std::collections::BTreeMap;

use crate::domain::TaskStatus;
use crate::graph::scope::ScopeSnapshot;

use super::{sanitize_identifier, status_glyph, EMPTY_SCOPE_NOTE};

fn class_name(status: TaskStatus) -> &'static str {
    status.as_str()
}

fn class_def(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::NotStarted => "classDef not_started fill:#e0e0e0,stroke:#9e9e9e",
        TaskStatus::InProgress => "classDef in_progress fill:#bbdefb,stroke:#1e88e5",
        TaskStatus::Blocked => "classDef blocked fill:#ffcdd2,stroke:#e53935",
        TaskStatus::Completed => "classDef completed fill:#c8e6c9,stroke:#43a047",
    }
}

/// Escapes characters Mermaid treats as markup using numeric character
/// references, which survive inside quoted node labels.
fn escape_label(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => escaped.push_str("#34;"),
            '[' => escaped.push_str("#91;"),
            ']' => escaped.push_str("#93;"),
            '(' => escaped.push_str("#40;"),
            ')' => escaped.push_str("#41;"),
            '{' => escaped.push_str("#123;"),
            '}' => escaped.push_str("#125;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Renders the scope as a Mermaid flowchart.
///
/// Node labels carry the status glyph next to the title; coloring happens
/// through one `classDef` per status present in the scope, applied with a
/// `class` line listing that status's nodes.
pub(crate) fn render_mermaid(snapshot: &ScopeSnapshot) -> String {
    if snapshot.is_empty() {
        return EMPTY_SCOPE_NOTE.to_string();
    }

    let mut out = String::from("flowchart TD\n");

    for task in snapshot.tasks() {
        let node = sanitize_identifier(task.id.as_str());
        let label = escape_label(&task.title);
        out.push_str(&format!(
            "    {node}[\"{} {label}\"]\n",
            status_glyph(task.status)
        ));
    }

    for pos in 0..snapshot.len() {
        let dependent = sanitize_identifier(snapshot.task(pos).id.as_str());
        for prerequisite in snapshot.prerequisites_of(pos) {
            let prerequisite = sanitize_identifier(snapshot.task(prerequisite).id.as_str());
            out.push_str(&format!("    {prerequisite} --> {dependent}\n"));
        }
    }

    // BTreeMap keyed by class name keeps the trailing blocks in a stable
    // order across runs.
    let mut by_class: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();
    for task in snapshot.tasks() {
        by_class
            .entry(class_name(task.status))
            .or_default()
            .push(sanitize_identifier(task.id.as_str()));
    }
    for (class, nodes) in &by_class {
        let Some(status) = TaskStatus::ALL.iter().find(|s| s.as_str() == *class) else {
            continue;
        };
        out.push_str(&format!("    {}\n", class_def(*status)));
        out.push_str(&format!("    class {} {class}\n", nodes.join(",")));
    }

    out
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::{Dependency, Task, TaskId, TaskListId};

    fn task(id: &str, title: &str, deps: &[&str], status: TaskStatus) -> Task {
        Task {
            id: TaskId::from(id),
            task_list_id: TaskListId::from("list-1"),
            title: title.to_string(),
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
        assert_eq!(
            render_mermaid(&ScopeSnapshot::build(Vec::new())),
            EMPTY_SCOPE_NOTE
        );
    }

    #[test]
    fn labels_carry_status_glyphs() {
        let snapshot = ScopeSnapshot::build(vec![task(
            "app-t-1",
            "design",
            &[],
            TaskStatus::Completed,
        )]);
        let mermaid = render_mermaid(&snapshot);
        assert!(mermaid.starts_with("flowchart TD\n"));
        assert!(mermaid.contains("app_t_1[\"✓ design\"]"));
    }

    #[test]
    fn edges_run_prerequisite_to_dependent() {
        let snapshot = ScopeSnapshot::build(vec![
            task("t1", "build", &["t2"], TaskStatus::NotStarted),
            task("t2", "design", &[], TaskStatus::Completed),
        ]);
        let mermaid = render_mermaid(&snapshot);
        assert!(mermaid.contains("t2 --> t1"));
    }

    #[test]
    fn markup_characters_are_escaped_numerically() {
        let snapshot = ScopeSnapshot::build(vec![task(
            "t1",
            "fix [urgent] (really) {\"now\"}",
            &[],
            TaskStatus::NotStarted,
        )]);
        let mermaid = render_mermaid(&snapshot);
        assert!(mermaid
            .contains("fix #91;urgent#93; #40;really#41; #123;#34;now#34;#125;"));
    }

    #[test]
    fn class_blocks_cover_each_status_present() {
        let snapshot = ScopeSnapshot::build(vec![
            task("t1", "one", &[], TaskStatus::NotStarted),
            task("t2", "two", &[], TaskStatus::NotStarted),
            task("t3", "three", &[], TaskStatus::Completed),
        ]);
        let mermaid = render_mermaid(&snapshot);
        assert!(mermaid.contains("classDef not_started"));
        assert!(mermaid.contains("class t1,t2 not_started"));
        assert!(mermaid.contains("classDef completed"));
        assert!(mermaid.contains("class t3 completed"));
        assert!(!mermaid.contains("classDef blocked"));
    }
}
