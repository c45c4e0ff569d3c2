//! Terminal output: text formatting for entities and reports, plus the JSON
//! escape hatch every command supports.

pub mod color;

use serde::Serialize;

use crate::domain::{Project, Task, TaskList};
use crate::error::Result;
use crate::graph::GraphReport;

use color::{priority_label, status_icon, status_label};

const DEFAULT_WIDTH: usize = 80;
const MIN_WIDTH: usize = 40;
const MAX_WIDTH: usize = 120;

/// Whether a command prints human text or machine JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Formatted text for terminals.
    Text,
    /// Pretty-printed JSON on stdout.
    Json,
}

/// Terminal capabilities detected once per invocation.
#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    /// Use Unicode glyphs; `TRELLIS_ASCII=1` turns them off.
    pub unicode: bool,
    /// Wrap width for long text.
    pub width: usize,
}

impl OutputConfig {
    /// Detects the terminal width and glyph support from the environment.
    #[must_use]
    pub fn detect() -> Self {
        let unicode = std::env::var_os("TRELLIS_ASCII").is_none();
        let width = std::env::var("TRELLIS_MAX_WIDTH")
            .ok()
            .and_then(|w| w.parse::<usize>().ok())
            .or_else(|| terminal_size::terminal_size().map(|(w, _)| usize::from(w.0)))
            .unwrap_or(DEFAULT_WIDTH)
            .clamp(MIN_WIDTH, MAX_WIDTH);
        Self { unicode, width }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            unicode: true,
            width: DEFAULT_WIDTH,
        }
    }
}

/// Pretty-prints any serializable value to stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One-line task summary: icon, id, priority, title.
#[must_use]
pub fn task_line(task: &Task, config: &OutputConfig) -> String {
    format!(
        "{} {} [{}] {}",
        status_icon(task.status, config.unicode),
        task.id,
        priority_label(task.priority),
        task.title
    )
}

/// Prints a list of one-line task summaries, or a placeholder when empty.
pub fn print_task_lines(tasks: &[Task], config: &OutputConfig) {
    if tasks.is_empty() {
        println!("(none)");
        return;
    }
    for task in tasks {
        println!("{}", task_line(task, config));
    }
}

/// Prints a task in full.
pub fn print_task(task: &Task, config: &OutputConfig) {
    println!("{}", task_line(task, config));
    println!("  list:     {}", task.task_list_id);
    println!("  status:   {}", status_label(task.status));
    if !task.dependencies.is_empty() {
        let targets: Vec<&str> = task
            .dependencies
            .iter()
            .map(|d| d.task_id.as_str())
            .collect();
        println!("  blocked on: {}", targets.join(", "));
    }
    if !task.exit_criteria.is_empty() {
        println!("  exit criteria:");
        for criterion in &task.exit_criteria {
            let mark = if criterion.met { "[x]" } else { "[ ]" };
            println!("    {mark} {}", criterion.description);
        }
    }
    if !task.description.is_empty() {
        println!();
        let wrapped = textwrap::fill(
            &task.description,
            textwrap::Options::new(config.width.saturating_sub(2)),
        );
        for line in wrapped.lines() {
            println!("  {line}");
        }
    }
    if let Some(completed_at) = task.completed_at {
        println!("  completed: {}", completed_at.format("%Y-%m-%d %H:%M UTC"));
    }
}

/// One-line project summary.
pub fn print_project(project: &Project) {
    if project.description.is_empty() {
        println!("{} {}", project.id, project.name);
    } else {
        println!("{} {}: {}", project.id, project.name, project.description);
    }
}

/// One-line task list summary.
pub fn print_task_list(list: &TaskList) {
    match &list.project_id {
        Some(project_id) => println!("{} {} (project {project_id})", list.id, list.title),
        None => println!("{} {}", list.id, list.title),
    }
}

/// Prints the analyzer's report as readable text.
pub fn print_report(report: &GraphReport, _config: &OutputConfig) {
    println!(
        "{} tasks, {} completed ({:.1}%)",
        report.total_tasks, report.completed_tasks, report.completion_progress
    );

    if report.critical_path.is_empty() {
        println!("critical path: (none)");
    } else {
        let path: Vec<&str> = report.critical_path.iter().map(|id| id.as_str()).collect();
        println!(
            "critical path ({} tasks): {}",
            report.critical_path_length,
            path.join(" -> ")
        );
    }

    if report.bottlenecks.is_empty() {
        println!("bottlenecks: (none)");
    } else {
        println!("bottlenecks:");
        for bottleneck in &report.bottlenecks {
            println!(
                "  {} blocks {} tasks",
                bottleneck.task_id, bottleneck.dependent_count
            );
        }
    }

    if report.leaf_tasks.is_empty() {
        println!("leaf tasks: (none)");
    } else {
        let leaves: Vec<&str> = report.leaf_tasks.iter().map(|id| id.as_str()).collect();
        println!("leaf tasks: {}", leaves.join(", "));
    }

    if !report.cycles.is_empty() {
        println!("cycles detected:");
        for cycle in &report.cycles {
            let members: Vec<&str> = cycle.iter().map(|id| id.as_str()).collect();
            println!("  {}", members.join(" -> "));
        }
    }
}
