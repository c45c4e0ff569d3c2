//! Command-line argument definitions.

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::domain::{TaskStatus, MAX_PRIORITY};
use crate::error::{Error, Result};
use crate::graph::{RenderFormat, Scope};
use crate::workspace::{validate_prefix, DEFAULT_PREFIX};

/// Top-level command line.
#[derive(Debug, Parser)]
#[command(
    name = "trellis",
    version,
    about = "Dependency-aware task tracking for projects, task lists, and tasks",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Emit JSON instead of formatted text.
    #[arg(long, global = true)]
    pub json: bool,

    /// What to do.
    #[command(subcommand)]
    pub command: Commands,
}

/// All subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Initialize a workspace in the current directory.
    Init(InitArgs),
    /// Show workspace summary: backend, prefix, entity counts.
    Info,
    /// Manage projects.
    #[command(subcommand)]
    Project(ProjectCommand),
    /// Manage task lists.
    #[command(subcommand)]
    List(ListCommand),
    /// Manage tasks.
    #[command(subcommand)]
    Task(TaskCommand),
    /// Replace a task's dependencies.
    Deps(DepsArgs),
    /// Show tasks ready to be worked on.
    Ready(ReadyArgs),
    /// Analyze a scope's dependency graph.
    Analyze(AnalyzeArgs),
    /// Render a scope's dependency graph.
    Graph(GraphArgs),
}

/// Arguments for `trellis init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Prefix stamped into generated ids (2-20 alphanumerics).
    #[arg(long, default_value = DEFAULT_PREFIX, value_parser = parse_prefix)]
    pub prefix: String,
}

/// Project management subcommands.
#[derive(Debug, Subcommand)]
pub enum ProjectCommand {
    /// Create a project.
    Add {
        /// Project name.
        name: String,
        /// Longer description.
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List all projects.
    List,
    /// Show one project and its task lists.
    Show {
        /// Project id.
        id: String,
    },
    /// Delete a project and everything in it.
    Remove {
        /// Project id.
        id: String,
    },
}

/// Task list management subcommands.
#[derive(Debug, Subcommand)]
pub enum ListCommand {
    /// Create a task list.
    Add {
        /// List title.
        title: String,
        /// Owning project id; omit for a free-standing list.
        #[arg(long)]
        project: Option<String>,
        /// Longer description.
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List all task lists.
    List,
    /// Show one task list and its tasks.
    Show {
        /// Task list id.
        id: String,
    },
    /// Delete a task list and its tasks.
    Remove {
        /// Task list id.
        id: String,
    },
}

/// Task management subcommands.
#[derive(Debug, Subcommand)]
pub enum TaskCommand {
    /// Create a task.
    Add(TaskAddArgs),
    /// Show one task in full.
    Show {
        /// Task id.
        id: String,
    },
    /// Update a task's fields.
    Update(TaskUpdateArgs),
    /// Mark a task completed.
    Done {
        /// Task id.
        id: String,
    },
    /// Delete a task. Fails while other tasks depend on it.
    Remove {
        /// Task id.
        id: String,
    },
    /// List the tasks in one task list.
    List {
        /// Task list id.
        #[arg(long)]
        list: String,
    },
}

/// Arguments for `trellis task add`.
#[derive(Debug, Args)]
pub struct TaskAddArgs {
    /// Task title.
    pub title: String,
    /// Task list the task belongs to.
    #[arg(long)]
    pub list: String,
    /// Longer description.
    #[arg(long, default_value = "")]
    pub description: String,
    /// Priority 0 (highest) to 4 (lowest).
    #[arg(long, value_parser = parse_priority)]
    pub priority: Option<u8>,
    /// Task this one depends on; repeatable.
    #[arg(long = "depends-on", value_name = "TASK_ID")]
    pub depends_on: Vec<String>,
    /// Exit criterion that must hold before completion; repeatable.
    #[arg(long = "criterion", value_name = "TEXT")]
    pub criteria: Vec<String>,
}

/// Arguments for `trellis task update`.
#[derive(Debug, Args)]
pub struct TaskUpdateArgs {
    /// Task id.
    pub id: String,
    /// New title.
    #[arg(long)]
    pub title: Option<String>,
    /// New description.
    #[arg(long)]
    pub description: Option<String>,
    /// New status.
    #[arg(long, value_enum)]
    pub status: Option<StatusArg>,
    /// New priority 0-4.
    #[arg(long, value_parser = parse_priority)]
    pub priority: Option<u8>,
}

/// Arguments for `trellis deps`.
#[derive(Debug, Args)]
pub struct DepsArgs {
    /// Task whose dependencies are being replaced.
    pub id: String,
    /// New dependency target; repeatable. No targets clears the set.
    #[arg(long = "on", value_name = "TASK_ID")]
    pub on: Vec<String>,
}

/// Scope selection shared by ready/analyze/graph.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct ScopeArgs {
    /// Operate on every task list in this project.
    #[arg(long, value_name = "PROJECT_ID")]
    pub project: Option<String>,
    /// Operate on a single task list.
    #[arg(long, value_name = "LIST_ID")]
    pub list: Option<String>,
}

impl ScopeArgs {
    /// The selected scope.
    pub fn to_scope(&self) -> Result<Scope> {
        match (&self.project, &self.list) {
            (Some(project), _) => Scope::parse("project", project),
            (_, Some(list)) => Scope::parse("task_list", list),
            _ => Err(Error::Config(
                "a scope is required: pass --project or --list".to_string(),
            )),
        }
    }
}

/// Arguments for `trellis ready`.
#[derive(Debug, Args)]
pub struct ReadyArgs {
    /// Scope to query.
    #[command(flatten)]
    pub scope: ScopeArgs,
    /// Offer only untouched tasks, for boards shared by several workers.
    #[arg(long)]
    pub multi_agent: bool,
}

/// Arguments for `trellis analyze`.
#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Scope to analyze.
    #[command(flatten)]
    pub scope: ScopeArgs,
}

/// Arguments for `trellis graph`.
#[derive(Debug, Args)]
pub struct GraphArgs {
    /// Scope to render.
    #[command(flatten)]
    pub scope: ScopeArgs,
    /// Output format.
    #[arg(long, value_enum, default_value_t = FormatArg::Ascii)]
    pub format: FormatArg,
}

/// Status values accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    /// Work has not begun.
    NotStarted,
    /// Work is underway.
    InProgress,
    /// Work is stalled outside the dependency graph.
    Blocked,
    /// Work is finished.
    Completed,
}

impl From<StatusArg> for TaskStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::NotStarted => TaskStatus::NotStarted,
            StatusArg::InProgress => TaskStatus::InProgress,
            StatusArg::Blocked => TaskStatus::Blocked,
            StatusArg::Completed => TaskStatus::Completed,
        }
    }
}

/// Render formats accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Box-drawing tree.
    Ascii,
    /// Graphviz DOT.
    Dot,
    /// Mermaid flowchart.
    Mermaid,
}

impl From<FormatArg> for RenderFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Ascii => RenderFormat::Ascii,
            FormatArg::Dot => RenderFormat::Dot,
            FormatArg::Mermaid => RenderFormat::Mermaid,
        }
    }
}

fn parse_prefix(value: &str) -> std::result::Result<String, String> {
    validate_prefix(value)?;
    Ok(value.to_string())
}

fn parse_priority(value: &str) -> std::result::Result<u8, String> {
    let priority: u8 = value
        .parse()
        .map_err(|_| format!("priority must be a number 0-{MAX_PRIORITY}"))?;
    if priority > MAX_PRIORITY {
        return Err(format!("priority must be 0-{MAX_PRIORITY}"));
    }
    Ok(priority)
}
