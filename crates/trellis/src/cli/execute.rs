//! Command execution logic.

use anyhow::Result;

use super::args::{
    AnalyzeArgs, DepsArgs, GraphArgs, InitArgs, ListCommand, ProjectCommand, ReadyArgs,
    TaskCommand,
};
use crate::app::App;
use crate::domain::{
    Dependency, NewProject, NewTask, NewTaskList, ProjectId, TaskId, TaskListId, TaskStatus,
    TaskUpdate,
};
use crate::error::Error;
use crate::graph::ReadinessMode;
use crate::output::{self, OutputConfig, OutputMode};
use crate::store::{GraphRepository, TaskStore};
use crate::workspace::{init_workspace, InitOutcome};

/// Execute the init command.
pub fn execute_init(args: &InitArgs, mode: OutputMode) -> Result<()> {
    let current_dir = std::env::current_dir()?;
    let outcome = init_workspace(&current_dir, &args.prefix)?;
    match (&outcome, mode) {
        (InitOutcome::Created(dir), OutputMode::Text) => {
            println!("Initialized trellis workspace in {}", dir.display());
            println!("  id prefix: {}", args.prefix);
        }
        (InitOutcome::AlreadyInitialized(dir), OutputMode::Text) => {
            println!("Workspace already initialized in {}", dir.display());
        }
        (outcome, OutputMode::Json) => {
            let (created, dir) = match outcome {
                InitOutcome::Created(dir) => (true, dir),
                InitOutcome::AlreadyInitialized(dir) => (false, dir),
            };
            output::print_json(&serde_json::json!({
                "created": created,
                "trellis_dir": dir.display().to_string(),
                "prefix": args.prefix,
            }))?;
        }
    }
    Ok(())
}

/// Execute the info command.
pub async fn execute_info(app: &App, mode: OutputMode) -> Result<()> {
    let projects = app.store().list_projects().await?.len();
    let task_lists = app.store().list_all_task_lists().await?.len();
    let tasks = app.store().count_tasks().await?;

    match mode {
        OutputMode::Json => {
            output::print_json(&serde_json::json!({
                "trellis_dir": app.trellis_dir().display().to_string(),
                "prefix": app.prefix(),
                "projects": projects,
                "task_lists": task_lists,
                "tasks": tasks,
            }))?;
        }
        OutputMode::Text => {
            println!("Workspace:  {}", app.trellis_dir().display());
            println!("Id prefix:  {}", app.prefix());
            println!("{projects} project(s), {task_lists} task list(s), {tasks} task(s)");
        }
    }
    Ok(())
}

/// Execute a `project` subcommand.
pub async fn execute_project(app: &mut App, command: &ProjectCommand, mode: OutputMode) -> Result<()> {
    match command {
        ProjectCommand::Add { name, description } => {
            let project = app
                .store_mut()
                .create_project(NewProject {
                    name: name.clone(),
                    description: description.clone(),
                })
                .await?;
            app.save().await?;
            match mode {
                OutputMode::Json => output::print_json(&project)?,
                OutputMode::Text => output::print_project(&project),
            }
        }
        ProjectCommand::List => {
            let projects = app.store().list_projects().await?;
            match mode {
                OutputMode::Json => output::print_json(&projects)?,
                OutputMode::Text => {
                    if projects.is_empty() {
                        println!("(none)");
                    }
                    for project in &projects {
                        output::print_project(project);
                    }
                }
            }
        }
        ProjectCommand::Show { id } => {
            let project_id = ProjectId::from(id.as_str());
            let project = app
                .store()
                .get_project(&project_id)
                .await?
                .ok_or(Error::ProjectNotFound(project_id.clone()))?;
            let lists = app.store().list_task_lists(&project_id).await?;
            match mode {
                OutputMode::Json => output::print_json(&serde_json::json!({
                    "project": project,
                    "task_lists": lists,
                }))?,
                OutputMode::Text => {
                    output::print_project(&project);
                    for list in &lists {
                        print!("  ");
                        output::print_task_list(list);
                    }
                }
            }
        }
        ProjectCommand::Remove { id } => {
            let project_id = ProjectId::from(id.as_str());
            app.store_mut().delete_project(&project_id).await?;
            app.save().await?;
            match mode {
                OutputMode::Json => {
                    output::print_json(&serde_json::json!({ "deleted": project_id }))?;
                }
                OutputMode::Text => println!("Deleted project {project_id}"),
            }
        }
    }
    Ok(())
}

/// Execute a `list` subcommand.
pub async fn execute_list(app: &mut App, command: &ListCommand, mode: OutputMode) -> Result<()> {
    let config = OutputConfig::detect();
    match command {
        ListCommand::Add {
            title,
            project,
            description,
        } => {
            let list = app
                .store_mut()
                .create_task_list(NewTaskList {
                    project_id: project.as_deref().map(ProjectId::from),
                    title: title.clone(),
                    description: description.clone(),
                })
                .await?;
            app.save().await?;
            match mode {
                OutputMode::Json => output::print_json(&list)?,
                OutputMode::Text => output::print_task_list(&list),
            }
        }
        ListCommand::List => {
            let lists = app.store().list_all_task_lists().await?;
            match mode {
                OutputMode::Json => output::print_json(&lists)?,
                OutputMode::Text => {
                    if lists.is_empty() {
                        println!("(none)");
                    }
                    for list in &lists {
                        output::print_task_list(list);
                    }
                }
            }
        }
        ListCommand::Show { id } => {
            let list_id = TaskListId::from(id.as_str());
            let list = app
                .store()
                .get_task_list(&list_id)
                .await?
                .ok_or(Error::TaskListNotFound(list_id.clone()))?;
            let tasks = app.store().list_tasks(&list_id).await?;
            match mode {
                OutputMode::Json => output::print_json(&serde_json::json!({
                    "task_list": list,
                    "tasks": tasks,
                }))?,
                OutputMode::Text => {
                    output::print_task_list(&list);
                    output::print_task_lines(&tasks, &config);
                }
            }
        }
        ListCommand::Remove { id } => {
            let list_id = TaskListId::from(id.as_str());
            app.store_mut().delete_task_list(&list_id).await?;
            app.save().await?;
            match mode {
                OutputMode::Json => {
                    output::print_json(&serde_json::json!({ "deleted": list_id }))?;
                }
                OutputMode::Text => println!("Deleted task list {list_id}"),
            }
        }
    }
    Ok(())
}

/// Execute a `task` subcommand.
pub async fn execute_task(app: &mut App, command: &TaskCommand, mode: OutputMode) -> Result<()> {
    let config = OutputConfig::detect();
    match command {
        TaskCommand::Add(args) => {
            let dependencies = resolve_dependency_targets(app.store(), &args.depends_on).await?;
            let task = app
                .create_task_gated(NewTask {
                    task_list_id: TaskListId::from(args.list.as_str()),
                    title: args.title.clone(),
                    description: args.description.clone(),
                    priority: args.priority,
                    dependencies,
                    exit_criteria: args.criteria.clone(),
                })
                .await?;
            app.save().await?;
            match mode {
                OutputMode::Json => output::print_json(&task)?,
                OutputMode::Text => output::print_task(&task, &config),
            }
        }
        TaskCommand::Show { id } => {
            let task_id = TaskId::from(id.as_str());
            let task = app
                .store()
                .get_task(&task_id)
                .await?
                .ok_or(Error::TaskNotFound(task_id))?;
            match mode {
                OutputMode::Json => output::print_json(&task)?,
                OutputMode::Text => output::print_task(&task, &config),
            }
        }
        TaskCommand::Update(args) => {
            let task_id = TaskId::from(args.id.as_str());
            let updates = TaskUpdate {
                title: args.title.clone(),
                description: args.description.clone(),
                status: args.status.map(TaskStatus::from),
                priority: args.priority,
                exit_criteria: None,
            };
            let task = app.store_mut().update_task(&task_id, updates).await?;
            app.save().await?;
            match mode {
                OutputMode::Json => output::print_json(&task)?,
                OutputMode::Text => output::print_task(&task, &config),
            }
        }
        TaskCommand::Done { id } => {
            let task_id = TaskId::from(id.as_str());
            let updates = TaskUpdate {
                status: Some(TaskStatus::Completed),
                ..TaskUpdate::default()
            };
            let task = app.store_mut().update_task(&task_id, updates).await?;
            app.save().await?;
            match mode {
                OutputMode::Json => output::print_json(&task)?,
                OutputMode::Text => println!("{}", output::task_line(&task, &config)),
            }
        }
        TaskCommand::Remove { id } => {
            let task_id = TaskId::from(id.as_str());
            app.store_mut().delete_task(&task_id).await?;
            app.save().await?;
            match mode {
                OutputMode::Json => {
                    output::print_json(&serde_json::json!({ "deleted": task_id }))?;
                }
                OutputMode::Text => println!("Deleted task {task_id}"),
            }
        }
        TaskCommand::List { list } => {
            let list_id = TaskListId::from(list.as_str());
            if app.store().get_task_list(&list_id).await?.is_none() {
                return Err(Error::TaskListNotFound(list_id).into());
            }
            let tasks = app.store().list_tasks(&list_id).await?;
            match mode {
                OutputMode::Json => output::print_json(&tasks)?,
                OutputMode::Text => output::print_task_lines(&tasks, &config),
            }
        }
    }
    Ok(())
}

/// Execute the deps command: replace a task's dependency set.
pub async fn execute_deps(app: &mut App, args: &DepsArgs, mode: OutputMode) -> Result<()> {
    let task_id = TaskId::from(args.id.as_str());
    let dependencies = resolve_dependency_targets(app.store(), &args.on).await?;
    let task = app.set_dependencies_gated(&task_id, dependencies).await?;
    app.save().await?;
    match mode {
        OutputMode::Json => output::print_json(&task)?,
        OutputMode::Text => output::print_task(&task, &OutputConfig::detect()),
    }
    Ok(())
}

/// Execute the ready command.
pub async fn execute_ready(app: &App, args: &ReadyArgs, mode: OutputMode) -> Result<()> {
    let scope = args.scope.to_scope()?;
    let readiness = if args.multi_agent {
        ReadinessMode::MultiAgent
    } else {
        ReadinessMode::SingleAgent
    };
    let tasks = app.engine().get_ready_tasks(&scope, readiness).await?;
    match mode {
        OutputMode::Json => output::print_json(&tasks)?,
        OutputMode::Text => output::print_task_lines(&tasks, &OutputConfig::detect()),
    }
    Ok(())
}

/// Execute the analyze command.
pub async fn execute_analyze(app: &App, args: &AnalyzeArgs, mode: OutputMode) -> Result<()> {
    let scope = args.scope.to_scope()?;
    let report = app.engine().analyze(&scope).await?;
    match mode {
        OutputMode::Json => output::print_json(&report)?,
        OutputMode::Text => output::print_report(&report, &OutputConfig::detect()),
    }
    Ok(())
}

/// Execute the graph command.
pub async fn execute_graph(app: &App, args: &GraphArgs, mode: OutputMode) -> Result<()> {
    let scope = args.scope.to_scope()?;
    let rendered = app.engine().render(&scope, args.format.into()).await?;
    match mode {
        OutputMode::Json => output::print_json(&serde_json::json!({
            "scope_type": scope.type_name(),
            "scope_id": scope.id(),
            "graph": rendered,
        }))?,
        OutputMode::Text => println!("{rendered}"),
    }
    Ok(())
}

/// Resolves raw `--depends-on` ids into dependency edges carrying the target
/// task's actual list, which is what reference validation checks against.
async fn resolve_dependency_targets(
    store: &dyn TaskStore,
    ids: &[String],
) -> crate::error::Result<Vec<Dependency>> {
    let mut dependencies = Vec::with_capacity(ids.len());
    for id in ids {
        let task_id = TaskId::from(id.as_str());
        let Some(target) = store.get_task(&task_id).await? else {
            return Err(Error::InvalidDependency {
                task_id,
                reason: "task does not exist".to_string(),
            });
        };
        dependencies.push(Dependency::new(target.id, target.task_list_id));
    }
    Ok(dependencies)
}
