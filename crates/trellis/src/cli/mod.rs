//! CLI argument parsing and command dispatch.
//!
//! Arguments are declared with clap's derive API in [`args`]; the command
//! implementations live in [`execute`]. Every command honors the global
//! `--json` flag.

pub mod args;
mod execute;

use anyhow::Result;
use clap::Parser;

pub use args::{
    AnalyzeArgs, Cli, Commands, DepsArgs, FormatArg, GraphArgs, InitArgs, ListCommand,
    ProjectCommand, ReadyArgs, ScopeArgs, StatusArg, TaskAddArgs, TaskCommand, TaskUpdateArgs,
};

use crate::app::App;
use crate::output::OutputMode;

impl Cli {
    /// Parse CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Execute the parsed command.
    pub async fn execute(&self) -> Result<()> {
        let mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        match &self.command {
            Commands::Init(args) => execute::execute_init(args, mode),
            Commands::Info => {
                let app = open_app().await?;
                execute::execute_info(&app, mode).await
            }
            Commands::Project(command) => {
                let mut app = open_app().await?;
                execute::execute_project(&mut app, command, mode).await
            }
            Commands::List(command) => {
                let mut app = open_app().await?;
                execute::execute_list(&mut app, command, mode).await
            }
            Commands::Task(command) => {
                let mut app = open_app().await?;
                execute::execute_task(&mut app, command, mode).await
            }
            Commands::Deps(args) => {
                let mut app = open_app().await?;
                execute::execute_deps(&mut app, args, mode).await
            }
            Commands::Ready(args) => {
                let app = open_app().await?;
                execute::execute_ready(&app, args, mode).await
            }
            Commands::Analyze(args) => {
                let app = open_app().await?;
                execute::execute_analyze(&app, args, mode).await
            }
            Commands::Graph(args) => {
                let app = open_app().await?;
                execute::execute_graph(&app, args, mode).await
            }
        }
    }
}

async fn open_app() -> Result<App> {
    Ok(App::from_directory(&std::env::current_dir()?).await?)
}
