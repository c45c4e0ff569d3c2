//! MCP server for trellis task tracking.
//!
//! This crate provides an MCP (Model Context Protocol) server that exposes
//! trellis projects, task lists, tasks, and the dependency graph engine to
//! AI assistants.
//!
//! # Architecture
//!
//! The server uses the `rmcp` crate for MCP protocol handling and wraps the
//! core `App` from the trellis crate, one instance per workspace. All
//! dependency mutations go through the graph engine's admission gate, so a
//! cycle or an edge to a nonexistent task is rejected before anything is
//! written.
//!
//! # Tools
//!
//! ## Context Management
//! - `set_context` - Set the workspace root for all operations
//! - `where_am_i` - Show current workspace context
//!
//! ## Projects and Task Lists
//! - `create_project` / `list_projects` / `get_project` / `delete_project`
//! - `create_task_list` / `list_task_lists` / `get_task_list` /
//!   `delete_task_list`
//!
//! ## Tasks
//! - `create_task` / `get_task` / `update_task` / `delete_task` /
//!   `list_tasks`
//! - `set_task_dependencies` - Replace a task's dependency set (gated)
//!
//! ## Graph Queries
//! - `get_ready_tasks` - Tasks whose prerequisites are all completed
//! - `analyze_graph` - Progress, critical path, bottlenecks, cycles
//! - `render_graph` - ASCII, DOT, or Mermaid rendering

pub mod context;
pub mod error;
pub mod models;
pub mod server;
pub mod tools;

pub use error::{Error, Result};
pub use server::TrellisMcpServer;
