//! Trellis - dependency-aware task tracking.
//!
//! This crate provides both a CLI application and a library for tracking
//! projects, task lists, and tasks, with a graph engine that validates
//! dependency edges, rejects cycles, and answers readiness and analysis
//! queries over a scope.

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod app;
pub mod domain;
pub mod error;
pub mod graph;
pub mod id;
pub mod output;
pub mod store;
pub mod workspace;

// Public CLI module (needed by binary)
pub mod cli;

pub use app::App;
pub use error::{Error, Result};
