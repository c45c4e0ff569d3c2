//! Request handlers, one module per resource.

pub mod health;
pub mod projects;
pub mod scopes;
pub mod task_lists;
pub mod tasks;
