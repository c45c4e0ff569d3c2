//! Resilient JSONL (JSON Lines) reading and atomic writing.
//!
//! This crate is the persistence substrate for trellis: records are stored one
//! JSON document per line, loads tolerate damaged lines by collecting
//! [`Warning`]s instead of failing, and writes go through a temp-file-then-rename
//! path so a crash never leaves a half-written file behind.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod atomic;
pub mod error;
pub mod reader;
pub mod warning;
pub mod writer;

pub use atomic::{write_jsonl_atomic, write_jsonl_atomic_iter};
pub use error::{Error, Result};
pub use reader::{read_jsonl_resilient, JsonlReader};
pub use warning::{Warning, WarningCollector};
pub use writer::JsonlWriter;
