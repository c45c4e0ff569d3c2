//! Warning types for non-fatal problems found while reading JSONL.
//!
//! Resilient loads keep going past a damaged line; each skipped line is
//! recorded as a [`Warning`] carrying its 1-based line number so callers can
//! report exactly what was dropped. [`WarningCollector`] accumulates warnings
//! across a streaming read, sharing state between clones so one handle can
//! live inside the stream while the caller keeps another.

use std::sync::{Arc, Mutex};

/// A non-fatal warning raised while processing a JSONL source.
///
/// The offending line is skipped and reading continues with the next line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A non-empty line contained JSON that could not be parsed into the
    /// expected record type.
    MalformedJson {
        /// 1-based line number where the error occurred.
        line_number: usize,
        /// Description of the parse failure.
        error: String,
    },

    /// A line was skipped for a reason other than malformed JSON, such as
    /// failing a validation rule during load.
    SkippedLine {
        /// 1-based line number that was skipped.
        line_number: usize,
        /// Why the line was skipped.
        reason: String,
    },
}

impl Warning {
    /// Returns the 1-based line number associated with this warning.
    #[must_use]
    pub fn line_number(&self) -> usize {
        match self {
            Self::MalformedJson { line_number, .. } | Self::SkippedLine { line_number, .. } => {
                *line_number
            }
        }
    }

    /// Returns a human-readable description of the warning.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::MalformedJson { line_number, error } => {
                format!("line {line_number}: malformed JSON: {error}")
            }
            Self::SkippedLine {
                line_number,
                reason,
            } => {
                format!("line {line_number}: skipped: {reason}")
            }
        }
    }

    /// Returns a static tag identifying the warning kind, for filtering
    /// without matching on variants.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedJson { .. } => "malformed_json",
            Self::SkippedLine { .. } => "skipped_line",
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl std::error::Error for Warning {}

/// A thread-safe, cloneable accumulator for [`Warning`]s.
///
/// Clones share the same underlying storage, so a collector handed into a
/// stream and the caller's copy observe the same warnings. All methods panic
/// only if the internal mutex was poisoned by a panicking holder, which does
/// not happen in normal use.
#[derive(Debug, Clone, Default)]
pub struct WarningCollector {
    warnings: Arc<Mutex<Vec<Warning>>>,
}

impl WarningCollector {
    /// Creates a new empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            warnings: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Records a warning.
    pub fn add(&self, warning: Warning) {
        self.warnings
            .lock()
            .expect("warning collector mutex poisoned")
            .push(warning);
    }

    /// Number of warnings recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.warnings
            .lock()
            .expect("warning collector mutex poisoned")
            .len()
    }

    /// True if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a snapshot of the warnings recorded so far without consuming
    /// the collector.
    #[must_use]
    pub fn warnings(&self) -> Vec<Warning> {
        self.warnings
            .lock()
            .expect("warning collector mutex poisoned")
            .clone()
    }

    /// Discards all recorded warnings.
    pub fn clear(&self) {
        self.warnings
            .lock()
            .expect("warning collector mutex poisoned")
            .clear();
    }

    /// Consumes the collector and returns the recorded warnings. Moves the
    /// vector out when this is the last clone, otherwise copies it.
    #[must_use]
    pub fn into_warnings(self) -> Vec<Warning> {
        Arc::try_unwrap(self.warnings)
            .map(|mutex| mutex.into_inner().expect("warning collector mutex poisoned"))
            .unwrap_or_else(|arc| {
                arc.lock()
                    .expect("warning collector mutex poisoned")
                    .clone()
            })
    }
}
