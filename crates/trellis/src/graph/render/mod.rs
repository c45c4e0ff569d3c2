//! Graph rendering to ASCII trees, Graphviz DOT, and Mermaid flowcharts.
//!
//! Every renderer works over the same [`ScopeSnapshot`](super::scope::ScopeSnapshot)
//! as the analyzer, so a render and an analysis of the same scope agree on
//! membership and edges. An empty scope renders as [`EMPTY_SCOPE_NOTE`] in
//! all three formats.

mod ascii;
mod dot;
mod mermaid;

use crate::domain::TaskStatus;

pub(crate) use ascii::render_ascii;
pub(crate) use dot::render_dot;
pub(crate) use mermaid::render_mermaid;

/// What an empty scope renders as, regardless of format.
pub const EMPTY_SCOPE_NOTE: &str = "No tasks in scope.";

/// Output format for [`crate::graph::GraphEngine::render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderFormat {
    /// Box-drawing dependency tree for terminals.
    #[default]
    Ascii,
    /// Graphviz DOT digraph.
    Dot,
    /// Mermaid flowchart.
    Mermaid,
}

impl RenderFormat {
    /// The wire label for this format.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RenderFormat::Ascii => "ascii",
            RenderFormat::Dot => "dot",
            RenderFormat::Mermaid => "mermaid",
        }
    }
}

impl std::fmt::Display for RenderFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RenderFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "ascii" => Ok(RenderFormat::Ascii),
            "dot" => Ok(RenderFormat::Dot),
            "mermaid" => Ok(RenderFormat::Mermaid),
            other => Err(format!(
                "unknown render format '{other}': expected ascii, dot, or mermaid"
            )),
        }
    }
}

/// One-glyph marker for a task's status, shared by the ASCII and Mermaid
/// renderers and the CLI.
#[must_use]
pub fn status_glyph(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::NotStarted => "○",
        TaskStatus::InProgress => "▶",
        TaskStatus::Blocked => "✗",
        TaskStatus::Completed => "✓",
    }
}

/// Replaces every character that is not alphanumeric or `_` with `_`,
/// producing identifiers both DOT and Mermaid accept bare.
pub(crate) fn sanitize_identifier(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}
