//! Status and priority coloring for terminal output.

use colored::{ColoredString, Colorize};

use crate::domain::TaskStatus;
use crate::graph::status_glyph;

/// ASCII stand-in for [`status_glyph`], for terminals without Unicode.
#[must_use]
pub fn status_glyph_ascii(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::NotStarted => "o",
        TaskStatus::InProgress => ">",
        TaskStatus::Blocked => "x",
        TaskStatus::Completed => "+",
    }
}

/// The status marker, colored for the terminal.
#[must_use]
pub fn status_icon(status: TaskStatus, unicode: bool) -> ColoredString {
    let glyph = if unicode {
        status_glyph(status)
    } else {
        status_glyph_ascii(status)
    };
    match status {
        TaskStatus::NotStarted => glyph.normal(),
        TaskStatus::InProgress => glyph.yellow(),
        TaskStatus::Blocked => glyph.red(),
        TaskStatus::Completed => glyph.green(),
    }
}

/// The status label, colored to match [`status_icon`].
#[must_use]
pub fn status_label(status: TaskStatus) -> ColoredString {
    match status {
        TaskStatus::NotStarted => status.as_str().normal(),
        TaskStatus::InProgress => status.as_str().yellow(),
        TaskStatus::Blocked => status.as_str().red(),
        TaskStatus::Completed => status.as_str().green(),
    }
}

/// Priority rendered as `P0`..`P4`, hotter priorities brighter.
#[must_use]
pub fn priority_label(priority: u8) -> ColoredString {
    let label = format!("P{priority}");
    match priority {
        0 => label.bright_red().bold(),
        1 => label.red(),
        2 => label.yellow(),
        3 => label.normal(),
        _ => label.dimmed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_glyphs_cover_all_statuses() {
        let glyphs: Vec<&str> = TaskStatus::ALL.iter().map(|s| status_glyph_ascii(*s)).collect();
        assert_eq!(glyphs, ["o", ">", "x", "+"]);
    }

    #[test]
    fn unicode_glyphs_cover_all_statuses() {
        let glyphs: Vec<&str> = TaskStatus::ALL.iter().map(|s| status_glyph(*s)).collect();
        assert_eq!(glyphs, ["○", "▶", "✗", "✓"]);
    }
}
