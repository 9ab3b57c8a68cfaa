//! Text output formatting with colors.

use taskgate_core::{Board, BoardList};
use taskgate_trello::TaskOutcome;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Formats the header above a board table.
    pub fn format_boards_header(&self) -> String {
        self.bold(&format!("{:<26} {}", "ID", "Name"))
    }

    /// Formats one board row.
    pub fn format_board_line(&self, board: &Board) -> String {
        format!("{:<26} {}", board.id, board.name)
    }

    /// Formats one list row. Closed lists are dimmed.
    pub fn format_list_line(&self, list: &BoardList) -> String {
        let line = format!("{:<26} {}", list.id, list.name);
        if list.closed {
            self.dim(&format!("{line} (closed)"))
        } else {
            line
        }
    }

    /// Formats a create-task outcome.
    pub fn format_outcome(&self, outcome: &TaskOutcome) -> String {
        let mut lines = Vec::new();

        let status = if outcome.created {
            self.green("✓ Created")
        } else {
            self.yellow("= Already exists")
        };
        lines.push(format!("{status} {}", self.bold(&outcome.card.name)));
        if !outcome.card.url.is_empty() {
            lines.push(format!("  {}", outcome.card.url));
        }
        lines.push(self.dim(&format!("  fingerprint {}", outcome.fingerprint)));

        if !outcome.dropped_assignees.is_empty() {
            lines.push(self.yellow(&format!(
                "  Unknown assignees: {}",
                outcome.dropped_assignees.join(", ")
            )));
        }
        if !outcome.created_labels.is_empty() {
            lines.push(format!(
                "  New labels: {}",
                outcome.created_labels.join(", ")
            ));
        }
        for failure in &outcome.failed_decorations {
            lines.push(self.red(&format!("  ✗ {failure}")));
        }

        lines.join("\n")
    }

    /// Formats an error line.
    pub fn format_error(&self, error: &str) -> String {
        self.red(&format!("Error: {error}"))
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }
}
