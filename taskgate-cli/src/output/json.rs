//! JSON output formatting.

use anyhow::Result;
use serde::Serialize;
use taskgate_core::{Board, BoardList};
use taskgate_trello::{TaskOutcome, WriteStage};

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for one board.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardOutput<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub url: &'a str,
}

/// JSON output for one list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOutput<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub closed: bool,
}

/// JSON output for a create-task call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeOutput<'a> {
    pub card_id: &'a str,
    pub card_url: &'a str,
    pub name: &'a str,
    pub created: bool,
    pub fingerprint: &'a str,
    pub stages: &'a [WriteStage],
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    pub dropped_assignees: &'a [String],
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    pub created_labels: &'a [String],
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    pub failed_decorations: &'a [String],
}

impl<'a> From<&'a TaskOutcome> for OutcomeOutput<'a> {
    fn from(outcome: &'a TaskOutcome) -> Self {
        Self {
            card_id: &outcome.card.id,
            card_url: &outcome.card.url,
            name: &outcome.card.name,
            created: outcome.created,
            fingerprint: &outcome.fingerprint,
            stages: &outcome.stages,
            dropped_assignees: &outcome.dropped_assignees,
            created_labels: &outcome.created_labels,
            failed_decorations: &outcome.failed_decorations,
        }
    }
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats boards.
    pub fn format_boards(&self, boards: &[Board]) -> Result<String> {
        let outputs: Vec<BoardOutput<'_>> = boards
            .iter()
            .map(|b| BoardOutput {
                id: &b.id,
                name: &b.name,
                url: &b.url,
            })
            .collect();
        self.format(&outputs)
    }

    /// Formats lists.
    pub fn format_lists(&self, lists: &[BoardList]) -> Result<String> {
        let outputs: Vec<ListOutput<'_>> = lists
            .iter()
            .map(|l| ListOutput {
                id: &l.id,
                name: &l.name,
                closed: l.closed,
            })
            .collect();
        self.format(&outputs)
    }

    /// Formats a create-task outcome.
    pub fn format_outcome(&self, outcome: &TaskOutcome) -> Result<String> {
        self.format(&OutcomeOutput::from(outcome))
    }
}
