//! The caller-supplied write request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ============================================================================
// Destination
// ============================================================================

/// Where a new card should go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    /// A list ID, used as-is.
    Id(String),
    /// A list name, resolved against the board's lists.
    Name(String),
}

// ============================================================================
// Write Intent
// ============================================================================

/// A card the caller wants created.
///
/// Built by the upstream command layer and consumed once by the write
/// orchestrator. Assignee and label entries are free text; they are
/// resolved to provider IDs on a best-effort basis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteIntent {
    /// Card title. Must not be blank.
    pub title: String,
    /// Card description.
    #[serde(default)]
    pub description: String,
    /// Board to write into. Falls back to the configured default board.
    #[serde(default)]
    pub board_id: Option<String>,
    /// Target list.
    #[serde(default)]
    pub destination: Option<Destination>,
    /// Free-text assignee names or handles.
    #[serde(default)]
    pub assignees: Vec<String>,
    /// Free-text label names.
    #[serde(default)]
    pub labels: Vec<String>,
    /// Due date.
    #[serde(default)]
    pub due: Option<DateTime<Utc>>,
    /// Checklist items, in display order.
    #[serde(default)]
    pub checklist: Vec<String>,
}

impl WriteIntent {
    /// Creates an intent with only a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            board_id: None,
            destination: None,
            assignees: Vec::new(),
            labels: Vec::new(),
            due: None,
            checklist: Vec::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the board.
    #[must_use]
    pub fn on_board(mut self, board_id: impl Into<String>) -> Self {
        self.board_id = Some(board_id.into());
        self
    }

    /// Targets a list by ID.
    #[must_use]
    pub fn in_list(mut self, list_id: impl Into<String>) -> Self {
        self.destination = Some(Destination::Id(list_id.into()));
        self
    }

    /// Targets a list by name.
    #[must_use]
    pub fn in_list_named(mut self, name: impl Into<String>) -> Self {
        self.destination = Some(Destination::Name(name.into()));
        self
    }

    /// Adds an assignee.
    #[must_use]
    pub fn assign(mut self, name: impl Into<String>) -> Self {
        self.assignees.push(name.into());
        self
    }

    /// Adds a label.
    #[must_use]
    pub fn label(mut self, name: impl Into<String>) -> Self {
        self.labels.push(name.into());
        self
    }

    /// Sets the due date.
    #[must_use]
    pub fn due_at(mut self, due: DateTime<Utc>) -> Self {
        self.due = Some(due);
        self
    }

    /// Adds a checklist item.
    #[must_use]
    pub fn checklist_item(mut self, item: impl Into<String>) -> Self {
        self.checklist.push(item.into());
        self
    }

    /// Checks the fields the provider requires.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidIntent`] when the title is blank or a
    /// destination names an empty list.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.title.trim().is_empty() {
            return Err(CoreError::InvalidIntent("title is required".to_string()));
        }
        match &self.destination {
            Some(Destination::Id(id)) if id.trim().is_empty() => Err(CoreError::InvalidIntent(
                "destination list id is empty".to_string(),
            )),
            Some(Destination::Name(name)) if name.trim().is_empty() => Err(
                CoreError::InvalidIntent("destination list name is empty".to_string()),
            ),
            _ => Ok(()),
        }
    }

    /// Returns the due date as a `YYYY-MM-DD` UTC day, or an empty string.
    pub fn due_day(&self) -> String {
        self.due
            .map(|d| d.date_naive().format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}
