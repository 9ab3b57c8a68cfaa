//! Board records exchanged with the provider.
//!
//! Field names follow the provider's JSON (camelCase). Every field that the
//! provider may omit or null out carries a serde default so partial payloads
//! (e.g. search results restricted to a few fields) still deserialize.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Board
// ============================================================================

/// A board visible to the configured credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    /// Board ID.
    pub id: String,
    /// Board name.
    pub name: String,
    /// Web URL of the board.
    #[serde(default)]
    pub url: String,
    /// Whether the board is archived.
    #[serde(default)]
    pub closed: bool,
}

// ============================================================================
// List
// ============================================================================

/// A list on a board. Cards are created inside lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardList {
    /// List ID.
    pub id: String,
    /// List name.
    pub name: String,
    /// Whether the list is archived.
    #[serde(default)]
    pub closed: bool,
    /// Sort position on the board.
    #[serde(default)]
    pub pos: Option<f64>,
}

// ============================================================================
// Member
// ============================================================================

/// A member of a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Member ID.
    pub id: String,
    /// Login handle, without the leading `@`.
    pub username: String,
    /// Display name, if the member set one.
    #[serde(default)]
    pub full_name: Option<String>,
}

impl Member {
    /// Creates a member record.
    pub fn new(
        id: impl Into<String>,
        username: impl Into<String>,
        full_name: Option<&str>,
    ) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            full_name: full_name.map(str::to_string),
        }
    }
}

// ============================================================================
// Label
// ============================================================================

/// A label defined on a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    /// Label ID.
    pub id: String,
    /// Label text. The provider allows color-only labels with an empty name.
    #[serde(default)]
    pub name: String,
    /// Label color.
    #[serde(default)]
    pub color: Option<String>,
}

impl Label {
    /// Creates a label record.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: None,
        }
    }
}

// ============================================================================
// Card
// ============================================================================

/// A card as returned by create and search calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Card ID.
    pub id: String,
    /// Card title.
    #[serde(default)]
    pub name: String,
    /// Web URL of the card.
    #[serde(default)]
    pub url: String,
    /// Due date.
    #[serde(default)]
    pub due: Option<DateTime<Utc>>,
    /// Containing list, when the response includes it.
    #[serde(default)]
    pub id_list: Option<String>,
}

impl Card {
    /// Returns the due date as a UTC calendar day.
    pub fn due_day(&self) -> Option<NaiveDate> {
        self.due.map(|d| d.date_naive())
    }
}

/// Response of the search endpoint, restricted to cards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    /// Matching cards.
    #[serde(default)]
    pub cards: Vec<Card>,
}

/// A checklist attached to a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checklist {
    /// Checklist ID.
    pub id: String,
    /// Checklist title.
    #[serde(default)]
    pub name: String,
}
