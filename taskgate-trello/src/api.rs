//! Typed Trello endpoints.
//!
//! Thin wrappers over [`RequestExecutor`]: each method builds one
//! [`ApiRequest`], and decodes the answer into a core model. Rate limiting,
//! retries and credentials are handled below this layer.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::json;
use taskgate_core::{
    Board, BoardList, Card, Checklist, EntityKind, Label, Member, SearchResults, SnapshotPayload,
};
use taskgate_fetch::{ApiRequest, FetchError, RequestExecutor};
use tracing::{debug, instrument};

// ============================================================================
// Constants
// ============================================================================

/// Boards of the token owner.
const MY_BOARDS_ENDPOINT: &str = "/1/members/me/boards";

/// Card creation.
const CARDS_ENDPOINT: &str = "/1/cards";

/// Label creation.
const LABELS_ENDPOINT: &str = "/1/labels";

/// Checklist creation.
const CHECKLISTS_ENDPOINT: &str = "/1/checklists";

/// Search.
const SEARCH_ENDPOINT: &str = "/1/search";

/// Fields requested for search hits.
const SEARCH_CARD_FIELDS: &str = "name,due,url";

// ============================================================================
// Request Types
// ============================================================================

/// Body of a card create call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCard {
    /// Card title.
    pub name: String,
    /// Card description.
    pub desc: String,
    /// Destination list.
    pub id_list: String,
    /// Position in the list.
    pub pos: String,
    /// Members to attach, sent comma-separated.
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    pub id_members: Vec<String>,
    /// Labels to attach, sent comma-separated.
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    pub id_labels: Vec<String>,
    /// Due date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<DateTime<Utc>>,
}

impl NewCard {
    /// Creates a card body placed at the top of `list_id`.
    pub fn new(name: impl Into<String>, list_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            desc: String::new(),
            id_list: list_id.into(),
            pos: "top".to_string(),
            id_members: Vec::new(),
            id_labels: Vec::new(),
            due: None,
        }
    }
}

fn comma_separated<S: Serializer>(ids: &[String], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ids.join(","))
}

// ============================================================================
// API Client
// ============================================================================

/// Trello REST client.
#[derive(Debug, Clone)]
pub struct TrelloApi {
    executor: RequestExecutor,
}

impl TrelloApi {
    /// Creates a client over a shared executor.
    pub fn new(executor: RequestExecutor) -> Self {
        Self { executor }
    }

    /// Returns the executor.
    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    /// Lists the open boards visible to the token.
    ///
    /// # Errors
    ///
    /// Returns the executor's error.
    #[instrument(skip(self))]
    pub async fn list_boards(&self) -> Result<Vec<Board>, FetchError> {
        let request = ApiRequest::get(MY_BOARDS_ENDPOINT)
            .param("filter", "open")
            .param("fields", "name,url,closed");
        let boards: Vec<Board> = self.executor.fetch(request).await?;
        Ok(boards.into_iter().filter(|b| !b.closed).collect())
    }

    /// Reads the lists of a board.
    ///
    /// # Errors
    ///
    /// Returns the executor's error.
    pub async fn board_lists(&self, board_id: &str) -> Result<Vec<BoardList>, FetchError> {
        let request = ApiRequest::get(board_path(board_id, EntityKind::Lists))
            .param("fields", "name,closed,pos");
        self.executor.fetch(request).await
    }

    /// Reads the members of a board.
    ///
    /// # Errors
    ///
    /// Returns the executor's error.
    pub async fn board_members(&self, board_id: &str) -> Result<Vec<Member>, FetchError> {
        let request = ApiRequest::get(board_path(board_id, EntityKind::Members))
            .param("fields", "username,fullName");
        self.executor.fetch(request).await
    }

    /// Reads the labels of a board.
    ///
    /// # Errors
    ///
    /// Returns the executor's error.
    pub async fn board_labels(&self, board_id: &str) -> Result<Vec<Label>, FetchError> {
        let request = ApiRequest::get(board_path(board_id, EntityKind::Labels));
        self.executor.fetch(request).await
    }

    /// Reads one reference collection of a board.
    ///
    /// # Errors
    ///
    /// Returns the executor's error.
    #[instrument(skip(self))]
    pub async fn board_collection(
        &self,
        kind: EntityKind,
        board_id: &str,
    ) -> Result<SnapshotPayload, FetchError> {
        let payload = match kind {
            EntityKind::Members => SnapshotPayload::Members(self.board_members(board_id).await?),
            EntityKind::Labels => SnapshotPayload::Labels(self.board_labels(board_id).await?),
            EntityKind::Lists => SnapshotPayload::Lists(self.board_lists(board_id).await?),
        };
        debug!(records = payload.len(), "Fetched board collection");
        Ok(payload)
    }

    /// Creates a card.
    ///
    /// # Errors
    ///
    /// Returns the executor's error.
    #[instrument(skip(self, card), fields(list_id = %card.id_list))]
    pub async fn create_card(&self, card: &NewCard) -> Result<Card, FetchError> {
        let request = ApiRequest::post(CARDS_ENDPOINT).json(serde_json::to_value(card)?);
        self.executor.fetch(request).await
    }

    /// Creates a label on a board.
    ///
    /// # Errors
    ///
    /// Returns the executor's error.
    pub async fn create_label(
        &self,
        board_id: &str,
        name: &str,
        color: &str,
    ) -> Result<Label, FetchError> {
        let request = ApiRequest::post(LABELS_ENDPOINT).json(json!({
            "name": name,
            "color": color,
            "idBoard": board_id,
        }));
        self.executor.fetch(request).await
    }

    /// Attaches a member to a card.
    ///
    /// # Errors
    ///
    /// Returns the executor's error.
    pub async fn add_member_to_card(&self, card_id: &str, member_id: &str) -> Result<(), FetchError> {
        let request = ApiRequest::post(format!("/1/cards/{card_id}/idMembers"))
            .json(json!({ "value": member_id }));
        self.executor.execute(request).await.map(drop)
    }

    /// Attaches a label to a card.
    ///
    /// # Errors
    ///
    /// Returns the executor's error.
    pub async fn add_label_to_card(&self, card_id: &str, label_id: &str) -> Result<(), FetchError> {
        let request = ApiRequest::post(format!("/1/cards/{card_id}/idLabels"))
            .json(json!({ "value": label_id }));
        self.executor.execute(request).await.map(drop)
    }

    /// Creates an empty checklist on a card.
    ///
    /// # Errors
    ///
    /// Returns the executor's error.
    pub async fn create_checklist(&self, card_id: &str, name: &str) -> Result<Checklist, FetchError> {
        let request = ApiRequest::post(CHECKLISTS_ENDPOINT).json(json!({
            "idCard": card_id,
            "name": name,
        }));
        self.executor.fetch(request).await
    }

    /// Appends an item to a checklist.
    ///
    /// # Errors
    ///
    /// Returns the executor's error.
    pub async fn add_checklist_item(&self, checklist_id: &str, name: &str) -> Result<(), FetchError> {
        let request = ApiRequest::post(format!("/1/checklists/{checklist_id}/checkItems"))
            .json(json!({ "name": name }));
        self.executor.execute(request).await.map(drop)
    }

    /// Adds a comment to a card.
    ///
    /// # Errors
    ///
    /// Returns the executor's error.
    pub async fn add_comment(&self, card_id: &str, text: &str) -> Result<(), FetchError> {
        let request = ApiRequest::post(format!("/1/cards/{card_id}/actions/comments"))
            .json(json!({ "text": text }));
        self.executor.execute(request).await.map(drop)
    }

    /// Moves a card to another list.
    ///
    /// # Errors
    ///
    /// Returns the executor's error.
    pub async fn move_card(&self, card_id: &str, list_id: &str) -> Result<Card, FetchError> {
        let request = ApiRequest::put(format!("/1/cards/{card_id}")).json(json!({ "idList": list_id }));
        self.executor.fetch(request).await
    }

    /// Searches cards on one board.
    ///
    /// Hits carry only name, due date and URL.
    ///
    /// # Errors
    ///
    /// Returns the executor's error.
    #[instrument(skip(self, query))]
    pub async fn search_cards(
        &self,
        board_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Card>, FetchError> {
        let request = ApiRequest::get(SEARCH_ENDPOINT)
            .param("query", query)
            .param("idBoards", board_id)
            .param("modelTypes", "cards")
            .param("cards_limit", limit.to_string())
            .param("card_fields", SEARCH_CARD_FIELDS);
        let results: SearchResults = self.executor.fetch(request).await?;
        Ok(results.cards)
    }
}

fn board_path(board_id: &str, kind: EntityKind) -> String {
    format!("/1/boards/{board_id}/{}", kind.path_segment())
}

// ============================================================================
// Tests
// ============================================================================
