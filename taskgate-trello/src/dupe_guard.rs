//! Duplicate-write guard.
//!
//! The provider has no idempotency keys, so before creating a card we look
//! for a near-identical one on the same board. The check is an
//! optimization: any search failure counts as "no duplicate" and the write
//! goes ahead. Availability wins over strict deduplication here.
//!
//! A title made only of punctuation normalizes to the empty string, so any
//! existing card whose name is two characters or fewer counts as its
//! duplicate.

use std::fmt::Write as _;

use chrono::{DateTime, NaiveDate, Utc};
use ring::digest::{SHA1_FOR_LEGACY_USE_ONLY, digest};
use taskgate_core::Card;
use tracing::{debug, instrument, warn};

use crate::api::TrelloApi;
use crate::resolver::levenshtein;

/// Words of the title used as the search phrase.
pub const SEARCH_CORE_WORDS: usize = 6;

/// Search hits inspected per check.
pub const SEARCH_LIMIT: usize = 20;

/// Titles at most this many edits apart are duplicates.
pub const TITLE_DISTANCE_LIMIT: usize = 2;

// ============================================================================
// Normalization
// ============================================================================

/// Lowercases, drops everything but letters, digits and whitespace, trims.
pub fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Returns the first words of a title, used as the search phrase.
pub fn search_core(title: &str) -> String {
    title
        .split_whitespace()
        .take(SEARCH_CORE_WORDS)
        .collect::<Vec<_>>()
        .join(" ")
}

fn day_string(day: Option<NaiveDate>) -> String {
    day.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Returns true if `candidate` duplicates a card titled `title` due `due`.
///
/// Titles must be within [`TITLE_DISTANCE_LIMIT`] edits after
/// normalization. Due dates only matter when both sides have one; then
/// they must fall on the same UTC day. A punctuation-only title compares
/// as empty and so matches any name of at most two characters.
pub fn is_duplicate(title: &str, due: Option<DateTime<Utc>>, candidate: &Card) -> bool {
    let close = levenshtein(&normalize_title(title), &normalize_title(&candidate.name))
        <= TITLE_DISTANCE_LIMIT;
    let same_day = match (due, candidate.due_day()) {
        (Some(wanted), Some(existing)) => wanted.date_naive() == existing,
        _ => true,
    };
    close && same_day
}

// ============================================================================
// Fingerprint
// ============================================================================

/// Deterministic content hash of a card write.
///
/// SHA-1 hex over `board|list|normalized title|YYYY-MM-DD`, the day being
/// empty without a due date. Only the due day counts, not the time.
pub fn compute_idempotency_fingerprint(
    board_id: &str,
    list_id: &str,
    title: &str,
    due: Option<DateTime<Utc>>,
) -> String {
    let input = format!(
        "{board_id}|{list_id}|{}|{}",
        normalize_title(title),
        day_string(due.map(|d| d.date_naive()))
    );
    let hash = digest(&SHA1_FOR_LEGACY_USE_ONLY, input.as_bytes());

    hash.as_ref()
        .iter()
        .fold(String::with_capacity(40), |mut hex, byte| {
            let _ = write!(hex, "{byte:02x}");
            hex
        })
}

// ============================================================================
// Guard
// ============================================================================

/// Searches the board for an existing card before a write.
#[derive(Debug, Clone)]
pub struct DuplicateGuard {
    api: TrelloApi,
}

impl DuplicateGuard {
    /// Creates a guard.
    pub fn new(api: TrelloApi) -> Self {
        Self { api }
    }

    /// Returns the first existing card that duplicates the planned one.
    ///
    /// Fails open: a search error is logged and reported as `None`.
    #[instrument(skip(self, title, due))]
    pub async fn find_possible_duplicate(
        &self,
        board_id: &str,
        title: &str,
        due: Option<DateTime<Utc>>,
    ) -> Option<Card> {
        let query = format!("\"{}\"", search_core(title));

        let candidates = match self.api.search_cards(board_id, &query, SEARCH_LIMIT).await {
            Ok(cards) => cards,
            Err(e) => {
                warn!(error = %e, "Duplicate search failed, proceeding with write");
                return None;
            }
        };

        let found = candidates
            .into_iter()
            .find(|card| is_duplicate(title, due, card));
        if let Some(card) = &found {
            debug!(card_id = %card.id, existing = %card.name, "Possible duplicate found");
        }
        found
    }
}

// ============================================================================
// Tests
// ============================================================================
