//! Write orchestration.
//!
//! One create-task operation walks these stages:
//!
//! ```text
//! Resolving -> DuplicateCheck -> Creating -> Decorating -> Done
//!                    |                                      ^
//!                    +------------ duplicate found ---------+
//! ```
//!
//! Any stage may end in `Failed`. Only `Resolving` and `Creating` can fail
//! the operation; everything after the card exists is best-effort and
//! reported on the [`TaskOutcome`].

use std::fmt;

use serde::Serialize;
use taskgate_core::{
    BoardList, Card, Destination, EntityKind, Label, Member, Snapshot, WriteIntent,
};
use taskgate_store::WriterConfig;
use tracing::{debug, info, instrument, warn};

use crate::api::{NewCard, TrelloApi};
use crate::dupe_guard::{DuplicateGuard, compute_idempotency_fingerprint};
use crate::error::WriteError;
use crate::metadata::BoardMetadata;
use crate::resolver::{AliasTable, EntityResolver, normalize_text};

/// Colors the provider accepts for labels.
pub const LABEL_COLORS: &[&str] = &[
    "red", "orange", "yellow", "green", "blue", "purple", "pink", "lime", "sky", "black",
];

// ============================================================================
// Stages and outcome
// ============================================================================

/// Stage of one create-task operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteStage {
    /// Choosing the board and destination list.
    Resolving,
    /// Looking for an existing near-identical card.
    DuplicateCheck,
    /// Resolving names and creating the card.
    Creating,
    /// Attaching new labels and checklist items.
    Decorating,
    /// Finished with a card reference.
    Done,
    /// Finished with an error.
    Failed,
}

impl fmt::Display for WriteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Resolving => "resolving",
            Self::DuplicateCheck => "duplicate_check",
            Self::Creating => "creating",
            Self::Decorating => "decorating",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Result of a successful create-task operation.
#[derive(Debug, Clone, Serialize)]
pub struct TaskOutcome {
    /// The created card, or the existing duplicate.
    pub card: Card,
    /// False when an existing card was returned instead of writing.
    pub created: bool,
    /// Idempotency fingerprint of the write.
    pub fingerprint: String,
    /// Stages passed through, in order.
    pub stages: Vec<WriteStage>,
    /// Assignee names that matched no board member.
    pub dropped_assignees: Vec<String>,
    /// Labels created on the board for this card.
    pub created_labels: Vec<String>,
    /// Decorations that failed after the card was created.
    pub failed_decorations: Vec<String>,
}

impl TaskOutcome {
    fn new(card: Card, fingerprint: String, stages: Vec<WriteStage>) -> Self {
        Self {
            card,
            created: true,
            fingerprint,
            stages,
            dropped_assignees: Vec::new(),
            created_labels: Vec::new(),
            failed_decorations: Vec::new(),
        }
    }

    /// Returns true if every decoration succeeded.
    pub fn is_complete(&self) -> bool {
        self.failed_decorations.is_empty()
    }
}

// ============================================================================
// Task writer
// ============================================================================

/// Creates cards from write intents.
#[derive(Debug, Clone)]
pub struct TaskWriter {
    api: TrelloApi,
    metadata: BoardMetadata,
    resolver: EntityResolver,
    guard: DuplicateGuard,
    config: WriterConfig,
    default_board_id: Option<String>,
}

impl TaskWriter {
    /// Creates a writer. Configured aliases extend the built-in table.
    pub fn new(
        api: TrelloApi,
        metadata: BoardMetadata,
        config: WriterConfig,
        default_board_id: Option<String>,
    ) -> Self {
        let resolver = EntityResolver::new(AliasTable::builtin().extend(&config.aliases));
        Self {
            guard: DuplicateGuard::new(api.clone()),
            api,
            metadata,
            resolver,
            config,
            default_board_id,
        }
    }

    /// Returns the resolver.
    pub fn resolver(&self) -> &EntityResolver {
        &self.resolver
    }

    /// Creates the card described by `intent`, unless a duplicate exists.
    ///
    /// # Errors
    ///
    /// - [`WriteError::Invalid`] for a blank title
    /// - [`WriteError::NoBoard`] without a board
    /// - [`WriteError::NoDestination`] when the board has no usable list
    /// - [`WriteError::Fetch`] when the board's lists cannot be read
    /// - [`WriteError::CreateFailed`] when the create call fails
    #[instrument(skip(self, intent), fields(title = %intent.title))]
    pub async fn create_task(&self, intent: WriteIntent) -> Result<TaskOutcome, WriteError> {
        let mut stages = vec![WriteStage::Resolving];
        let result = self.run(&intent, &mut stages).await;
        if let Err(e) = &result {
            let failed_at = stages.last().copied().unwrap_or(WriteStage::Resolving);
            stages.push(WriteStage::Failed);
            warn!(failed_at = %failed_at, stages = ?stages, error = %e, "Task write failed");
        }
        result
    }

    async fn run(
        &self,
        intent: &WriteIntent,
        stages: &mut Vec<WriteStage>,
    ) -> Result<TaskOutcome, WriteError> {
        intent.validate()?;
        let board_id = non_blank(intent.board_id.as_deref())
            .or_else(|| non_blank(self.default_board_id.as_deref()))
            .ok_or(WriteError::NoBoard)?;
        let list_id = self.resolve_destination(board_id, intent.destination.as_ref()).await?;
        let fingerprint =
            compute_idempotency_fingerprint(board_id, &list_id, &intent.title, intent.due);
        debug!(board_id, list_id = %list_id, fingerprint = %fingerprint, "Destination resolved");

        stages.push(WriteStage::DuplicateCheck);
        if let Some(existing) = self
            .guard
            .find_possible_duplicate(board_id, &intent.title, intent.due)
            .await
        {
            info!(card_id = %existing.id, "Returning existing card instead of writing");
            stages.push(WriteStage::Done);
            let mut outcome = TaskOutcome::new(existing, fingerprint, std::mem::take(stages));
            outcome.created = false;
            return Ok(outcome);
        }

        stages.push(WriteStage::Creating);
        let members = self.reference(EntityKind::Members, board_id).await;
        let labels = self.reference(EntityKind::Labels, board_id).await;
        let assignees = self
            .resolver
            .resolve_assignees(&intent.assignees, members_of(members.as_ref()));
        let label_resolution = self
            .resolver
            .resolve_labels(&intent.labels, labels_of(labels.as_ref()));
        let dropped_assignees: Vec<String> =
            assignees.unmatched().into_iter().map(String::from).collect();
        if !dropped_assignees.is_empty() {
            warn!(
                dropped = dropped_assignees.len(),
                names = ?dropped_assignees,
                "Assignees not found on board"
            );
        }

        let mut new_card = NewCard::new(intent.title.trim(), &list_id);
        new_card.desc.clone_from(&intent.description);
        new_card.id_members = assignees.ids;
        new_card.id_labels = label_resolution.ids.clone();
        new_card.due = intent.due;

        let card = self
            .api
            .create_card(&new_card)
            .await
            .map_err(WriteError::create_failed)?;
        info!(card_id = %card.id, "Card created");

        stages.push(WriteStage::Decorating);
        let mut outcome = TaskOutcome::new(card, fingerprint, Vec::new());
        outcome.dropped_assignees = dropped_assignees;

        let missing_labels = distinct(label_resolution.unmatched());
        self.attach_new_labels(board_id, &missing_labels, &mut outcome).await;
        self.attach_checklist(&intent.checklist, &mut outcome).await;

        stages.push(WriteStage::Done);
        outcome.stages = std::mem::take(stages);
        Ok(outcome)
    }

    async fn resolve_destination(
        &self,
        board_id: &str,
        destination: Option<&Destination>,
    ) -> Result<String, WriteError> {
        if let Some(Destination::Id(id)) = destination {
            return Ok(id.clone());
        }

        let snapshot = self.metadata.lists(board_id).await?;
        let lists = snapshot.lists();
        let named = match destination {
            Some(Destination::Name(name)) => {
                let found = self.resolver.resolve_list(name, lists);
                if found.is_none() {
                    debug!(name = %name, "Named list not found, using default list");
                }
                found
            }
            _ => None,
        };

        named
            .or_else(|| self.resolver.default_list(lists, &self.config.default_list_keywords))
            .map(|list: &BoardList| list.id.clone())
            .ok_or_else(|| WriteError::NoDestination {
                board_id: board_id.to_string(),
            })
    }

    /// Reads reference data for resolution. A failed read resolves nothing.
    async fn reference(&self, kind: EntityKind, board_id: &str) -> Option<Snapshot> {
        match self.metadata.get(kind, board_id).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(kind = %kind, error = %e, "Reference data unavailable, names left unresolved");
                None
            }
        }
    }

    async fn attach_new_labels(&self, board_id: &str, names: &[String], outcome: &mut TaskOutcome) {
        if names.is_empty() {
            return;
        }

        for name in names {
            let color = random_label_color();
            let attached = async {
                let label = self.api.create_label(board_id, name, color).await?;
                self.api.add_label_to_card(&outcome.card.id, &label.id).await
            }
            .await;

            match attached {
                Ok(()) => {
                    debug!(label = %name, color, "Created and attached label");
                    outcome.created_labels.push(name.clone());
                }
                Err(e) => {
                    warn!(label = %name, error = %e, "Label decoration failed");
                    outcome.failed_decorations.push(format!("label '{name}': {e}"));
                }
            }
        }

        self.metadata.invalidate(EntityKind::Labels, board_id);
    }

    async fn attach_checklist(&self, items: &[String], outcome: &mut TaskOutcome) {
        let items: Vec<&str> = items
            .iter()
            .map(|i| i.trim())
            .filter(|i| !i.is_empty())
            .collect();
        if items.is_empty() {
            return;
        }

        let checklist = match self
            .api
            .create_checklist(&outcome.card.id, &self.config.checklist_name)
            .await
        {
            Ok(checklist) => checklist,
            Err(e) => {
                warn!(error = %e, "Checklist creation failed");
                outcome.failed_decorations.push(format!("checklist: {e}"));
                return;
            }
        };

        for item in items {
            if let Err(e) = self.api.add_checklist_item(&checklist.id, item).await {
                warn!(item, error = %e, "Checklist item failed");
                outcome
                    .failed_decorations
                    .push(format!("checklist item '{item}': {e}"));
            }
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn members_of(snapshot: Option<&Snapshot>) -> &[Member] {
    snapshot.map_or(&[], Snapshot::members)
}

fn labels_of(snapshot: Option<&Snapshot>) -> &[Label] {
    snapshot.map_or(&[], Snapshot::labels)
}

/// Unique names by normalized text, first spelling kept.
fn distinct(names: Vec<&str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();
    for name in names {
        let key = normalize_text(name);
        if key.is_empty() || seen.contains(&key) {
            continue;
        }
        seen.push(key);
        out.push(name.trim().to_string());
    }
    out
}

fn random_label_color() -> &'static str {
    use rand::seq::SliceRandom;

    LABEL_COLORS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("blue")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_labels() {
        let names = distinct(vec!["Acil", " acil ", "", "Rapor"]);
        assert_eq!(names, vec!["Acil".to_string(), "Rapor".to_string()]);
    }

    #[test]
    fn test_random_color_is_from_palette() {
        for _ in 0..20 {
            assert!(LABEL_COLORS.contains(&random_label_color()));
        }
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(WriteStage::DuplicateCheck.to_string(), "duplicate_check");
        assert_eq!(
            serde_json::to_value(WriteStage::Decorating).unwrap(),
            serde_json::json!("decorating")
        );
    }
}
