//! Cached reference data.
//!
//! A [`Snapshot`] is an immutable copy of one board collection (members,
//! labels or lists) taken at a point in time. Snapshots are shared by value;
//! the payload sits behind an `Arc` so cloning is cheap.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::board::{BoardList, Label, Member};

// ============================================================================
// Entity Kind
// ============================================================================

/// Which reference collection a snapshot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Board members.
    Members,
    /// Board labels.
    Labels,
    /// Board lists.
    Lists,
}

impl EntityKind {
    /// Returns the provider path segment for this collection.
    pub fn path_segment(&self) -> &'static str {
        match self {
            Self::Members => "members",
            Self::Labels => "labels",
            Self::Lists => "lists",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

// ============================================================================
// Snapshot Key
// ============================================================================

/// Cache key: one collection on one board.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotKey {
    /// Collection kind.
    pub kind: EntityKind,
    /// Board ID.
    pub scope_id: String,
}

impl SnapshotKey {
    /// Creates a key.
    pub fn new(kind: EntityKind, scope_id: impl Into<String>) -> Self {
        Self {
            kind,
            scope_id: scope_id.into(),
        }
    }
}

impl fmt::Display for SnapshotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.scope_id)
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Records held by a snapshot, in provider order.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotPayload {
    /// Board members.
    Members(Vec<Member>),
    /// Board labels.
    Labels(Vec<Label>),
    /// Board lists.
    Lists(Vec<BoardList>),
}

impl SnapshotPayload {
    /// Returns the kind of records held.
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Members(_) => EntityKind::Members,
            Self::Labels(_) => EntityKind::Labels,
            Self::Lists(_) => EntityKind::Lists,
        }
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        match self {
            Self::Members(v) => v.len(),
            Self::Labels(v) => v.len(),
            Self::Lists(v) => v.len(),
        }
    }

    /// Returns true if there are no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Reference data for one board, as fetched at `fetched_at`.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Board ID.
    pub scope_id: String,
    /// Wall-clock fetch time.
    pub fetched_at: DateTime<Utc>,
    payload: Arc<SnapshotPayload>,
}

impl Snapshot {
    /// Creates a snapshot stamped with the current time.
    pub fn new(scope_id: impl Into<String>, payload: SnapshotPayload) -> Self {
        Self {
            scope_id: scope_id.into(),
            fetched_at: Utc::now(),
            payload: Arc::new(payload),
        }
    }

    /// Returns the collection kind.
    pub fn kind(&self) -> EntityKind {
        self.payload.kind()
    }

    /// Returns the cache key for this snapshot.
    pub fn key(&self) -> SnapshotKey {
        SnapshotKey::new(self.kind(), self.scope_id.clone())
    }

    /// Returns the payload.
    pub fn payload(&self) -> &SnapshotPayload {
        &self.payload
    }

    /// Returns the members, or an empty slice for other kinds.
    pub fn members(&self) -> &[Member] {
        match self.payload.as_ref() {
            SnapshotPayload::Members(v) => v,
            _ => &[],
        }
    }

    /// Returns the labels, or an empty slice for other kinds.
    pub fn labels(&self) -> &[Label] {
        match self.payload.as_ref() {
            SnapshotPayload::Labels(v) => v,
            _ => &[],
        }
    }

    /// Returns the lists, or an empty slice for other kinds.
    pub fn lists(&self) -> &[BoardList] {
        match self.payload.as_ref() {
            SnapshotPayload::Lists(v) => v,
            _ => &[],
        }
    }
}
