//! Integration tests for write intents and snapshots.

use chrono::{TimeZone, Utc};
use taskgate_core::{
    CoreError, Destination, EntityKind, Label, Member, Snapshot, SnapshotKey, SnapshotPayload,
    WriteIntent,
};

#[test]
fn test_intent_builder_collects_fields() {
    let intent = WriteIntent::new("Website Analizi")
        .on_board("b1")
        .in_list_named("Yapılacak")
        .assign("ziya")
        .label("Yüksek Öncelik")
        .due_at(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap())
        .checklist_item("Rakip listesi");

    assert!(intent.validate().is_ok());
    assert_eq!(intent.board_id.as_deref(), Some("b1"));
    assert_eq!(intent.destination, Some(Destination::Name("Yapılacak".into())));
    assert_eq!(intent.due_day(), "2024-06-01");
}

#[test]
fn test_blank_title_is_invalid() {
    let err = WriteIntent::new("").validate().unwrap_err();
    assert!(matches!(err, CoreError::InvalidIntent(_)));
}

#[test]
fn test_snapshot_clone_shares_payload() {
    let snapshot = Snapshot::new(
        "b1",
        SnapshotPayload::Members(vec![Member::new("m1", "ziyaeyuboglu", None)]),
    );
    let copy = snapshot.clone();

    assert_eq!(copy.members(), snapshot.members());
    assert_eq!(copy.key(), SnapshotKey::new(EntityKind::Members, "b1"));
    assert!(copy.labels().is_empty());
}

#[test]
fn test_payload_kind_and_len() {
    let payload = SnapshotPayload::Labels(vec![Label::new("l1", "Test"), Label::new("l2", "")]);
    assert_eq!(payload.kind(), EntityKind::Labels);
    assert_eq!(payload.len(), 2);
    assert!(!payload.is_empty());
}
