//! End-to-end create-task behavior against an in-memory Trello.

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use common::{BOARD, DOING_LIST, FakeTrello, TODO_LIST, gateway};
use taskgate_core::WriteIntent;
use taskgate_fetch::{FetchError, Method, Transport};
use taskgate_store::GatewayConfig;
use taskgate_trello::{
    Gateway, LABEL_COLORS, WriteError, WriteStage, compute_idempotency_fingerprint,
};

fn june(day: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, day, 0, 0, 0).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_alias_assignee_is_attached() {
    let fake = FakeTrello::new();
    let gateway = gateway(&fake);

    let outcome = gateway
        .create_task(WriteIntent::new("Kampanya Planı").assign("ziya"))
        .await
        .unwrap();

    assert!(outcome.created);
    assert!(outcome.dropped_assignees.is_empty());
    assert_eq!(
        outcome.stages,
        vec![
            WriteStage::Resolving,
            WriteStage::DuplicateCheck,
            WriteStage::Creating,
            WriteStage::Decorating,
            WriteStage::Done,
        ]
    );

    let bodies = fake.created_cards();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["name"], "Kampanya Planı");
    assert_eq!(bodies[0]["idMembers"], "m-ziya");
    assert_eq!(bodies[0]["idList"], TODO_LIST);
    assert_eq!(bodies[0]["pos"], "top");
}

#[tokio::test(start_paused = true)]
async fn test_label_without_diacritics_resolves_at_create() {
    let fake = FakeTrello::new();
    let gateway = gateway(&fake);

    let outcome = gateway
        .create_task(WriteIntent::new("Sunum").label("yuksek oncelik"))
        .await
        .unwrap();

    assert!(outcome.created_labels.is_empty());
    assert_eq!(fake.created_cards()[0]["idLabels"], "lab-high");
    assert_eq!(fake.count(&Method::POST, "/1/labels"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_near_duplicate_on_same_day_is_not_written() {
    let fake = FakeTrello::new();
    let gateway = gateway(&fake);

    let first = gateway
        .create_task(WriteIntent::new("Website Analizi").due_at(june(1)))
        .await
        .unwrap();
    let second = gateway
        .create_task(WriteIntent::new("Website Analiz").due_at(june(1)))
        .await
        .unwrap();

    assert!(first.created);
    assert!(!second.created);
    assert_eq!(second.card.id, first.card.id);
    assert_eq!(
        second.stages,
        vec![WriteStage::Resolving, WriteStage::DuplicateCheck, WriteStage::Done]
    );
    assert_eq!(fake.count(&Method::POST, "/1/cards"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_near_duplicate_on_next_day_is_written() {
    let fake = FakeTrello::new();
    let gateway = gateway(&fake);

    gateway
        .create_task(WriteIntent::new("Website Analizi").due_at(june(1)))
        .await
        .unwrap();
    let second = gateway
        .create_task(WriteIntent::new("Website Analiz").due_at(june(2)))
        .await
        .unwrap();

    assert!(second.created);
    assert_eq!(fake.count(&Method::POST, "/1/cards"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_search_is_scoped_and_limited() {
    let fake = FakeTrello::new();
    let gateway = gateway(&fake);

    gateway
        .create_task(WriteIntent::new("Bir iki üç dört beş altı yedi sekiz"))
        .await
        .unwrap();

    let search = fake
        .requests()
        .into_iter()
        .find(|r| r.path == "/1/search")
        .unwrap();
    assert_eq!(search.query_value("query"), Some("\"Bir iki üç dört beş altı\""));
    assert_eq!(search.query_value("idBoards"), Some(BOARD));
    assert_eq!(search.query_value("modelTypes"), Some("cards"));
    assert_eq!(search.query_value("cards_limit"), Some("20"));
    assert_eq!(search.query_value("card_fields"), Some("name,due,url"));
}

#[tokio::test(start_paused = true)]
async fn test_outcome_fingerprint_matches_inputs() {
    let fake = FakeTrello::new();
    let gateway = gateway(&fake);

    let outcome = gateway
        .create_task(WriteIntent::new("Bütçe Toplantısı").due_at(june(3)))
        .await
        .unwrap();

    assert_eq!(
        outcome.fingerprint,
        compute_idempotency_fingerprint(BOARD, TODO_LIST, "bütçe toplantısı", Some(june(3)))
    );
}

#[tokio::test(start_paused = true)]
async fn test_reference_data_is_read_once_within_ttl() {
    let fake = FakeTrello::new();
    let gateway = gateway(&fake);

    for title in ["Kampanya Planı", "Website Analizi"] {
        gateway
            .create_task(WriteIntent::new(title).assign("berkay").label("test"))
            .await
            .unwrap();
    }
    assert_eq!(fake.count(&Method::GET, "/1/boards/b1/members"), 1);
    assert_eq!(fake.count(&Method::GET, "/1/boards/b1/labels"), 1);
    assert_eq!(fake.count(&Method::GET, "/1/boards/b1/lists"), 1);

    tokio::time::advance(Duration::from_secs(11 * 60)).await;
    gateway
        .create_task(WriteIntent::new("Bütçe Toplantısı").assign("berkay"))
        .await
        .unwrap();
    assert_eq!(fake.count(&Method::GET, "/1/boards/b1/members"), 2);
    assert_eq!(fake.count(&Method::GET, "/1/boards/b1/lists"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_named_destination() {
    let fake = FakeTrello::new();
    let gateway = gateway(&fake);

    gateway
        .create_task(WriteIntent::new("Tasarım").in_list_named("devam"))
        .await
        .unwrap();
    assert_eq!(fake.created_cards()[0]["idList"], DOING_LIST);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_list_name_falls_back_to_default() {
    let fake = FakeTrello::new();
    let gateway = gateway(&fake);

    gateway
        .create_task(WriteIntent::new("Tasarım").in_list_named("Olmayan Liste"))
        .await
        .unwrap();
    assert_eq!(fake.created_cards()[0]["idList"], TODO_LIST);
}

#[tokio::test(start_paused = true)]
async fn test_explicit_list_id_skips_list_lookup() {
    let fake = FakeTrello::new();
    let gateway = gateway(&fake);

    gateway
        .create_task(WriteIntent::new("Tasarım").in_list("l-custom"))
        .await
        .unwrap();
    assert_eq!(fake.count(&Method::GET, "/1/boards/b1/lists"), 0);
    assert_eq!(fake.created_cards()[0]["idList"], "l-custom");
}

#[tokio::test(start_paused = true)]
async fn test_no_destination() {
    let fake = FakeTrello::new();
    fake.close_all_lists();
    let gateway = gateway(&fake);

    let err = gateway
        .create_task(WriteIntent::new("Tasarım"))
        .await
        .unwrap_err();

    assert!(matches!(err, WriteError::NoDestination { ref board_id } if board_id == BOARD));
    assert_eq!(fake.count(&Method::POST, "/1/cards"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_no_board() {
    let fake = FakeTrello::new();
    let transport: Arc<dyn Transport> = fake.clone();
    let gateway = Gateway::with_transport(&GatewayConfig::default(), transport).unwrap();

    let err = gateway
        .create_task(WriteIntent::new("Tasarım"))
        .await
        .unwrap_err();
    assert!(matches!(err, WriteError::NoBoard));
    assert!(fake.requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_blank_title_is_rejected_before_any_call() {
    let fake = FakeTrello::new();
    let gateway = gateway(&fake);

    let err = gateway
        .create_task(WriteIntent::new("  "))
        .await
        .unwrap_err();
    assert!(matches!(err, WriteError::Invalid(_)));
    assert!(fake.requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_create_error_keeps_cause() {
    let fake = FakeTrello::new();
    fake.fail(Method::POST, "/1/cards", 400);
    let gateway = gateway(&fake);

    let err = gateway
        .create_task(WriteIntent::new("Tasarım"))
        .await
        .unwrap_err();

    match err {
        WriteError::CreateFailed { source, .. } => {
            assert!(matches!(source, FetchError::Api { status: 400, .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(fake.count(&Method::POST, "/1/cards"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limited_create_is_retried_then_fails() {
    let fake = FakeTrello::new();
    fake.fail(Method::POST, "/1/cards", 429);
    let gateway = gateway(&fake);

    let err = gateway
        .create_task(WriteIntent::new("Tasarım"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        WriteError::CreateFailed {
            source: FetchError::RateLimited { attempts: 3 },
            ..
        }
    ));
    assert!(err.is_transient());
    assert_eq!(fake.count(&Method::POST, "/1/cards"), 3);
}

#[tokio::test(start_paused = true)]
async fn test_failed_duplicate_search_does_not_block_write() {
    let fake = FakeTrello::new();
    fake.add_card("Website Analizi", None);
    fake.fail(Method::GET, "/1/search", 500);
    let gateway = gateway(&fake);

    let outcome = gateway
        .create_task(WriteIntent::new("Website Analizi"))
        .await
        .unwrap();

    assert!(outcome.created);
    assert_eq!(fake.count(&Method::POST, "/1/cards"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_unmatched_label_is_created_and_attached() {
    let fake = FakeTrello::new();
    let gateway = gateway(&fake);

    let outcome = gateway
        .create_task(WriteIntent::new("Tasarım").label("Pazarlama").label("pazarlama "))
        .await
        .unwrap();

    assert_eq!(outcome.created_labels, vec!["Pazarlama".to_string()]);
    assert!(outcome.is_complete());
    assert_eq!(fake.count(&Method::POST, "/1/labels"), 1);
    assert_eq!(
        fake.count(&Method::POST, &format!("/1/cards/{}/idLabels", outcome.card.id)),
        1
    );

    let label_call = fake
        .requests()
        .into_iter()
        .find(|r| r.path == "/1/labels")
        .unwrap();
    let body = label_call.body.unwrap();
    assert_eq!(body["idBoard"], BOARD);
    assert!(LABEL_COLORS.contains(&body["color"].as_str().unwrap()));

    // The new label is visible to the next write without being recreated.
    gateway
        .create_task(WriteIntent::new("Kampanya Planı").label("pazarlama"))
        .await
        .unwrap();
    assert_eq!(fake.count(&Method::POST, "/1/labels"), 1);
    assert!(fake.created_cards()[1]["idLabels"].as_str().unwrap().starts_with("label-"));
}

#[tokio::test(start_paused = true)]
async fn test_label_decoration_failure_is_reported_not_fatal() {
    let fake = FakeTrello::new();
    fake.fail(Method::POST, "/1/labels", 500);
    let gateway = gateway(&fake);

    let outcome = gateway
        .create_task(WriteIntent::new("Tasarım").label("Yepyeni Etiket"))
        .await
        .unwrap();

    assert!(outcome.created);
    assert!(outcome.created_labels.is_empty());
    assert_eq!(outcome.failed_decorations.len(), 1);
    assert!(!outcome.is_complete());
}

#[tokio::test(start_paused = true)]
async fn test_checklist_items_are_added_in_order() {
    let fake = FakeTrello::new();
    let gateway = gateway(&fake);

    gateway
        .create_task(
            WriteIntent::new("Lansman")
                .checklist_item("Metin yaz")
                .checklist_item("  ")
                .checklist_item("Görsel hazırla"),
        )
        .await
        .unwrap();

    let checklist = fake
        .requests()
        .into_iter()
        .find(|r| r.path == "/1/checklists")
        .unwrap();
    assert_eq!(checklist.body.unwrap()["name"], "Checklist");

    let items: Vec<String> = fake
        .requests()
        .into_iter()
        .filter(|r| r.path.ends_with("/checkItems"))
        .map(|r| r.body.unwrap()["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(items, vec!["Metin yaz".to_string(), "Görsel hazırla".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_checklist_failure_is_reported_not_fatal() {
    let fake = FakeTrello::new();
    fake.fail(Method::POST, "/1/checklists", 400);
    let gateway = gateway(&fake);

    let outcome = gateway
        .create_task(WriteIntent::new("Lansman").checklist_item("Metin yaz"))
        .await
        .unwrap();

    assert!(outcome.created);
    assert_eq!(outcome.failed_decorations.len(), 1);
    assert_eq!(fake.count_suffix(&Method::POST, "/checkItems"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_assignee_is_dropped_and_reported() {
    let fake = FakeTrello::new();
    let gateway = gateway(&fake);

    let outcome = gateway
        .create_task(WriteIntent::new("Tasarım").assign("@ghost").assign("berkay"))
        .await
        .unwrap();

    assert_eq!(outcome.dropped_assignees, vec!["@ghost".to_string()]);
    assert_eq!(fake.created_cards()[0]["idMembers"], "m-berkay");
}

#[tokio::test(start_paused = true)]
async fn test_member_lookup_failure_drops_assignees() {
    let fake = FakeTrello::new();
    fake.fail(Method::GET, "/1/boards/b1/members", 500);
    let gateway = gateway(&fake);

    let outcome = gateway
        .create_task(WriteIntent::new("Tasarım").assign("ziya"))
        .await
        .unwrap();

    assert!(outcome.created);
    assert_eq!(outcome.dropped_assignees, vec!["ziya".to_string()]);
    assert!(fake.created_cards()[0].get("idMembers").is_none());
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_writes_share_one_gateway() {
    let fake = FakeTrello::new();
    let gateway = gateway(&fake);

    let titles = [
        "Kampanya Planı",
        "Website Analizi",
        "Bütçe Toplantısı",
        "Lansman Takvimi",
        "Müşteri Anketi",
    ];
    let results = futures::future::join_all(
        titles
            .iter()
            .map(|title| gateway.create_task(WriteIntent::new(*title))),
    )
    .await;

    assert!(results.iter().all(Result::is_ok));
    assert_eq!(fake.count(&Method::POST, "/1/cards"), titles.len());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_rejects_new_writes() {
    let fake = FakeTrello::new();
    let gateway = gateway(&fake);
    gateway.shutdown();

    let err = gateway
        .create_task(WriteIntent::new("Tasarım"))
        .await
        .unwrap_err();
    assert!(matches!(err, WriteError::Fetch(FetchError::Shutdown)));
    assert!(fake.requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_list_boards_skips_closed() {
    let fake = FakeTrello::new();
    let gateway = gateway(&fake);

    let boards = gateway.list_boards().await.unwrap();
    assert_eq!(boards.len(), 1);
    assert_eq!(boards[0].id, BOARD);
}

#[tokio::test(start_paused = true)]
async fn test_comment_and_move() {
    let fake = FakeTrello::new();
    let gateway = gateway(&fake);
    let card_id = fake.add_card("Tasarım", None);

    gateway.api().add_comment(&card_id, "Taslak hazır").await.unwrap();
    let moved = gateway.api().move_card(&card_id, DOING_LIST).await.unwrap();

    assert_eq!(moved.id_list.as_deref(), Some(DOING_LIST));
    assert_eq!(
        fake.count(&Method::POST, &format!("/1/cards/{card_id}/actions/comments")),
        1
    );
}

#[tokio::test(start_paused = true)]
async fn test_add_member_to_existing_card() {
    let fake = FakeTrello::new();
    let gateway = gateway(&fake);
    let card_id = fake.add_card("Tasarım", None);

    gateway
        .api()
        .add_member_to_card(&card_id, "m-ziya")
        .await
        .unwrap();

    let path = format!("/1/cards/{card_id}/idMembers");
    assert_eq!(fake.count(&Method::POST, &path), 1);
    let call = fake
        .requests()
        .into_iter()
        .find(|r| r.path == path)
        .unwrap();
    assert_eq!(call.body.unwrap(), serde_json::json!({ "value": "m-ziya" }));
}
