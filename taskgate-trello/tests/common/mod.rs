//! In-memory Trello used by the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use taskgate_fetch::{ApiRequest, ApiResponse, FetchError, Method, Transport};
use taskgate_store::GatewayConfig;
use taskgate_trello::Gateway;

pub const BOARD: &str = "b1";
pub const TODO_LIST: &str = "l-todo";
pub const DOING_LIST: &str = "l-doing";

#[derive(Default)]
struct State {
    boards: Vec<Value>,
    lists: Vec<Value>,
    members: Vec<Value>,
    labels: Vec<Value>,
    cards: Vec<Value>,
    requests: Vec<ApiRequest>,
    failures: Vec<(Method, String, u16)>,
    next_id: u32,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

/// Routes requests against in-memory boards, lists, members and cards.
pub struct FakeTrello {
    state: Mutex<State>,
}

impl FakeTrello {
    /// One board with two open lists, two members and two labels.
    pub fn new() -> Arc<Self> {
        let state = State {
            boards: vec![
                json!({"id": BOARD, "name": "Pazarlama", "url": "https://trello.com/b/b1", "closed": false}),
                json!({"id": "b-old", "name": "Eski", "url": "https://trello.com/b/old", "closed": true}),
            ],
            lists: vec![
                json!({"id": "l-archive", "name": "Arşiv", "closed": true, "pos": 1.0}),
                json!({"id": DOING_LIST, "name": "Devam Ediyor", "closed": false, "pos": 2.0}),
                json!({"id": TODO_LIST, "name": "Yapılacaklar", "closed": false, "pos": 3.0}),
            ],
            members: vec![
                json!({"id": "m-ziya", "username": "ziyaeyuboglu", "fullName": "Ziya Eyüboğlu"}),
                json!({"id": "m-berkay", "username": "infoalieweb3", "fullName": "Berkay Alie"}),
            ],
            labels: vec![
                json!({"id": "lab-high", "name": "Yüksek Öncelik", "color": "red"}),
                json!({"id": "lab-test", "name": "Test", "color": "green"}),
            ],
            ..State::default()
        };
        Arc::new(Self {
            state: Mutex::new(state),
        })
    }

    /// Answers `status` for every `method` call on exactly `path`.
    pub fn fail(&self, method: Method, path: &str, status: u16) {
        self.state
            .lock()
            .unwrap()
            .failures
            .push((method, path.to_string(), status));
    }

    pub fn close_all_lists(&self) {
        for list in &mut self.state.lock().unwrap().lists {
            list["closed"] = json!(true);
        }
    }

    pub fn add_card(&self, name: &str, due: Option<&str>) -> String {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id("card");
        state.cards.push(json!({
            "id": id,
            "name": name,
            "due": due,
            "url": format!("https://trello.com/c/{id}"),
            "idList": TODO_LIST,
        }));
        id
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn count(&self, method: &Method, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| &r.method == method && r.path == path)
            .count()
    }

    pub fn count_suffix(&self, method: &Method, suffix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| &r.method == method && r.path.ends_with(suffix))
            .count()
    }

    /// Bodies of all card create calls.
    pub fn created_cards(&self) -> Vec<Value> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == Method::POST && r.path == "/1/cards")
            .filter_map(|r| r.body)
            .collect()
    }

    fn route(state: &mut State, request: &ApiRequest) -> ApiResponse {
        let segments: Vec<&str> = request.path.trim_start_matches("/1/").split('/').collect();
        let body = request.body.clone().unwrap_or(Value::Null);

        let value = match (request.method.as_str(), segments.as_slice()) {
            ("GET", ["members", "me", "boards"]) => json!(state.boards),
            ("GET", ["boards", _, "lists"]) => json!(state.lists),
            ("GET", ["boards", _, "members"]) => json!(state.members),
            ("GET", ["boards", _, "labels"]) => json!(state.labels),
            ("GET", ["search"]) => json!({ "cards": state.cards }),
            ("POST", ["cards"]) => {
                let id = state.next_id("card");
                let card = json!({
                    "id": id,
                    "name": body["name"],
                    "due": body.get("due").cloned().unwrap_or(Value::Null),
                    "url": format!("https://trello.com/c/{id}"),
                    "idList": body["idList"],
                });
                state.cards.push(card.clone());
                card
            }
            ("POST", ["labels"]) => {
                let label = json!({
                    "id": state.next_id("label"),
                    "name": body["name"],
                    "color": body["color"],
                });
                state.labels.push(label.clone());
                label
            }
            ("POST", ["cards", _, "idLabels" | "idMembers"]) => json!([]),
            ("POST", ["cards", _, "actions", "comments"]) => json!({"type": "commentCard"}),
            ("POST", ["checklists"]) => {
                json!({ "id": state.next_id("checklist"), "name": body["name"] })
            }
            ("POST", ["checklists", _, "checkItems"]) => {
                json!({ "id": state.next_id("item"), "name": body["name"] })
            }
            ("PUT", ["cards", id]) => {
                let Some(card) = state.cards.iter_mut().find(|c| c["id"] == *id) else {
                    return ApiResponse::new(404, "The requested resource was not found.");
                };
                card["idList"] = body["idList"].clone();
                card.clone()
            }
            _ => return ApiResponse::new(404, "The requested resource was not found."),
        };
        ApiResponse::ok_json(&value)
    }
}

#[async_trait]
impl Transport for FakeTrello {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, FetchError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());

        let failure = state
            .failures
            .iter()
            .find(|(method, path, _)| *method == request.method && *path == request.path)
            .map(|(_, _, status)| *status);
        if let Some(status) = failure {
            return Ok(ApiResponse::new(
                status,
                json!({ "message": format!("forced {status}") }).to_string(),
            ));
        }

        Ok(Self::route(&mut state, request))
    }
}

pub fn config() -> GatewayConfig {
    GatewayConfig {
        default_board_id: Some(BOARD.to_string()),
        ..GatewayConfig::default()
    }
}

pub fn gateway(fake: &Arc<FakeTrello>) -> Gateway {
    let transport: Arc<dyn Transport> = Arc::clone(fake) as Arc<dyn Transport>;
    Gateway::with_transport(&config(), transport).unwrap()
}
