//! Broker client tests against a local mock broker

use std::collections::VecDeque;
use std::io::{self, Cursor};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::State,
    http::{header::ACCEPT, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use wargame_cli::{BlockingBroker, BrokerClient, BrokerError, MatchRunner};
use wargame_core::{Coord, GameType, Move, Options, Player, Unit, UnitType};

// ============================================================================
// MOCK BROKER
// ============================================================================

/// GET replays `replies` in order, repeating the last one;
/// POST records the body and echoes it (or a bogus move when `echo` is off)
#[derive(Clone)]
struct MockBroker {
    replies: Arc<Mutex<VecDeque<(StatusCode, String)>>>,
    posted: Arc<Mutex<Vec<Value>>>,
    echo: bool,
}

impl MockBroker {
    fn new(replies: Vec<(StatusCode, String)>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into())),
            posted: Arc::new(Mutex::new(Vec::new())),
            echo: true,
        }
    }

    fn ok(body: Value) -> Self {
        Self::new(vec![(StatusCode::OK, body.to_string())])
    }

    fn posted(&self) -> Vec<Value> {
        self.posted.lock().unwrap().clone()
    }
}

async fn serve_move(State(mock): State<MockBroker>, headers: HeaderMap) -> (StatusCode, String) {
    if headers.get(ACCEPT).and_then(|v| v.to_str().ok()) != Some("application/json") {
        return (StatusCode::NOT_ACCEPTABLE, "{}".to_string());
    }
    let mut replies = mock.replies.lock().unwrap();
    if replies.len() > 1 {
        replies.pop_front().unwrap()
    } else {
        replies.front().cloned().unwrap()
    }
}

async fn accept_move(State(mock): State<MockBroker>, Json(body): Json<Value>) -> Json<Value> {
    mock.posted.lock().unwrap().push(body.clone());
    let data = if mock.echo {
        body
    } else {
        wire(0, 0, 0, 0, 0)
    };
    Json(json!({"success": true, "data": data}))
}

async fn spawn_broker(mock: MockBroker) -> String {
    let app = Router::new()
        .route("/", get(serve_move).post(accept_move))
        .with_state(mock);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{}/", addr)
}

/// Mock broker on its own thread, for the blocking client
fn spawn_broker_thread(mock: MockBroker) -> String {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            tx.send(spawn_broker(mock).await).unwrap();
            std::future::pending::<()>().await;
        });
    });
    rx.recv().unwrap()
}

fn wire(r0: i8, c0: i8, r1: i8, c1: i8, turn: u32) -> Value {
    json!({"from": {"row": r0, "col": c0}, "to": {"row": r1, "col": c1}, "turn": turn})
}

// ============================================================================
// ASYNC CLIENT
// ============================================================================

#[tokio::test]
async fn test_fetch_move_for_expected_turn() {
    let url = spawn_broker(MockBroker::ok(json!({"success": true, "data": wire(2, 4, 1, 4, 1)}))).await;
    let client = BrokerClient::new(url);

    let mv = client.fetch_move(1).await.unwrap();
    assert_eq!(mv, Some(Move::from_quad(2, 4, 1, 4)));
}

#[tokio::test]
async fn test_fetch_ignores_other_turns() {
    let url = spawn_broker(MockBroker::ok(json!({"success": true, "data": wire(2, 4, 1, 4, 3)}))).await;
    let client = BrokerClient::new(url);
    assert_eq!(client.fetch_move(1).await.unwrap(), None);
}

#[tokio::test]
async fn test_fetch_without_data() {
    let url = spawn_broker(MockBroker::ok(json!({"success": true, "data": null}))).await;
    let client = BrokerClient::new(url);
    assert_eq!(client.fetch_move(1).await.unwrap(), None);
}

#[tokio::test]
async fn test_fetch_failures() {
    let url = spawn_broker(MockBroker::ok(json!({"success": false, "data": null}))).await;
    let result = BrokerClient::new(url).fetch_move(1).await;
    assert!(matches!(result, Err(BrokerError::Rejected)));

    let url = spawn_broker(MockBroker::new(vec![(StatusCode::OK, "not json".to_string())])).await;
    let result = BrokerClient::new(url).fetch_move(1).await;
    assert!(matches!(result, Err(BrokerError::Malformed { .. })));

    let url = spawn_broker(MockBroker::new(vec![(
        StatusCode::INTERNAL_SERVER_ERROR,
        "{}".to_string(),
    )]))
    .await;
    let result = BrokerClient::new(url).fetch_move(1).await;
    assert!(matches!(
        result,
        Err(BrokerError::Status { status, .. }) if status == reqwest::StatusCode::INTERNAL_SERVER_ERROR
    ));
}

#[tokio::test]
async fn test_unreachable_broker() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = BrokerClient::new(format!("http://{}/", addr)).fetch_move(1).await;
    assert!(matches!(result, Err(BrokerError::Http(_))));
}

#[tokio::test]
async fn test_post_move_checks_echo() {
    let mock = MockBroker::ok(json!({"success": true, "data": null}));
    let url = spawn_broker(mock.clone()).await;
    let client = BrokerClient::new(url);

    client.post_move(Move::from_quad(0, 2, 1, 2), 4).await.unwrap();
    assert_eq!(mock.posted(), vec![wire(0, 2, 1, 2, 4)]);
}

#[tokio::test]
async fn test_post_move_echo_mismatch() {
    let mock = MockBroker {
        echo: false,
        ..MockBroker::ok(json!({"success": true, "data": null}))
    };
    let url = spawn_broker(mock).await;

    let result = BrokerClient::new(url).post_move(Move::from_quad(0, 2, 1, 2), 4).await;
    assert!(matches!(result, Err(BrokerError::EchoMismatch { .. })));
}

// ============================================================================
// MATCH THROUGH THE BROKER
// ============================================================================

#[test]
fn test_match_via_broker() {
    // Stale turn, then an unplayable move, then the real one
    let mock = MockBroker::new(vec![
        (StatusCode::OK, json!({"success": true, "data": wire(3, 3, 2, 3, 0)}).to_string()),
        (StatusCode::OK, json!({"success": true, "data": wire(4, 3, 3, 3, 1)}).to_string()),
        (StatusCode::OK, json!({"success": true, "data": wire(2, 4, 1, 4, 1)}).to_string()),
    ]);
    let url = spawn_broker_thread(mock.clone());

    let options = Options {
        game_type: GameType::AttackerVsComp,
        max_depth: 2,
        min_depth: 1,
        max_time: 60.0,
        max_turns: Some(2),
        broker: Some(url.clone()),
        ..Default::default()
    };
    let broker = BlockingBroker::new(url)
        .unwrap()
        .with_poll_interval(Duration::from_millis(10));
    let runner = MatchRunner::new(options, Cursor::new(""), io::sink())
        .unwrap()
        .with_broker(broker);
    let outcome = runner.play().unwrap();

    assert_eq!(outcome.winner, Player::Defender);
    assert_eq!(outcome.turns_played, 2);
    assert_eq!(
        outcome.final_state.get(Coord::new(1, 4)),
        Some(&Unit::new(Player::Attacker, UnitType::Standard))
    );

    // Only the computer's move goes back to the broker, tagged with the new turn count
    let posted = mock.posted();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0]["turn"], 2);
}
