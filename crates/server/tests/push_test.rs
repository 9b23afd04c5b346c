mod common;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use courier_shared::constants::DELETED_MESSAGE_PLACEHOLDER;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

fn auth_header(token: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("authorization"),
        format!("Bearer {}", token).parse().unwrap(),
    )
}

async fn setup() -> (TestServer, sqlx::SqlitePool, Arc<courier_server::AppState>) {
    let pool = common::setup_test_db().await;
    let state = common::test_state(pool.clone());
    let server = TestServer::new(common::create_test_app(Arc::clone(&state))).unwrap();
    (server, pool, state)
}

async fn next_frame(rx: &mut mpsc::UnboundedReceiver<String>) -> Value {
    let payload = timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("push not delivered")
        .expect("channel closed");
    serde_json::from_str(&payload).unwrap()
}

#[tokio::test]
async fn send_pushes_one_created_event_to_recipient() {
    let (server, pool, state) = setup().await;
    let alice = common::create_session(&pool, "alice").await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    state.registry.register("bob", tx).await;

    let (h, v) = auth_header(&alice);
    let body: Value = server
        .post("/api/messages/send")
        .add_header(h, v)
        .json(&json!({ "to_user_id": "bob", "text": "ping" }))
        .await
        .json();
    assert_eq!(body["success"], true);

    let frame = next_frame(&mut rx).await;
    assert_eq!(frame["type"], "message_created");
    assert_eq!(frame["message"]["id"], body["message"]["id"]);
    assert_eq!(frame["message"]["fromUser"], "alice");
    assert_eq!(frame["message"]["text"], "ping");

    // Exactly one event per send.
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn send_does_not_push_to_sender_channel() {
    let (server, pool, state) = setup().await;
    let alice = common::create_session(&pool, "alice").await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    state.registry.register("alice", tx).await;

    let (h, v) = auth_header(&alice);
    let body: Value = server
        .post("/api/messages/send")
        .add_header(h, v)
        .json(&json!({ "to_user_id": "bob", "text": "to bob" }))
        .await
        .json();
    assert_eq!(body["success"], true);

    // Give the spawned publish a chance to run, then confirm silence.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn send_without_recipient_channel_still_persists() {
    let (server, pool, _state) = setup().await;
    let alice = common::create_session(&pool, "alice").await;
    let bob = common::create_session(&pool, "bob").await;

    let (h, v) = auth_header(&alice);
    let body: Value = server
        .post("/api/messages/send")
        .add_header(h, v)
        .json(&json!({ "to_user_id": "bob", "text": "lost push" }))
        .await
        .json();
    assert_eq!(body["success"], true);

    let (h, v) = auth_header(&bob);
    let recent: Value = server.get("/api/messages/recent").add_header(h, v).await.json();
    assert_eq!(recent["messages"][0]["text"], "lost push");
}

#[tokio::test]
async fn redaction_pushes_updated_event_with_placeholder() {
    let (server, pool, state) = setup().await;
    let alice = common::create_session(&pool, "alice").await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    state.registry.register("bob", tx).await;

    let (h, v) = auth_header(&alice);
    let sent: Value = server
        .post("/api/messages/send")
        .add_header(h, v)
        .json(&json!({ "to_user_id": "bob", "text": "soon gone" }))
        .await
        .json();
    let id = sent["message"]["id"].as_str().unwrap().to_string();

    // Drain the created event so only the update remains.
    let frame = next_frame(&mut rx).await;
    assert_eq!(frame["type"], "message_created");

    let (h, v) = auth_header(&alice);
    let body: Value = server
        .post("/api/messages/delete")
        .add_header(h, v)
        .json(&json!({ "messageId": id, "type": "everyone" }))
        .await
        .json();
    assert_eq!(body["success"], true);

    let frame = next_frame(&mut rx).await;
    assert_eq!(frame["type"], "message_updated");
    assert_eq!(frame["message"]["id"], id.as_str());
    assert_eq!(frame["message"]["text"], DELETED_MESSAGE_PLACEHOLDER);
    assert_eq!(frame["message"]["isDeletedEveryone"], true);
}

#[tokio::test]
async fn failed_redaction_pushes_nothing() {
    let (server, pool, state) = setup().await;
    let alice = common::create_session(&pool, "alice").await;
    let bob = common::create_session(&pool, "bob").await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    state.registry.register("bob", tx).await;

    let (h, v) = auth_header(&alice);
    let sent: Value = server
        .post("/api/messages/send")
        .add_header(h, v)
        .json(&json!({ "to_user_id": "bob", "text": "stays" }))
        .await
        .json();
    let id = sent["message"]["id"].as_str().unwrap().to_string();

    // Drain the created event before attempting the redaction.
    let frame = next_frame(&mut rx).await;
    assert_eq!(frame["type"], "message_created");

    // Recipient trying to redact: rejected, no event.
    let (h, v) = auth_header(&bob);
    let body: Value = server
        .post("/api/messages/delete")
        .add_header(h, v)
        .json(&json!({ "messageId": id, "type": "everyone" }))
        .await
        .json();
    assert_eq!(body["success"], false);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn subscribe_requires_credentials() {
    let (server, _pool, _state) = setup().await;

    let res = server.get("/api/messages/stream").await;
    res.assert_status(StatusCode::UNAUTHORIZED);
}
