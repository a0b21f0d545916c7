//! # WebSocket Tests
//!
//! Real sockets against a served router.

use super::*;
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn serve(state: Arc<ChatAppState>) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = test_app(state);
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .unwrap();
    });
    addr
}

async fn connect(addr: SocketAddr) -> Client {
    let (client, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    client
}

async fn send(client: &mut Client, frame: Value) {
    client.send(Message::Text(frame.to_string())).await.unwrap();
}

/// Next JSON event, skipping control frames.
async fn next_event(client: &mut Client) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .expect("timed out waiting for an event")
            .unwrap()
            .unwrap();
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

async fn expect_events(client: &mut Client, names: &[&str]) -> Vec<Value> {
    let mut seen = Vec::new();
    for name in names {
        let event = next_event(client).await;
        assert_eq!(event["event"], *name, "unexpected frame {event}");
        seen.push(event);
    }
    seen
}

async fn join(addr: SocketAddr, username: &str) -> Client {
    let mut client = connect(addr).await;
    send(&mut client, json!({ "event": "join", "data": { "username": username } })).await;
    expect_events(&mut client, &["user_info", "chat_history", "users_update"]).await;
    client
}

#[tokio::test]
async fn test_chat_round_trip_over_socket() {
    let addr = serve(test_state(Script::Reply("Hello from the model".to_string()))).await;

    let mut alice = join(addr, "alice").await;
    let mut bob = join(addr, "bob").await;
    let seen = expect_events(&mut alice, &["user_joined", "users_update"]).await;
    assert_eq!(seen[0]["data"]["username"], "bob");
    assert_eq!(seen[1]["data"].as_array().unwrap().len(), 2);

    send(&mut bob, json!({ "event": "message", "data": { "content": "hi all" } })).await;
    for client in [&mut alice, &mut bob] {
        let event = next_event(client).await;
        assert_eq!(event["event"], "message");
        assert_eq!(event["data"]["username"], "bob");
        assert_eq!(event["data"]["content"], "hi all");
        assert_eq!(event["data"]["type"], "user");
    }

    // garbage is ignored, the session stays usable
    alice.send(Message::Text("not json".to_string())).await.unwrap();
    send(
        &mut alice,
        json!({ "event": "llm_message", "data": { "content": "hello", "model": "mistral" } }),
    )
    .await;

    let seen = expect_events(&mut bob, &["message", "llm_typing", "llm_typing", "message"]).await;
    assert_eq!(seen[0]["data"]["content"], "hello");
    assert_eq!(seen[1]["data"]["isTyping"], true);
    assert_eq!(seen[2]["data"]["isTyping"], false);
    assert_eq!(seen[3]["data"]["type"], "llm");
    assert_eq!(seen[3]["data"]["username"], "🤖 mistral");
    assert_eq!(seen[3]["data"]["content"], "Hello from the model");

    bob.close(None).await.unwrap();
    expect_events(&mut alice, &["message", "llm_typing", "llm_typing", "message"]).await;
    let seen = expect_events(&mut alice, &["user_left", "users_update"]).await;
    assert_eq!(seen[0]["data"]["username"], "bob");
    assert_eq!(seen[1]["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unjoined_socket_leaves_silently() {
    let addr = serve(test_state(Script::Reply("ok".to_string()))).await;
    let mut alice = join(addr, "alice").await;

    let mut lurker = connect(addr).await;
    send(&mut lurker, json!({ "event": "message", "data": { "content": "psst" } })).await;
    lurker.close(None).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    send(&mut alice, json!({ "event": "message", "data": { "content": "still here" } })).await;
    let event = next_event(&mut alice).await;
    assert_eq!(event["event"], "message");
    assert_eq!(event["data"]["content"], "still here");
}
