use crate::chat::gateway::testing::{Script, ScriptedClient};
use crate::chat::hub::outbound_channel;
use crate::chat::{ChatAppState, ConnectionId};
use crate::server::create_router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use lib_core::Config;
use serde_json::Value;
use shared::dto::{ChatEvent, ErrorResponse, HealthResponse, ModelsResponse, Participant};
use std::sync::Arc;
use tower::ServiceExt;

mod websocket;

fn test_state(script: Script) -> Arc<ChatAppState> {
    let config = Config {
        llm_timeout_secs: 5,
        ..Config::default()
    };
    Arc::new(ChatAppState::new(config, ScriptedClient::new(script)))
}

fn test_app(state: Arc<ChatAppState>) -> Router {
    create_router(state, &[])
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

#[tokio::test]
async fn test_health() {
    let state = test_state(Script::Reply("ok".to_string()));
    let (tx, _rx) = outbound_channel();
    state.relay.join(ConnectionId::new(), Some("alice"), tx).await.unwrap();

    let (status, body) = get_json(test_app(state), "/health").await;

    assert_eq!(status, StatusCode::OK);
    let health: HealthResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.connections, 1);
}

#[tokio::test]
async fn test_history_empty_then_populated() {
    let state = test_state(Script::Reply("ok".to_string()));

    let (status, body) = get_json(test_app(Arc::clone(&state)), "/api/history").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"[]");

    let a = ConnectionId::new();
    let (tx, _rx) = outbound_channel();
    state.relay.join(a, Some("alice"), tx).await.unwrap();
    for n in 0..60 {
        state.relay.post_message(a, &format!("m{n}")).await.unwrap();
    }

    let (_, body) = get_json(test_app(state), "/api/history").await;
    let history: Vec<ChatEvent> = serde_json::from_slice(&body).unwrap();
    assert_eq!(history.len(), 50);
    assert_eq!(history.first().unwrap().content, "m10");
    assert_eq!(history.last().unwrap().content, "m59");

    let raw: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(raw[0]["username"], "alice");
    assert_eq!(raw[0]["type"], "user");
}

#[tokio::test]
async fn test_users_in_join_order() {
    let state = test_state(Script::Reply("ok".to_string()));
    for name in ["alice", "bob"] {
        let (tx, _rx) = outbound_channel();
        state.relay.join(ConnectionId::new(), Some(name), tx).await.unwrap();
    }

    let (status, body) = get_json(test_app(state), "/api/users").await;

    assert_eq!(status, StatusCode::OK);
    let users: Vec<Participant> = serde_json::from_slice(&body).unwrap();
    let names: Vec<&str> = users.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["alice", "bob"]);
}

#[tokio::test]
async fn test_models() {
    let state = test_state(Script::Reply("ok".to_string()));

    let (status, body) = get_json(test_app(state), "/api/models").await;

    assert_eq!(status, StatusCode::OK);
    let models: ModelsResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(models.default_model, "llama3.2");
    assert!(models.models.contains(&"mistral".to_string()));
}

#[tokio::test]
async fn test_unknown_route_is_404_json() {
    let state = test_state(Script::Reply("ok".to_string()));

    let response = test_app(state)
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().contains_key("x-request-id"));
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.code, "NotFound");
    assert_eq!(error.error, "Route not found");
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let state = test_state(Script::Reply("ok".to_string()));

    let response = test_app(state)
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("origin", "http://localhost:8501")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}
