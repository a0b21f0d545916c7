//! # WebSocket Handlers
//!
//! The chat transport. Every connection gets its own session task; frames are
//! JSON objects `{"event": <name>, "data": <payload>}`.
//!
//! ## Endpoints
//!
//! - `GET /ws` - WebSocket connection to the chat relay

use crate::chat::hub::{outbound_channel, Inbox};
use crate::chat::{ChatAppState, ConnectionId, Session, SessionFlow};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use axum::response::Response;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use shared::dto::ClientEvent;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// WebSocket handler for the chat relay.
///
/// **Route**: `GET /ws`
///
/// # Example
///
/// ```javascript
/// const ws = new WebSocket('ws://localhost:3001/ws');
/// ws.onopen = () => ws.send(JSON.stringify({ event: 'join', data: { username: 'alice' } }));
/// ws.onmessage = (frame) => {
///   const { event, data } = JSON.parse(frame.data);
///   if (event === 'message') console.log(`${data.username}: ${data.content}`);
/// };
/// ```
pub async fn chat_websocket(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<Arc<ChatAppState>>,
) -> Response {
    let connection_id = ConnectionId::new();
    let client_ip = headers
        .get("x-forwarded-for")
        .or_else(|| headers.get("x-real-ip"))
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| addr.ip().to_string());

    info!(
        connection_id = %connection_id,
        client_ip = %client_ip,
        "[WS] CONNECT_ATTEMPT path=/ws"
    );

    ws.on_upgrade(move |socket| async move {
        handle_chat_socket(socket, state, connection_id, client_ip).await;
    })
}

/// Drive one connection until either side goes away.
///
/// The participant is always removed from the relay afterwards, whichever
/// task ended first.
async fn handle_chat_socket(
    socket: WebSocket,
    state: Arc<ChatAppState>,
    connection_id: ConnectionId,
    client_ip: String,
) {
    let (sender, receiver) = socket.split();
    let relay = Arc::clone(&state.relay);
    let connection_start = Instant::now();
    let messages_sent = Arc::new(AtomicU64::new(0));
    let messages_received = Arc::new(AtomicU64::new(0));

    let (outbound, inbox) = outbound_channel();
    let session = Session::new(connection_id, Arc::clone(&relay), outbound);

    info!(
        connection_id = %connection_id,
        client_ip = %client_ip,
        "[WS] CONNECTED"
    );

    let mut send_task = tokio::spawn(forward_outbound(
        sender,
        inbox,
        connection_id,
        Arc::clone(&messages_sent),
    ));
    let mut recv_task = tokio::spawn(read_inbound(
        receiver,
        session,
        connection_id,
        Arc::clone(&messages_received),
    ));

    // The other task must have stopped before `leave`, or a join it is still
    // processing could land after the participant was removed.
    tokio::select! {
        result = &mut send_task => {
            recv_task.abort();
            let _ = recv_task.await;
            if let Err(e) = result {
                error!(connection_id = %connection_id, error = ?e, "[WS] SEND_TASK_ERROR");
            }
        }
        result = &mut recv_task => {
            send_task.abort();
            let _ = send_task.await;
            if let Err(e) = result {
                error!(connection_id = %connection_id, error = ?e, "[WS] RECV_TASK_ERROR");
            }
        }
    }

    relay.leave(connection_id).await;

    let duration = connection_start.elapsed();
    info!(
        connection_id = %connection_id,
        client_ip = %client_ip,
        duration_ms = duration.as_millis() as u64,
        messages_sent = messages_sent.load(Ordering::Relaxed),
        messages_received = messages_received.load(Ordering::Relaxed),
        "[WS] DISCONNECTED"
    );
}

/// Serialize queued server events onto the socket.
async fn forward_outbound(
    mut sender: SplitSink<WebSocket, Message>,
    mut inbox: Inbox,
    connection_id: ConnectionId,
    messages_sent: Arc<AtomicU64>,
) {
    while let Some(event) = inbox.recv().await {
        let json = match serde_json::to_string(&event) {
            Ok(json) => json,
            Err(e) => {
                error!(connection_id = %connection_id, error = %e, "[WS] SERIALIZE_ERROR");
                continue;
            }
        };

        if let Err(e) = sender.send(Message::Text(json.into())).await {
            warn!(
                connection_id = %connection_id,
                error = %e,
                messages_sent = messages_sent.load(Ordering::Relaxed),
                "[WS] SEND_ERROR"
            );
            break;
        }
        let count = messages_sent.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(connection_id = %connection_id, event = event.name(), total_sent = count, "[WS] MESSAGE_SENT");
    }
}

/// Decode client frames and feed them to the session.
async fn read_inbound(
    mut receiver: SplitStream<WebSocket>,
    mut session: Session,
    connection_id: ConnectionId,
    messages_received: Arc<AtomicU64>,
) {
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                messages_received.fetch_add(1, Ordering::Relaxed);
                match serde_json::from_str::<ClientEvent>(text.as_str()) {
                    Ok(event) => {
                        if session.handle(event).await == SessionFlow::Close {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(
                            connection_id = %connection_id,
                            error = %e,
                            size = text.len(),
                            "[WS] MALFORMED_FRAME ignored"
                        );
                    }
                }
            }
            Ok(Message::Close(frame)) => {
                let code = frame.as_ref().map(|f| f.code);
                info!(connection_id = %connection_id, code = ?code, "[WS] CLOSE_RECEIVED");
                break;
            }
            Ok(Message::Binary(data)) => {
                debug!(connection_id = %connection_id, size = data.len(), "[WS] BINARY_IGNORED");
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Err(e) => {
                warn!(connection_id = %connection_id, error = %e, "[WS] RECV_ERROR");
                break;
            }
        }
    }

    session.disconnect().await;
}
