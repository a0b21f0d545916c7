//! # Connection Session
//!
//! Per-connection state machine: `Connecting → Joined → Disconnected`.
//! Inbound client events are validated here before they reach the relay.

use super::events::ConnectionId;
use super::hub::Outbound;
use super::relay::ChatRelay;
use lib_utils::{validate_max_length, validate_not_empty};
use shared::dto::{ClientEvent, Participant};
use std::sync::Arc;
use tracing::{debug, warn};

/// Longest accepted message body, in bytes.
pub const MAX_CONTENT_BYTES: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Joined(Participant),
    Disconnected,
}

/// What the transport loop should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionFlow {
    Continue,
    Close,
}

pub struct Session {
    connection_id: ConnectionId,
    relay: Arc<ChatRelay>,
    state: SessionState,
    /// Handed to the hub on join
    outbound: Option<Outbound>,
}

impl Session {
    pub fn new(connection_id: ConnectionId, relay: Arc<ChatRelay>, outbound: Outbound) -> Self {
        Self {
            connection_id,
            relay,
            state: SessionState::Connecting,
            outbound: Some(outbound),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub async fn handle(&mut self, event: ClientEvent) -> SessionFlow {
        if self.state == SessionState::Disconnected {
            return SessionFlow::Close;
        }

        match event {
            ClientEvent::Join(request) => self.join(request.username.as_deref()).await,
            ClientEvent::Message(request) => {
                if self.accept_content(&request.content, "message") {
                    self.relay.post_message(self.connection_id, &request.content).await;
                }
            }
            ClientEvent::LlmMessage(request) => {
                if self.accept_content(&request.content, "llm_message")
                    && self
                        .relay
                        .post_message(self.connection_id, &request.content)
                        .await
                        .is_some()
                {
                    self.relay.request_completion(request.content, request.model);
                }
            }
            ClientEvent::Disconnect => {
                self.disconnect().await;
                return SessionFlow::Close;
            }
        }

        SessionFlow::Continue
    }

    /// Enter the terminal state; safe to call more than once.
    pub async fn disconnect(&mut self) {
        if self.state == SessionState::Disconnected {
            return;
        }
        self.state = SessionState::Disconnected;
        self.outbound = None;
        self.relay.leave(self.connection_id).await;
    }

    async fn join(&mut self, requested_name: Option<&str>) {
        let Some(outbound) = self.outbound.take() else {
            debug!(connection_id = %self.connection_id, "[CHAT] repeated join ignored");
            return;
        };

        match self.relay.join(self.connection_id, requested_name, outbound).await {
            Ok(participant) => self.state = SessionState::Joined(participant),
            Err(e) => warn!(connection_id = %self.connection_id, error = %e, "[CHAT] join rejected"),
        }
    }

    fn accept_content(&self, content: &str, kind: &str) -> bool {
        if !matches!(self.state, SessionState::Joined(_)) {
            debug!(connection_id = %self.connection_id, kind, "[CHAT] dropped before join");
            return false;
        }
        if validate_not_empty(content, "content").is_err() {
            debug!(connection_id = %self.connection_id, kind, "[CHAT] empty content dropped");
            return false;
        }
        if let Err(e) = validate_max_length(content, MAX_CONTENT_BYTES, "content") {
            warn!(
                connection_id = %self.connection_id,
                kind,
                size = content.len(),
                error = %e,
                "[CHAT] oversized content dropped"
            );
            return false;
        }
        true
    }
}
