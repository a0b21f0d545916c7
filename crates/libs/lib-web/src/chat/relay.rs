//! # Chat Relay
//!
//! Ties presence, history, fan-out and the completion gateway together.
//!
//! A single sequencer lock orders every history-affecting step: an append and
//! its broadcast happen as one unit, and a joiner's history snapshot cannot
//! interleave with them. History order therefore equals broadcast order.

use super::events::{user_event, ConnectionId};
use super::gateway::CompletionGateway;
use super::history::{HistoryBuffer, HISTORY_REPLAY_LIMIT};
use super::hub::{BroadcastHub, Outbound};
use super::presence::{PresenceError, PresenceRegistry};
use shared::dto::{ChatEvent, Participant, PresenceNotice, ServerEvent};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

pub struct ChatRelay {
    presence: PresenceRegistry,
    history: HistoryBuffer,
    hub: BroadcastHub,
    gateway: CompletionGateway,
    sequencer: Mutex<()>,
}

impl ChatRelay {
    pub fn new(history_capacity: usize, gateway: CompletionGateway) -> Self {
        Self {
            presence: PresenceRegistry::new(),
            history: HistoryBuffer::new(history_capacity),
            hub: BroadcastHub::new(),
            gateway,
            sequencer: Mutex::new(()),
        }
    }

    // region: --- Presence

    /// Register `connection_id` and start delivering to `outbound`.
    ///
    /// The joiner receives its identity and the recent history first; the
    /// others then see `user_joined`, and everyone gets the new roster.
    ///
    /// A join whose outbound queue is already closed is refused: its socket is
    /// gone and no later `leave` would remove the entry.
    pub async fn join(
        &self,
        connection_id: ConnectionId,
        requested_name: Option<&str>,
        outbound: Outbound,
    ) -> Result<Participant, PresenceError> {
        let _order = self.sequencer.lock().await;

        if outbound.is_closed() {
            debug!(connection_id = %connection_id, "[CHAT] join on closed connection refused");
            return Err(PresenceError::ConnectionClosed(connection_id));
        }

        let participant = self.presence.register(connection_id, requested_name).await?;
        self.hub.attach(connection_id, outbound).await;

        let snapshot = self.history.recent(HISTORY_REPLAY_LIMIT).await;
        let replayed = snapshot.len();
        self.hub
            .unicast(connection_id, ServerEvent::UserInfo(participant.clone()))
            .await;
        self.hub
            .unicast(connection_id, ServerEvent::ChatHistory(snapshot))
            .await;

        self.hub
            .broadcast_except(
                connection_id,
                ServerEvent::UserJoined(PresenceNotice::now(&participant.username)),
            )
            .await;
        self.hub
            .broadcast_all(ServerEvent::UsersUpdate(self.presence.list().await))
            .await;

        info!(
            connection_id = %connection_id,
            username = %participant.username,
            replayed,
            "[CHAT] participant joined"
        );
        Ok(participant)
    }

    /// Unregister `connection_id`. Unknown or already removed ids are a no-op.
    pub async fn leave(&self, connection_id: ConnectionId) -> Option<Participant> {
        let _order = self.sequencer.lock().await;

        self.hub.detach(connection_id).await;
        let Some(participant) = self.presence.remove(connection_id).await else {
            debug!(connection_id = %connection_id, "[CHAT] leave for unregistered connection");
            return None;
        };

        self.hub
            .broadcast_all(ServerEvent::UserLeft(PresenceNotice::now(&participant.username)))
            .await;
        self.hub
            .broadcast_all(ServerEvent::UsersUpdate(self.presence.list().await))
            .await;

        info!(
            connection_id = %connection_id,
            username = %participant.username,
            "[CHAT] participant left"
        );
        Some(participant)
    }

    // endregion: --- Presence

    // region: --- Messages

    /// Record and broadcast a message typed by `connection_id`.
    ///
    /// Returns `None` when the connection has not joined.
    pub async fn post_message(&self, connection_id: ConnectionId, content: &str) -> Option<ChatEvent> {
        let Some(author) = self.presence.get(connection_id).await else {
            debug!(connection_id = %connection_id, "[CHAT] message from unjoined connection dropped");
            return None;
        };

        let event = user_event(&author, content);
        self.publish(event.clone()).await;
        Some(event)
    }

    /// Append `event` to history and broadcast it, as one ordered step.
    pub async fn publish(&self, event: ChatEvent) {
        let _order = self.sequencer.lock().await;
        debug!(id = %event.id, kind = ?event.kind, "[CHAT] publish");
        self.history.append(event.clone()).await;
        self.hub.broadcast_all(ServerEvent::Message(event)).await;
    }

    /// Run a completion in the background and publish its outcome.
    ///
    /// The caller is not blocked; other connections keep flowing meanwhile.
    pub fn request_completion(self: &Arc<Self>, prompt: String, model: Option<String>) -> JoinHandle<()> {
        let relay = Arc::clone(self);
        tokio::spawn(async move {
            let event = relay
                .gateway
                .run(&prompt, model.as_deref(), &relay.hub)
                .await;
            relay.publish(event).await;
        })
    }

    // endregion: --- Messages

    // region: --- Queries

    /// The history query: at most the last 50 events, oldest first.
    pub async fn recent_history(&self) -> Vec<ChatEvent> {
        self.history.recent(HISTORY_REPLAY_LIMIT).await
    }

    pub async fn participants(&self) -> Vec<Participant> {
        self.presence.list().await
    }

    pub async fn participant(&self, connection_id: ConnectionId) -> Option<Participant> {
        self.presence.get(connection_id).await
    }

    /// Number of connections currently receiving broadcasts.
    pub async fn connection_count(&self) -> usize {
        self.hub.len().await
    }

    // endregion: --- Queries
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::chat::gateway::testing::{settings, Script, ScriptedClient};
    use crate::chat::hub::Inbox;
    use std::time::Duration;

    pub fn relay_with(script: Script, timeout: Duration) -> Arc<ChatRelay> {
        let gateway = CompletionGateway::new(ScriptedClient::new(script), settings(timeout));
        Arc::new(ChatRelay::new(50, gateway))
    }

    /// Everything queued for a connection so far.
    pub fn drain(inbox: &mut Inbox) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = inbox.try_recv() {
            events.push(event);
        }
        events
    }

    pub fn names(events: &[ServerEvent]) -> Vec<&'static str> {
        events.iter().map(ServerEvent::name).collect()
    }
}
