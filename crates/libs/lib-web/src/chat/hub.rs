//! # Broadcast Hub
//!
//! Fan-out point for server events. Each joined connection registers a
//! bounded outbound queue; delivery is best-effort and never blocks: a full or
//! closed queue drops the event for that connection only.

use super::events::ConnectionId;
use shared::dto::ServerEvent;
use std::collections::HashMap;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, warn};

/// Per-connection queue depth before events start being dropped.
pub const OUTBOUND_CAPACITY: usize = 256;

pub type Outbound = mpsc::Sender<ServerEvent>;
pub type Inbox = mpsc::Receiver<ServerEvent>;

/// Queue pair for a new connection.
pub fn outbound_channel() -> (Outbound, Inbox) {
    mpsc::channel(OUTBOUND_CAPACITY)
}

/// Observer list of connected sinks.
#[derive(Debug, Default)]
pub struct BroadcastHub {
    sinks: RwLock<HashMap<ConnectionId, Outbound>>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start delivering to `connection_id`. Replaces any previous sink.
    pub async fn attach(&self, connection_id: ConnectionId, outbound: Outbound) {
        self.sinks.write().await.insert(connection_id, outbound);
    }

    /// Stop delivering to `connection_id`. Returns whether it was attached.
    pub async fn detach(&self, connection_id: ConnectionId) -> bool {
        self.sinks.write().await.remove(&connection_id).is_some()
    }

    /// Deliver to every attached connection.
    pub async fn broadcast_all(&self, event: ServerEvent) {
        self.fan_out(None, event).await;
    }

    /// Deliver to every attached connection except `excluded`.
    pub async fn broadcast_except(&self, excluded: ConnectionId, event: ServerEvent) {
        self.fan_out(Some(excluded), event).await;
    }

    /// Deliver to exactly one connection. Returns whether it was queued.
    pub async fn unicast(&self, connection_id: ConnectionId, event: ServerEvent) -> bool {
        let sink = self.sinks.read().await.get(&connection_id).cloned();
        match sink {
            Some(sink) => deliver(connection_id, &sink, event),
            None => {
                debug!(connection_id = %connection_id, "[HUB] unicast to detached connection dropped");
                false
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.sinks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sinks.read().await.is_empty()
    }

    async fn fan_out(&self, excluded: Option<ConnectionId>, event: ServerEvent) {
        // Snapshot the sinks; the lock is not held while sending.
        let targets: Vec<(ConnectionId, Outbound)> = self
            .sinks
            .read()
            .await
            .iter()
            .filter(|(id, _)| Some(**id) != excluded)
            .map(|(id, sink)| (*id, sink.clone()))
            .collect();

        for (connection_id, sink) in targets {
            deliver(connection_id, &sink, event.clone());
        }
    }
}

fn deliver(connection_id: ConnectionId, sink: &Outbound, event: ServerEvent) -> bool {
    let name = event.name();
    match sink.try_send(event) {
        Ok(()) => true,
        Err(mpsc::error::TrySendError::Full(_)) => {
            warn!(
                connection_id = %connection_id,
                event = name,
                "[HUB] outbound queue full, event dropped"
            );
            false
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            debug!(
                connection_id = %connection_id,
                event = name,
                "[HUB] connection closed, event dropped"
            );
            false
        }
    }
}
