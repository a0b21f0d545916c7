//! # Presence Registry
//!
//! Source of truth for who is online. Entries are created on join and
//! removed on disconnect; a connection id is registered at most once.

use super::events::ConnectionId;
use lib_utils::{guest_name, now_utc};
use shared::dto::Participant;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PresenceError {
    #[error("connection {0} has already joined")]
    AlreadyJoined(ConnectionId),

    #[error("connection {0} closed before joining")]
    ConnectionClosed(ConnectionId),
}

#[derive(Debug)]
struct Entry {
    /// Join order, used to keep `list()` stable
    seq: u64,
    participant: Participant,
}

#[derive(Debug, Default)]
struct Roster {
    next_seq: u64,
    entries: HashMap<ConnectionId, Entry>,
}

/// Connection id → participant metadata.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    roster: RwLock<Roster>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and store a participant for `connection_id`.
    ///
    /// A missing or blank `requested_name` gets a generated guest name.
    pub async fn register(
        &self,
        connection_id: ConnectionId,
        requested_name: Option<&str>,
    ) -> Result<Participant, PresenceError> {
        let mut roster = self.roster.write().await;
        if roster.entries.contains_key(&connection_id) {
            return Err(PresenceError::AlreadyJoined(connection_id));
        }

        let username = requested_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(guest_name);

        let participant = Participant {
            id: connection_id.to_string(),
            username,
            joined_at: now_utc(),
        };

        let seq = roster.next_seq;
        roster.next_seq += 1;
        roster.entries.insert(
            connection_id,
            Entry {
                seq,
                participant: participant.clone(),
            },
        );

        Ok(participant)
    }

    /// Delete and return the entry; `None` for unknown or already removed ids.
    pub async fn remove(&self, connection_id: ConnectionId) -> Option<Participant> {
        self.roster
            .write()
            .await
            .entries
            .remove(&connection_id)
            .map(|entry| entry.participant)
    }

    pub async fn get(&self, connection_id: ConnectionId) -> Option<Participant> {
        self.roster
            .read()
            .await
            .entries
            .get(&connection_id)
            .map(|entry| entry.participant.clone())
    }

    /// Snapshot of all participants in join order.
    pub async fn list(&self) -> Vec<Participant> {
        let roster = self.roster.read().await;
        let mut entries: Vec<&Entry> = roster.entries.values().collect();
        entries.sort_by_key(|entry| entry.seq);
        entries.into_iter().map(|entry| entry.participant.clone()).collect()
    }

    pub async fn len(&self) -> usize {
        self.roster.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.roster.read().await.entries.is_empty()
    }
}
