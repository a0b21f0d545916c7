//! # Chat History Buffer
//!
//! Append-only, capacity-bounded log of chat events. The oldest entries are
//! evicted once the configured capacity is exceeded; eviction is by size only.

use shared::dto::ChatEvent;
use std::collections::VecDeque;
use tokio::sync::RwLock;

/// Number of events replayed to a joiner and returned by the history query.
pub const HISTORY_REPLAY_LIMIT: usize = 50;

/// Shared, ordered history of the chat stream.
#[derive(Debug)]
pub struct HistoryBuffer {
    events: RwLock<VecDeque<ChatEvent>>,
    capacity: usize,
}

impl HistoryBuffer {
    /// Create an empty buffer keeping at most `capacity` events (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Add `event` at the tail, evicting from the head past capacity.
    pub async fn append(&self, event: ChatEvent) {
        let mut events = self.events.write().await;
        events.push_back(event);
        while events.len() > self.capacity {
            events.pop_front();
        }
    }

    /// The last `limit` events in chronological order.
    pub async fn recent(&self, limit: usize) -> Vec<ChatEvent> {
        let events = self.events.read().await;
        let skip = events.len().saturating_sub(limit);
        events.iter().skip(skip).cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::dto::ChatEventKind;
    use std::sync::Arc;

    fn event(n: usize) -> ChatEvent {
        ChatEvent::new(
            format!("evt-{n}"),
            "tester".to_string(),
            format!("message {n}"),
            ChatEventKind::User,
        )
    }

    fn ids(events: &[ChatEvent]) -> Vec<String> {
        events.iter().map(|e| e.id.clone()).collect()
    }

    #[tokio::test]
    async fn test_recent_on_empty_buffer() {
        let history = HistoryBuffer::new(5);
        assert!(history.recent(10).await.is_empty());
        assert!(history.is_empty().await);
    }

    #[tokio::test]
    async fn test_never_exceeds_capacity() {
        let history = HistoryBuffer::new(3);
        for n in 0..10 {
            history.append(event(n)).await;
            assert!(history.len().await <= 3);
        }
        assert_eq!(ids(&history.recent(3).await), vec!["evt-7", "evt-8", "evt-9"]);
    }

    #[tokio::test]
    async fn test_recent_returns_tail_in_order() {
        let history = HistoryBuffer::new(50);
        for n in 0..60 {
            history.append(event(n)).await;
        }
        let last_two = history.recent(2).await;
        assert_eq!(ids(&last_two), vec!["evt-58", "evt-59"]);

        let all = history.recent(100).await;
        assert_eq!(all.len(), 50);
        assert_eq!(all.first().unwrap().id, "evt-10");
        assert_eq!(all.last().unwrap().id, "evt-59");
    }

    #[tokio::test]
    async fn test_zero_capacity_is_clamped() {
        let history = HistoryBuffer::new(0);
        assert_eq!(history.capacity(), 1);
        history.append(event(1)).await;
        history.append(event(2)).await;
        assert_eq!(ids(&history.recent(5).await), vec!["evt-2"]);
    }

    #[tokio::test]
    async fn test_concurrent_appends_lose_nothing() {
        let history = Arc::new(HistoryBuffer::new(1_000));
        let mut tasks = Vec::new();
        for n in 0..200 {
            let history = Arc::clone(&history);
            tasks.push(tokio::spawn(async move { history.append(event(n)).await }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let events = history.recent(1_000).await;
        assert_eq!(events.len(), 200);
        let mut seen = ids(&events);
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 200);
    }
}
