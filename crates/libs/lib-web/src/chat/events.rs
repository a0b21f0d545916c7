//! # Chat Event Construction
//!
//! Connection identities, event ids and the reserved author labels.

use lib_utils::{now_utc, unix_millis};
use shared::dto::{ChatEvent, ChatEventKind, Participant};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Author label for gateway failures.
pub const SYSTEM_AUTHOR: &str = "⚠️ System";
/// Prefix of the author label for generated replies.
pub const LLM_AUTHOR_PREFIX: &str = "🤖";
/// Prefix of every failure reason shown in the chat stream.
pub const LLM_ERROR_PREFIX: &str = "Error: Unable to get response from LLM.";

static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Identity of one websocket connection, assigned at upgrade time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// `<unix-millis>_<origin>_<seq>`; the sequence keeps ids unique within a millisecond.
fn event_id(origin: &str) -> String {
    let seq = EVENT_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{}_{}_{}", unix_millis(now_utc()), origin, seq)
}

/// A message typed by a participant.
pub fn user_event(author: &Participant, content: impl Into<String>) -> ChatEvent {
    ChatEvent::new(
        event_id(&author.id),
        author.username.clone(),
        content.into(),
        ChatEventKind::User,
    )
}

/// A reply produced by `model`.
pub fn llm_event(model: &str, content: impl Into<String>) -> ChatEvent {
    ChatEvent::new(
        event_id("llm"),
        format!("{LLM_AUTHOR_PREFIX} {model}"),
        content.into(),
        ChatEventKind::Llm,
    )
}

/// A visible, non-fatal failure notice.
pub fn error_event(reason: impl fmt::Display) -> ChatEvent {
    ChatEvent::new(
        event_id("error"),
        SYSTEM_AUTHOR.to_string(),
        format!("{LLM_ERROR_PREFIX} {reason}"),
        ChatEventKind::Error,
    )
}
