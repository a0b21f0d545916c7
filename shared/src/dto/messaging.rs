//! # Messaging Data Transfer Objects
//!
//! Wire types for the chat relay websocket. Every frame is a JSON object of
//! the form `{"event": <name>, "data": <payload>}`; field names inside the
//! payloads follow the browser/desktop clients (`username`, `joinedAt`,
//! `type`, `isTyping`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A connected chat identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Participant {
    /// Connection id, stable for the lifetime of the socket
    pub id: String,
    pub username: String,
    #[serde(rename = "joinedAt")]
    pub joined_at: DateTime<Utc>,
}

/// Origin of a [`ChatEvent`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ChatEventKind {
    User,
    Llm,
    Error,
}

/// One immutable entry of the shared chat stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatEvent {
    pub id: String,
    /// Display label: participant name, or a reserved model/system label
    #[serde(rename = "username")]
    pub author: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: ChatEventKind,
}

impl ChatEvent {
    /// Create an event stamped with the current time.
    pub fn new(id: String, author: String, content: String, kind: ChatEventKind) -> Self {
        Self {
            id,
            author,
            content,
            timestamp: Utc::now(),
            kind,
        }
    }
}

/// Presence change announced to the other participants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PresenceNotice {
    pub username: String,
    pub timestamp: DateTime<Utc>,
}

impl PresenceNotice {
    pub fn now(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Transient "the model is writing" signal. Never stored in history.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypingStatus {
    #[serde(rename = "isTyping")]
    pub is_typing: bool,
}

/// Payload of a `join` frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct JoinRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Payload of a `message` frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageRequest {
    pub content: String,
}

/// Payload of an `llm_message` frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LlmMessageRequest {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Frames sent by a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    Join(JoinRequest),
    Message(MessageRequest),
    LlmMessage(LlmMessageRequest),
    Disconnect,
}

/// Frames sent by the relay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    UserInfo(Participant),
    UserJoined(PresenceNotice),
    UserLeft(PresenceNotice),
    UsersUpdate(Vec<Participant>),
    ChatHistory(Vec<ChatEvent>),
    Message(ChatEvent),
    LlmTyping(TypingStatus),
}

impl ServerEvent {
    /// Wire name of the event, handy for log fields.
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::UserInfo(_) => "user_info",
            ServerEvent::UserJoined(_) => "user_joined",
            ServerEvent::UserLeft(_) => "user_left",
            ServerEvent::UsersUpdate(_) => "users_update",
            ServerEvent::ChatHistory(_) => "chat_history",
            ServerEvent::Message(_) => "message",
            ServerEvent::LlmTyping(_) => "llm_typing",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_join_frame() {
        let frame = json!({ "event": "join", "data": { "username": "alice" } });
        let event: ClientEvent = serde_json::from_value(frame).unwrap();
        assert_eq!(
            event,
            ClientEvent::Join(JoinRequest { username: Some("alice".to_string()) })
        );
    }

    #[test]
    fn test_client_join_without_username() {
        let frame = json!({ "event": "join", "data": {} });
        let event: ClientEvent = serde_json::from_value(frame).unwrap();
        assert_eq!(event, ClientEvent::Join(JoinRequest::default()));
    }

    #[test]
    fn test_client_llm_message_model_optional() {
        let frame = json!({ "event": "llm_message", "data": { "content": "hi" } });
        let event: ClientEvent = serde_json::from_value(frame).unwrap();
        assert_eq!(
            event,
            ClientEvent::LlmMessage(LlmMessageRequest { content: "hi".to_string(), model: None })
        );
    }

    #[test]
    fn test_client_disconnect_without_data() {
        let event: ClientEvent = serde_json::from_str(r#"{"event":"disconnect"}"#).unwrap();
        assert_eq!(event, ClientEvent::Disconnect);
    }

    #[test]
    fn test_unknown_event_is_rejected() {
        let result = serde_json::from_str::<ClientEvent>(r#"{"event":"edit","data":{}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_chat_event_uses_client_field_names() {
        let event = ChatEvent {
            id: "1_llm".to_string(),
            author: "🤖 mistral".to_string(),
            content: "hello".to_string(),
            timestamp: Utc::now(),
            kind: ChatEventKind::Llm,
        };
        let value = serde_json::to_value(ServerEvent::Message(event)).unwrap();
        assert_eq!(value["event"], "message");
        assert_eq!(value["data"]["username"], "🤖 mistral");
        assert_eq!(value["data"]["type"], "llm");
    }

    #[test]
    fn test_typing_and_participant_field_names() {
        let typing = serde_json::to_value(ServerEvent::LlmTyping(TypingStatus { is_typing: true })).unwrap();
        assert_eq!(typing, json!({ "event": "llm_typing", "data": { "isTyping": true } }));

        let participant = Participant {
            id: "abc".to_string(),
            username: "bob".to_string(),
            joined_at: Utc::now(),
        };
        let value = serde_json::to_value(&participant).unwrap();
        assert!(value.get("joinedAt").is_some());
    }
}
