//! # Data Transfer Objects (DTOs)
//!
//! All data structures exchanged between chat clients and the relay.
//!
//! ## Module Organization
//!
//! - [`messaging`] - Websocket frames, chat events, participants, typing signal
//! - [`system`] - Health, model catalog and error bodies for the HTTP endpoints
//!
//! ## Serialization Format
//!
//! - **Frames**: adjacently tagged, `{"event": "<snake_case name>", "data": {...}}`
//! - **Field naming**: snake_case, except where the clients expect
//!   camelCase (`joinedAt`, `isTyping`) or a different label (`username`, `type`)
//! - **Timestamps**: RFC 3339 strings (chrono `serde` feature)
//!
//! ## Example Frames
//!
//! ```text
//! -> {"event":"join","data":{"username":"alice"}}
//! <- {"event":"user_info","data":{"id":"7f0c...","username":"alice","joinedAt":"2024-01-01T00:00:00Z"}}
//! -> {"event":"llm_message","data":{"content":"hello","model":"mistral"}}
//! <- {"event":"llm_typing","data":{"isTyping":true}}
//! ```

pub mod messaging;
pub mod system;

pub use messaging::*;
pub use system::*;
