//! # Shared Data Transfer Objects Library
//!
//! This library defines the contract between chat clients and the relay.
//! All DTOs use JSON serialization via `serde`.
//!
//! ## Structure
//!
//! - **[`dto`]**: Data Transfer Objects
//!   - **[`dto::messaging`]**: Websocket frames and chat stream entries
//!   - **[`dto::system`]**: Health and model catalog responses
//!
//! ## Usage
//!
//! ```rust
//! use shared::dto::{ClientEvent, MessageRequest};
//!
//! let frame = serde_json::to_string(&ClientEvent::Message(MessageRequest {
//!     content: "hi all".to_string(),
//! }))
//! .unwrap();
//! assert_eq!(frame, r#"{"event":"message","data":{"content":"hi all"}}"#);
//! ```

pub mod dto;

// Note: Wildcard re-exports are used here since shared is a DTO library
// where all exports are meant to be public API
pub use dto::*;
