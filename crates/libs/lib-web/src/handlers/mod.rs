//! # HTTP Request Handlers
//!
//! Axum handlers for the relay, organized by surface.
//!
//! ## Handler Modules
//!
//! - **[`websocket`]**: the chat transport
//!   - `GET /ws` - WebSocket upgrade, one session per connection
//!
//! - **[`chat`]**: read-only views of the relay
//!   - `GET /api/history` - Recent chat events
//!   - `GET /api/users` - Current participants
//!   - `GET /api/models` - Advertised models
//!
//! - **[`health`]**: liveness
//!   - `GET /health`
//!
//! All handlers take `State<Arc<ChatAppState>>`. None of them require
//! authentication.

pub mod chat;
pub mod health;
pub mod websocket;

#[cfg(test)]
mod tests;
