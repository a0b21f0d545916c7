//! # Web Library
//!
//! The chat relay service: websocket sessions, the in-memory relay behind
//! them, HTTP query handlers, middleware, and server bootstrap.

pub mod chat;
pub mod handlers;
pub mod middleware;
pub mod server;

pub use server::{create_router, start_server, ServerConfig};
