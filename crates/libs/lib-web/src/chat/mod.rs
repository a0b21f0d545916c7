//! # Chat Module
//!
//! The real-time relay: presence, bounded history, fan-out to connected
//! sockets, and the LLM participant.
//!
//! Clients talk to it over the `/ws` websocket using named JSON events; see
//! [`shared::dto::ClientEvent`] and [`shared::dto::ServerEvent`].

pub mod events;
pub mod gateway;
pub mod history;
pub mod hub;
pub mod ollama;
pub mod presence;
pub mod relay;
pub mod session;
pub mod state;

pub use events::ConnectionId;
pub use gateway::{CompletionGateway, GatewayError, GatewaySettings, GenerateRequest, InferenceClient};
pub use history::HistoryBuffer;
pub use hub::BroadcastHub;
pub use ollama::OllamaClient;
pub use presence::PresenceRegistry;
pub use relay::ChatRelay;
pub use session::{Session, SessionFlow, SessionState};
pub use state::ChatAppState;
