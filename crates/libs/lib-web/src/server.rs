//! # Server Setup
//!
//! Server initialization, route registration, and HTTP server startup.
//!
//! This module provides the main server setup function that creates the Axum router,
//! registers all routes, applies middleware, and serves until Ctrl-C or SIGTERM.

// region: --- Imports
use crate::chat::ChatAppState;
use crate::handlers;
use crate::middleware::{log_requests, stamp_req, RequestStamp};
use axum::http::{HeaderValue, Method, Request, Response};
use axum::{routing::get, Router};
use lib_core::{AppError, Config};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::classify::ServerErrorsFailureClass;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn, Span};
// endregion: --- Imports

// region: --- Server Configuration
/// Server configuration
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:3001"); `BIND_HOST`/`PORT` when unset
    pub bind_address: Option<String>,
    /// Allowed CORS origins; empty allows any origin
    pub allowed_origins: Vec<String>,
}
// endregion: --- Server Configuration

// region: --- Server Setup
/// Initialize and start the HTTP server
///
/// # Errors
///
/// This function will return an error if:
/// - The tracing subscriber cannot be installed
/// - Configuration loading or validation fails
/// - The HTTP client for the inference service cannot be built
/// - Server binding fails
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    let log_level = init_tracing()?;

    info!(" CHAT RELAY STARTING");
    info!(" Log level: {}", log_level);

    info!("Loading configuration...");
    let app_config = Config::load().map_err(|e| anyhow::anyhow!(e))?;
    let bind_address = config
        .bind_address
        .clone()
        .unwrap_or_else(|| app_config.bind_address());

    info!(
        ollama_url = %app_config.ollama_url,
        default_model = %app_config.default_model,
        timeout_secs = app_config.llm_timeout_secs,
        history_capacity = app_config.history_capacity,
        "[LLM] inference service configured"
    );

    let chat_state = Arc::new(ChatAppState::with_ollama(app_config)?);
    let app = create_router(chat_state, &config.allowed_origins);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    info!(" SERVER READY: http://{}", bind_address);
    log_server_info();

    // ConnectInfo is needed by the websocket handler for the peer address
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!(" Server stopped");
    Ok(())
}

/// Install the global subscriber, filtered by `LOG_LEVEL`.
fn init_tracing() -> anyhow::Result<String> {
    let log_level = std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase();

    let filter = match log_level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {
            tracing_subscriber::EnvFilter::new(&log_level)
        }
        _ => tracing_subscriber::EnvFilter::new("info"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set global tracing subscriber: {}", e))?;

    Ok(log_level)
}

/// Build the application router around `chat_state`.
pub fn create_router(chat_state: Arc<ChatAppState>, allowed_origins: &[String]) -> Router {
    let cors = CorsLayer::new().allow_methods([Method::GET, Method::POST]);
    let cors = if allowed_origins.is_empty() {
        cors.allow_origin(Any).allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        cors.allow_origin(origins)
            .allow_headers([axum::http::header::CONTENT_TYPE])
    };

    info!("[ROUTE SETUP] Registering HTTP routes...");
    Router::new()
        .route("/ws", get(handlers::websocket::chat_websocket))
        .route("/api/history", get(handlers::chat::get_history))
        .route("/api/users", get(handlers::chat::get_users))
        .route("/api/models", get(handlers::chat::get_models))
        .route("/health", get(handlers::health::health))
        .fallback(|| async {
            info!("[404 HANDLER] Unmatched route - returning 404");
            AppError::NotFound("Route not found".to_string())
        })
        .with_state(chat_state)
        // Last layer runs first: stamping wraps tracing and logging so both see the id
        .layer(axum::middleware::from_fn(log_requests))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let request_id = request
                        .extensions()
                        .get::<RequestStamp>()
                        .map(|s| s.id.clone())
                        .unwrap_or_else(|| "unknown".to_string());
                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        uri = %request.uri(),
                        version = ?request.version(),
                    )
                })
                .on_response(|_response: &Response<_>, _latency: Duration, _span: &Span| {
                    // logged by log_requests
                })
                .on_failure(
                    |failure: ServerErrorsFailureClass, latency: Duration, _span: &Span| {
                        error!(
                            error = ?failure,
                            latency_ms = latency.as_millis() as u64,
                            "[HTTP FAILURE] {:?}",
                            failure
                        );
                    },
                ),
        )
        .layer(axum::middleware::from_fn(stamp_req))
        .layer(cors)
}

/// Resolve on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!(" Shutdown signal received, draining connections");
}

/// Log server information
fn log_server_info() {
    info!(" CHAT:");
    info!("   • GET  /ws            (websocket: join, message, llm_message)");
    info!("   • GET  /api/history");
    info!("   • GET  /api/users");
    info!("   • GET  /api/models");
    info!(" HEALTH:");
    info!("   • GET  /health");
}
// endregion: --- Server Setup
