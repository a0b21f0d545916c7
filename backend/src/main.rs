//! # Backend Service
//!
//! Thin entry point that delegates to lib-web for server setup.
//!
//! Configuration comes from the environment (and `.env`); see
//! `lib_core::Config`. `ALLOWED_ORIGINS` optionally restricts CORS to a
//! comma-separated list of origins.

use lib_web::{start_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let allowed_origins = std::env::var("ALLOWED_ORIGINS")
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let config = ServerConfig {
        allowed_origins,
        ..Default::default()
    };

    start_server(config).await
}
