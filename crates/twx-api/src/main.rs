//! # twx-api: Binary Entry Point
//!
//! Validates the built-in workflows, then starts the Axum HTTP server.
//! Binds to `PORT` (default 8080).

use twx_api::state::{AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Refuse to serve a catalog that offers actions the table forbids.
    twx_state::validate_builtin_workflows().map_err(|e| {
        tracing::error!(error = %e, "workflow consistency check failed");
        e
    })?;

    let config = AppConfig::from_env();
    if config.auth_token.is_none() {
        tracing::warn!(
            "AUTH_TOKEN not set: authentication disabled, all callers are SUPER_ADMIN \
             and host-only transitions (e.g. submitting a draft listing) are unavailable"
        );
    }
    tracing::info!(?config, "configuration loaded");

    let port = config.port;
    let app = twx_api::app(AppState::with_config(config));

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("TWX API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
