//! Mock Telemetry API server.
//!
//! Serves six read-only endpoints with randomly generated, schema-shaped
//! payloads. Stateless by design: nothing is remembered across requests.

use anyhow::{Context, Result};
use axum::middleware;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use telemetry_mock_backend::{
    api::{create_router, AppState},
    middleware::request_logging,
    models::Config,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();
    init_tracing();

    info!("🚀 Mock Telemetry API starting");

    let state = AppState::new();
    let app = create_router(state)
        .layer(middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive());

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Initialize tracing with env-filter overrides
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "telemetry_mock_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
