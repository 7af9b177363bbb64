use anyhow::{Context, Result};
use axum::http::HeaderName;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use unified_errors::api::handlers::AppStateInner;
use unified_errors::api::routes::create_router;
use unified_errors::config::Config;
use unified_errors::errors::Normalizer;
use unified_errors::metrics;

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    info!("Starting graceful shutdown...");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,unified_errors=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting unified-errors demo v{}", env!("CARGO_PKG_VERSION"));

    metrics::registry::init_metrics();

    let config = Config::from_env().context("Failed to load configuration")?;
    info!("Configuration loaded successfully");

    let request_id_header = HeaderName::from_bytes(config.errors.request_id_header.as_bytes())
        .context("REQUEST_ID_HEADER must be a valid header name")?;

    let normalizer = if config.errors.log_unexpected_errors {
        Normalizer::tracing()
    } else {
        Normalizer::default()
    };

    let state = Arc::new(
        AppStateInner::seeded(normalizer, request_id_header)
            .context("Failed to register error kinds")?,
    );
    info!("Registered {} custom error kinds", state.kinds.len());

    let app = create_router(state);

    let addr = config.server_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind server")?;

    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");

    Ok(())
}
