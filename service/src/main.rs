//! Content Service HTTP server.

use anyhow::Context as _;
use content_runtime::{telemetry, CollectorSink};
use content_service::{
    config::Config,
    repository::InMemoryContentStore,
    server::{build_router, AppState},
    DEFAULT_LOG_FILTER,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let config = Config::from_env().context("Failed to load configuration")?;

    let sink = CollectorSink::new(config.sink.clone())
        .context("Failed to build log collector sink")?;
    let collector_enabled = sink.is_enabled();
    telemetry::init(DEFAULT_LOG_FILTER, sink).context("Failed to initialize tracing")?;

    info!("Starting Content Service");
    if !collector_enabled {
        warn!(
            "Log collector not fully configured (LOGGING_SERVICE_URL, LOGGING_SERVICE_API_PATH, \
             LOGGING_SERVICE_TIMEOUT, SERVICE_NAME); remote log delivery disabled"
        );
    }
    info!(
        default_page_size = config.pagination.default_limit(),
        max_page_size = config.pagination.max_limit(),
        request_timeout_secs = config.server.request_timeout.as_secs(),
        "Configuration loaded"
    );

    let mut state = AppState::new(
        Arc::new(InMemoryContentStore::seeded()),
        config.pagination,
    );
    if let Some(base_url) = config.assets_base_url.as_deref() {
        state = state.with_assets_base_url(base_url);
    }

    let app = build_router(state, config.server.request_timeout);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(address = %addr, "Content Service started");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Content Service stopped");
    Ok(())
}

/// Graceful shutdown signal handler.
///
/// Waits for:
/// - Ctrl+C (SIGINT)
/// - SIGTERM (in production environments)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
