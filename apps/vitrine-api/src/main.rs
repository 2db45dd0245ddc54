//! vitrine API server.

use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

use vitrine_api::build_router;
use vitrine_api::config::VitrineConfig;
use vitrine_api::logging::init_logging;
use vitrine_api::state::AppState;
use vitrine_catalog::CourseService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();

    let config = VitrineConfig::load().context("Failed to load configuration")?;

    init_logging(&config.logging);

    info!(
        config_path = %VitrineConfig::config_path(),
        upstream = %config.upstream.base_url,
        "Starting vitrine API"
    );

    if config.cors.allowed_origins.is_empty() {
        warn!("No allowed origins configured, accepting requests from any origin");
    } else {
        info!(origins = ?config.cors.allowed_origins, "Origin allow-list active");
    }

    let service = CourseService::from_settings(&config.catalog_settings())
        .context("Failed to build course service")?;
    let state = AppState::new(Arc::new(service), config.institution_policy());

    let app = build_router(state, &config.cors);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(addr = %addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        },
    }
}
