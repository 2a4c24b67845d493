//! Portal Server - Main entry point

use std::time::Duration;

use anyhow::Result;
use portal_common::logging::{init_logging, LogConfig};
use tokio::signal;
use tokio::sync::oneshot;
use tracing::{info, warn};

use portal_server::{api, config::Config};

#[tokio::main]
async fn main() -> Result<()> {
    let log_config = LogConfig::builder()
        .log_file_prefix("portal-server")
        .filter_directives("portal_server=debug,tower_http=debug,sqlx=warn")
        .build();

    // Environment variables take precedence
    let log_config = LogConfig::from_env_with(log_config)?;

    let _logging = init_logging(&log_config)?;

    info!("Starting Portal Server");

    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    let state = api::build_state(&config).await?;

    let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
    let shutdown = async move {
        shutdown_signal().await;
        let _ = signalled_tx.send(());
    };

    // Bulk jobs hold their request open until every batch is sent, so the
    // drain after a signal is bounded by PORTAL_SHUTDOWN_TIMEOUT.
    let drain_timeout = Duration::from_secs(config.server.shutdown_timeout_secs);
    let deadline = async move {
        if signalled_rx.await.is_ok() {
            info!("Waiting up to {:?} for in-flight requests", drain_timeout);
            tokio::time::sleep(drain_timeout).await;
        } else {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = api::serve(&config, state, shutdown) => result?,
        _ = deadline => warn!("Shutdown timeout elapsed, abandoning in-flight requests"),
    }

    info!("Server shut down gracefully");

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }
}
