//! driftlog Server
//!
//! Entry point for the driftlog commit-log service: opens the log, serves
//! the HTTP API, and closes the log cleanly on shutdown so store buffers
//! flush and index files shrink to their populated length.
//!
//! ## Configuration
//! All configuration is done via environment variables:
//!
//! - `DRIFTLOG_ADDR`: bind address (default: 0.0.0.0:8080)
//! - `DRIFTLOG_DIR`: log directory (default: ./data/log)
//! - `DRIFTLOG_MAX_STORE_BYTES`: segment store cap (default: 64 MiB)
//! - `DRIFTLOG_MAX_INDEX_BYTES`: segment index cap (default: 10 MiB)
//!
//! ## Logging
//! Controlled via `RUST_LOG`:
//! ```bash
//! RUST_LOG=debug cargo run -p driftlog-server
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use driftlog_storage::{Log, LogConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let bind_addr: SocketAddr = std::env::var("DRIFTLOG_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        .parse()?;
    let dir = std::env::var("DRIFTLOG_DIR").unwrap_or_else(|_| "./data/log".to_string());

    let config = LogConfig {
        max_store_bytes: env_u64("DRIFTLOG_MAX_STORE_BYTES", 64 * 1024 * 1024)?,
        max_index_bytes: env_u64("DRIFTLOG_MAX_INDEX_BYTES", 10 * 1024 * 1024)?,
        initial_offset: 0,
    };

    tracing::info!(dir, "opening log");
    let log = Arc::new(Log::open(&dir, config)?);

    let app = driftlog_server::router(Arc::clone(&log));
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("driftlog server listening on {bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("flushing log before exit");
    log.close()?;
    tracing::info!("driftlog server shut down gracefully");

    Ok(())
}

fn env_u64(name: &str, default: u64) -> Result<u64, std::num::ParseIntError> {
    match std::env::var(name) {
        Ok(value) => value.parse(),
        Err(_) => Ok(default),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received SIGINT, initiating shutdown"),
        _ = terminate => tracing::info!("received SIGTERM, initiating shutdown"),
    }
}
