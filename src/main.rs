//! FrameKV - A Minimal Networked Key-Value Store
//!
//! This is the main entry point for the FrameKV server.
//! It parses flags, sets up logging and the storage engine, starts the
//! server and waits for a shutdown signal.

use anyhow::Context;
use clap::Parser;
use framekv::{Config, Server, StorageEngine};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

/// FrameKV server
#[derive(Parser, Debug)]
#[command(name = "framekv")]
#[command(about = "A minimal in-memory key-value server")]
#[command(version)]
struct Args {
    /// Host to bind to
    #[arg(short = 'H', long, env = "FRAMEKV_HOST", default_value = framekv::DEFAULT_HOST)]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "FRAMEKV_PORT", default_value_t = framekv::DEFAULT_PORT)]
    port: u16,

    /// Per-connection read buffer in bytes; a message must fit in one read
    #[arg(long, env = "FRAMEKV_BUFFER_SIZE", default_value_t = framekv::config::DEFAULT_BUFFER_SIZE)]
    buffer_size: usize,

    /// Seconds to wait for connections to drain on shutdown
    #[arg(long, env = "FRAMEKV_SHUTDOWN_TIMEOUT_SECS", default_value_t = 5)]
    shutdown_timeout_secs: u64,

    /// Give up accepting after this many consecutive temporary errors
    #[arg(long, env = "FRAMEKV_MAX_ACCEPT_RETRIES")]
    max_accept_retries: Option<u32>,
}

impl Args {
    fn into_config(self) -> Config {
        Config::new()
            .with_host(self.host)
            .with_port(self.port)
            .with_buffer_size(self.buffer_size)
            .with_max_accept_retries(self.max_accept_retries)
            .with_shutdown_timeout(Duration::from_secs(self.shutdown_timeout_secs))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Set up logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let config = args.into_config();
    info!(
        version = framekv::VERSION,
        bind = %config.bind_address(),
        buffer_size = config.buffer_size,
        "Starting FrameKV"
    );

    // Create the storage engine (shared across all connections)
    let storage = Arc::new(StorageEngine::new());

    let mut server = Server::new(config.clone(), storage);
    let addr = server
        .start()
        .await
        .context("failed to start server")?;
    info!("Listening on {}", addr);

    shutdown_signal().await?;
    info!("Shutdown signal received, stopping server...");

    if let Err(e) = server.shutdown(config.shutdown_timeout).await {
        error!(error = %e, "Error during server shutdown");
    }

    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm =
            signal(SignalKind::terminate()).context("failed to install SIGTERM handler")?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res.context("failed to install Ctrl+C handler")?,
            _ = sigterm.recv() => {}
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c()
        .await
        .context("failed to install Ctrl+C handler")?;

    Ok(())
}
