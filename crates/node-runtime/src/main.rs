//! # Token Node
//!
//! Runs the token model behind the HTTP digest API.
//!
//! ```text
//! POST /operation ──▶ OperationPool ──(interval)──▶ TokenService ──▶ state
//!                                                        │
//! GET /token/... ◀──────────── TokenDigest ◀─────────────┘
//! ```
//!
//! Logging honours `RUST_LOG` (default `info`).

use anyhow::{Context, Result};
use node_runtime::{NodeConfig, NodeRuntime};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")?;

    let config = NodeConfig::from_env().context("Failed to load configuration")?;
    info!(
        api = %config.api.http_addr(),
        block_interval_ms = config.block.interval_ms,
        "Starting token node"
    );

    let runtime = NodeRuntime::new(config).context("Failed to initialize node")?;

    info!("Node is running. Press Ctrl+C to stop.");
    runtime
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for Ctrl+C");
            }
        })
        .await
        .context("Node stopped with an error")?;

    info!("Shutdown complete");
    Ok(())
}
