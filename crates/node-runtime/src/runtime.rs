//! # Node Runtime
//!
//! Block loop plus API gateway, stopped together by one shutdown signal.
//!
//! ## Block Loop
//!
//! Every `block.interval_ms` the loop drains up to
//! `block.max_operations_per_block` operations from the pool and processes
//! them as the block at the next height. An empty pool produces no block.
//! A hard service error stops the node; rejected operations only show up in
//! the block report.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use qc_16_api_gateway::{ApiGatewayService, GatewayError};
use qc_18_token_model::errors::RegistryError;
use qc_18_token_model::service::{BlockReport, ServiceError};
use shared_types::Height;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::container::{ConfigError, NodeConfig, NodeContainer};
use crate::genesis::{GenesisConfig, GenesisError};

/// Node runtime errors.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Genesis(#[from] GenesisError),

    #[error("Module registration failed: {0}")]
    Registry(#[from] RegistryError),

    #[error("Block processing failed: {0}")]
    Service(#[from] ServiceError),

    #[error("API gateway failed: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Task failed: {0}")]
    Task(#[from] JoinError),
}

/// The node: container, current height and shutdown channel.
pub struct NodeRuntime {
    container: Arc<NodeContainer>,
    height: AtomicU64,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl NodeRuntime {
    /// Creates the node, seeding genesis from `config.genesis_file` if set.
    pub fn new(config: NodeConfig) -> Result<Self, RuntimeError> {
        let genesis = match &config.genesis_file {
            Some(path) => {
                info!(path = %path.display(), "loading genesis file");
                GenesisConfig::from_file(path)?
            }
            None => {
                warn!("no genesis file configured, starting from empty state");
                GenesisConfig::default()
            }
        };
        Self::with_genesis(config, &genesis)
    }

    pub fn with_genesis(config: NodeConfig, genesis: &GenesisConfig) -> Result<Self, RuntimeError> {
        let container = Arc::new(NodeContainer::new(config, genesis)?);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Ok(Self {
            container,
            height: AtomicU64::new(0),
            shutdown_tx,
            shutdown_rx,
        })
    }

    pub fn container(&self) -> Arc<NodeContainer> {
        Arc::clone(&self.container)
    }

    /// Height of the last produced block; 0 is genesis.
    pub fn height(&self) -> Height {
        self.height.load(Ordering::Acquire)
    }

    /// Processes the next block from the pool. `None` when the pool is empty.
    pub async fn produce_block(&self) -> Result<Option<BlockReport>, RuntimeError> {
        let max = self.container.config.block.max_operations_per_block;
        let operations = self.container.pool.drain(max);
        if operations.is_empty() {
            return Ok(None);
        }

        let height = self.height() + 1;
        let service = Arc::clone(&self.container.service);
        let report =
            tokio::task::spawn_blocking(move || service.process_block(height, operations)).await??;
        self.height.store(height, Ordering::Release);

        for rejected in &report.rejected {
            debug!(
                height,
                hash = %rejected.hash,
                kind = %rejected.kind,
                reason = %rejected.reason,
                "operation rejected"
            );
        }
        info!(
            height,
            accepted = report.accepted.len(),
            rejected = report.rejected.len(),
            states = report.states,
            "block processed"
        );
        Ok(Some(report))
    }

    /// Produces blocks on the configured interval until shutdown.
    pub async fn run_block_loop(&self) -> Result<(), RuntimeError> {
        let mut ticker = tokio::time::interval(self.container.config.block.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut shutdown = self.shutdown_rx.clone();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.produce_block().await {
                        error!(error = %e, height = self.height() + 1, "block processing aborted");
                        return Err(e);
                    }
                }
                _ = shutdown.changed() => {
                    info!(height = self.height(), "block loop stopped");
                    return Ok(());
                }
            }
        }
    }

    /// Serves the gateway on the configured address and runs the block loop
    /// until `signal` resolves.
    pub async fn run<F>(&self, signal: F) -> Result<(), RuntimeError>
    where
        F: Future<Output = ()>,
    {
        let gateway = self.gateway()?;
        let shutdown = self.shutdown_future();
        self.run_with(tokio::spawn(gateway.serve(shutdown)), signal).await
    }

    /// Like [`run`](Self::run) on an already bound listener.
    pub async fn run_on<F>(&self, listener: TcpListener, signal: F) -> Result<(), RuntimeError>
    where
        F: Future<Output = ()>,
    {
        let gateway = self.gateway()?;
        let shutdown = self.shutdown_future();
        self.run_with(tokio::spawn(gateway.serve_on(listener, shutdown)), signal)
            .await
    }

    /// Signals the block loop and the gateway to stop and closes the pool.
    pub fn shutdown(&self) {
        info!("Initiating graceful shutdown...");
        self.container.pool.close();
        self.shutdown_tx.send_replace(true);
    }

    fn gateway(&self) -> Result<ApiGatewayService, GatewayError> {
        ApiGatewayService::new(
            self.container.config.api.clone(),
            self.container.app_state(),
            &self.container.routes,
        )
    }

    fn shutdown_future(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.shutdown_rx.clone();
        async move {
            let _ = rx.wait_for(|stop| *stop).await;
        }
    }

    async fn run_with<F>(
        &self,
        mut api: JoinHandle<Result<(), GatewayError>>,
        signal: F,
    ) -> Result<(), RuntimeError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(signal);

        let outcome = tokio::select! {
            result = self.run_block_loop() => result,
            joined = &mut api => {
                self.shutdown();
                return flatten_gateway(joined);
            }
            () = &mut signal => {
                info!("Received shutdown signal");
                Ok(())
            }
        };

        self.shutdown();
        let served = flatten_gateway(api.await);

        let left = self.container.pool.len();
        if left > 0 {
            warn!(operations = left, "operations left in pool at shutdown");
        }
        outcome.and(served)
    }
}

fn flatten_gateway(
    joined: Result<Result<(), GatewayError>, JoinError>,
) -> Result<(), RuntimeError> {
    Ok(joined??)
}
