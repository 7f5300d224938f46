//! API Gateway service - main entry point.
//!
//! Binds the HTTP listener and serves the router until the shutdown future
//! resolves.

use axum::Router;
use qc_18_token_model::module::ApiRoute;
use std::future::Future;
use tokio::net::TcpListener;
use tracing::info;

use crate::domain::config::GatewayConfig;
use crate::domain::error::GatewayError;
use crate::router::{build_router, AppState};

/// API Gateway service state
pub struct ApiGatewayService {
    config: GatewayConfig,
    router: Router,
}

impl ApiGatewayService {
    /// Create a new API Gateway service
    pub fn new(
        config: GatewayConfig,
        state: AppState,
        routes: &[ApiRoute],
    ) -> Result<Self, GatewayError> {
        config.validate()?;
        let router = build_router(state, routes, &config);
        Ok(Self { config, router })
    }

    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Router with the full middleware stack, for embedding or tests.
    #[must_use]
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Binds the configured address and serves until `shutdown` resolves.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.http_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| GatewayError::Bind { addr, source })?;
        self.serve_on(listener, shutdown).await
    }

    /// Serves on an already bound listener.
    pub async fn serve_on<F>(self, listener: TcpListener, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!(addr = ?listener.local_addr().ok(), "Starting HTTP server");
        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;
        info!("API Gateway stopped");
        Ok(())
    }
}
