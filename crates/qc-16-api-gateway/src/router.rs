//! Router assembly.
//!
//! Digest routes come from the route descriptors registered by model modules;
//! the operation and health routes belong to the gateway itself.

use axum::routing::{get, post, MethodRouter};
use axum::Router;
use qc_18_token_model::codec::HinterRegistry;
use qc_18_token_model::module::ApiRoute;
use qc_18_token_model::ports::TokenQueryApi;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::domain::config::GatewayConfig;
use crate::handlers;
use crate::middleware::create_cors_layer;
use crate::ports::OperationSubmitter;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub query: Arc<dyn TokenQueryApi>,
    pub submitter: Arc<dyn OperationSubmitter>,
    pub hinters: Arc<HinterRegistry>,
}

fn module_route(route: &ApiRoute) -> Option<MethodRouter<AppState>> {
    match (route.method, route.name) {
        ("GET", "token") => Some(get(handlers::token)),
        ("GET", "token-balance") => Some(get(handlers::token_balance)),
        _ => None,
    }
}

/// Builds the HTTP router with the gateway middleware stack.
pub fn build_router(state: AppState, routes: &[ApiRoute], config: &GatewayConfig) -> Router {
    let mut router = Router::new()
        .route("/operation", post(handlers::submit_operation))
        .route("/health", get(handlers::health));

    for route in routes {
        match module_route(route) {
            Some(handler) => {
                debug!(path = route.path, name = route.name, "mounting module route");
                router = router.route(route.path, handler);
            }
            None => warn!(path = route.path, name = route.name, "no handler for module route"),
        }
    }

    router.with_state(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(RequestBodyLimitLayer::new(config.limits.max_request_size))
            .layer(TimeoutLayer::new(config.request_timeout()))
            .layer(create_cors_layer(&config.cors)),
    )
}
