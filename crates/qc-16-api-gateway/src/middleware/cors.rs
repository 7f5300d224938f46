//! CORS middleware.
//!
//! Wrapper around tower-http CORS with gateway configuration.

use crate::domain::config::CorsConfig;
use axum::http::{HeaderName, Method};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer as TowerCorsLayer};

/// Create CORS layer from gateway config
pub fn create_cors_layer(config: &CorsConfig) -> TowerCorsLayer {
    if !config.enabled {
        return TowerCorsLayer::very_permissive();
    }

    let mut cors = TowerCorsLayer::new();

    if config.allowed_origins.iter().any(|o| o == "*") {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<_> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    let methods: Vec<Method> = config
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();
    cors = cors.allow_methods(methods);

    if config.allowed_headers.iter().any(|h| h == "*") {
        cors = cors.allow_headers(Any);
    } else {
        cors = cors.allow_headers(parse_headers(&config.allowed_headers));
    }

    if !config.expose_headers.is_empty() {
        cors = cors.expose_headers(parse_headers(&config.expose_headers));
    }

    cors = cors.max_age(Duration::from_secs(config.max_age));

    // tower-http panics on credentials combined with a wildcard origin
    if config.allow_credentials && !config.allowed_origins.iter().any(|o| o == "*") {
        cors = cors.allow_credentials(true);
    }

    cors
}

fn parse_headers(names: &[String]) -> Vec<HeaderName> {
    names.iter().filter_map(|h| h.parse().ok()).collect()
}
