//! API Gateway error types.
//!
//! HTTP failures are answered with an RFC 7807 problem document:
//!
//! ```json
//! { "type": "...", "title": "Not Found", "status": 404, "detail": "..." }
//! ```

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use qc_18_token_model::digest::DigestError;
use serde::Serialize;
use std::io;
use thiserror::Error;

use super::config::ConfigError;
use crate::ports::SubmitError;

/// Problem type URIs
pub mod problem_types {
    pub const BAD_REQUEST: &str = "https://quantum-chain/problems/bad-request";
    pub const NOT_FOUND: &str = "https://quantum-chain/problems/not-found";
    pub const CONFLICT: &str = "https://quantum-chain/problems/conflict";
    pub const UNAVAILABLE: &str = "https://quantum-chain/problems/unavailable";
    pub const INTERNAL: &str = "https://quantum-chain/problems/internal";
}

/// Error answered to an HTTP client
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiError {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: String,
    #[serde(serialize_with = "serialize_status")]
    pub status: StatusCode,
    pub detail: String,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_status<S: serde::Serializer>(status: &StatusCode, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u16(status.as_u16())
}

impl ApiError {
    pub fn new(kind: &'static str, status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            kind,
            title: status.canonical_reason().unwrap_or("Error").to_string(),
            status,
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(problem_types::BAD_REQUEST, StatusCode::BAD_REQUEST, detail)
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(problem_types::NOT_FOUND, StatusCode::NOT_FOUND, detail)
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(
            problem_types::INTERNAL,
            StatusCode::INTERNAL_SERVER_ERROR,
            detail,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::to_vec(&self).unwrap_or_default();
        (
            self.status,
            [(header::CONTENT_TYPE, "application/problem+json")],
            body,
        )
            .into_response()
    }
}

impl From<DigestError> for ApiError {
    fn from(err: DigestError) -> Self {
        match err {
            DigestError::NotFound(_) => Self::not_found(err.to_string()),
            DigestError::InvalidKey(_) | DigestError::UnexpectedValue(_) => {
                Self::internal(err.to_string())
            }
        }
    }
}

impl From<SubmitError> for ApiError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Duplicate(_) => {
                Self::new(problem_types::CONFLICT, StatusCode::CONFLICT, err.to_string())
            }
            SubmitError::PoolFull { .. } | SubmitError::Closed => Self::new(
                problem_types::UNAVAILABLE,
                StatusCode::SERVICE_UNAVAILABLE,
                err.to_string(),
            ),
        }
    }
}

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Gateway lifecycle errors
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_body() {
        let err = ApiError::not_found("token design of contract account 0x01 not found");
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["status"], 404);
        assert_eq!(json["title"], "Not Found");
        assert_eq!(json["type"], problem_types::NOT_FOUND);
    }

    #[test]
    fn test_submit_error_status() {
        assert_eq!(ApiError::from(SubmitError::Closed).status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            ApiError::from(SubmitError::Duplicate(shared_types::Hash::ZERO)).status,
            StatusCode::CONFLICT
        );
    }
}
