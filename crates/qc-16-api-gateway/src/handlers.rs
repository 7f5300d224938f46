//! Route handlers of the digest API.
//!
//! | Route | Success | Failure |
//! |-------|---------|---------|
//! | `GET /token/:contract` | 200 HAL design | 400 bad address, 404 no token |
//! | `GET /token/:contract/account/:address` | 200 HAL `{amount}` or empty HAL | 400 bad address |
//! | `POST /operation` | 202 HAL `{hash}` | 400 undecodable/invalid, 409 queued, 503 pool |
//! | `GET /health` | 200 | |

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};
use shared_types::Address;
use tracing::{debug, info, warn};

use crate::domain::error::{ApiError, ApiResult};
use crate::domain::hal::Hal;
use crate::router::AppState;

fn parse_address(label: &str, raw: &str) -> ApiResult<Address> {
    raw.parse()
        .map_err(|e| ApiError::bad_request(format!("invalid {label} address {raw}: {e}")))
}

/// `GET /token/:contract`
pub async fn token(
    State(state): State<AppState>,
    Path(contract): Path<String>,
) -> ApiResult<Hal> {
    let contract = parse_address("contract", &contract)?;
    let design = state.query.token(&contract).await?;

    Ok(Hal::new(&design, format!("/token/{contract}")))
}

/// `GET /token/:contract/account/:address`
pub async fn token_balance(
    State(state): State<AppState>,
    Path((contract, address)): Path<(String, String)>,
) -> ApiResult<Hal> {
    let contract = parse_address("contract", &contract)?;
    let address = parse_address("account", &address)?;

    let Some(amount) = state.query.token_balance(&contract, &address).await? else {
        debug!(%contract, %address, "no balance recorded");
        return Ok(Hal::empty());
    };

    Ok(Hal::new(
        json!({ "amount": amount.to_string() }),
        format!("/token/{contract}/account/{address}"),
    )
    .with_link("token", format!("/token/{contract}")))
}

/// `POST /operation`
pub async fn submit_operation(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let value: Value = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("request body is not JSON: {e}")))?;

    let operation = state
        .hinters
        .decode_operation(value)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    operation
        .is_valid()
        .map_err(|e| ApiError::bad_request(format!("invalid operation: {e}")))?;

    let hash = operation.hash();
    let kind = operation.kind();
    state.submitter.submit(operation).await.map_err(|e| {
        warn!(%hash, error = %e, "operation not queued");
        ApiError::from(e)
    })?;

    info!(%hash, %kind, "operation queued");
    Ok((
        StatusCode::ACCEPTED,
        Hal::new(json!({ "hash": hash.to_string() }), "/operation"),
    ))
}

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "api-gateway",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
