//! Digest API driven end to end: blocks committed through the token service,
//! read back and submitted over the router.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use parking_lot::Mutex;
use qc_16_api_gateway::{build_router, AppState, GatewayConfig, OperationSubmitter, SubmitError};
use qc_18_token_model::prelude::*;
use serde_json::{json, Value};
use shared_types::{Address, Amount, CurrencyId};
use tower::ServiceExt;

const S: Address = Address([1; 20]);
const R: Address = Address([2; 20]);
const C: Address = Address([9; 20]);

#[derive(Default)]
struct RecordingSubmitter {
    queued: Mutex<Vec<Operation>>,
}

#[async_trait]
impl OperationSubmitter for RecordingSubmitter {
    async fn submit(&self, operation: Operation) -> Result<(), SubmitError> {
        let mut queued = self.queued.lock();
        if queued.iter().any(|op| op.hash() == operation.hash()) {
            return Err(SubmitError::Duplicate(operation.hash()));
        }
        queued.push(operation);
        Ok(())
    }
}

struct Fixture {
    app: Router,
    hinters: HinterRegistry,
    submitter: Arc<RecordingSubmitter>,
}

fn register_op() -> Operation {
    Operation::new(RegisterModelFact::new(
        TokenFact::new(b"reg".to_vec(), S, C, CurrencyId::new("QCT").unwrap()),
        TokenSymbol::new("ABC123").unwrap(),
        "Alpha",
        Amount::from(18),
        Amount::from(100),
    ))
}

fn mint_op(amount: u64) -> Operation {
    Operation::new(MintFact::new(
        TokenFact::new(b"mint".to_vec(), S, C, CurrencyId::new("QCT").unwrap()),
        R,
        Amount::from(amount),
    ))
}

fn fixture() -> Fixture {
    let store = Arc::new(InMemoryStateDb::new());
    store.seed_account(S).unwrap();
    store.seed_account(R).unwrap();
    store.seed_contract_account(C, S).unwrap();

    let mut registry = ModuleRegistry::new();
    TokenModule.register(&mut registry).unwrap();
    let parts = registry.build();

    let digest = Arc::new(TokenDigest::new());
    let service = TokenService::new(store, Arc::new(parts.processors), ServiceConfig::default())
        .with_observer(digest.clone());
    let report = service.process_block(1, vec![register_op()]).unwrap();
    assert_eq!(report.accepted.len(), 1);

    let submitter = Arc::new(RecordingSubmitter::default());
    let state = AppState {
        query: digest,
        submitter: submitter.clone(),
        hinters: Arc::new(parts.hinters.clone()),
    };

    Fixture {
        app: build_router(state, &parts.routes, &GatewayConfig::default()),
        hinters: parts.hinters,
        submitter,
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, content_type, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/operation")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

// =============================================================================
// GET /token
// =============================================================================

#[tokio::test]
async fn test_get_token_design() {
    let f = fixture();

    let (status, content_type, json) = send(&f.app, get(&format!("/token/{C}"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "application/hal+json");
    assert_eq!(json["_embedded"]["symbol"], "ABC123");
    assert_eq!(json["_embedded"]["policy"]["total_supply"], "100");
    assert_eq!(json["_links"]["self"]["href"], format!("/token/{C}"));
}

#[tokio::test]
async fn test_get_unknown_token_is_not_found() {
    let f = fixture();

    let (status, content_type, json) = send(&f.app, get(&format!("/token/{R}"))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(content_type, "application/problem+json");
    assert_eq!(json["status"], 404);
}

#[tokio::test]
async fn test_malformed_address_is_bad_request() {
    let f = fixture();

    let (status, _, _) = send(&f.app, get("/token/not-an-address")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(&f.app, get(&format!("/token/{C}/account/0x12"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// GET /token/:contract/account/:address
// =============================================================================

#[tokio::test]
async fn test_get_balance() {
    let f = fixture();

    let (status, _, json) = send(&f.app, get(&format!("/token/{C}/account/{S}"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["_embedded"], json!({ "amount": "100" }));
    assert_eq!(json["_links"]["token"]["href"], format!("/token/{C}"));
}

#[tokio::test]
async fn test_missing_balance_is_empty_hal() {
    let f = fixture();

    let (status, _, json) = send(&f.app, get(&format!("/token/{C}/account/{R}"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "_embedded": null, "_links": {} }));
}

// =============================================================================
// POST /operation
// =============================================================================

#[tokio::test]
async fn test_submit_operation_is_queued() {
    let f = fixture();
    let op = mint_op(5);
    let body = f.hinters.encode_json(&op).unwrap().to_string();

    let (status, _, json) = send(&f.app, post(body.clone())).await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(json["_embedded"]["hash"], op.hash().to_string());
    assert_eq!(f.submitter.queued.lock().as_slice(), &[op]);

    let (status, _, _) = send(&f.app, post(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_submit_rejects_garbage_and_invalid_operations() {
    let f = fixture();

    let (status, _, _) = send(&f.app, post("{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let unknown = json!({ "_hint": "qc-unknown-v0.0.1" }).to_string();
    let (status, _, _) = send(&f.app, post(unknown)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut tampered = f.hinters.encode_json(&mint_op(5)).unwrap();
    tampered["hash"] = json!(mint_op(6).hash().to_string());
    let (status, _, json) = send(&f.app, post(tampered.to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["detail"].as_str().unwrap().starts_with("invalid operation"));

    assert!(f.submitter.queued.lock().is_empty());
}

#[tokio::test]
async fn test_oversized_body_is_refused() {
    let digest = Arc::new(TokenDigest::new());
    let mut config = GatewayConfig::default();
    config.limits.max_request_size = 16;
    let app = build_router(
        AppState {
            query: digest,
            submitter: Arc::new(RecordingSubmitter::default()),
            hinters: Arc::new(HinterRegistry::default()),
        },
        &[],
        &config,
    );

    let mut request = post(vec![b' '; 64]);
    request
        .headers_mut()
        .insert(header::CONTENT_LENGTH, header::HeaderValue::from(64));
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_health() {
    let f = fixture();
    let (status, _, json) = send(&f.app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
}
