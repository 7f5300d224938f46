//! QC-16 API Gateway - HTTP digest API of the token model.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    API GATEWAY (qc-16)                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Middleware: Trace → Timeout → BodyLimit → CORS             │
//! │                          │                                  │
//! │  ┌───────────────────────┴──────────────────────────────┐   │
//! │  │ GET  /token/:contract                 ──▶ TokenQueryApi │
//! │  │ GET  /token/:contract/account/:address ──▶ TokenQueryApi │
//! │  │ POST /operation    ──▶ HinterRegistry ──▶ OperationSubmitter │
//! │  │ GET  /health                                          │   │
//! │  └───────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Responses are HAL JSON (`application/hal+json`); failures are problem
//! documents (`application/problem+json`).
//!
//! # Usage
//!
//! ```ignore
//! use qc_16_api_gateway::{ApiGatewayService, AppState, GatewayConfig};
//!
//! let state = AppState { query: digest, submitter: pool, hinters: Arc::new(parts.hinters) };
//! let service = ApiGatewayService::new(GatewayConfig::default(), state, &parts.routes)?;
//! service.serve(shutdown_signal).await?;
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod domain;
pub mod handlers;
pub mod middleware;
pub mod ports;
pub mod router;
pub mod service;

pub use domain::config::{ConfigError, GatewayConfig};
pub use domain::error::{ApiError, GatewayError};
pub use domain::hal::Hal;
pub use ports::{OperationSubmitter, SubmitError};
pub use router::{build_router, AppState};
pub use service::ApiGatewayService;
