//! Ports layer for the API Gateway.
//!
//! The token read side is the token model's own inbound port
//! ([`TokenQueryApi`](qc_18_token_model::ports::TokenQueryApi)); the only
//! driven port owned here is the operation queue.

pub mod outbound;

pub use outbound::{OperationSubmitter, SubmitError};
