//! Registration and codec error types.

use shared_types::{Hint, ValidationError};
use thiserror::Error;

/// Failures while wiring hinters, processors and modules together.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("hinter already registered, {0}")]
    DuplicateHint(Hint),

    #[error("operation processor already registered, {0}")]
    DuplicateProcessor(Hint),

    #[error("operation processor not found, {0}")]
    UnsupportedOperation(Hint),

    #[error("module already registered, {0}")]
    DuplicateModule(String),
}

/// Hinted JSON encode/decode failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("json: {0}")]
    Json(String),

    #[error("missing _hint field")]
    MissingHint,

    #[error("unknown hint, {0}")]
    UnknownHint(String),

    #[error("invalid hint: {0}")]
    InvalidHint(ValidationError),

    #[error("expected {expected}, decoded {found}")]
    UnexpectedValue {
        expected: &'static str,
        found: String,
    },
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}
