use shared_types::Amount;
use thiserror::Error;

/// State access failures.
///
/// [`StateError::Store`] and [`StateError::Merge`] are infrastructure
/// failures; the rest describe missing or unexpected state and become
/// operation rejections when raised during processing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("state store failure: {0}")]
    Store(String),

    #[error("{name} state not found, {key}")]
    NotFound { name: String, key: String },

    #[error("state already exists, {key}")]
    AlreadyExists { key: String },

    #[error("unexpected state value in {key}: expected {expected}, found {found}")]
    UnexpectedValue {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid state key {key}: {reason}")]
    InvalidKey { key: String, reason: String },

    #[error(transparent)]
    Merge(#[from] MergeError),
}

impl StateError {
    /// Whether the failure comes from the store itself rather than its content.
    #[must_use]
    pub const fn is_hard(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Merge(_))
    }
}

/// Failures while folding merge values into a state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    #[error("unsupported token balance state value, {0}")]
    UnsupportedBalanceValue(&'static str),

    #[error("token balance delta without a token balance merger, {key}")]
    DeltaWithoutMerger { key: String },

    #[error("existing state of {key} is not a token balance, {found}")]
    UnexpectedExisting { key: String, found: &'static str },

    #[error("token balance overflow, {key}")]
    Overflow { key: String },

    #[error("token balance underflow, {key}: {balance} < {deducted}")]
    Underflow {
        key: String,
        balance: Amount,
        deducted: Amount,
    },

    #[error("no value merged into {key}")]
    Empty { key: String },
}
