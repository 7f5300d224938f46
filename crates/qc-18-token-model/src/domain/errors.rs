//! Domain error types.

use shared_types::{Address, ValidationError};
use thiserror::Error;

/// Failure of a token value invariant or allowance mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Structural validation failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The approve box of `owner` has no entry for `approved`.
    #[error("not found approved, {approved} in approve box of {owner}")]
    ApprovedNotFound {
        /// Owner of the approve box.
        owner: Address,
        /// Account that was looked up.
        approved: Address,
    },

    /// The policy has no approve box for `account`.
    #[error("not found approve box, {0}")]
    ApproveBoxNotFound(Address),
}
