//! # Error Types
//!
//! Structural validation failures shared by facts, items and value types.
//! None of these need state access to detect.

use thiserror::Error;

/// A value failed its structural (`is_valid`) check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Two roles of one fact or item point at the same account.
    #[error("self targeted: {0}")]
    SelfTarget(String),

    /// A value that must be unique appears more than once.
    #[error("duplicated value: {0}")]
    DuplicateValue(String),

    /// Numeric value or collection length outside its permitted range.
    #[error("value out of range: {0}")]
    OutOfRange(String),

    /// Required value is empty.
    #[error("empty value: {0}")]
    Empty(String),

    /// Textual form could not be parsed.
    #[error("malformed value: {0}")]
    Malformed(String),

    /// Stored hash does not match the recomputed one.
    #[error("hash mismatch: {0}")]
    HashMismatch(String),
}
