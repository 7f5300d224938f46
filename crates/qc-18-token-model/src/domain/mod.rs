//! # Token Domain
//!
//! Immutable token values with structural validation and deterministic
//! byte encodings for hashing.
//!
//! ```text
//! Design ──┬── TokenSymbol
//!          ├── name, decimal
//!          └── Policy ──┬── total_supply
//!                       └── [ApproveBox] ── account, [ApproveInfo]
//!                                                     └── account, amount
//! ```
//!
//! Allowance lists are small; lookups are first-match linear scans and the
//! unique-by-account invariant is checked by `is_valid`.

pub mod approve;
pub mod design;
pub mod errors;
pub mod policy;
pub mod symbol;

pub use approve::{ApproveBox, ApproveInfo};
pub use design::Design;
pub use errors::DomainError;
pub use policy::Policy;
pub use symbol::TokenSymbol;
