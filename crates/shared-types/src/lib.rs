//! # Shared Types Crate
//!
//! Host primitives shared by every crate of the token workspace.
//!
//! ## Contents
//!
//! - **Entities**: `Address`, `Hash`, `Height`, `Amount`, `CurrencyId`, `Hint`
//! - **Accounts**: the currency module's account and contract-account state
//!   values, plus the state keys they live under
//! - **Errors**: structural validation failures shared by facts and values
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: primitives used on the wire are defined once.
//! - **Display is the wire form**: addresses, hashes, hints and currency ids
//!   serialize through their `Display`/`FromStr` implementations so JSON and
//!   state keys agree on one textual representation.

pub mod account;
pub mod entities;
pub mod errors;

pub use account::*;
pub use entities::*;
pub use errors::*;
