//! # Genesis Module
//!
//! Seeds the state store at height 0 before the first block.
//!
//! The genesis file is JSON:
//!
//! ```json
//! {
//!   "accounts": ["0x0101…"],
//!   "contract_accounts": [{ "address": "0x0909…", "owner": "0x0101…" }]
//! }
//! ```
//!
//! Contract accounts are seeded inactive; registering a token model on one
//! activates it.

pub mod builder;

pub use builder::{ContractAccountSpec, GenesisBuilder, GenesisConfig, GenesisError, GenesisSummary};
