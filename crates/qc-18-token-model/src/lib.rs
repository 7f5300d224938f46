//! # QC-18 Token Model - Fungible Token Extension
//!
//! **Module ID:** `token`
//!
//! ## Purpose
//!
//! Adds fungible tokens to contract accounts. A token is a [`Design`]
//! (symbol, name, decimal, policy) stored under its contract account; balances
//! are stored per `(contract, holder)` and change only through additive
//! deltas folded by a dedicated merger.
//!
//! ## Operations
//!
//! | Operation | Effect |
//! |-----------|--------|
//! | `RegisterModel` | Creates the design, activates the contract account, credits the initial supply to the sender |
//! | `Mint` | Raises total supply, credits the receiver |
//! | `Burn` | Lowers total supply, debits the sender's own balance |
//! | `Approve` | Grants, raises or revokes allowances (cumulative) |
//! | `Transfer` | Moves balance from the sender to receivers; items run in parallel |
//! | `TransferFrom` | Spends allowances granted by targets |
//!
//! ## Processing Pipeline
//!
//! ```text
//! Operation ──▶ is_valid (structural, no state)
//!           ──▶ DuplicationCheck (per proposal)
//!           ──▶ Processor::pre_process (stateful admission)
//!           ──▶ Processor::process ──▶ Vec<StateMergeValue>
//!                                            │
//!                    StateStore::commit ◀────┘  (mergers fold deltas per key)
//!                            │
//!                            ▼
//!                      TokenDigest (read model for the HTTP API)
//! ```
//!
//! ## Error Channels
//!
//! - [`ReasonError`]: the operation is rejected and left out of the block;
//!   processing continues with the next operation.
//! - Hard [`ProcessError`] variants (store failure, vanished precondition):
//!   processing of the block stops and the error propagates.
//!
//! ## Balance Keys
//!
//! | Key | Value |
//! |-----|-------|
//! | `token:{contract}:design` | [`DesignStateValue`] |
//! | `token:{contract}:{address}:tokenbalance` | [`TokenBalanceStateValue`] |
//!
//! ## Usage Example
//!
//! ```ignore
//! use qc_18_token_model::prelude::*;
//!
//! let mut registry = ModuleRegistry::new();
//! TokenModule.register(&mut registry)?;
//! let parts = registry.build();
//!
//! let store = Arc::new(InMemoryStateDb::new());
//! let service = TokenService::new(store, Arc::new(parts.processors), ServiceConfig::default());
//! let report = service.process_block(1, operations)?;
//! ```

// Crate-level lints
#![allow(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod codec;
pub mod digest;
pub mod domain;
pub mod errors;
pub mod module;
pub mod operation;
pub mod ports;
pub mod processor;
pub mod service;
pub mod state;

pub use domain::{ApproveBox, ApproveInfo, Design, DomainError, Policy, TokenSymbol};
pub use processor::{ProcessError, ReasonError};
pub use state::{DesignStateValue, TokenBalanceStateValue};

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain values
    pub use crate::domain::{ApproveBox, ApproveInfo, Design, DomainError, Policy, TokenSymbol};

    // State model
    pub use crate::state::{
        AddTokenBalanceStateValue, DeductTokenBalanceStateValue, DesignStateValue, MergeError,
        State, StateError, StateKeyGenerator, StateMergeValue, StateValue, StateValueMerger,
        TokenBalanceStateValue, TokenBalanceStateValueMerger,
    };

    // Operations
    pub use crate::operation::{
        ApproveFact, ApproveItem, BurnFact, MintFact, Operation, OperationFact, OperationKind,
        RegisterModelFact, TokenFact, TransferFact, TransferFromFact, TransferFromItem,
        TransferItem, MAX_ITEMS,
    };

    // Processors
    pub use crate::processor::{
        prepare_sender_total_amounts, DuplicationChecker, GetNewProcessor, OperationProcessor,
        OperationProcessors, ProcessError, ReasonError,
    };

    // Ports
    pub use crate::ports::inbound::TokenQueryApi;
    pub use crate::ports::outbound::{CommitObserver, StateReader, StateStore};

    // Adapters, digest, service
    pub use crate::adapters::{InMemoryStateDb, PendingState};
    pub use crate::digest::{DigestError, TokenDigest};
    pub use crate::service::{
        BlockReport, RejectedOperation, ServiceConfig, ServiceError, ServiceStats, TokenService,
    };

    // Registration
    pub use crate::codec::{Hinted, HintedValue, HinterRegistry, HinterRegistryBuilder};
    pub use crate::errors::{CodecError, RegistryError};
    pub use crate::module::{ApiRoute, ModelModule, ModuleParts, ModuleRegistry, TokenModule};
}
