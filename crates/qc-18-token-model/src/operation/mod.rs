//! # Operations
//!
//! Facts are the hashable intent of an operation; [`Operation`] is the
//! envelope that crosses the wire. Structural validation (`is_valid`) never
//! touches state.
//!
//! | Kind | Fact | Items |
//! |------|------|-------|
//! | RegisterModel | [`RegisterModelFact`] | - |
//! | Mint | [`MintFact`] | - |
//! | Burn | [`BurnFact`] | - |
//! | Approve | [`ApproveFact`] | [`ApproveItem`] |
//! | Transfer | [`TransferFact`] | [`TransferItem`] |
//! | TransferFrom | [`TransferFromFact`] | [`TransferFromItem`] |

pub mod approve;
pub mod base;
pub mod burn;
pub mod mint;
pub mod register_model;
pub mod transfer;
pub mod transfer_from;

use std::fmt;

use serde::{Deserialize, Serialize};
use shared_types::{Address, Hash, Hint, ValidationError};

pub use approve::{ApproveFact, ApproveItem};
pub use base::{TokenFact, MAX_ITEMS};
pub use burn::BurnFact;
pub use mint::MintFact;
pub use register_model::RegisterModelFact;
pub use transfer::{TransferFact, TransferItem};
pub use transfer_from::{TransferFromFact, TransferFromItem};

// =============================================================================
// KINDS
// =============================================================================

/// The closed set of token operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OperationKind {
    RegisterModel,
    Mint,
    Burn,
    Approve,
    Transfer,
    TransferFrom,
}

impl OperationKind {
    pub const ALL: [Self; 6] = [
        Self::RegisterModel,
        Self::Mint,
        Self::Burn,
        Self::Approve,
        Self::Transfer,
        Self::TransferFrom,
    ];

    /// Hint of the operation envelope.
    #[must_use]
    pub const fn operation_hint(self) -> Hint {
        match self {
            Self::RegisterModel => Hint::new("qc-token-register-model-operation", "0.0.1"),
            Self::Mint => Hint::new("qc-token-mint-operation", "0.0.1"),
            Self::Burn => Hint::new("qc-token-burn-operation", "0.0.1"),
            Self::Approve => Hint::new("qc-token-approve-operation", "0.0.1"),
            Self::Transfer => Hint::new("qc-token-transfer-operation", "0.0.1"),
            Self::TransferFrom => Hint::new("qc-token-transfer-from-operation", "0.0.1"),
        }
    }

    /// Hint of the fact.
    #[must_use]
    pub const fn fact_hint(self) -> Hint {
        match self {
            Self::RegisterModel => RegisterModelFact::HINT,
            Self::Mint => MintFact::HINT,
            Self::Burn => BurnFact::HINT,
            Self::Approve => ApproveFact::HINT,
            Self::Transfer => TransferFact::HINT,
            Self::TransferFrom => TransferFromFact::HINT,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::RegisterModel => "RegisterModel",
            Self::Mint => "Mint",
            Self::Burn => "Burn",
            Self::Approve => "Approve",
            Self::Transfer => "Transfer",
            Self::TransferFrom => "TransferFrom",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// FACTS
// =============================================================================

/// Any token fact, tagged by its hint on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "_hint")]
pub enum OperationFact {
    #[serde(rename = "qc-token-register-model-operation-fact-v0.0.1")]
    RegisterModel(RegisterModelFact),
    #[serde(rename = "qc-token-mint-operation-fact-v0.0.1")]
    Mint(MintFact),
    #[serde(rename = "qc-token-burn-operation-fact-v0.0.1")]
    Burn(BurnFact),
    #[serde(rename = "qc-token-approve-operation-fact-v0.0.1")]
    Approve(ApproveFact),
    #[serde(rename = "qc-token-transfer-operation-fact-v0.0.1")]
    Transfer(TransferFact),
    #[serde(rename = "qc-token-transfer-from-operation-fact-v0.0.1")]
    TransferFrom(TransferFromFact),
}

impl OperationFact {
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::RegisterModel(_) => OperationKind::RegisterModel,
            Self::Mint(_) => OperationKind::Mint,
            Self::Burn(_) => OperationKind::Burn,
            Self::Approve(_) => OperationKind::Approve,
            Self::Transfer(_) => OperationKind::Transfer,
            Self::TransferFrom(_) => OperationKind::TransferFrom,
        }
    }

    /// Account that signs and pays for the operation.
    #[must_use]
    pub const fn sender(&self) -> &Address {
        match self {
            Self::RegisterModel(f) => f.sender(),
            Self::Mint(f) => f.sender(),
            Self::Burn(f) => f.sender(),
            Self::Approve(f) => f.sender(),
            Self::Transfer(f) => f.sender(),
            Self::TransferFrom(f) => f.sender(),
        }
    }

    pub fn is_valid(&self) -> Result<(), ValidationError> {
        match self {
            Self::RegisterModel(f) => f.is_valid(),
            Self::Mint(f) => f.is_valid(),
            Self::Burn(f) => f.is_valid(),
            Self::Approve(f) => f.is_valid(),
            Self::Transfer(f) => f.is_valid(),
            Self::TransferFrom(f) => f.is_valid(),
        }
    }

    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        match self {
            Self::RegisterModel(f) => f.bytes(),
            Self::Mint(f) => f.bytes(),
            Self::Burn(f) => f.bytes(),
            Self::Approve(f) => f.bytes(),
            Self::Transfer(f) => f.bytes(),
            Self::TransferFrom(f) => f.bytes(),
        }
    }

    /// `sha256(bytes)`
    #[must_use]
    pub fn hash(&self) -> Hash {
        Hash::sha256(&self.bytes())
    }
}

macro_rules! impl_from_fact {
    ($($fact:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$fact> for OperationFact {
                fn from(fact: $fact) -> Self {
                    Self::$variant(fact)
                }
            }
        )*
    };
}

impl_from_fact!(
    RegisterModelFact => RegisterModel,
    MintFact => Mint,
    BurnFact => Burn,
    ApproveFact => Approve,
    TransferFact => Transfer,
    TransferFromFact => TransferFrom,
);

// =============================================================================
// ENVELOPE
// =============================================================================

/// A fact wrapped for submission.
///
/// `hash = sha256(fact hash ‖ operation hint)`. Signatures and fees belong to
/// the host and are not part of this envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "_hint")]
    hint: Hint,
    fact: OperationFact,
    hash: Hash,
}

impl Operation {
    #[must_use]
    pub fn new(fact: impl Into<OperationFact>) -> Self {
        let fact = fact.into();
        let hint = fact.kind().operation_hint();
        let hash = Self::generate_hash(&fact, &hint);
        Self { hint, fact, hash }
    }

    fn generate_hash(fact: &OperationFact, hint: &Hint) -> Hash {
        let fact_hash = fact.hash();
        let hint_bytes = hint.bytes();
        Hash::sha256_parts([&fact_hash.as_bytes()[..], hint_bytes.as_slice()])
    }

    #[must_use]
    pub const fn hint(&self) -> &Hint {
        &self.hint
    }

    #[must_use]
    pub const fn fact(&self) -> &OperationFact {
        &self.fact
    }

    #[must_use]
    pub const fn hash(&self) -> Hash {
        self.hash
    }

    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        self.fact.kind()
    }

    /// Fact validity, hint matching the fact kind, and hash integrity.
    pub fn is_valid(&self) -> Result<(), ValidationError> {
        self.fact.is_valid()?;

        let expected = self.fact.kind().operation_hint();
        if self.hint != expected {
            return Err(ValidationError::Malformed(format!(
                "operation hint {} does not match fact, expected {expected}",
                self.hint
            )));
        }

        if self.hash != Self::generate_hash(&self.fact, &self.hint) {
            return Err(ValidationError::HashMismatch(format!("operation {}", self.hash)));
        }
        Ok(())
    }
}
