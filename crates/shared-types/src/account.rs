//! # Account State Values
//!
//! State values owned by the currency module. The token module reads them to
//! tell normal accounts from contract accounts, creates missing accounts on
//! credit, and flags a contract account active when a token is registered on
//! it.
//!
//! | Key | Value |
//! |-----|-------|
//! | `{address}:account` | [`AccountStateValue`] |
//! | `{address}:contractaccount` | [`ContractAccountStateValue`] |

use serde::{Deserialize, Serialize};

use crate::entities::{Address, Hint};

/// Suffix of an account state key.
pub const ACCOUNT_STATE_SUFFIX: &str = "account";

/// Suffix of a contract-account state key.
pub const CONTRACT_ACCOUNT_STATE_SUFFIX: &str = "contractaccount";

/// State key holding the account record of `address`.
#[must_use]
pub fn account_state_key(address: &Address) -> String {
    format!("{address}:{ACCOUNT_STATE_SUFFIX}")
}

/// State key holding the contract-account record of `address`.
#[must_use]
pub fn contract_account_state_key(address: &Address) -> String {
    format!("{address}:{CONTRACT_ACCOUNT_STATE_SUFFIX}")
}

/// A plain account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStateValue {
    /// The account's address.
    pub address: Address,
}

impl AccountStateValue {
    /// Hint of the account state value.
    pub const HINT: Hint = Hint::new("qc-account-state-value", "0.0.1");

    /// Creates an account record.
    #[must_use]
    pub const fn new(address: Address) -> Self {
        Self { address }
    }

    /// Deterministic bytes for hashing.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        self.address.as_bytes().to_vec()
    }
}

/// Contract-account status.
///
/// `is_active` flips to true once a model (such as a token) is registered on
/// the contract; `register_operation` records which operation did it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAccountStateValue {
    owner: Address,
    is_active: bool,
    register_operation: Option<Hint>,
}

impl ContractAccountStateValue {
    /// Hint of the contract-account state value.
    pub const HINT: Hint = Hint::new("qc-contract-account-state-value", "0.0.1");

    /// Creates an inactive contract account owned by `owner`.
    #[must_use]
    pub const fn new(owner: Address) -> Self {
        Self {
            owner,
            is_active: false,
            register_operation: None,
        }
    }

    /// Account that owns the contract.
    #[must_use]
    pub const fn owner(&self) -> &Address {
        &self.owner
    }

    /// Whether a model is registered on the contract.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.is_active
    }

    /// Hint of the operation that activated the contract, if any.
    #[must_use]
    pub const fn register_operation(&self) -> Option<&Hint> {
        self.register_operation.as_ref()
    }

    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }

    pub fn set_register_operation(&mut self, hint: Hint) {
        self.register_operation = Some(hint);
    }

    /// Deterministic bytes for hashing.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        let mut out = self.owner.as_bytes().to_vec();
        out.push(u8::from(self.is_active));
        if let Some(hint) = &self.register_operation {
            out.extend(hint.bytes());
        }
        out
    }
}
