//! # Processor Errors
//!
//! Two channels:
//!
//! | Type | Meaning | Effect |
//! |------|---------|--------|
//! | [`ReasonError`] | expected rejection | operation left out of the block |
//! | [`ProcessError::Store`] / [`ProcessError::Precondition`] | infrastructure failure | block processing stops |
//!
//! Reason messages are user-visible and surface unchanged through the API.

use shared_types::{Address, Amount, Hint, ValidationError};
use thiserror::Error;

use crate::domain::DomainError;
use crate::operation::OperationKind;
use crate::state::{AccountCheckError, StateError};

/// Why an operation was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReasonError {
    /// The fact does not belong to the processor's kind.
    #[error("expected {expected}, not {actual}")]
    TypeMismatch {
        expected: OperationKind,
        actual: OperationKind,
    },

    #[error("invalid fact: {0}")]
    InvalidFact(#[from] ValidationError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    State(StateError),

    #[error(transparent)]
    Account(AccountCheckError),

    /// No processor is registered for the hint.
    #[error("operation {0} is not supported")]
    UnsupportedOperation(Hint),

    // --- registration ---
    /// The contract already carries a token design.
    #[error("token design for contract account {0} already exists")]
    ServiceExists(Address),

    #[error("token service state for contract account {0} not found")]
    ServiceNotFound(Address),

    #[error("contract account {0} not found")]
    ContractAccountNotFound(Address),

    /// Only the contract owner may register a token on it.
    #[error("sender {sender} is not owner of contract account {contract}")]
    NotContractOwner { sender: Address, contract: Address },

    // --- balances ---
    #[error("token balance state of {holder} in contract account {contract} not found")]
    BalanceNotFound { holder: Address, contract: Address },

    #[error("target {target} is not token owner in contract account {contract}")]
    NotTokenOwner { target: Address, contract: Address },

    #[error(
        "token balance of target {target} is less than amount to burn in contract account {contract}, {balance} < {amount}"
    )]
    InsufficientBurnBalance {
        target: Address,
        contract: Address,
        balance: Amount,
        amount: Amount,
    },

    #[error(
        "token balance of holder {holder} is less than amount to transfer in contract account {contract}, {balance} < {amount}"
    )]
    InsufficientHolderBalance {
        holder: Address,
        contract: Address,
        balance: Amount,
        amount: Amount,
    },

    #[error("total supply overflow in contract account {0}")]
    SupplyOverflow(Address),

    #[error("total supply underflow in contract account {0}")]
    SupplyUnderflow(Address),

    /// Checked addition of amounts overflowed `U256`.
    #[error("amount overflow, {0}")]
    AmountOverflow(String),

    // --- allowances ---
    /// A revoke from a sender with no approve box.
    #[error("sender {0} has not approved any accounts")]
    NotApprovedAny(Address),

    /// A revoke for a spender the sender never approved.
    #[error("approved account {0} has not been approved")]
    ApprovedNotApproved(Address),

    #[error("token balance for sender {sender} in contract account {contract} not found")]
    SenderBalanceNotFound { sender: Address, contract: Address },

    #[error("target {target} has not approved any accounts in contract account {contract}")]
    TargetNotApproved { target: Address, contract: Address },

    #[error("sender {sender} has not been approved by target {target} in contract account {contract}")]
    SenderNotApproved {
        sender: Address,
        target: Address,
        contract: Address,
    },

    #[error(
        "approved amount of sender {sender} is less than amount to transfer in contract account {contract}, {approved} < {amount}"
    )]
    InsufficientAllowance {
        sender: Address,
        contract: Address,
        approved: Amount,
        amount: Amount,
    },

    // --- proposal ---
    /// A sender may appear in one operation per block.
    #[error("proposal cannot have duplicated sender, {0}")]
    DuplicatedSender(Address),

    #[error("cannot use a duplicated contract for registering in contract model, {0}")]
    DuplicatedContract(Address),
}

/// Outcome of a failed `pre_process` or `process`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessError {
    /// Expected rejection, the block continues.
    #[error(transparent)]
    Reason(#[from] ReasonError),

    /// Store failure, the block stops.
    #[error("state store failure: {0}")]
    Store(StateError),

    /// State that admission guaranteed has disappeared.
    #[error("precondition failed: {0}")]
    Precondition(String),
}

impl ProcessError {
    #[must_use]
    pub const fn is_reason(&self) -> bool {
        matches!(self, Self::Reason(_))
    }

    #[must_use]
    pub const fn reason(&self) -> Option<&ReasonError> {
        match self {
            Self::Reason(r) => Some(r),
            _ => None,
        }
    }
}

impl From<StateError> for ProcessError {
    fn from(err: StateError) -> Self {
        if err.is_hard() {
            Self::Store(err)
        } else {
            Self::Reason(ReasonError::State(err))
        }
    }
}

impl From<AccountCheckError> for ProcessError {
    fn from(err: AccountCheckError) -> Self {
        match err {
            AccountCheckError::State(e) if e.is_hard() => Self::Store(e),
            other => Self::Reason(ReasonError::Account(other)),
        }
    }
}

impl From<DomainError> for ProcessError {
    fn from(err: DomainError) -> Self {
        Self::Reason(err.into())
    }
}

impl From<ValidationError> for ProcessError {
    fn from(err: ValidationError) -> Self {
        Self::Reason(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_failures_are_hard() {
        let err: ProcessError = StateError::Store("disk".into()).into();
        assert!(!err.is_reason());
    }

    #[test]
    fn test_missing_state_is_a_reason() {
        let err: ProcessError = StateError::NotFound {
            name: "design".into(),
            key: "k".into(),
        }
        .into();
        assert!(err.is_reason());
    }

    #[test]
    fn test_burn_message() {
        let target = Address::new([1; 20]);
        let contract = Address::new([2; 20]);
        let err = ReasonError::InsufficientBurnBalance {
            target,
            contract,
            balance: Amount::from(100),
            amount: Amount::from(200),
        };
        assert_eq!(
            err.to_string(),
            format!(
                "token balance of target {target} is less than amount to burn in contract account {contract}, 100 < 200"
            )
        );
    }
}
