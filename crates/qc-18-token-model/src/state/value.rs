//! State values stored under token and account keys.

use serde::{Deserialize, Serialize};
use shared_types::{
    amount_bytes, decimal_amount, AccountStateValue, Amount, ContractAccountStateValue, Hash,
    Height, Hint,
};

use super::errors::StateError;
use crate::domain::Design;

/// Design stored under `token:{contract}:design`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignStateValue {
    design: Design,
}

impl DesignStateValue {
    /// Hint of the design state value.
    pub const HINT: Hint = Hint::new("qc-token-design-state-value", "0.0.1");

    #[must_use]
    pub const fn new(design: Design) -> Self {
        Self { design }
    }

    #[must_use]
    pub const fn design(&self) -> &Design {
        &self.design
    }

    #[must_use]
    pub fn into_design(self) -> Design {
        self.design
    }
}

/// Balance stored under `token:{contract}:{address}:tokenbalance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalanceStateValue {
    #[serde(with = "decimal_amount")]
    amount: Amount,
}

impl TokenBalanceStateValue {
    /// Hint of the balance state value.
    pub const HINT: Hint = Hint::new("qc-token-balance-state-value", "0.0.1");

    #[must_use]
    pub const fn new(amount: Amount) -> Self {
        Self { amount }
    }

    #[must_use]
    pub const fn amount(&self) -> Amount {
        self.amount
    }
}

/// Credit marker. Only a [`TokenBalanceStateValueMerger`](super::TokenBalanceStateValueMerger) applies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddTokenBalanceStateValue {
    #[serde(with = "decimal_amount")]
    amount: Amount,
}

impl AddTokenBalanceStateValue {
    /// Hint of the credit marker.
    pub const HINT: Hint = Hint::new("qc-token-add-balance-state-value", "0.0.1");

    #[must_use]
    pub const fn new(amount: Amount) -> Self {
        Self { amount }
    }

    #[must_use]
    pub const fn amount(&self) -> Amount {
        self.amount
    }
}

/// Debit marker. Only a [`TokenBalanceStateValueMerger`](super::TokenBalanceStateValueMerger) applies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductTokenBalanceStateValue {
    #[serde(with = "decimal_amount")]
    amount: Amount,
}

impl DeductTokenBalanceStateValue {
    /// Hint of the debit marker.
    pub const HINT: Hint = Hint::new("qc-token-deduct-balance-state-value", "0.0.1");

    #[must_use]
    pub const fn new(amount: Amount) -> Self {
        Self { amount }
    }

    #[must_use]
    pub const fn amount(&self) -> Amount {
        self.amount
    }
}

/// Every value this module reads or writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "_hint")]
pub enum StateValue {
    #[serde(rename = "qc-account-state-value-v0.0.1")]
    Account(AccountStateValue),
    #[serde(rename = "qc-contract-account-state-value-v0.0.1")]
    ContractAccount(ContractAccountStateValue),
    #[serde(rename = "qc-token-design-state-value-v0.0.1")]
    Design(DesignStateValue),
    #[serde(rename = "qc-token-balance-state-value-v0.0.1")]
    TokenBalance(TokenBalanceStateValue),
    #[serde(rename = "qc-token-add-balance-state-value-v0.0.1")]
    AddTokenBalance(AddTokenBalanceStateValue),
    #[serde(rename = "qc-token-deduct-balance-state-value-v0.0.1")]
    DeductTokenBalance(DeductTokenBalanceStateValue),
}

impl StateValue {
    #[must_use]
    pub fn hint(&self) -> Hint {
        match self {
            Self::Account(_) => AccountStateValue::HINT,
            Self::ContractAccount(_) => ContractAccountStateValue::HINT,
            Self::Design(_) => DesignStateValue::HINT,
            Self::TokenBalance(_) => TokenBalanceStateValue::HINT,
            Self::AddTokenBalance(_) => AddTokenBalanceStateValue::HINT,
            Self::DeductTokenBalance(_) => DeductTokenBalanceStateValue::HINT,
        }
    }

    /// Short type name used in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Account(_) => "AccountStateValue",
            Self::ContractAccount(_) => "ContractAccountStateValue",
            Self::Design(_) => "DesignStateValue",
            Self::TokenBalance(_) => "TokenBalanceStateValue",
            Self::AddTokenBalance(_) => "AddTokenBalanceStateValue",
            Self::DeductTokenBalance(_) => "DeductTokenBalanceStateValue",
        }
    }

    /// Deterministic bytes for hashing.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        match self {
            Self::Account(v) => v.bytes(),
            Self::ContractAccount(v) => v.bytes(),
            Self::Design(v) => v.design.bytes(),
            Self::TokenBalance(TokenBalanceStateValue { amount })
            | Self::AddTokenBalance(AddTokenBalanceStateValue { amount })
            | Self::DeductTokenBalance(DeductTokenBalanceStateValue { amount }) => {
                amount_bytes(amount).to_vec()
            }
        }
    }
}

/// A committed value together with where and why it was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub key: String,
    pub value: StateValue,
    pub height: Height,
    /// Facts of the operations that produced this value.
    pub operations: Vec<Hash>,
}

impl State {
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        value: StateValue,
        height: Height,
        operations: Vec<Hash>,
    ) -> Self {
        Self {
            key: key.into(),
            value,
            height,
            operations,
        }
    }

    /// `sha256(key ‖ value bytes ‖ height)`
    #[must_use]
    pub fn hash(&self) -> Hash {
        let height = self.height.to_be_bytes();
        let value = self.value.bytes();
        Hash::sha256_parts([self.key.as_bytes(), value.as_slice(), &height[..]])
    }

    fn unexpected(&self, expected: &'static str) -> StateError {
        StateError::UnexpectedValue {
            key: self.key.clone(),
            expected,
            found: self.value.type_name(),
        }
    }
}

/// Design held by a design state.
pub fn state_design_value(state: &State) -> Result<Design, StateError> {
    match &state.value {
        StateValue::Design(v) => Ok(v.design.clone()),
        _ => Err(state.unexpected("DesignStateValue")),
    }
}

/// Amount held by a balance state.
pub fn state_token_balance_value(state: &State) -> Result<Amount, StateError> {
    match &state.value {
        StateValue::TokenBalance(v) => Ok(v.amount),
        _ => Err(state.unexpected("TokenBalanceStateValue")),
    }
}

/// Contract-account record held by a contract-account state.
pub fn state_contract_account_value(
    state: &State,
) -> Result<ContractAccountStateValue, StateError> {
    match &state.value {
        StateValue::ContractAccount(v) => Ok(v.clone()),
        _ => Err(state.unexpected("ContractAccountStateValue")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Policy, TokenSymbol};

    fn design_state() -> State {
        let design = Design::new(
            TokenSymbol::new("ABC").unwrap(),
            "Alpha",
            Amount::zero(),
            Policy::new(Amount::from(100), vec![]),
        );
        State::new("token:x:design", StateValue::Design(DesignStateValue::new(design)), 1, vec![])
    }

    #[test]
    fn test_extract_matching_value() {
        let st = design_state();
        assert_eq!(state_design_value(&st).unwrap().policy().total_supply(), Amount::from(100));
    }

    #[test]
    fn test_extract_wrong_value_type() {
        let st = design_state();
        assert_eq!(
            state_token_balance_value(&st),
            Err(StateError::UnexpectedValue {
                key: "token:x:design".into(),
                expected: "TokenBalanceStateValue",
                found: "DesignStateValue",
            })
        );
    }

    #[test]
    fn test_json_carries_hint_tag() {
        let value = StateValue::TokenBalance(TokenBalanceStateValue::new(Amount::from(42)));
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json["_hint"], "qc-token-balance-state-value-v0.0.1");
        assert_eq!(json["amount"], "42");
        assert_eq!(json["_hint"], value.hint().to_string());

        let back: StateValue = serde_json::from_value(json).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_state_hash_depends_on_height() {
        let mut st = design_state();
        let first = st.hash();
        st.height = 2;
        assert_ne!(first, st.hash());
    }
}
