//! # Token Digest
//!
//! Read model over committed token state, fed by [`CommitObserver`] and
//! served through [`TokenQueryApi`].
//!
//! | Index | Key | History |
//! |-------|-----|---------|
//! | designs | contract | height → design |
//! | balances | (contract, holder) | height → amount |
//!
//! Non-token states are ignored.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{Address, Amount, Height};
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::Design;
use crate::ports::inbound::TokenQueryApi;
use crate::ports::outbound::CommitObserver;
use crate::state::{
    is_design_key, is_token_balance_key, parse_design_key, parse_token_balance_key,
    state_design_value, state_token_balance_value, State, StateError,
};

/// Digest failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DigestError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("unexpected value: {0}")]
    UnexpectedValue(String),
}

impl From<StateError> for DigestError {
    fn from(err: StateError) -> Self {
        match err {
            StateError::InvalidKey { .. } => Self::InvalidKey(err.to_string()),
            other => Self::UnexpectedValue(other.to_string()),
        }
    }
}

/// In-memory token read model.
#[derive(Default)]
pub struct TokenDigest {
    designs: RwLock<HashMap<Address, BTreeMap<Height, Design>>>,
    balances: RwLock<HashMap<(Address, Address), BTreeMap<Height, Amount>>>,
}

impl TokenDigest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes one committed state. Returns whether it was a token state.
    pub fn index_state(&self, state: &State) -> Result<bool, DigestError> {
        if is_design_key(&state.key) {
            let contract = parse_design_key(&state.key)?;
            let design = state_design_value(state)?;
            self.designs
                .write()
                .entry(contract)
                .or_default()
                .insert(state.height, design);
            Ok(true)
        } else if is_token_balance_key(&state.key) {
            let pair = parse_token_balance_key(&state.key)?;
            let amount = state_token_balance_value(state)?;
            self.balances
                .write()
                .entry(pair)
                .or_default()
                .insert(state.height, amount);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Latest design of `contract`.
    #[must_use]
    pub fn design(&self, contract: &Address) -> Option<Design> {
        self.designs
            .read()
            .get(contract)
            .and_then(|h| h.values().next_back().cloned())
    }

    /// Design of `contract` as of `height`.
    #[must_use]
    pub fn design_at(&self, contract: &Address, height: Height) -> Option<Design> {
        self.designs
            .read()
            .get(contract)
            .and_then(|h| h.range(..=height).next_back().map(|(_, d)| d.clone()))
    }

    /// Latest balance of `holder` in `contract`.
    #[must_use]
    pub fn balance(&self, contract: &Address, holder: &Address) -> Option<Amount> {
        self.balances
            .read()
            .get(&(*contract, *holder))
            .and_then(|h| h.values().next_back().copied())
    }

    /// Every recorded balance of `holder` in `contract`, oldest first.
    #[must_use]
    pub fn balance_history(&self, contract: &Address, holder: &Address) -> Vec<(Height, Amount)> {
        self.balances
            .read()
            .get(&(*contract, *holder))
            .map(|h| h.iter().map(|(k, v)| (*k, *v)).collect())
            .unwrap_or_default()
    }

    /// Contracts with a registered token, sorted.
    #[must_use]
    pub fn contracts(&self) -> Vec<Address> {
        let mut contracts: Vec<Address> = self.designs.read().keys().copied().collect();
        contracts.sort();
        contracts
    }
}

impl CommitObserver for TokenDigest {
    fn on_commit(&self, height: Height, states: &[State]) -> Result<(), DigestError> {
        let mut indexed = 0usize;
        for st in states {
            match self.index_state(st) {
                Ok(true) => indexed += 1,
                Ok(false) => {}
                Err(err) => {
                    warn!(height, key = %st.key, error = %err, "digest rejected state");
                    return Err(err);
                }
            }
        }
        debug!(height, states = states.len(), indexed, "digest updated");
        Ok(())
    }
}

#[async_trait]
impl TokenQueryApi for TokenDigest {
    async fn token(&self, contract: &Address) -> Result<Design, DigestError> {
        self.design(contract).ok_or_else(|| {
            DigestError::NotFound(format!("token design of contract account {contract}"))
        })
    }

    async fn token_balance(
        &self,
        contract: &Address,
        address: &Address,
    ) -> Result<Option<Amount>, DigestError> {
        Ok(self.balance(contract, address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Policy, TokenSymbol};
    use crate::state::{DesignStateValue, StateKeyGenerator, StateValue, TokenBalanceStateValue};
    use shared_types::{account_state_key, AccountStateValue};

    fn addr(b: u8) -> Address {
        Address::new([b; 20])
    }

    fn design(supply: u64) -> Design {
        Design::new(
            TokenSymbol::new("ABC").unwrap(),
            "Alpha",
            Amount::zero(),
            Policy::new(Amount::from(supply), vec![]),
        )
    }

    fn design_state(height: Height, supply: u64) -> State {
        State::new(
            StateKeyGenerator::new(addr(9)).design(),
            StateValue::Design(DesignStateValue::new(design(supply))),
            height,
            vec![],
        )
    }

    fn balance_state(height: Height, amount: u64) -> State {
        State::new(
            StateKeyGenerator::new(addr(9)).token_balance(&addr(1)),
            StateValue::TokenBalance(TokenBalanceStateValue::new(Amount::from(amount))),
            height,
            vec![],
        )
    }

    #[tokio::test]
    async fn test_latest_values_served() {
        let digest = TokenDigest::new();
        digest.on_commit(1, &[design_state(1, 100), balance_state(1, 100)]).unwrap();
        digest.on_commit(2, &[design_state(2, 80), balance_state(2, 80)]).unwrap();

        assert_eq!(digest.token(&addr(9)).await.unwrap().policy().total_supply(), Amount::from(80));
        assert_eq!(digest.token_balance(&addr(9), &addr(1)).await.unwrap(), Some(Amount::from(80)));
        assert_eq!(
            digest.design_at(&addr(9), 1).unwrap().policy().total_supply(),
            Amount::from(100)
        );
        assert_eq!(digest.balance_history(&addr(9), &addr(1)).len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let digest = TokenDigest::new();

        assert!(matches!(digest.token(&addr(9)).await, Err(DigestError::NotFound(_))));
        assert_eq!(digest.token_balance(&addr(9), &addr(1)).await.unwrap(), None);
    }

    #[test]
    fn test_non_token_states_ignored() {
        let digest = TokenDigest::new();
        let account = State::new(
            account_state_key(&addr(1)),
            StateValue::Account(AccountStateValue::new(addr(1))),
            0,
            vec![],
        );

        assert!(!digest.index_state(&account).unwrap());
        assert!(digest.contracts().is_empty());
    }

    #[test]
    fn test_wrong_value_under_token_key() {
        let digest = TokenDigest::new();
        let mut st = balance_state(1, 1);
        st.key = StateKeyGenerator::new(addr(9)).design();

        assert!(matches!(digest.index_state(&st), Err(DigestError::UnexpectedValue(_))));
    }
}
