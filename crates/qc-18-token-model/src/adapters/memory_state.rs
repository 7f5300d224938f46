use std::collections::HashMap;

use parking_lot::RwLock;
use shared_types::{
    account_state_key, contract_account_state_key, AccountStateValue, Address,
    ContractAccountStateValue, Hash, Height,
};
use tracing::debug;

use crate::ports::outbound::{StateReader, StateStore};
use crate::state::{fold_merge_values, State, StateError, StateMergeValue, StateValue};

/// In-memory implementation of [`StateStore`].
pub struct InMemoryStateDb {
    states: RwLock<HashMap<String, State>>,
}

impl InMemoryStateDb {
    #[must_use]
    pub fn new() -> Self {
        Self {
            states: RwLock::new(HashMap::new()),
        }
    }

    /// Writes `state` as is, bypassing mergers. Used for genesis.
    pub fn seed_state(&self, state: State) -> Result<(), StateError> {
        let mut states = self.states.write();
        if states.contains_key(&state.key) {
            return Err(StateError::AlreadyExists { key: state.key });
        }
        states.insert(state.key.clone(), state);
        Ok(())
    }

    /// Plain account at height 0.
    pub fn seed_account(&self, address: Address) -> Result<(), StateError> {
        self.seed_state(State::new(
            account_state_key(&address),
            StateValue::Account(AccountStateValue::new(address)),
            0,
            vec![],
        ))
    }

    /// Inactive contract account owned by `owner`, at height 0.
    ///
    /// The plain account of `address` is created too when missing.
    pub fn seed_contract_account(
        &self,
        address: Address,
        owner: Address,
    ) -> Result<(), StateError> {
        if self.get_state(&account_state_key(&address))?.is_none() {
            self.seed_account(address)?;
        }
        self.seed_state(State::new(
            contract_account_state_key(&address),
            StateValue::ContractAccount(ContractAccountStateValue::new(owner)),
            0,
            vec![],
        ))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.read().is_empty()
    }

    /// Every stored state, sorted by key.
    #[must_use]
    pub fn snapshot(&self) -> Vec<State> {
        let mut states: Vec<State> = self.states.read().values().cloned().collect();
        states.sort_by(|a, b| a.key.cmp(&b.key));
        states
    }
}

impl Default for InMemoryStateDb {
    fn default() -> Self {
        Self::new()
    }
}

impl StateReader for InMemoryStateDb {
    fn get_state(&self, key: &str) -> Result<Option<State>, StateError> {
        Ok(self.states.read().get(key).cloned())
    }
}

/// Values grouped by key, keys in first-seen order.
pub(crate) fn group_by_key(
    values: &[(Hash, StateMergeValue)],
) -> Vec<(&str, Vec<(&Hash, &StateMergeValue)>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<(&Hash, &StateMergeValue)>)> = Vec::new();

    for (op, smv) in values {
        let slot = *index.entry(smv.key()).or_insert_with(|| {
            groups.push((smv.key(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push((op, smv));
    }

    groups
}

impl StateStore for InMemoryStateDb {
    fn commit(
        &self,
        height: Height,
        values: &[(Hash, StateMergeValue)],
    ) -> Result<Vec<State>, StateError> {
        let mut states = self.states.write();

        let merged = group_by_key(values)
            .into_iter()
            .map(|(key, group)| fold_merge_values(height, key, states.get(key), group))
            .collect::<Result<Vec<State>, _>>()?;

        for st in &merged {
            states.insert(st.key.clone(), st.clone());
        }

        debug!(height, values = values.len(), states = merged.len(), "state committed");
        Ok(merged)
    }
}
