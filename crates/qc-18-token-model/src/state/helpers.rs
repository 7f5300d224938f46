//! Existence checks shared by every processor.

use shared_types::{
    account_state_key, contract_account_state_key, AccountStateValue, Address,
    ContractAccountStateValue,
};
use thiserror::Error;

use super::errors::StateError;
use super::merger::StateMergeValue;
use super::value::{state_contract_account_value, State, StateValue};
use crate::ports::outbound::StateReader;

/// Reads `key`; a missing state is [`StateError::NotFound`] labelled `name`.
pub fn exists_state(key: &str, name: &str, reader: &dyn StateReader) -> Result<State, StateError> {
    reader.get_state(key)?.ok_or_else(|| StateError::NotFound {
        name: name.to_string(),
        key: key.to_string(),
    })
}

pub fn check_exists_state(key: &str, reader: &dyn StateReader) -> Result<(), StateError> {
    exists_state(key, "required", reader).map(|_| ())
}

pub fn check_not_exists_state(key: &str, reader: &dyn StateReader) -> Result<(), StateError> {
    match reader.get_state(key)? {
        Some(_) => Err(StateError::AlreadyExists {
            key: key.to_string(),
        }),
        None => Ok(()),
    }
}

/// Outcome of [`exists_c_account`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountCheckError {
    #[error(transparent)]
    State(#[from] StateError),

    #[error("{label} account {address} not found")]
    AccountNotFound { label: &'static str, address: Address },

    #[error("{label} {address} is contract account")]
    ContractAccount { label: &'static str, address: Address },

    #[error("{label} {address} is not contract account")]
    NotContractAccount { label: &'static str, address: Address },
}

/// Checks the account kind of `address`.
///
/// With `must_exist` the plain account state has to be present. With
/// `must_be_contract` the address has to be a contract account; without it,
/// it must not be one. Returns the contract-account record when there is one.
pub fn exists_c_account(
    address: &Address,
    label: &'static str,
    must_exist: bool,
    must_be_contract: bool,
    reader: &dyn StateReader,
) -> Result<Option<ContractAccountStateValue>, AccountCheckError> {
    if must_exist && reader.get_state(&account_state_key(address))?.is_none() {
        return Err(AccountCheckError::AccountNotFound {
            label,
            address: *address,
        });
    }

    let contract = match reader.get_state(&contract_account_state_key(address))? {
        Some(st) => Some(state_contract_account_value(&st)?),
        None => None,
    };

    match (must_be_contract, contract.is_some()) {
        (true, false) => Err(AccountCheckError::NotContractAccount {
            label,
            address: *address,
        }),
        (false, true) => Err(AccountCheckError::ContractAccount {
            label,
            address: *address,
        }),
        _ => Ok(contract),
    }
}

/// Account write for `address` when it has no account state yet.
pub fn create_not_exist_account(
    address: &Address,
    reader: &dyn StateReader,
) -> Result<Option<StateMergeValue>, StateError> {
    let key = account_state_key(address);
    if reader.get_state(&key)?.is_some() {
        return Ok(None);
    }
    Ok(Some(StateMergeValue::new(
        key,
        StateValue::Account(AccountStateValue::new(*address)),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn addr(b: u8) -> Address {
        Address::new([b; 20])
    }

    fn reader_with(states: Vec<State>) -> impl StateReader {
        let map: HashMap<String, State> = states.into_iter().map(|s| (s.key.clone(), s)).collect();
        move |key: &str| -> Result<Option<State>, StateError> { Ok(map.get(key).cloned()) }
    }

    fn account(address: Address) -> State {
        State::new(
            account_state_key(&address),
            StateValue::Account(AccountStateValue::new(address)),
            0,
            vec![],
        )
    }

    fn contract_account(address: Address, owner: Address) -> State {
        State::new(
            contract_account_state_key(&address),
            StateValue::ContractAccount(ContractAccountStateValue::new(owner)),
            0,
            vec![],
        )
    }

    #[test]
    fn test_exists_state_labels_missing_key() {
        let reader = reader_with(vec![]);
        assert_eq!(
            exists_state("k", "design", &reader),
            Err(StateError::NotFound {
                name: "design".into(),
                key: "k".into()
            })
        );
    }

    #[test]
    fn test_check_not_exists_state() {
        let reader = reader_with(vec![account(addr(1))]);
        assert!(check_not_exists_state(&account_state_key(&addr(2)), &reader).is_ok());
        assert!(matches!(
            check_not_exists_state(&account_state_key(&addr(1)), &reader),
            Err(StateError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn test_exists_c_account_rejects_contract() {
        let reader = reader_with(vec![account(addr(1)), contract_account(addr(1), addr(2))]);
        let err = exists_c_account(&addr(1), "receiver", false, false, &reader).unwrap_err();
        assert_eq!(err.to_string(), format!("receiver {} is contract account", addr(1)));
    }

    #[test]
    fn test_exists_c_account_requires_account() {
        let reader = reader_with(vec![]);
        assert!(exists_c_account(&addr(3), "receiver", false, false, &reader).is_ok());
        assert!(matches!(
            exists_c_account(&addr(3), "target", true, false, &reader),
            Err(AccountCheckError::AccountNotFound { .. })
        ));
    }

    #[test]
    fn test_exists_c_account_returns_contract_record() {
        let reader = reader_with(vec![account(addr(1)), contract_account(addr(1), addr(2))]);
        let record = exists_c_account(&addr(1), "contract", true, true, &reader)
            .unwrap()
            .unwrap();
        assert_eq!(record.owner(), &addr(2));
    }

    #[test]
    fn test_create_not_exist_account() {
        let reader = reader_with(vec![account(addr(1))]);
        assert!(create_not_exist_account(&addr(1), &reader).unwrap().is_none());
        let smv = create_not_exist_account(&addr(2), &reader).unwrap().unwrap();
        assert_eq!(smv.key(), account_state_key(&addr(2)));
    }
}
