use std::collections::BTreeMap;

use shared_types::{Address, Amount};

use super::errors::{ProcessError, ReasonError};
use crate::ports::outbound::StateReader;
use crate::state::{state_token_balance_value, StateKeyGenerator};

/// Checks that `holder` can cover `required` (contract → amount) and returns
/// the debit per balance key.
///
/// Fails on the first contract without a design, without a balance for
/// `holder`, or whose balance is below the required amount.
pub fn prepare_sender_total_amounts(
    holder: &Address,
    required: &BTreeMap<Address, Amount>,
    reader: &dyn StateReader,
) -> Result<BTreeMap<String, Amount>, ProcessError> {
    let mut totals = BTreeMap::new();

    for (contract, amount) in required {
        let g = StateKeyGenerator::new(*contract);

        if reader.get_state(&g.design())?.is_none() {
            return Err(ReasonError::ServiceNotFound(*contract).into());
        }

        let key = g.token_balance(holder);
        let st = reader
            .get_state(&key)?
            .ok_or(ReasonError::BalanceNotFound {
                holder: *holder,
                contract: *contract,
            })?;
        let balance = state_token_balance_value(&st)?;

        if balance < *amount {
            return Err(ReasonError::InsufficientHolderBalance {
                holder: *holder,
                contract: *contract,
                balance,
                amount: *amount,
            }
            .into());
        }

        totals.insert(key, *amount);
    }

    Ok(totals)
}

/// Adds `amount` to `map[key]`.
pub(crate) fn accumulate(
    map: &mut BTreeMap<Address, Amount>,
    key: Address,
    amount: Amount,
) -> Result<(), ReasonError> {
    let entry = map.entry(key).or_insert_with(Amount::zero);
    *entry = entry.checked_add(amount).ok_or_else(|| {
        ReasonError::AmountOverflow(format!("required amount in contract account {key}"))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStateDb;
    use crate::domain::{Design, Policy, TokenSymbol};
    use crate::ports::outbound::StateStore;
    use crate::state::{DesignStateValue, StateMergeValue, StateValue};
    use shared_types::Hash;

    fn addr(b: u8) -> Address {
        Address::new([b; 20])
    }

    fn store_with_balance(contract: Address, holder: Address, amount: u64) -> InMemoryStateDb {
        let db = InMemoryStateDb::new();
        let g = StateKeyGenerator::new(contract);
        let design = Design::new(
            TokenSymbol::new("ABC").unwrap(),
            "Alpha",
            Amount::zero(),
            Policy::new(Amount::from(amount), vec![]),
        );
        db.commit(
            1,
            &[
                (
                    Hash::ZERO,
                    StateMergeValue::new(
                        g.design(),
                        StateValue::Design(DesignStateValue::new(design)),
                    ),
                ),
                (
                    Hash::ZERO,
                    StateMergeValue::add_balance(g.token_balance(&holder), Amount::from(amount)),
                ),
            ],
        )
        .unwrap();
        db
    }

    #[test]
    fn test_totals_keyed_by_balance_key() {
        let db = store_with_balance(addr(9), addr(1), 100);
        let required = BTreeMap::from([(addr(9), Amount::from(60))]);

        let totals = prepare_sender_total_amounts(&addr(1), &required, &db).unwrap();

        let key = StateKeyGenerator::new(addr(9)).token_balance(&addr(1));
        assert_eq!(totals, BTreeMap::from([(key, Amount::from(60))]));
    }

    #[test]
    fn test_insufficient_balance() {
        let db = store_with_balance(addr(9), addr(1), 100);
        let required = BTreeMap::from([(addr(9), Amount::from(101))]);

        let err = prepare_sender_total_amounts(&addr(1), &required, &db).unwrap_err();

        assert_eq!(
            err,
            ProcessError::Reason(ReasonError::InsufficientHolderBalance {
                holder: addr(1),
                contract: addr(9),
                balance: Amount::from(100),
                amount: Amount::from(101),
            })
        );
    }

    #[test]
    fn test_unknown_contract_and_holder() {
        let db = store_with_balance(addr(9), addr(1), 100);

        let unknown_contract = BTreeMap::from([(addr(8), Amount::one())]);
        assert_eq!(
            prepare_sender_total_amounts(&addr(1), &unknown_contract, &db).unwrap_err(),
            ProcessError::Reason(ReasonError::ServiceNotFound(addr(8)))
        );

        let known = BTreeMap::from([(addr(9), Amount::one())]);
        assert!(matches!(
            prepare_sender_total_amounts(&addr(2), &known, &db).unwrap_err(),
            ProcessError::Reason(ReasonError::BalanceNotFound { .. })
        ));
    }

    #[test]
    fn test_accumulate_sums() {
        let mut map = BTreeMap::new();
        accumulate(&mut map, addr(1), Amount::from(2)).unwrap();
        accumulate(&mut map, addr(1), Amount::from(3)).unwrap();
        assert_eq!(map[&addr(1)], Amount::from(5));
        assert!(accumulate(&mut map, addr(1), Amount::MAX).is_err());
    }
}
