//! Store fixtures for unit tests.

use shared_types::{Address, Amount, Hash};

use super::InMemoryStateDb;
use crate::domain::{Design, Policy, TokenSymbol};
use crate::ports::outbound::StateStore;
use crate::state::{DesignStateValue, StateKeyGenerator, StateMergeValue, StateValue};

/// Token `ABC` on `contract` owned by `holder`, who holds the whole `supply`.
pub(crate) fn with_token(contract: Address, holder: Address, supply: u64) -> InMemoryStateDb {
    let db = InMemoryStateDb::new();
    db.seed_account(holder).unwrap();
    db.seed_contract_account(contract, holder).unwrap();

    let g = StateKeyGenerator::new(contract);
    let design = Design::new(
        TokenSymbol::new("ABC").unwrap(),
        "Alpha",
        Amount::zero(),
        Policy::new(Amount::from(supply), vec![]),
    );
    db.commit(
        1,
        &[
            (
                Hash::ZERO,
                StateMergeValue::new(g.design(), StateValue::Design(DesignStateValue::new(design))),
            ),
            (
                Hash::ZERO,
                StateMergeValue::add_balance(g.token_balance(&holder), Amount::from(supply)),
            ),
        ],
    )
    .unwrap();
    db
}
