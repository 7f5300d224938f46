//! Mint: raises total supply and credits the receiver.

use shared_types::Height;
use tracing::debug;

use super::errors::{ProcessError, ReasonError};
use super::{admitted_design, expect_fact, processed_design, OperationProcessor};
use crate::operation::{Operation, OperationKind};
use crate::ports::outbound::StateReader;
use crate::state::{
    create_not_exist_account, exists_c_account, state_token_balance_value, DesignStateValue,
    StateKeyGenerator, StateMergeValue, StateValue,
};

/// Processor for `Mint` operations.
#[derive(Debug, Clone, Copy)]
pub struct MintProcessor {
    height: Height,
}

impl MintProcessor {
    #[must_use]
    pub const fn new(height: Height) -> Self {
        Self { height }
    }

    #[must_use]
    pub fn new_processor(height: Height) -> Box<dyn OperationProcessor> {
        Box::new(Self::new(height))
    }
}

impl OperationProcessor for MintProcessor {
    fn kind(&self) -> OperationKind {
        OperationKind::Mint
    }

    fn height(&self) -> Height {
        self.height
    }

    fn pre_process(&self, op: &Operation, reader: &dyn StateReader) -> Result<(), ProcessError> {
        let fact = expect_fact!(op, Mint)?;
        fact.is_valid()?;

        exists_c_account(fact.receiver(), "receiver", false, false, reader)?;
        admitted_design(fact.contract(), reader)?;

        Ok(())
    }

    fn process(
        &self,
        op: &Operation,
        reader: &dyn StateReader,
    ) -> Result<Vec<StateMergeValue>, ProcessError> {
        let fact = expect_fact!(op, Mint)?;
        let contract = *fact.contract();
        let g = StateKeyGenerator::new(contract);

        let design = processed_design(&contract, reader)?;
        let total = design
            .policy()
            .total_supply()
            .checked_add(fact.amount())
            .ok_or(ReasonError::SupplyOverflow(contract))?;
        let policy = design.policy().with_total_supply(total);
        policy.is_valid()?;
        let design = design.with_policy(policy);
        design.is_valid()?;

        let mut values = vec![StateMergeValue::new(
            g.design(),
            StateValue::Design(DesignStateValue::new(design)),
        )];

        if let Some(account) = create_not_exist_account(fact.receiver(), reader)? {
            values.push(account);
        }

        let balance_key = g.token_balance(fact.receiver());
        if let Some(st) = reader.get_state(&balance_key)? {
            state_token_balance_value(&st)?;
        }
        values.push(StateMergeValue::add_balance(balance_key, fact.amount()));

        debug!(
            height = self.height,
            contract = %contract,
            receiver = %fact.receiver(),
            amount = %fact.amount(),
            total_supply = %total,
            "token minted"
        );

        Ok(values)
    }
}
