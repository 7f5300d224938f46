//! Burn: lowers total supply and debits the sender's own balance.

use shared_types::Height;
use tracing::debug;

use super::errors::{ProcessError, ReasonError};
use super::{admitted_design, expect_fact, processed_design, OperationProcessor};
use crate::operation::{Operation, OperationKind};
use crate::ports::outbound::StateReader;
use crate::state::{
    state_token_balance_value, DesignStateValue, StateKeyGenerator, StateMergeValue, StateValue,
};

/// Processor for `Burn` operations.
#[derive(Debug, Clone, Copy)]
pub struct BurnProcessor {
    height: Height,
}

impl BurnProcessor {
    #[must_use]
    pub const fn new(height: Height) -> Self {
        Self { height }
    }

    #[must_use]
    pub fn new_processor(height: Height) -> Box<dyn OperationProcessor> {
        Box::new(Self::new(height))
    }
}

impl OperationProcessor for BurnProcessor {
    fn kind(&self) -> OperationKind {
        OperationKind::Burn
    }

    fn height(&self) -> Height {
        self.height
    }

    fn pre_process(&self, op: &Operation, reader: &dyn StateReader) -> Result<(), ProcessError> {
        let fact = expect_fact!(op, Burn)?;
        fact.is_valid()?;

        let (target, contract) = (*fact.target(), *fact.contract());
        if fact.sender() != &target {
            return Err(ReasonError::NotTokenOwner { target, contract }.into());
        }

        admitted_design(&contract, reader)?;

        let key = StateKeyGenerator::new(contract).token_balance(&target);
        let st = reader
            .get_state(&key)?
            .ok_or(ReasonError::BalanceNotFound {
                holder: target,
                contract,
            })?;
        let balance = state_token_balance_value(&st)?;
        if balance < fact.amount() {
            return Err(ReasonError::InsufficientBurnBalance {
                target,
                contract,
                balance,
                amount: fact.amount(),
            }
            .into());
        }

        Ok(())
    }

    fn process(
        &self,
        op: &Operation,
        reader: &dyn StateReader,
    ) -> Result<Vec<StateMergeValue>, ProcessError> {
        let fact = expect_fact!(op, Burn)?;
        let contract = *fact.contract();
        let g = StateKeyGenerator::new(contract);

        let design = processed_design(&contract, reader)?;
        let total = design
            .policy()
            .total_supply()
            .checked_sub(fact.amount())
            .ok_or(ReasonError::SupplyUnderflow(contract))?;
        let policy = design.policy().with_total_supply(total);
        policy.is_valid()?;
        let design = design.with_policy(policy);
        design.is_valid()?;

        debug!(
            height = self.height,
            contract = %contract,
            target = %fact.target(),
            amount = %fact.amount(),
            total_supply = %total,
            "token burned"
        );

        Ok(vec![
            StateMergeValue::new(g.design(), StateValue::Design(DesignStateValue::new(design))),
            StateMergeValue::deduct_balance(g.token_balance(fact.target()), fact.amount()),
        ])
    }
}
