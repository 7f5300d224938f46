//! RegisterModel: creates a token on a contract account owned by the sender.

use shared_types::{contract_account_state_key, Height};
use tracing::debug;

use super::errors::{ProcessError, ReasonError};
use super::{expect_fact, OperationProcessor};
use crate::domain::{Design, Policy};
use crate::operation::{Operation, OperationKind};
use crate::ports::outbound::StateReader;
use crate::state::{
    exists_c_account, state_contract_account_value, DesignStateValue, StateKeyGenerator,
    StateMergeValue, StateValue,
};

/// Processor for `RegisterModel` operations.
#[derive(Debug, Clone, Copy)]
pub struct RegisterModelProcessor {
    height: Height,
}

impl RegisterModelProcessor {
    #[must_use]
    pub const fn new(height: Height) -> Self {
        Self { height }
    }

    /// [`GetNewProcessor`](super::GetNewProcessor) constructor.
    #[must_use]
    pub fn new_processor(height: Height) -> Box<dyn OperationProcessor> {
        Box::new(Self::new(height))
    }
}

impl OperationProcessor for RegisterModelProcessor {
    fn kind(&self) -> OperationKind {
        OperationKind::RegisterModel
    }

    fn height(&self) -> Height {
        self.height
    }

    fn pre_process(&self, op: &Operation, reader: &dyn StateReader) -> Result<(), ProcessError> {
        let fact = expect_fact!(op, RegisterModel)?;
        fact.is_valid()?;

        let contract = *fact.contract();
        let g = StateKeyGenerator::new(contract);
        if reader.get_state(&g.design())?.is_some() {
            return Err(ReasonError::ServiceExists(contract).into());
        }

        let record = exists_c_account(&contract, "contract", true, true, reader)?
            .ok_or(ReasonError::ContractAccountNotFound(contract))?;
        if record.owner() != fact.sender() {
            return Err(ReasonError::NotContractOwner {
                sender: *fact.sender(),
                contract,
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
        let fact = expect_fact!(op, RegisterModel)?;
        let contract = *fact.contract();
        let g = StateKeyGenerator::new(contract);

        let policy = Policy::new(fact.initial_supply(), vec![]);
        policy.is_valid()?;
        let design = Design::new(fact.symbol().clone(), fact.name(), fact.decimal(), policy);
        design.is_valid()?;

        let ca_key = contract_account_state_key(&contract);
        let st = reader
            .get_state(&ca_key)?
            .ok_or(ReasonError::ContractAccountNotFound(contract))?;
        let mut record = state_contract_account_value(&st)?;
        record.set_active(true);
        record.set_register_operation(op.hint().clone());

        let mut values = vec![
            StateMergeValue::new(g.design(), StateValue::Design(DesignStateValue::new(design))),
            StateMergeValue::new(ca_key, StateValue::ContractAccount(record)),
        ];

        if !fact.initial_supply().is_zero() {
            values.push(StateMergeValue::add_balance(
                g.token_balance(fact.sender()),
                fact.initial_supply(),
            ));
        }

        debug!(
            height = self.height,
            contract = %contract,
            symbol = %fact.symbol().as_str(),
            initial_supply = %fact.initial_supply(),
            "token model registered"
        );

        Ok(values)
    }
}
