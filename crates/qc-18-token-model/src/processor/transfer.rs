//! Transfer: moves balance from the sender to one or more receivers.
//!
//! Items write disjoint receiver keys, so they are checked and processed in
//! parallel. The sender's debit is computed once per contract afterwards.

use std::collections::BTreeMap;

use rayon::prelude::*;
use shared_types::{Address, Amount, Height};
use tracing::debug;

use super::amounts::{accumulate, prepare_sender_total_amounts};
use super::errors::ProcessError;
use super::{expect_fact, OperationProcessor};
use crate::operation::{Operation, OperationKind, TransferItem};
use crate::ports::outbound::StateReader;
use crate::state::{
    create_not_exist_account, exists_c_account, state_token_balance_value, StateKeyGenerator,
    StateMergeValue,
};

/// Per-item rules of a transfer. Shared across worker threads.
pub struct TransferItemProcessor<'a> {
    reader: &'a dyn StateReader,
}

impl<'a> TransferItemProcessor<'a> {
    #[must_use]
    pub fn new(reader: &'a dyn StateReader) -> Self {
        Self { reader }
    }

    pub fn pre_process(&self, item: &TransferItem) -> Result<(), ProcessError> {
        item.is_valid()?;
        exists_c_account(item.receiver(), "receiver", false, false, self.reader)?;
        Ok(())
    }

    /// Receiver account creation (if needed) and credit.
    pub fn process(&self, item: &TransferItem) -> Result<Vec<StateMergeValue>, ProcessError> {
        let mut values = Vec::with_capacity(2);
        if let Some(account) = create_not_exist_account(item.receiver(), self.reader)? {
            values.push(account);
        }

        let key = StateKeyGenerator::new(*item.contract()).token_balance(item.receiver());
        if let Some(st) = self.reader.get_state(&key)? {
            state_token_balance_value(&st)?;
        }
        values.push(StateMergeValue::add_balance(key, item.amount()));

        Ok(values)
    }
}

/// Sum of item amounts per contract.
fn required_amounts(items: &[TransferItem]) -> Result<BTreeMap<Address, Amount>, ProcessError> {
    let mut required = BTreeMap::new();
    for item in items {
        accumulate(&mut required, *item.contract(), item.amount())?;
    }
    Ok(required)
}

/// Processor for `Transfer` operations.
#[derive(Debug, Clone, Copy)]
pub struct TransferProcessor {
    height: Height,
}

impl TransferProcessor {
    #[must_use]
    pub const fn new(height: Height) -> Self {
        Self { height }
    }

    #[must_use]
    pub fn new_processor(height: Height) -> Box<dyn OperationProcessor> {
        Box::new(Self::new(height))
    }
}

impl OperationProcessor for TransferProcessor {
    fn kind(&self) -> OperationKind {
        OperationKind::Transfer
    }

    fn height(&self) -> Height {
        self.height
    }

    fn pre_process(&self, op: &Operation, reader: &dyn StateReader) -> Result<(), ProcessError> {
        let fact = expect_fact!(op, Transfer)?;
        fact.is_valid()?;

        let required = required_amounts(fact.items())?;
        prepare_sender_total_amounts(fact.sender(), &required, reader)?;

        let ip = TransferItemProcessor::new(reader);
        fact.items()
            .par_iter()
            .try_for_each(|item| ip.pre_process(item))
    }

    fn process(
        &self,
        op: &Operation,
        reader: &dyn StateReader,
    ) -> Result<Vec<StateMergeValue>, ProcessError> {
        let fact = expect_fact!(op, Transfer)?;

        let ip = TransferItemProcessor::new(reader);
        let credits: Vec<Vec<StateMergeValue>> = fact
            .items()
            .par_iter()
            .map(|item| ip.process(item))
            .collect::<Result<_, _>>()?;
        let mut values: Vec<StateMergeValue> = credits.into_iter().flatten().collect();

        let required = required_amounts(fact.items())?;
        let totals = prepare_sender_total_amounts(fact.sender(), &required, reader)?;
        values.extend(
            totals
                .into_iter()
                .map(|(key, amount)| StateMergeValue::deduct_balance(key, amount)),
        );

        debug!(
            height = self.height,
            sender = %fact.sender(),
            items = fact.items().len(),
            contracts = required.len(),
            "transfer processed"
        );

        Ok(values)
    }
}
