//! TransferFrom: the sender spends allowances granted by targets.
//!
//! Amounts are aggregated per `(target, contract)`. The aggregate is checked
//! against both the target's balance and the sender's allowance, so several
//! items may draw on one allowance.

use std::collections::BTreeMap;

use shared_types::{Address, Amount, Height};
use tracing::debug;

use super::amounts::{accumulate, prepare_sender_total_amounts};
use super::errors::{ProcessError, ReasonError};
use super::{admitted_design, expect_fact, processed_design, OperationProcessor};
use crate::domain::{ApproveInfo, Design};
use crate::operation::{Operation, OperationKind, TransferFromItem};
use crate::ports::outbound::StateReader;
use crate::state::{
    create_not_exist_account, exists_c_account, state_token_balance_value, DesignStateValue,
    StateKeyGenerator, StateMergeValue, StateValue,
};

/// `target → contract → amount`
type RequiredAmounts = BTreeMap<Address, BTreeMap<Address, Amount>>;

fn required_amounts(items: &[TransferFromItem]) -> Result<RequiredAmounts, ProcessError> {
    let mut required = RequiredAmounts::new();
    for item in items {
        accumulate(
            required.entry(*item.target()).or_default(),
            *item.contract(),
            item.amount(),
        )?;
    }
    Ok(required)
}

/// Per-item rules of a transfer-from. Lives for one call.
pub struct TransferFromItemProcessor<'a> {
    sender: &'a Address,
    reader: &'a dyn StateReader,
}

impl<'a> TransferFromItemProcessor<'a> {
    #[must_use]
    pub fn new(sender: &'a Address, reader: &'a dyn StateReader) -> Self {
        Self { sender, reader }
    }

    /// `spent` is what the whole operation draws from this item's
    /// `(target, contract)` allowance. The target's balance is checked
    /// against the same total by [`prepare_sender_total_amounts`].
    pub fn pre_process(
        &self,
        item: &TransferFromItem,
        design: &Design,
        spent: Amount,
    ) -> Result<(), ProcessError> {
        item.is_valid()?;

        let (contract, target) = (*item.contract(), *item.target());
        exists_c_account(item.receiver(), "receiver", false, false, self.reader)?;
        exists_c_account(&target, "target", true, false, self.reader)?;

        let approved = self.allowance(design, item)?;
        if approved.amount() < spent {
            return Err(ReasonError::InsufficientAllowance {
                sender: *self.sender,
                contract,
                approved: approved.amount(),
                amount: spent,
            }
            .into());
        }

        Ok(())
    }

    /// Spends the allowance on `design` and credits the receiver.
    pub fn process(
        &self,
        item: &TransferFromItem,
        design: &mut Design,
    ) -> Result<Vec<StateMergeValue>, ProcessError> {
        let contract = *item.contract();
        let approved = self.allowance(design, item)?;
        let left = approved.amount().checked_sub(item.amount()).ok_or(
            ReasonError::InsufficientAllowance {
                sender: *self.sender,
                contract,
                approved: approved.amount(),
                amount: item.amount(),
            },
        )?;

        let mut policy = design.policy().clone();
        let mut apb = policy
            .get_approve_box(item.target())
            .cloned()
            .ok_or(ReasonError::TargetNotApproved {
                target: *item.target(),
                contract,
            })?;
        if left.is_zero() {
            apb.remove_approve_info(self.sender)?;
        } else {
            apb.set_approve_info(ApproveInfo::new(*self.sender, left));
        }
        policy.merge_approve_box(apb);
        policy.is_valid()?;
        *design = design.with_policy(policy);
        design.is_valid()?;

        let mut values = Vec::with_capacity(2);
        if let Some(account) = create_not_exist_account(item.receiver(), self.reader)? {
            values.push(account);
        }
        let key = StateKeyGenerator::new(contract).token_balance(item.receiver());
        if let Some(st) = self.reader.get_state(&key)? {
            state_token_balance_value(&st)?;
        }
        values.push(StateMergeValue::add_balance(key, item.amount()));

        Ok(values)
    }

    fn allowance(
        &self,
        design: &Design,
        item: &TransferFromItem,
    ) -> Result<ApproveInfo, ReasonError> {
        let (contract, target) = (*item.contract(), *item.target());
        let apb = design
            .policy()
            .get_approve_box(&target)
            .ok_or(ReasonError::TargetNotApproved { target, contract })?;
        apb.get_approve_info(self.sender)
            .cloned()
            .ok_or(ReasonError::SenderNotApproved {
                sender: *self.sender,
                target,
                contract,
            })
    }
}

/// Processor for `TransferFrom` operations.
#[derive(Debug, Clone, Copy)]
pub struct TransferFromProcessor {
    height: Height,
}

impl TransferFromProcessor {
    #[must_use]
    pub const fn new(height: Height) -> Self {
        Self { height }
    }

    #[must_use]
    pub fn new_processor(height: Height) -> Box<dyn OperationProcessor> {
        Box::new(Self::new(height))
    }
}

impl OperationProcessor for TransferFromProcessor {
    fn kind(&self) -> OperationKind {
        OperationKind::TransferFrom
    }

    fn height(&self) -> Height {
        self.height
    }

    fn pre_process(&self, op: &Operation, reader: &dyn StateReader) -> Result<(), ProcessError> {
        let fact = expect_fact!(op, TransferFrom)?;
        fact.is_valid()?;

        let required = required_amounts(fact.items())?;
        for (target, per_contract) in &required {
            prepare_sender_total_amounts(target, per_contract, reader)?;
        }

        let mut designs: BTreeMap<Address, Design> = BTreeMap::new();
        let ip = TransferFromItemProcessor::new(fact.sender(), reader);
        for item in fact.items() {
            if !designs.contains_key(item.contract()) {
                designs.insert(*item.contract(), admitted_design(item.contract(), reader)?);
            }
            let design = &designs[item.contract()];
            let spent = required
                .get(item.target())
                .and_then(|m| m.get(item.contract()))
                .copied()
                .unwrap_or_else(|| item.amount());
            ip.pre_process(item, design, spent)?;
        }

        Ok(())
    }

    fn process(
        &self,
        op: &Operation,
        reader: &dyn StateReader,
    ) -> Result<Vec<StateMergeValue>, ProcessError> {
        let fact = expect_fact!(op, TransferFrom)?;

        let mut designs: BTreeMap<Address, Design> = BTreeMap::new();
        for item in fact.items() {
            if !designs.contains_key(item.contract()) {
                designs.insert(*item.contract(), processed_design(item.contract(), reader)?);
            }
        }

        let ip = TransferFromItemProcessor::new(fact.sender(), reader);
        let mut values = Vec::new();
        for item in fact.items() {
            let design = designs.get_mut(item.contract()).ok_or_else(|| {
                ProcessError::Precondition(format!("design of {} not loaded", item.contract()))
            })?;
            values.extend(ip.process(item, design)?);
        }

        let contracts = designs.len();
        values.extend(designs.into_iter().map(|(contract, design)| {
            StateMergeValue::new(
                StateKeyGenerator::new(contract).design(),
                StateValue::Design(DesignStateValue::new(design)),
            )
        }));

        let required = required_amounts(fact.items())?;
        for (target, per_contract) in &required {
            let totals = prepare_sender_total_amounts(target, per_contract, reader)?;
            values.extend(
                totals
                    .into_iter()
                    .map(|(key, amount)| StateMergeValue::deduct_balance(key, amount)),
            );
        }

        debug!(
            height = self.height,
            sender = %fact.sender(),
            items = fact.items().len(),
            contracts,
            targets = required.len(),
            "allowances spent"
        );

        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::testing::with_token;
    use crate::adapters::InMemoryStateDb;
    use crate::operation::{ApproveFact, ApproveItem, TransferFromFact};
    use crate::ports::outbound::StateStore;
    use crate::processor::ApproveProcessor;
    use crate::state::{AccountCheckError, DeductTokenBalanceStateValue};
    use shared_types::{CurrencyId, Hash};

    fn addr(b: u8) -> Address {
        Address::new([b; 20])
    }

    fn qct() -> CurrencyId {
        CurrencyId::new("QCT").unwrap()
    }

    /// Token on 9 held by 1 (100), with 1 approving 2 for `allowance`.
    fn approved_store(allowance: u64) -> InMemoryStateDb {
        let db = with_token(addr(9), addr(1), 100);
        db.seed_account(addr(2)).unwrap();
        let op = Operation::new(ApproveFact::new(
            b"a".to_vec(),
            addr(1),
            vec![ApproveItem::new(addr(9), addr(2), Amount::from(allowance), qct())],
        ));
        let values = ApproveProcessor::new(1).process(&op, &db).unwrap();
        let tagged: Vec<_> = values.into_iter().map(|v| (op.fact().hash(), v)).collect();
        db.commit(1, &tagged).unwrap();
        db
    }

    fn item(receiver: u8, amount: u64) -> TransferFromItem {
        TransferFromItem::new(addr(9), addr(receiver), addr(1), Amount::from(amount), qct())
    }

    fn transfer_from_op(items: Vec<TransferFromItem>) -> Operation {
        Operation::new(TransferFromFact::new(b"f".to_vec(), addr(2), items))
    }

    #[test]
    fn test_spending_full_allowance_removes_it() {
        let db = approved_store(40);
        let op = transfer_from_op(vec![item(3, 40)]);
        let p = TransferFromProcessor::new(2);

        p.pre_process(&op, &db).unwrap();
        let values = p.process(&op, &db).unwrap();

        let design = values
            .iter()
            .find_map(|v| match v.value() {
                StateValue::Design(d) => Some(d.design().clone()),
                _ => None,
            })
            .unwrap();
        let apb = design.policy().get_approve_box(&addr(1)).unwrap();
        assert!(apb.get_approve_info(&addr(2)).is_none());

        let deduct = values.last().unwrap();
        assert_eq!(deduct.key(), StateKeyGenerator::new(addr(9)).token_balance(&addr(1)));
        assert_eq!(
            deduct.value(),
            &StateValue::DeductTokenBalance(DeductTokenBalanceStateValue::new(Amount::from(40)))
        );
    }

    #[test]
    fn test_partial_spend_keeps_remainder() {
        let db = approved_store(40);
        let sender = addr(2);
        let ip = TransferFromItemProcessor::new(&sender, &db);
        let mut design = processed_design(&addr(9), &db).unwrap();

        ip.process(&item(3, 15), &mut design).unwrap();

        let apb = design.policy().get_approve_box(&addr(1)).unwrap();
        assert_eq!(apb.get_approve_info(&addr(2)).unwrap().amount(), Amount::from(25));
    }

    #[test]
    fn test_items_share_one_allowance() {
        let db = approved_store(40);
        let op = transfer_from_op(vec![item(3, 30), item(4, 30)]);

        let err = TransferFromProcessor::new(2).pre_process(&op, &db).unwrap_err();

        assert_eq!(
            err,
            ProcessError::Reason(ReasonError::InsufficientAllowance {
                sender: addr(2),
                contract: addr(9),
                approved: Amount::from(40),
                amount: Amount::from(60),
            })
        );
    }

    #[test]
    fn test_unapproved_sender_rejected() {
        let db = approved_store(40);
        let op = Operation::new(TransferFromFact::new(
            b"f".to_vec(),
            addr(5),
            vec![TransferFromItem::new(addr(9), addr(3), addr(1), Amount::from(1), qct())],
        ));

        let err = TransferFromProcessor::new(2).pre_process(&op, &db).unwrap_err();

        assert_eq!(
            err,
            ProcessError::Reason(ReasonError::SenderNotApproved {
                sender: addr(5),
                target: addr(1),
                contract: addr(9),
            })
        );
    }

    #[test]
    fn test_target_balance_checked_against_total() {
        let db = approved_store(200);
        let op = transfer_from_op(vec![item(3, 60), item(4, 60)]);

        let err = TransferFromProcessor::new(2).pre_process(&op, &db).unwrap_err();

        assert_eq!(
            err,
            ProcessError::Reason(ReasonError::InsufficientHolderBalance {
                holder: addr(1),
                contract: addr(9),
                balance: Amount::from(100),
                amount: Amount::from(120),
            })
        );
    }

    #[test]
    fn test_contract_receiver_rejected() {
        let db = approved_store(40);
        let op = transfer_from_op(vec![item(9, 10)]);

        let err = TransferFromProcessor::new(2).pre_process(&op, &db).unwrap_err();

        assert_eq!(err.to_string(), format!("receiver {} is contract account", addr(9)));
        assert_eq!(
            err,
            ProcessError::Reason(ReasonError::Account(AccountCheckError::ContractAccount {
                label: "receiver",
                address: addr(9),
            }))
        );
    }

    #[test]
    fn test_contract_target_rejected() {
        let db = approved_store(40);
        db.seed_contract_account(addr(7), addr(1)).unwrap();
        let key = StateKeyGenerator::new(addr(9)).token_balance(&addr(7));
        db.commit(2, &[(Hash::ZERO, StateMergeValue::add_balance(key, Amount::from(50)))])
            .unwrap();
        let spend = TransferFromItem::new(addr(9), addr(3), addr(7), Amount::from(10), qct());
        let op = transfer_from_op(vec![spend]);

        let err = TransferFromProcessor::new(3).pre_process(&op, &db).unwrap_err();

        assert_eq!(err.to_string(), format!("target {} is contract account", addr(7)));
    }

    #[test]
    fn test_target_without_approvals_rejected() {
        let db = with_token(addr(9), addr(1), 100);
        let op = transfer_from_op(vec![item(3, 1)]);

        let err = TransferFromProcessor::new(2).pre_process(&op, &db).unwrap_err();

        assert!(matches!(
            err,
            ProcessError::Reason(ReasonError::TargetNotApproved { .. })
        ));
    }
}
