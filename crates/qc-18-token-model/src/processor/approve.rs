//! Approve: grants, raises or revokes allowances.
//!
//! Allowances are cumulative. Approving `x` for a spender that already holds
//! `y` leaves `x + y`; approving `0` revokes the entry.

use std::collections::BTreeMap;

use shared_types::{Address, Height};
use tracing::debug;

use super::errors::{ProcessError, ReasonError};
use super::{admitted_design, expect_fact, processed_design, OperationProcessor};
use crate::domain::{ApproveBox, ApproveInfo, Design};
use crate::operation::{ApproveItem, Operation, OperationKind};
use crate::ports::outbound::StateReader;
use crate::state::{
    create_not_exist_account, exists_c_account, DesignStateValue, StateKeyGenerator,
    StateMergeValue, StateValue,
};

/// Per-item rules of an approve operation. Lives for one call.
pub struct ApproveItemProcessor<'a> {
    sender: &'a Address,
    reader: &'a dyn StateReader,
}

impl<'a> ApproveItemProcessor<'a> {
    #[must_use]
    pub fn new(sender: &'a Address, reader: &'a dyn StateReader) -> Self {
        Self { sender, reader }
    }

    pub fn pre_process(&self, item: &ApproveItem) -> Result<(), ProcessError> {
        item.is_valid()?;

        exists_c_account(item.approved(), "approved", false, false, self.reader)?;
        let design = admitted_design(item.contract(), self.reader)?;

        if item.amount().is_zero() {
            match design.policy().get_approve_box(self.sender) {
                None => return Err(ReasonError::NotApprovedAny(*self.sender).into()),
                Some(apb) if apb.get_approve_info(item.approved()).is_none() => {
                    return Err(ReasonError::ApprovedNotApproved(*item.approved()).into());
                }
                Some(_) => {}
            }
        }

        let key = StateKeyGenerator::new(*item.contract()).token_balance(self.sender);
        if self.reader.get_state(&key)?.is_none() {
            return Err(ReasonError::SenderBalanceNotFound {
                sender: *self.sender,
                contract: *item.contract(),
            }
            .into());
        }

        Ok(())
    }

    /// Applies `item` to `design`, the working copy of its contract's design.
    ///
    /// Returns the approved account's creation, if it has no account yet.
    pub fn process(
        &self,
        item: &ApproveItem,
        design: &mut Design,
    ) -> Result<Vec<StateMergeValue>, ProcessError> {
        let mut values = Vec::new();
        if let Some(account) = create_not_exist_account(item.approved(), self.reader)? {
            values.push(account);
        }

        let mut policy = design.policy().clone();
        let apb = match policy.get_approve_box(self.sender).cloned() {
            None if item.amount().is_zero() => {
                return Err(ReasonError::NotApprovedAny(*self.sender).into());
            }
            None => ApproveBox::new(
                *self.sender,
                vec![ApproveInfo::new(*item.approved(), item.amount())],
            ),
            Some(mut apb) => {
                if item.amount().is_zero() {
                    apb.remove_approve_info(item.approved())?;
                } else {
                    let amount = match apb.get_approve_info(item.approved()) {
                        Some(info) => info.amount().checked_add(item.amount()).ok_or_else(|| {
                            ReasonError::AmountOverflow(format!(
                                "allowance of {} from {}",
                                item.approved(),
                                self.sender
                            ))
                        })?,
                        None => item.amount(),
                    };
                    apb.set_approve_info(ApproveInfo::new(*item.approved(), amount));
                }
                apb
            }
        };
        apb.is_valid()?;

        policy.merge_approve_box(apb);
        policy.is_valid()?;
        *design = design.with_policy(policy);
        design.is_valid()?;

        Ok(values)
    }
}

/// Processor for `Approve` operations.
#[derive(Debug, Clone, Copy)]
pub struct ApproveProcessor {
    height: Height,
}

impl ApproveProcessor {
    #[must_use]
    pub const fn new(height: Height) -> Self {
        Self { height }
    }

    #[must_use]
    pub fn new_processor(height: Height) -> Box<dyn OperationProcessor> {
        Box::new(Self::new(height))
    }
}

impl OperationProcessor for ApproveProcessor {
    fn kind(&self) -> OperationKind {
        OperationKind::Approve
    }

    fn height(&self) -> Height {
        self.height
    }

    fn pre_process(&self, op: &Operation, reader: &dyn StateReader) -> Result<(), ProcessError> {
        let fact = expect_fact!(op, Approve)?;
        fact.is_valid()?;

        let ip = ApproveItemProcessor::new(fact.sender(), reader);
        for item in fact.items() {
            ip.pre_process(item)?;
        }

        Ok(())
    }

    fn process(
        &self,
        op: &Operation,
        reader: &dyn StateReader,
    ) -> Result<Vec<StateMergeValue>, ProcessError> {
        let fact = expect_fact!(op, Approve)?;

        let mut designs: BTreeMap<Address, Design> = BTreeMap::new();
        for item in fact.items() {
            if !designs.contains_key(item.contract()) {
                designs.insert(*item.contract(), processed_design(item.contract(), reader)?);
            }
        }

        let ip = ApproveItemProcessor::new(fact.sender(), reader);
        let mut values = Vec::new();
        for item in fact.items() {
            let design = designs.get_mut(item.contract()).ok_or_else(|| {
                ProcessError::Precondition(format!("design of {} not loaded", item.contract()))
            })?;
            values.extend(ip.process(item, design)?);
        }

        debug!(
            height = self.height,
            sender = %fact.sender(),
            items = fact.items().len(),
            contracts = designs.len(),
            "allowances updated"
        );

        values.extend(designs.into_iter().map(|(contract, design)| {
            StateMergeValue::new(
                StateKeyGenerator::new(contract).design(),
                StateValue::Design(DesignStateValue::new(design)),
            )
        }));

        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::testing::with_token;
    use crate::operation::ApproveFact;
    use crate::ports::outbound::StateStore;
    use crate::state::AccountCheckError;
    use shared_types::{Amount, CurrencyId};

    fn addr(b: u8) -> Address {
        Address::new([b; 20])
    }

    fn qct() -> CurrencyId {
        CurrencyId::new("QCT").unwrap()
    }

    fn item(approved: u8, amount: u64) -> ApproveItem {
        ApproveItem::new(addr(9), addr(approved), Amount::from(amount), qct())
    }

    fn approve_op(sender: Address, items: Vec<ApproveItem>) -> Operation {
        Operation::new(ApproveFact::new(b"a".to_vec(), sender, items))
    }

    fn design_of(values: &[StateMergeValue]) -> Design {
        values
            .iter()
            .find_map(|v| match v.value() {
                StateValue::Design(d) => Some(d.design().clone()),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_first_approve_creates_box() {
        let db = with_token(addr(9), addr(1), 100);
        let op = approve_op(addr(1), vec![item(2, 40)]);
        let p = ApproveProcessor::new(2);

        p.pre_process(&op, &db).unwrap();
        let design = design_of(&p.process(&op, &db).unwrap());

        let apb = design.policy().get_approve_box(&addr(1)).unwrap();
        assert_eq!(apb.get_approve_info(&addr(2)).unwrap().amount(), Amount::from(40));
    }

    #[test]
    fn test_approve_is_cumulative() {
        let ip_db = with_token(addr(9), addr(1), 100);
        let sender = addr(1);
        let ip = ApproveItemProcessor::new(&sender, &ip_db);
        let mut design = processed_design(&addr(9), &ip_db).unwrap();

        ip.process(&item(2, 40), &mut design).unwrap();
        ip.process(&item(2, 15), &mut design).unwrap();

        let apb = design.policy().get_approve_box(&addr(1)).unwrap();
        assert_eq!(apb.get_approve_info(&addr(2)).unwrap().amount(), Amount::from(55));
    }

    #[test]
    fn test_zero_amount_revokes() {
        let db = with_token(addr(9), addr(1), 100);
        let sender = addr(1);
        let ip = ApproveItemProcessor::new(&sender, &db);
        let mut design = processed_design(&addr(9), &db).unwrap();

        ip.process(&item(2, 40), &mut design).unwrap();
        ip.process(&item(2, 0), &mut design).unwrap();

        let apb = design.policy().get_approve_box(&addr(1)).unwrap();
        assert!(apb.get_approve_info(&addr(2)).is_none());
    }

    #[test]
    fn test_zero_amount_without_box_rejected() {
        let db = with_token(addr(9), addr(1), 100);

        let err = ApproveProcessor::new(2)
            .pre_process(&approve_op(addr(1), vec![item(2, 0)]), &db)
            .unwrap_err();

        assert_eq!(err.to_string(), format!("sender {} has not approved any accounts", addr(1)));
    }

    #[test]
    fn test_zero_amount_for_unknown_spender_rejected() {
        let db = with_token(addr(9), addr(1), 100);
        let grant = approve_op(addr(1), vec![item(2, 40)]);
        let values = ApproveProcessor::new(2).process(&grant, &db).unwrap();
        let tagged: Vec<_> = values.into_iter().map(|v| (grant.fact().hash(), v)).collect();
        db.commit(2, &tagged).unwrap();

        let err = ApproveProcessor::new(3)
            .pre_process(&approve_op(addr(1), vec![item(3, 0)]), &db)
            .unwrap_err();

        assert_eq!(err, ProcessError::Reason(ReasonError::ApprovedNotApproved(addr(3))));
        assert_eq!(err.to_string(), format!("approved account {} has not been approved", addr(3)));
    }

    #[test]
    fn test_contract_account_cannot_be_approved() {
        let db = with_token(addr(9), addr(1), 100);

        let err = ApproveProcessor::new(2)
            .pre_process(&approve_op(addr(1), vec![item(9, 10)]), &db)
            .unwrap_err();

        assert_eq!(
            err,
            ProcessError::Reason(ReasonError::Account(AccountCheckError::ContractAccount {
                label: "approved",
                address: addr(9),
            }))
        );
        assert_eq!(err.to_string(), format!("approved {} is contract account", addr(9)));
    }

    #[test]
    fn test_contract_without_design_rejected() {
        let db = with_token(addr(9), addr(1), 100);
        let other = ApproveItem::new(addr(8), addr(2), Amount::from(10), qct());

        let err = ApproveProcessor::new(2)
            .pre_process(&approve_op(addr(1), vec![other]), &db)
            .unwrap_err();

        assert_eq!(err, ProcessError::Reason(ReasonError::ServiceNotFound(addr(8))));
        assert_eq!(
            err.to_string(),
            format!("token service state for contract account {} not found", addr(8))
        );
    }

    #[test]
    fn test_sender_without_balance_rejected() {
        let db = with_token(addr(9), addr(1), 100);

        let err = ApproveProcessor::new(2)
            .pre_process(&approve_op(addr(5), vec![item(2, 10)]), &db)
            .unwrap_err();

        assert_eq!(
            err,
            ProcessError::Reason(ReasonError::SenderBalanceNotFound {
                sender: addr(5),
                contract: addr(9)
            })
        );
    }

    #[test]
    fn test_one_design_write_per_contract() {
        let db = with_token(addr(9), addr(1), 100);
        let op = approve_op(addr(1), vec![item(2, 10), item(3, 20)]);

        let values = ApproveProcessor::new(2).process(&op, &db).unwrap();

        let designs = values
            .iter()
            .filter(|v| matches!(v.value(), StateValue::Design(_)))
            .count();
        assert_eq!(designs, 1);
        assert_eq!(design_of(&values).policy().approve_list()[0].approved().len(), 2);
    }
}
