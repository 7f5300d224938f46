//! Token policy: total supply and outstanding allowances.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use shared_types::{amount_bytes, decimal_amount, Address, Amount, Hint, ValidationError};

use super::approve::ApproveBox;
use super::errors::DomainError;

/// Mutable economic state of a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    #[serde(with = "decimal_amount")]
    total_supply: Amount,
    approve_list: Vec<ApproveBox>,
}

impl Policy {
    /// Hint of the policy value.
    pub const HINT: Hint = Hint::new("qc-token-policy", "0.0.1");

    /// Creates a policy.
    #[must_use]
    pub fn new(total_supply: Amount, approve_list: Vec<ApproveBox>) -> Self {
        Self {
            total_supply,
            approve_list,
        }
    }

    /// Same allowances under a new total supply.
    #[must_use]
    pub fn with_total_supply(&self, total_supply: Amount) -> Self {
        Self::new(total_supply, self.approve_list.clone())
    }

    /// Total amount in circulation.
    #[must_use]
    pub const fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Approve boxes, one per approving owner.
    #[must_use]
    pub fn approve_list(&self) -> &[ApproveBox] {
        &self.approve_list
    }

    /// Rejects duplicate owners and invalid boxes.
    pub fn is_valid(&self) -> Result<(), ValidationError> {
        let mut seen = HashSet::with_capacity(self.approve_list.len());
        for apb in &self.approve_list {
            if !seen.insert(*apb.account()) {
                return Err(ValidationError::DuplicateValue(format!(
                    "approve box account {}",
                    apb.account()
                )));
            }
            apb.is_valid()?;
        }
        Ok(())
    }

    /// First approve box owned by `account`.
    #[must_use]
    pub fn get_approve_box(&self, account: &Address) -> Option<&ApproveBox> {
        self.approve_list.iter().find(|apb| apb.account() == account)
    }

    /// Replaces the box owned by `apb.account()` in place, or appends it.
    pub fn merge_approve_box(&mut self, apb: ApproveBox) {
        match self
            .approve_list
            .iter_mut()
            .find(|existing| existing.account() == apb.account())
        {
            Some(existing) => *existing = apb,
            None => self.approve_list.push(apb),
        }
    }

    /// Deletes the box owned by `account`.
    pub fn remove_approve_box(&mut self, account: &Address) -> Result<(), DomainError> {
        let idx = self
            .approve_list
            .iter()
            .position(|apb| apb.account() == account)
            .ok_or(DomainError::ApproveBoxNotFound(*account))?;
        self.approve_list.remove(idx);
        Ok(())
    }

    /// Deterministic bytes for hashing: `total_supply ‖ sorted(box bytes)`.
    ///
    /// Box encodings are sorted so the hash does not depend on list order.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        let mut boxes: Vec<Vec<u8>> = self.approve_list.iter().map(ApproveBox::bytes).collect();
        boxes.sort();

        let mut out = amount_bytes(&self.total_supply).to_vec();
        out.extend(boxes.into_iter().flatten());
        out
    }
}
