//! # Allowances
//!
//! An [`ApproveBox`] is one owner's complete allowance ledger within a token:
//! which spenders it has approved and how much each may still spend.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use shared_types::{amount_bytes, decimal_amount, Address, Amount, Hint, ValidationError};

use super::errors::DomainError;

/// A single allowance: `account` may spend up to `amount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproveInfo {
    account: Address,
    #[serde(with = "decimal_amount")]
    amount: Amount,
}

impl ApproveInfo {
    /// Hint of the allowance value.
    pub const HINT: Hint = Hint::new("qc-token-approve-info", "0.0.1");

    /// Creates an allowance.
    #[must_use]
    pub const fn new(account: Address, amount: Amount) -> Self {
        Self { account, amount }
    }

    /// The approved spender.
    #[must_use]
    pub const fn account(&self) -> &Address {
        &self.account
    }

    /// Remaining allowance.
    #[must_use]
    pub const fn amount(&self) -> Amount {
        self.amount
    }

    /// Deterministic bytes for hashing: `account ‖ amount`.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(20 + 32);
        out.extend_from_slice(self.account.as_bytes());
        out.extend_from_slice(&amount_bytes(&self.amount));
        out
    }
}

/// All allowances granted by `account`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproveBox {
    account: Address,
    approved: Vec<ApproveInfo>,
}

impl ApproveBox {
    /// Hint of the approve box value.
    pub const HINT: Hint = Hint::new("qc-token-approve-box", "0.0.1");

    /// Creates an approve box.
    #[must_use]
    pub fn new(account: Address, approved: Vec<ApproveInfo>) -> Self {
        Self { account, approved }
    }

    /// The owner that granted the allowances.
    #[must_use]
    pub const fn account(&self) -> &Address {
        &self.account
    }

    /// Granted allowances in insertion order.
    #[must_use]
    pub fn approved(&self) -> &[ApproveInfo] {
        &self.approved
    }

    /// Rejects duplicate spenders.
    pub fn is_valid(&self) -> Result<(), ValidationError> {
        let mut seen = HashSet::with_capacity(self.approved.len());
        for info in &self.approved {
            if !seen.insert(info.account) {
                return Err(ValidationError::DuplicateValue(format!(
                    "approved account {} in approve box of {}",
                    info.account, self.account
                )));
            }
        }
        Ok(())
    }

    /// First allowance granted to `account`.
    #[must_use]
    pub fn get_approve_info(&self, account: &Address) -> Option<&ApproveInfo> {
        self.approved.iter().find(|info| &info.account == account)
    }

    /// Replaces the allowance of `info.account` in place, or appends it.
    pub fn set_approve_info(&mut self, info: ApproveInfo) {
        match self.approved.iter_mut().find(|a| a.account == info.account) {
            Some(existing) => *existing = info,
            None => self.approved.push(info),
        }
    }

    /// Deletes the allowance of `account`.
    ///
    /// Fails when no allowance for `account` exists, including on an empty box.
    pub fn remove_approve_info(&mut self, account: &Address) -> Result<(), DomainError> {
        let idx = self
            .approved
            .iter()
            .position(|info| &info.account == account)
            .ok_or(DomainError::ApprovedNotFound {
                owner: self.account,
                approved: *account,
            })?;
        self.approved.remove(idx);
        Ok(())
    }

    /// Deterministic bytes for hashing: `info bytes... ‖ account`.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        let mut out: Vec<u8> = self.approved.iter().flat_map(ApproveInfo::bytes).collect();
        out.extend_from_slice(self.account.as_bytes());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        Address::new([b; 20])
    }

    #[test]
    fn test_set_approve_info_upserts_in_place() {
        let mut apb = ApproveBox::new(
            addr(1),
            vec![
                ApproveInfo::new(addr(2), Amount::from(10)),
                ApproveInfo::new(addr(3), Amount::from(20)),
            ],
        );

        apb.set_approve_info(ApproveInfo::new(addr(2), Amount::from(15)));
        apb.set_approve_info(ApproveInfo::new(addr(4), Amount::from(5)));

        let accounts: Vec<_> = apb.approved().iter().map(|i| *i.account()).collect();
        assert_eq!(accounts, vec![addr(2), addr(3), addr(4)]);
        assert_eq!(apb.get_approve_info(&addr(2)).unwrap().amount(), Amount::from(15));
    }

    #[test]
    fn test_remove_approve_info() {
        let mut apb = ApproveBox::new(addr(1), vec![ApproveInfo::new(addr(2), Amount::from(10))]);
        assert!(apb.remove_approve_info(&addr(3)).is_err());
        assert!(apb.remove_approve_info(&addr(2)).is_ok());
        assert!(apb.approved().is_empty());
    }

    #[test]
    fn test_remove_from_empty_box_errors() {
        let mut apb = ApproveBox::new(addr(1), vec![]);
        assert_eq!(
            apb.remove_approve_info(&addr(2)),
            Err(DomainError::ApprovedNotFound {
                owner: addr(1),
                approved: addr(2)
            })
        );
    }

    #[test]
    fn test_duplicate_spender_is_invalid() {
        let apb = ApproveBox::new(
            addr(1),
            vec![
                ApproveInfo::new(addr(2), Amount::from(1)),
                ApproveInfo::new(addr(2), Amount::from(2)),
            ],
        );
        assert!(matches!(apb.is_valid(), Err(ValidationError::DuplicateValue(_))));
    }

    #[test]
    fn test_bytes_layout() {
        let info = ApproveInfo::new(addr(2), Amount::from(7));
        let bytes = info.bytes();
        assert_eq!(bytes.len(), 52);
        assert_eq!(&bytes[..20], addr(2).as_bytes());
        assert_eq!(bytes[51], 7);

        let apb = ApproveBox::new(addr(1), vec![info.clone()]);
        let box_bytes = apb.bytes();
        assert_eq!(&box_bytes[..52], info.bytes().as_slice());
        assert_eq!(&box_bytes[52..], addr(1).as_bytes());
    }
}
