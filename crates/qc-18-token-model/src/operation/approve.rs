//! Allowance grants, raises and revocations.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use shared_types::{
    amount_bytes, decimal_amount, Address, Amount, CurrencyId, Hash, Hint, ValidationError,
};

use super::base::{check_items_len, check_token};

/// One allowance change: `approved` may spend `amount` more of the sender's
/// balance in `contract`. Zero revokes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproveItem {
    contract: Address,
    approved: Address,
    #[serde(with = "decimal_amount")]
    amount: Amount,
    currency: CurrencyId,
}

impl ApproveItem {
    pub const HINT: Hint = Hint::new("qc-token-approve-item", "0.0.1");

    #[must_use]
    pub const fn new(
        contract: Address,
        approved: Address,
        amount: Amount,
        currency: CurrencyId,
    ) -> Self {
        Self {
            contract,
            approved,
            amount,
            currency,
        }
    }

    #[must_use]
    pub const fn contract(&self) -> &Address {
        &self.contract
    }

    #[must_use]
    pub const fn approved(&self) -> &Address {
        &self.approved
    }

    #[must_use]
    pub const fn amount(&self) -> Amount {
        self.amount
    }

    #[must_use]
    pub const fn currency(&self) -> &CurrencyId {
        &self.currency
    }

    pub fn is_valid(&self) -> Result<(), ValidationError> {
        if self.approved == self.contract {
            return Err(ValidationError::SelfTarget(format!(
                "approved {} is same with contract account",
                self.approved
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(self.contract.as_bytes());
        out.extend_from_slice(self.approved.as_bytes());
        out.extend_from_slice(&amount_bytes(&self.amount));
        out.extend_from_slice(self.currency.as_str().as_bytes());
        out
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproveFact {
    #[serde_as(as = "Hex")]
    token: Vec<u8>,
    sender: Address,
    items: Vec<ApproveItem>,
}

impl ApproveFact {
    pub const HINT: Hint = Hint::new("qc-token-approve-operation-fact", "0.0.1");

    #[must_use]
    pub fn new(token: Vec<u8>, sender: Address, items: Vec<ApproveItem>) -> Self {
        Self {
            token,
            sender,
            items,
        }
    }

    #[must_use]
    pub const fn sender(&self) -> &Address {
        &self.sender
    }

    #[must_use]
    pub fn items(&self) -> &[ApproveItem] {
        &self.items
    }

    /// Item count in range, every item valid, sender never one of the
    /// contracts, each `(contract, approved)` at most once.
    pub fn is_valid(&self) -> Result<(), ValidationError> {
        check_token(&self.token)?;
        check_items_len("approve", self.items.len())?;

        let mut seen = HashSet::with_capacity(self.items.len());
        for item in &self.items {
            item.is_valid()?;
            if self.sender == item.contract {
                return Err(ValidationError::SelfTarget(format!(
                    "sender {} is same with contract account",
                    self.sender
                )));
            }
            if !seen.insert((item.contract, item.approved)) {
                return Err(ValidationError::DuplicateValue(format!(
                    "approved account {} in contract account {}",
                    item.approved, item.contract
                )));
            }
        }
        Ok(())
    }

    /// `token ‖ sender ‖ item bytes...`
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        let mut out = self.token.clone();
        out.extend_from_slice(self.sender.as_bytes());
        out.extend(self.items.iter().flat_map(ApproveItem::bytes));
        out
    }

    #[must_use]
    pub fn hash(&self) -> Hash {
        Hash::sha256(&self.bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        Address::new([b; 20])
    }

    fn item(contract: u8, approved: u8, amount: u64) -> ApproveItem {
        ApproveItem::new(
            addr(contract),
            addr(approved),
            Amount::from(amount),
            CurrencyId::new("QCT").unwrap(),
        )
    }

    #[test]
    fn test_zero_amount_is_valid() {
        let fact = ApproveFact::new(b"a".to_vec(), addr(1), vec![item(2, 3, 0)]);
        assert!(fact.is_valid().is_ok());
    }

    #[test]
    fn test_approved_cannot_be_contract() {
        let fact = ApproveFact::new(b"a".to_vec(), addr(1), vec![item(2, 2, 1)]);
        assert!(matches!(fact.is_valid(), Err(ValidationError::SelfTarget(_))));
    }

    #[test]
    fn test_sender_cannot_be_contract() {
        let fact = ApproveFact::new(b"a".to_vec(), addr(1), vec![item(1, 3, 1)]);
        assert!(matches!(fact.is_valid(), Err(ValidationError::SelfTarget(_))));
    }

    #[test]
    fn test_duplicate_pair_rejected() {
        let fact = ApproveFact::new(b"a".to_vec(), addr(1), vec![item(2, 3, 1), item(2, 3, 5)]);
        assert!(matches!(fact.is_valid(), Err(ValidationError::DuplicateValue(_))));
    }

    #[test]
    fn test_same_contract_different_spenders_allowed() {
        let fact = ApproveFact::new(b"a".to_vec(), addr(1), vec![item(2, 3, 1), item(2, 4, 1)]);
        assert!(fact.is_valid().is_ok());
    }

    #[test]
    fn test_empty_items_rejected() {
        let fact = ApproveFact::new(b"a".to_vec(), addr(1), vec![]);
        assert!(matches!(fact.is_valid(), Err(ValidationError::Empty(_))));
    }
}
