//! Transfers spending allowances granted by other accounts.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use shared_types::{
    amount_bytes, decimal_amount, Address, Amount, CurrencyId, Hash, Hint, ValidationError,
};

use super::base::{check_items_len, check_token};

/// Moves `amount` from `target` to `receiver`, spending the allowance
/// `target` granted to the fact's sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferFromItem {
    contract: Address,
    receiver: Address,
    target: Address,
    #[serde(with = "decimal_amount")]
    amount: Amount,
    currency: CurrencyId,
}

impl TransferFromItem {
    pub const HINT: Hint = Hint::new("qc-token-transfer-from-item", "0.0.1");

    #[must_use]
    pub const fn new(
        contract: Address,
        receiver: Address,
        target: Address,
        amount: Amount,
        currency: CurrencyId,
    ) -> Self {
        Self {
            contract,
            receiver,
            target,
            amount,
            currency,
        }
    }

    #[must_use]
    pub const fn contract(&self) -> &Address {
        &self.contract
    }

    #[must_use]
    pub const fn receiver(&self) -> &Address {
        &self.receiver
    }

    #[must_use]
    pub const fn target(&self) -> &Address {
        &self.target
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
        if self.receiver == self.contract {
            return Err(ValidationError::SelfTarget(format!(
                "receiver {} is same with contract account",
                self.receiver
            )));
        }
        if self.target == self.contract {
            return Err(ValidationError::SelfTarget(format!(
                "target {} is same with contract account",
                self.target
            )));
        }
        if self.receiver == self.target {
            return Err(ValidationError::SelfTarget(format!(
                "receiver {} is same with target",
                self.receiver
            )));
        }
        if self.amount.is_zero() {
            return Err(ValidationError::OutOfRange(format!(
                "transfer amount must be over zero, got {}",
                self.amount
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(self.contract.as_bytes());
        out.extend_from_slice(self.receiver.as_bytes());
        out.extend_from_slice(self.target.as_bytes());
        out.extend_from_slice(&amount_bytes(&self.amount));
        out.extend_from_slice(self.currency.as_str().as_bytes());
        out
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferFromFact {
    #[serde_as(as = "Hex")]
    token: Vec<u8>,
    sender: Address,
    items: Vec<TransferFromItem>,
}

impl TransferFromFact {
    pub const HINT: Hint = Hint::new("qc-token-transfer-from-operation-fact", "0.0.1");

    #[must_use]
    pub fn new(token: Vec<u8>, sender: Address, items: Vec<TransferFromItem>) -> Self {
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
    pub fn items(&self) -> &[TransferFromItem] {
        &self.items
    }

    pub fn is_valid(&self) -> Result<(), ValidationError> {
        check_token(&self.token)?;
        check_items_len("transfer-from", self.items.len())?;

        let mut seen = HashSet::with_capacity(self.items.len());
        for item in &self.items {
            item.is_valid()?;
            if self.sender == item.contract {
                return Err(ValidationError::SelfTarget(format!(
                    "sender {} is same with contract account",
                    self.sender
                )));
            }
            if !seen.insert((item.contract, item.target, item.receiver)) {
                return Err(ValidationError::DuplicateValue(format!(
                    "target {} and receiver {} in contract account {}",
                    item.target, item.receiver, item.contract
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        let mut out = self.token.clone();
        out.extend_from_slice(self.sender.as_bytes());
        out.extend(self.items.iter().flat_map(TransferFromItem::bytes));
        out
    }

    #[must_use]
    pub fn hash(&self) -> Hash {
        Hash::sha256(&self.bytes())
    }
}
