//! Balance transfers from the sender.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use shared_types::{
    amount_bytes, decimal_amount, Address, Amount, CurrencyId, Hash, Hint, ValidationError,
};

use super::base::{check_items_len, check_token};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferItem {
    contract: Address,
    receiver: Address,
    #[serde(with = "decimal_amount")]
    amount: Amount,
    currency: CurrencyId,
}

impl TransferItem {
    pub const HINT: Hint = Hint::new("qc-token-transfer-item", "0.0.1");

    #[must_use]
    pub const fn new(
        contract: Address,
        receiver: Address,
        amount: Amount,
        currency: CurrencyId,
    ) -> Self {
        Self {
            contract,
            receiver,
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
        out.extend_from_slice(&amount_bytes(&self.amount));
        out.extend_from_slice(self.currency.as_str().as_bytes());
        out
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferFact {
    #[serde_as(as = "Hex")]
    token: Vec<u8>,
    sender: Address,
    items: Vec<TransferItem>,
}

impl TransferFact {
    pub const HINT: Hint = Hint::new("qc-token-transfer-operation-fact", "0.0.1");

    #[must_use]
    pub fn new(token: Vec<u8>, sender: Address, items: Vec<TransferItem>) -> Self {
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
    pub fn items(&self) -> &[TransferItem] {
        &self.items
    }

    pub fn is_valid(&self) -> Result<(), ValidationError> {
        check_token(&self.token)?;
        check_items_len("transfer", self.items.len())?;

        let mut seen = HashSet::with_capacity(self.items.len());
        for item in &self.items {
            item.is_valid()?;
            if self.sender == item.contract {
                return Err(ValidationError::SelfTarget(format!(
                    "sender {} is same with contract account",
                    self.sender
                )));
            }
            if self.sender == item.receiver {
                return Err(ValidationError::SelfTarget(format!(
                    "sender {} is same with receiver",
                    self.sender
                )));
            }
            if !seen.insert((item.contract, item.receiver)) {
                return Err(ValidationError::DuplicateValue(format!(
                    "receiver account {} in contract account {}",
                    item.receiver, item.contract
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        let mut out = self.token.clone();
        out.extend_from_slice(self.sender.as_bytes());
        out.extend(self.items.iter().flat_map(TransferItem::bytes));
        out
    }

    #[must_use]
    pub fn hash(&self) -> Hash {
        Hash::sha256(&self.bytes())
    }
}
