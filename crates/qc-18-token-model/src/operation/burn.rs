use serde::{Deserialize, Serialize};
use shared_types::{amount_bytes, decimal_amount, Address, Amount, Hash, Hint, ValidationError};

use super::base::TokenFact;

/// Lowers the total supply and debits `target`.
///
/// Admission additionally requires `target == sender`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnFact {
    #[serde(flatten)]
    base: TokenFact,
    target: Address,
    #[serde(with = "decimal_amount")]
    amount: Amount,
}

impl BurnFact {
    pub const HINT: Hint = Hint::new("qc-token-burn-operation-fact", "0.0.1");

    #[must_use]
    pub const fn new(base: TokenFact, target: Address, amount: Amount) -> Self {
        Self {
            base,
            target,
            amount,
        }
    }

    #[must_use]
    pub const fn base(&self) -> &TokenFact {
        &self.base
    }

    #[must_use]
    pub const fn sender(&self) -> &Address {
        self.base.sender()
    }

    #[must_use]
    pub const fn contract(&self) -> &Address {
        self.base.contract()
    }

    #[must_use]
    pub const fn target(&self) -> &Address {
        &self.target
    }

    #[must_use]
    pub const fn amount(&self) -> Amount {
        self.amount
    }

    pub fn is_valid(&self) -> Result<(), ValidationError> {
        self.base.is_valid()?;
        if &self.target == self.base.contract() {
            return Err(ValidationError::SelfTarget(format!(
                "target {} is same with contract account",
                self.target
            )));
        }
        if self.amount.is_zero() {
            return Err(ValidationError::OutOfRange(format!(
                "burn amount must be over zero, got {}",
                self.amount
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        let mut out = self.base.bytes();
        out.extend_from_slice(self.target.as_bytes());
        out.extend_from_slice(&amount_bytes(&self.amount));
        out
    }

    #[must_use]
    pub fn hash(&self) -> Hash {
        Hash::sha256(&self.bytes())
    }
}
