use serde::{Deserialize, Serialize};
use shared_types::{amount_bytes, decimal_amount, Address, Amount, Hash, Hint, ValidationError};

use super::base::TokenFact;

/// Raises the total supply and credits `receiver`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintFact {
    #[serde(flatten)]
    base: TokenFact,
    receiver: Address,
    #[serde(with = "decimal_amount")]
    amount: Amount,
}

impl MintFact {
    pub const HINT: Hint = Hint::new("qc-token-mint-operation-fact", "0.0.1");

    #[must_use]
    pub const fn new(base: TokenFact, receiver: Address, amount: Amount) -> Self {
        Self {
            base,
            receiver,
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
    pub const fn receiver(&self) -> &Address {
        &self.receiver
    }

    #[must_use]
    pub const fn amount(&self) -> Amount {
        self.amount
    }

    pub fn is_valid(&self) -> Result<(), ValidationError> {
        self.base.is_valid()?;
        if &self.receiver == self.base.contract() {
            return Err(ValidationError::SelfTarget(format!(
                "receiver {} is same with contract address",
                self.receiver
            )));
        }
        if self.amount.is_zero() {
            return Err(ValidationError::OutOfRange(format!(
                "mint amount must be over zero, got {}",
                self.amount
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        let mut out = self.base.bytes();
        out.extend_from_slice(self.receiver.as_bytes());
        out.extend_from_slice(&amount_bytes(&self.amount));
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
    use shared_types::CurrencyId;

    fn addr(b: u8) -> Address {
        Address::new([b; 20])
    }

    fn base() -> TokenFact {
        TokenFact::new(b"m".to_vec(), addr(1), addr(2), CurrencyId::new("QCT").unwrap())
    }

    #[test]
    fn test_receiver_cannot_be_contract() {
        let fact = MintFact::new(base(), addr(2), Amount::one());
        assert!(matches!(fact.is_valid(), Err(ValidationError::SelfTarget(_))));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let fact = MintFact::new(base(), addr(3), Amount::zero());
        assert!(matches!(fact.is_valid(), Err(ValidationError::OutOfRange(_))));
    }

    #[test]
    fn test_valid_mint() {
        assert!(MintFact::new(base(), addr(3), Amount::from(50)).is_valid().is_ok());
    }
}
