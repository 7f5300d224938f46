use serde::{Deserialize, Serialize};
use shared_types::{amount_bytes, decimal_amount, Address, Amount, Hash, Hint, ValidationError};

use super::base::TokenFact;
use crate::domain::TokenSymbol;

/// Registers a token on a contract account and credits the initial supply
/// to the sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterModelFact {
    #[serde(flatten)]
    base: TokenFact,
    symbol: TokenSymbol,
    name: String,
    #[serde(with = "decimal_amount")]
    decimal: Amount,
    #[serde(with = "decimal_amount")]
    initial_supply: Amount,
}

impl RegisterModelFact {
    pub const HINT: Hint = Hint::new("qc-token-register-model-operation-fact", "0.0.1");

    #[must_use]
    pub fn new(
        base: TokenFact,
        symbol: TokenSymbol,
        name: impl Into<String>,
        decimal: Amount,
        initial_supply: Amount,
    ) -> Self {
        Self {
            base,
            symbol,
            name: name.into(),
            decimal,
            initial_supply,
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
    pub const fn symbol(&self) -> &TokenSymbol {
        &self.symbol
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn decimal(&self) -> Amount {
        self.decimal
    }

    #[must_use]
    pub const fn initial_supply(&self) -> Amount {
        self.initial_supply
    }

    /// Decimal and initial supply are unsigned, so only the base, the symbol
    /// and the name can be malformed.
    pub fn is_valid(&self) -> Result<(), ValidationError> {
        self.base.is_valid()?;
        self.symbol.is_valid()?;
        if self.name.is_empty() {
            return Err(ValidationError::Empty("token name".into()));
        }
        Ok(())
    }

    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        let mut out = self.base.bytes();
        out.extend_from_slice(self.symbol.bytes());
        out.extend_from_slice(self.name.as_bytes());
        out.extend_from_slice(&amount_bytes(&self.decimal));
        out.extend_from_slice(&amount_bytes(&self.initial_supply));
        out
    }

    #[must_use]
    pub fn hash(&self) -> Hash {
        Hash::sha256(&self.bytes())
    }
}
