//! Per-contract token descriptor.

use serde::{Deserialize, Serialize};
use shared_types::{amount_bytes, decimal_amount, Amount, Hint, ValidationError};

use super::policy::Policy;
use super::symbol::TokenSymbol;

/// Token metadata plus its [`Policy`].
///
/// Symbol, name and decimal are fixed at registration; operations only ever
/// replace the policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Design {
    symbol: TokenSymbol,
    name: String,
    #[serde(with = "decimal_amount")]
    decimal: Amount,
    policy: Policy,
}

impl Design {
    /// Hint of the design value.
    pub const HINT: Hint = Hint::new("qc-token-design", "0.0.1");

    /// Creates a design.
    #[must_use]
    pub fn new(
        symbol: TokenSymbol,
        name: impl Into<String>,
        decimal: Amount,
        policy: Policy,
    ) -> Self {
        Self {
            symbol,
            name: name.into(),
            decimal,
            policy,
        }
    }

    /// Same metadata with a replaced policy.
    #[must_use]
    pub fn with_policy(&self, policy: Policy) -> Self {
        Self {
            symbol: self.symbol.clone(),
            name: self.name.clone(),
            decimal: self.decimal,
            policy,
        }
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
    pub const fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Symbol rules, non-empty name, valid policy.
    pub fn is_valid(&self) -> Result<(), ValidationError> {
        self.symbol.is_valid()?;
        if self.name.is_empty() {
            return Err(ValidationError::Empty("token name".into()));
        }
        self.policy.is_valid()
    }

    /// Deterministic bytes for hashing: `symbol ‖ name ‖ decimal ‖ policy`.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(self.symbol.bytes());
        out.extend_from_slice(self.name.as_bytes());
        out.extend_from_slice(&amount_bytes(&self.decimal));
        out.extend(self.policy.bytes());
        out
    }
}
