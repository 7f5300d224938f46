//! Fields shared by the single-target facts.

use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use shared_types::{Address, CurrencyId, ValidationError};

/// Largest number of items one multi-item fact may carry.
pub const MAX_ITEMS: usize = 100;

/// `token` is the client nonce that makes otherwise identical facts distinct.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenFact {
    #[serde_as(as = "Hex")]
    token: Vec<u8>,
    sender: Address,
    contract: Address,
    currency: CurrencyId,
}

impl TokenFact {
    #[must_use]
    pub fn new(token: Vec<u8>, sender: Address, contract: Address, currency: CurrencyId) -> Self {
        Self {
            token,
            sender,
            contract,
            currency,
        }
    }

    #[must_use]
    pub fn token(&self) -> &[u8] {
        &self.token
    }

    #[must_use]
    pub const fn sender(&self) -> &Address {
        &self.sender
    }

    #[must_use]
    pub const fn contract(&self) -> &Address {
        &self.contract
    }

    /// Currency the fee is paid in.
    #[must_use]
    pub const fn currency(&self) -> &CurrencyId {
        &self.currency
    }

    /// Non-empty token, sender distinct from contract.
    pub fn is_valid(&self) -> Result<(), ValidationError> {
        check_token(&self.token)?;
        if self.sender == self.contract {
            return Err(ValidationError::SelfTarget(format!(
                "contract address is same with sender, {}",
                self.sender
            )));
        }
        Ok(())
    }

    /// `token ‖ sender ‖ contract ‖ currency`
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        let mut out = self.token.clone();
        out.extend_from_slice(self.sender.as_bytes());
        out.extend_from_slice(self.contract.as_bytes());
        out.extend_from_slice(self.currency.as_str().as_bytes());
        out
    }
}

pub(crate) fn check_token(token: &[u8]) -> Result<(), ValidationError> {
    if token.is_empty() {
        return Err(ValidationError::Empty("fact token".into()));
    }
    Ok(())
}

pub(crate) fn check_items_len(kind: &str, len: usize) -> Result<(), ValidationError> {
    if len == 0 {
        return Err(ValidationError::Empty(format!("items for {kind}")));
    }
    if len > MAX_ITEMS {
        return Err(ValidationError::OutOfRange(format!(
            "items over allowed, {len} > {MAX_ITEMS}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        Address::new([b; 20])
    }

    fn currency() -> CurrencyId {
        CurrencyId::new("QCT").unwrap()
    }

    #[test]
    fn test_sender_must_differ_from_contract() {
        let fact = TokenFact::new(b"t".to_vec(), addr(1), addr(1), currency());
        assert!(matches!(fact.is_valid(), Err(ValidationError::SelfTarget(_))));
    }

    #[test]
    fn test_token_must_not_be_empty() {
        let fact = TokenFact::new(vec![], addr(1), addr(2), currency());
        assert!(matches!(fact.is_valid(), Err(ValidationError::Empty(_))));
    }

    #[test]
    fn test_token_serializes_as_hex() {
        let fact = TokenFact::new(vec![0xde, 0xad], addr(1), addr(2), currency());
        let json = serde_json::to_value(&fact).unwrap();
        assert_eq!(json["token"], "dead");
        assert_eq!(json["currency"], "QCT");
    }

    #[test]
    fn test_items_len_bounds() {
        assert!(check_items_len("transfer", 0).is_err());
        assert!(check_items_len("transfer", 1).is_ok());
        assert!(check_items_len("transfer", MAX_ITEMS).is_ok());
        assert!(matches!(
            check_items_len("transfer", MAX_ITEMS + 1),
            Err(ValidationError::OutOfRange(_))
        ));
    }
}
