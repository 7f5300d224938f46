//! State key construction and parsing.
//!
//! | Key | Segments |
//! |-----|----------|
//! | `token:{contract}:design` | 3 |
//! | `token:{contract}:{address}:tokenbalance` | 4 |

use shared_types::Address;

use super::errors::StateError;

/// Namespace shared by every token key.
pub const TOKEN_PREFIX: &str = "token";

/// Suffix of the design key.
pub const DESIGN_SUFFIX: &str = "design";

/// Suffix of balance keys.
pub const TOKEN_BALANCE_SUFFIX: &str = "tokenbalance";

const DESIGN_SEGMENTS: usize = 3;
const TOKEN_BALANCE_SEGMENTS: usize = 4;

/// `token:{contract}`
#[must_use]
pub fn state_key_token_prefix(contract: &Address) -> String {
    format!("{TOKEN_PREFIX}:{contract}")
}

/// Builds the keys of one contract's token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateKeyGenerator {
    contract: Address,
}

impl StateKeyGenerator {
    #[must_use]
    pub const fn new(contract: Address) -> Self {
        Self { contract }
    }

    #[must_use]
    pub const fn contract(&self) -> &Address {
        &self.contract
    }

    /// Key of the token design.
    #[must_use]
    pub fn design(&self) -> String {
        format!("{}:{DESIGN_SUFFIX}", state_key_token_prefix(&self.contract))
    }

    /// Key of `address`'s balance in this token.
    #[must_use]
    pub fn token_balance(&self, address: &Address) -> String {
        format!(
            "{}:{address}:{TOKEN_BALANCE_SUFFIX}",
            state_key_token_prefix(&self.contract)
        )
    }
}

#[must_use]
pub fn is_design_key(key: &str) -> bool {
    key.starts_with(TOKEN_PREFIX)
        && key.ends_with(DESIGN_SUFFIX)
        && key.split(':').count() == DESIGN_SEGMENTS
}

#[must_use]
pub fn is_token_balance_key(key: &str) -> bool {
    key.starts_with(TOKEN_PREFIX)
        && key.ends_with(TOKEN_BALANCE_SUFFIX)
        && key.split(':').count() == TOKEN_BALANCE_SEGMENTS
}

/// Splits `key` on `:` and checks its prefix and segment count.
pub fn parse_state_key<'k>(
    key: &'k str,
    prefix: &str,
    segments: usize,
) -> Result<Vec<&'k str>, StateError> {
    let parts: Vec<&str> = key.split(':').collect();
    if parts.first() != Some(&prefix) {
        return Err(StateError::InvalidKey {
            key: key.to_string(),
            reason: format!("prefix is not {prefix}"),
        });
    }
    if parts.len() != segments {
        return Err(StateError::InvalidKey {
            key: key.to_string(),
            reason: format!("expected {segments} segments, found {}", parts.len()),
        });
    }
    Ok(parts)
}

fn parse_address(key: &str, part: &str) -> Result<Address, StateError> {
    part.parse().map_err(|e| StateError::InvalidKey {
        key: key.to_string(),
        reason: format!("{e}"),
    })
}

/// Contract of a design key.
pub fn parse_design_key(key: &str) -> Result<Address, StateError> {
    let parts = parse_state_key(key, TOKEN_PREFIX, DESIGN_SEGMENTS)?;
    if parts[2] != DESIGN_SUFFIX {
        return Err(StateError::InvalidKey {
            key: key.to_string(),
            reason: format!("suffix is not {DESIGN_SUFFIX}"),
        });
    }
    parse_address(key, parts[1])
}

/// `(contract, holder)` of a balance key.
pub fn parse_token_balance_key(key: &str) -> Result<(Address, Address), StateError> {
    let parts = parse_state_key(key, TOKEN_PREFIX, TOKEN_BALANCE_SEGMENTS)?;
    if parts[3] != TOKEN_BALANCE_SUFFIX {
        return Err(StateError::InvalidKey {
            key: key.to_string(),
            reason: format!("suffix is not {TOKEN_BALANCE_SUFFIX}"),
        });
    }
    Ok((parse_address(key, parts[1])?, parse_address(key, parts[2])?))
}
