//! Token symbol.

use std::fmt;
use std::str::FromStr;

use serde_with::{DeserializeFromStr, SerializeDisplay};
use shared_types::{validate_identifier, ValidationError};

/// Ticker of a token, e.g. `ABC123`.
///
/// 3 to 10 characters: uppercase letters and digits at both ends, and
/// `_ . ! $ * @` allowed in between.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, SerializeDisplay, DeserializeFromStr)]
pub struct TokenSymbol(String);

impl TokenSymbol {
    /// Creates a validated symbol.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        validate_identifier("token symbol", &value)?;
        Ok(Self(value))
    }

    /// Re-checks the symbol rules.
    pub fn is_valid(&self) -> Result<(), ValidationError> {
        validate_identifier("token symbol", &self.0)
    }

    /// The symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Deterministic bytes for hashing.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for TokenSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for TokenSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenSymbol({})", self.0)
    }
}

impl FromStr for TokenSymbol {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
