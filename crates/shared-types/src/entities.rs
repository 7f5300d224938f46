//! # Core Domain Entities
//!
//! Primitives every module builds on.
//!
//! ## Clusters
//!
//! - **Identity**: `Address`, `CurrencyId`
//! - **Integrity**: `Hash` (SHA-256)
//! - **Ledger**: `Height`, `Amount`
//! - **Encoding**: `Hint` (versioned type tag)

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use sha2::{Digest, Sha256};

use crate::errors::ValidationError;

// Re-export U256 from primitive-types for use across all crates
pub use primitive_types::U256;

/// Token and currency amounts.
///
/// Unsigned 256-bit integers: "non-negative" holds by construction, and all
/// arithmetic on balances goes through `checked_*`.
pub type Amount = U256;

/// Block height.
pub type Height = u64;

/// Identifier pattern shared by currency ids and token symbols.
pub const IDENTIFIER_PATTERN: &str = r"^[A-Z0-9][A-Z0-9_\.\!\$\*\@]*[A-Z0-9]$";

/// Minimum identifier length (inclusive).
pub const MIN_IDENTIFIER_LENGTH: usize = 3;

/// Maximum identifier length (inclusive).
pub const MAX_IDENTIFIER_LENGTH: usize = 10;

static IDENTIFIER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(IDENTIFIER_PATTERN).expect("identifier pattern is a valid regex")
});

/// Checks a currency id or token symbol against the identifier rules.
pub fn validate_identifier(label: &str, value: &str) -> Result<(), ValidationError> {
    let len = value.len();
    if !(MIN_IDENTIFIER_LENGTH..=MAX_IDENTIFIER_LENGTH).contains(&len) {
        return Err(ValidationError::OutOfRange(format!(
            "{label} length {len} not in [{MIN_IDENTIFIER_LENGTH}, {MAX_IDENTIFIER_LENGTH}]"
        )));
    }
    if !IDENTIFIER_REGEX.is_match(value) {
        return Err(ValidationError::Malformed(format!(
            "{label} {value:?} does not match {IDENTIFIER_PATTERN}"
        )));
    }
    Ok(())
}

/// Fixed-width big-endian encoding of an amount, used in hash preimages.
#[must_use]
pub fn amount_bytes(amount: &Amount) -> [u8; 32] {
    let mut out = [0u8; 32];
    amount.to_big_endian(&mut out);
    out
}

/// Serde adapter writing amounts as decimal strings.
///
/// `U256`'s own serde form is hex; the wire form here is decimal so that
/// clients and the digest API read amounts the way they are typed.
pub mod decimal_amount {
    use super::Amount;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    /// Serializes an amount as a decimal string.
    pub fn serialize<S: Serializer>(value: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    /// Deserializes a decimal string into an amount.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Amount::from_dec_str(&raw).map_err(|e| D::Error::custom(format!("amount {raw:?}: {e:?}")))
    }
}

// =============================================================================
// ADDRESS (20 bytes)
// =============================================================================

/// A 20-byte account address.
///
/// The textual form is `0x` followed by 40 lowercase hex digits. It is also
/// the form embedded into state keys, so it never contains `:`.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    SerializeDisplay,
    DeserializeFromStr,
)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address (0x0000...0000).
    pub const ZERO: Self = Self([0u8; 20]);

    /// Creates an address from a 20-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for Address {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .ok_or_else(|| ValidationError::Malformed(format!("address {s:?} missing 0x prefix")))?;
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|e| ValidationError::Malformed(format!("address {s:?}: {e}")))?;
        Ok(Self(bytes))
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

// =============================================================================
// HASH (32 bytes)
// =============================================================================

/// A 32-byte SHA-256 digest.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    SerializeDisplay,
    DeserializeFromStr,
)]
pub struct Hash(pub [u8; 32]);

impl Hash {
    /// The zero hash.
    pub const ZERO: Self = Self([0u8; 32]);

    /// SHA-256 of the given bytes.
    #[must_use]
    pub fn sha256(bytes: &[u8]) -> Self {
        Self(Sha256::digest(bytes).into())
    }

    /// SHA-256 over several byte slices, in order.
    #[must_use]
    pub fn sha256_parts<'a>(parts: impl IntoIterator<Item = &'a [u8]>) -> Self {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part);
        }
        Self(hasher.finalize().into())
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", &hex::encode(self.0)[..16])
    }
}

impl FromStr for Hash {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| ValidationError::Malformed(format!("hash {s:?}: {e}")))?;
        Ok(Self(bytes))
    }
}

// =============================================================================
// CURRENCY ID
// =============================================================================

/// Fee currency identifier, e.g. `QCT`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, SerializeDisplay, DeserializeFromStr)]
pub struct CurrencyId(String);

impl CurrencyId {
    /// Creates a validated currency id.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        validate_identifier("currency id", &value)?;
        Ok(Self(value))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for CurrencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CurrencyId({})", self.0)
    }
}

impl FromStr for CurrencyId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// =============================================================================
// HINT
// =============================================================================

/// Versioned type tag used for polymorphic encode/decode.
///
/// Textual form: `{kind}-v{version}`, e.g. `qc-token-design-v0.0.1`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, SerializeDisplay, DeserializeFromStr)]
pub struct Hint {
    kind: Cow<'static, str>,
    version: Cow<'static, str>,
}

impl Hint {
    /// Creates a hint from static parts; usable in `const` items.
    #[must_use]
    pub const fn new(kind: &'static str, version: &'static str) -> Self {
        Self {
            kind: Cow::Borrowed(kind),
            version: Cow::Borrowed(version),
        }
    }

    /// The type name part.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The version part (without the `v`).
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Hint as bytes, used in hash preimages.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-v{}", self.kind, self.version)
    }
}

impl fmt::Debug for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hint({self})")
    }
}

impl FromStr for Hint {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, version) = s
            .rsplit_once("-v")
            .ok_or_else(|| ValidationError::Malformed(format!("hint {s:?} has no version")))?;
        if kind.is_empty() {
            return Err(ValidationError::Empty(format!("hint type in {s:?}")));
        }
        let well_formed = !version.is_empty()
            && version
                .split('.')
                .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()));
        if !well_formed {
            return Err(ValidationError::Malformed(format!("hint version in {s:?}")));
        }
        Ok(Self {
            kind: Cow::Owned(kind.to_string()),
            version: Cow::Owned(version.to_string()),
        })
    }
}
