//! # Hinted JSON Codec
//!
//! Every polymorphic value travels as a JSON object carrying its hint in a
//! `_hint` field. The [`HinterRegistry`] maps a hint to the decoder of its
//! type; it is built once through [`HinterRegistryBuilder`] and read-only
//! afterwards.
//!
//! ```text
//! {"_hint": "qc-token-mint-operation-v0.0.1", ...}
//!        │
//!        ▼ lookup
//! HinterRegistry ──▶ decoder ──▶ Hinted::Operation(..)
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use shared_types::Hint;

use crate::domain::{ApproveBox, ApproveInfo, Design, Policy};
use crate::errors::{CodecError, RegistryError};
use crate::operation::{
    ApproveFact, ApproveItem, BurnFact, MintFact, Operation, OperationFact, RegisterModelFact,
    TransferFact, TransferFromFact, TransferFromItem, TransferItem,
};
use crate::state::StateValue;

/// Field holding the hint of an encoded value.
pub const HINT_FIELD: &str = "_hint";

/// Any value the registry can decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hinted {
    ApproveInfo(ApproveInfo),
    ApproveBox(ApproveBox),
    Policy(Policy),
    Design(Design),
    StateValue(StateValue),
    ApproveItem(ApproveItem),
    TransferItem(TransferItem),
    TransferFromItem(TransferFromItem),
    Fact(OperationFact),
    Operation(Operation),
}

macro_rules! impl_hinted {
    ($($variant:ident($ty:ty)),+ $(,)?) => {
        $(
            impl From<$ty> for Hinted {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )+
    };
}

impl_hinted!(
    ApproveInfo(ApproveInfo),
    ApproveBox(ApproveBox),
    Policy(Policy),
    Design(Design),
    StateValue(StateValue),
    ApproveItem(ApproveItem),
    TransferItem(TransferItem),
    TransferFromItem(TransferFromItem),
    Fact(OperationFact),
    Operation(Operation),
);

/// A serializable value that knows its hint.
pub trait HintedValue: Serialize {
    fn hint(&self) -> Hint;
}

macro_rules! impl_hinted_value_const {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl HintedValue for $ty {
                fn hint(&self) -> Hint {
                    <$ty>::HINT
                }
            }
        )+
    };
}

impl_hinted_value_const!(
    ApproveInfo,
    ApproveBox,
    Policy,
    Design,
    ApproveItem,
    TransferItem,
    TransferFromItem,
    RegisterModelFact,
    MintFact,
    BurnFact,
    ApproveFact,
    TransferFact,
    TransferFromFact,
);

impl HintedValue for StateValue {
    fn hint(&self) -> Hint {
        StateValue::hint(self)
    }
}

impl HintedValue for OperationFact {
    fn hint(&self) -> Hint {
        self.kind().fact_hint()
    }
}

impl HintedValue for Operation {
    fn hint(&self) -> Hint {
        self.hint().clone()
    }
}

/// Decodes a JSON object into its [`Hinted`] variant.
pub type HintDecoder = fn(Value) -> Result<Hinted, CodecError>;

fn decode_as<T>(value: Value) -> Result<Hinted, CodecError>
where
    T: DeserializeOwned + Into<Hinted>,
{
    Ok(serde_json::from_value::<T>(value)?.into())
}

/// Collects hinters before the registry is frozen.
#[derive(Default)]
pub struct HinterRegistryBuilder {
    decoders: HashMap<Hint, HintDecoder>,
}

impl HinterRegistryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_hinter(
        &mut self,
        hint: Hint,
        decoder: HintDecoder,
    ) -> Result<&mut Self, RegistryError> {
        if self.decoders.contains_key(&hint) {
            return Err(RegistryError::DuplicateHint(hint));
        }
        self.decoders.insert(hint, decoder);
        Ok(self)
    }

    /// Registers `hint` as decoding into `T`.
    pub fn add<T>(&mut self, hint: Hint) -> Result<&mut Self, RegistryError>
    where
        T: DeserializeOwned + Into<Hinted>,
    {
        self.add_hinter(hint, decode_as::<T>)
    }

    #[must_use]
    pub fn build(self) -> HinterRegistry {
        HinterRegistry {
            decoders: self.decoders,
        }
    }
}

/// Frozen hint → decoder table.
#[derive(Clone, Default)]
pub struct HinterRegistry {
    decoders: HashMap<Hint, HintDecoder>,
}

impl fmt::Debug for HinterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HinterRegistry")
            .field("hints", &self.decoders.len())
            .finish()
    }
}

impl HinterRegistry {
    #[must_use]
    pub fn contains(&self, hint: &Hint) -> bool {
        self.decoders.contains_key(hint)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Serializes `value` with its hint in [`HINT_FIELD`].
    ///
    /// Unregistered hints are refused so nothing undecodable leaves the node.
    pub fn encode_json<T: HintedValue>(&self, value: &T) -> Result<Value, CodecError> {
        let hint = value.hint();
        if !self.contains(&hint) {
            return Err(CodecError::UnknownHint(hint.to_string()));
        }

        let mut json = serde_json::to_value(value)?;
        match json.as_object_mut() {
            Some(obj) => {
                obj.insert(HINT_FIELD.to_string(), Value::String(hint.to_string()));
                Ok(json)
            }
            None => Err(CodecError::UnexpectedValue {
                expected: "json object",
                found: json.to_string(),
            }),
        }
    }

    pub fn decode_json(&self, value: Value) -> Result<Hinted, CodecError> {
        let raw = value
            .get(HINT_FIELD)
            .and_then(Value::as_str)
            .ok_or(CodecError::MissingHint)?;
        let hint: Hint = raw.parse().map_err(CodecError::InvalidHint)?;
        let decoder = self
            .decoders
            .get(&hint)
            .ok_or_else(|| CodecError::UnknownHint(hint.to_string()))?;
        decoder(value)
    }

    pub fn decode_json_str(&self, raw: &str) -> Result<Hinted, CodecError> {
        self.decode_json(serde_json::from_str(raw)?)
    }

    /// Decodes a value that must be an [`Operation`].
    pub fn decode_operation(&self, value: Value) -> Result<Operation, CodecError> {
        match self.decode_json(value)? {
            Hinted::Operation(op) => Ok(op),
            other => Err(CodecError::UnexpectedValue {
                expected: "operation",
                found: format!("{other:?}"),
            }),
        }
    }
}
