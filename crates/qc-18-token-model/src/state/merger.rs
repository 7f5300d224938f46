//! # State Merging
//!
//! Processors never write state directly. They emit [`StateMergeValue`]s; at
//! commit time every value targeting one key is folded by a single merger
//! built from the first value's [`MergerKind`].
//!
//! ```text
//!   Add(50) ─┐
//!   Add(10) ─┼──▶ TokenBalanceStateValueMerger ──▶ existing + 60 − 30
//! Deduct(30)─┘
//! ```
//!
//! Balances only ever change through this fold, so two operations in one
//! block that credit the same holder both take effect.

use parking_lot::Mutex;
use shared_types::{Amount, Hash, Height};

use super::errors::MergeError;
use super::value::{
    AddTokenBalanceStateValue, DeductTokenBalanceStateValue, State, StateValue,
    TokenBalanceStateValue,
};

/// Folds values merged into one key into the key's next state.
pub trait StateValueMerger: Send + Sync {
    /// Accepts one value produced by operation `operation`.
    fn merge(&self, value: StateValue, operation: Hash) -> Result<(), MergeError>;

    /// Produces the resulting state.
    fn close_value(&self) -> Result<State, MergeError>;
}

/// Which merger folds a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergerKind {
    /// Last merged value wins.
    Replace,
    /// Additive deltas over the existing balance.
    TokenBalance,
}

/// A pending write to one state key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateMergeValue {
    key: String,
    value: StateValue,
    merger: MergerKind,
}

impl StateMergeValue {
    /// Plain write; replaces whatever is stored under `key`.
    #[must_use]
    pub fn new(key: impl Into<String>, value: StateValue) -> Self {
        Self {
            key: key.into(),
            value,
            merger: MergerKind::Replace,
        }
    }

    /// Balance delta folded by [`TokenBalanceStateValueMerger`].
    #[must_use]
    pub fn token_balance(key: impl Into<String>, value: StateValue) -> Self {
        Self {
            key: key.into(),
            value,
            merger: MergerKind::TokenBalance,
        }
    }

    /// Credit `amount` to the balance under `key`.
    #[must_use]
    pub fn add_balance(key: impl Into<String>, amount: Amount) -> Self {
        Self::token_balance(
            key,
            StateValue::AddTokenBalance(AddTokenBalanceStateValue::new(amount)),
        )
    }

    /// Debit `amount` from the balance under `key`.
    #[must_use]
    pub fn deduct_balance(key: impl Into<String>, amount: Amount) -> Self {
        Self::token_balance(
            key,
            StateValue::DeductTokenBalance(DeductTokenBalanceStateValue::new(amount)),
        )
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub const fn value(&self) -> &StateValue {
        &self.value
    }

    #[must_use]
    pub const fn merger_kind(&self) -> MergerKind {
        self.merger
    }

    /// Merger for this value's key over `existing`.
    pub fn new_merger(
        &self,
        height: Height,
        existing: Option<&State>,
    ) -> Result<Box<dyn StateValueMerger>, MergeError> {
        match self.merger {
            MergerKind::Replace => Ok(Box::new(ReplaceStateValueMerger::new(height, &self.key))),
            MergerKind::TokenBalance => Ok(Box::new(TokenBalanceStateValueMerger::new(
                height, &self.key, existing,
            )?)),
        }
    }
}

// =============================================================================
// REPLACE MERGER
// =============================================================================

#[derive(Default)]
struct Replaced {
    value: Option<StateValue>,
    operations: Vec<Hash>,
}

/// Keeps the last merged value.
pub struct ReplaceStateValueMerger {
    height: Height,
    key: String,
    inner: Mutex<Replaced>,
}

impl ReplaceStateValueMerger {
    #[must_use]
    pub fn new(height: Height, key: &str) -> Self {
        Self {
            height,
            key: key.to_string(),
            inner: Mutex::new(Replaced::default()),
        }
    }
}

impl StateValueMerger for ReplaceStateValueMerger {
    fn merge(&self, value: StateValue, operation: Hash) -> Result<(), MergeError> {
        if matches!(
            value,
            StateValue::AddTokenBalance(_) | StateValue::DeductTokenBalance(_)
        ) {
            return Err(MergeError::DeltaWithoutMerger {
                key: self.key.clone(),
            });
        }

        let mut inner = self.inner.lock();
        inner.value = Some(value);
        if !inner.operations.contains(&operation) {
            inner.operations.push(operation);
        }
        Ok(())
    }

    fn close_value(&self) -> Result<State, MergeError> {
        let inner = self.inner.lock();
        let value = inner.value.clone().ok_or_else(|| MergeError::Empty {
            key: self.key.clone(),
        })?;
        Ok(State::new(
            self.key.clone(),
            value,
            self.height,
            inner.operations.clone(),
        ))
    }
}

// =============================================================================
// TOKEN BALANCE MERGER
// =============================================================================

#[derive(Default)]
struct Deltas {
    add: Amount,
    remove: Amount,
    operations: Vec<Hash>,
}

/// Folds credits and debits: `existing + Σadd − Σremove`.
///
/// A missing existing state counts as zero. Arithmetic is checked; a result
/// below zero fails the close instead of wrapping.
pub struct TokenBalanceStateValueMerger {
    height: Height,
    key: String,
    existing: Amount,
    deltas: Mutex<Deltas>,
}

impl TokenBalanceStateValueMerger {
    pub fn new(height: Height, key: &str, existing: Option<&State>) -> Result<Self, MergeError> {
        let existing = match existing.map(|st| &st.value) {
            None => Amount::zero(),
            Some(StateValue::TokenBalance(v)) => v.amount(),
            Some(other) => {
                return Err(MergeError::UnexpectedExisting {
                    key: key.to_string(),
                    found: other.type_name(),
                })
            }
        };

        Ok(Self {
            height,
            key: key.to_string(),
            existing,
            deltas: Mutex::new(Deltas::default()),
        })
    }

    fn overflow(&self) -> MergeError {
        MergeError::Overflow {
            key: self.key.clone(),
        }
    }
}

impl StateValueMerger for TokenBalanceStateValueMerger {
    fn merge(&self, value: StateValue, operation: Hash) -> Result<(), MergeError> {
        let mut deltas = self.deltas.lock();

        match value {
            StateValue::AddTokenBalance(v) => {
                deltas.add = deltas
                    .add
                    .checked_add(v.amount())
                    .ok_or_else(|| self.overflow())?;
            }
            StateValue::DeductTokenBalance(v) => {
                deltas.remove = deltas
                    .remove
                    .checked_add(v.amount())
                    .ok_or_else(|| self.overflow())?;
            }
            other => return Err(MergeError::UnsupportedBalanceValue(other.type_name())),
        }

        if !deltas.operations.contains(&operation) {
            deltas.operations.push(operation);
        }
        Ok(())
    }

    fn close_value(&self) -> Result<State, MergeError> {
        let deltas = self.deltas.lock();

        let credited = self
            .existing
            .checked_add(deltas.add)
            .ok_or_else(|| self.overflow())?;
        let balance = credited
            .checked_sub(deltas.remove)
            .ok_or_else(|| MergeError::Underflow {
                key: self.key.clone(),
                balance: credited,
                deducted: deltas.remove,
            })?;

        Ok(State::new(
            self.key.clone(),
            StateValue::TokenBalance(TokenBalanceStateValue::new(balance)),
            self.height,
            deltas.operations.clone(),
        ))
    }
}

/// Folds every value staged for `key` over `existing`.
///
/// The first value picks the merger.
pub fn fold_merge_values<'a>(
    height: Height,
    key: &str,
    existing: Option<&State>,
    values: impl IntoIterator<Item = (&'a Hash, &'a StateMergeValue)>,
) -> Result<State, MergeError> {
    let mut values = values.into_iter();
    let (first_op, first) = values.next().ok_or_else(|| MergeError::Empty {
        key: key.to_string(),
    })?;

    let merger = first.new_merger(height, existing)?;
    merger.merge(first.value.clone(), *first_op)?;
    for (op, smv) in values {
        merger.merge(smv.value.clone(), *op)?;
    }
    merger.close_value()
}
