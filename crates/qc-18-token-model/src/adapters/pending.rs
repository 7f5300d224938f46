use std::collections::HashMap;

use shared_types::{Hash, Height};

use super::memory_state::group_by_key;
use crate::ports::outbound::StateReader;
use crate::state::{fold_merge_values, State, StateError, StateMergeValue};

/// Committed state plus the merge values staged so far in one block.
///
/// Reads of a staged key fold its staged values over the committed state,
/// exactly as the commit will.
pub struct PendingState<'a, R: StateReader + ?Sized> {
    base: &'a R,
    height: Height,
    staged: Vec<(Hash, StateMergeValue)>,
    by_key: HashMap<String, Vec<usize>>,
}

impl<'a, R: StateReader + ?Sized> PendingState<'a, R> {
    pub fn new(base: &'a R, height: Height) -> Self {
        Self {
            base,
            height,
            staged: Vec::new(),
            by_key: HashMap::new(),
        }
    }

    /// Stages the writes of operation `fact`.
    ///
    /// Fails without staging anything if a touched key would no longer fold.
    pub fn stage(&mut self, fact: Hash, values: Vec<StateMergeValue>) -> Result<(), StateError> {
        let start = self.staged.len();
        self.staged.extend(values.into_iter().map(|v| (fact, v)));

        let check = group_by_key(&self.staged[start..])
            .into_iter()
            .map(|(key, _)| key.to_string())
            .collect::<Vec<_>>();
        for (offset, (_, smv)) in self.staged[start..].iter().enumerate() {
            self.by_key
                .entry(smv.key().to_string())
                .or_default()
                .push(start + offset);
        }

        for key in &check {
            if let Err(err) = self.get_state(key) {
                self.rollback(start);
                return Err(err);
            }
        }
        Ok(())
    }

    fn rollback(&mut self, start: usize) {
        self.staged.truncate(start);
        self.by_key.retain(|_, idx| {
            idx.retain(|i| *i < start);
            !idx.is_empty()
        });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.staged.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    pub fn into_staged(self) -> Vec<(Hash, StateMergeValue)> {
        self.staged
    }
}

impl<R: StateReader + ?Sized> StateReader for PendingState<'_, R> {
    fn get_state(&self, key: &str) -> Result<Option<State>, StateError> {
        let existing = self.base.get_state(key)?;
        let Some(idx) = self.by_key.get(key) else {
            return Ok(existing);
        };

        let values = idx.iter().map(|i| {
            let (op, smv) = &self.staged[*i];
            (op, smv)
        });
        Ok(Some(fold_merge_values(self.height, key, existing.as_ref(), values)?))
    }
}
