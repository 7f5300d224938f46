//! # Operation Processors
//!
//! One processor per [`OperationKind`]. The host drives each operation
//! through two phases against a read-only [`StateReader`]:
//!
//! ```text
//! pre_process ──▶ admission (no writes; Reason errors reject)
//!     │ Ok
//!     ▼
//! process ─────▶ Vec<StateMergeValue>
//! ```
//!
//! Multi-item operations delegate per-item rules to borrowed item processors
//! ([`ApproveItemProcessor`], [`TransferItemProcessor`],
//! [`TransferFromItemProcessor`]) that live only for one call.

pub mod amounts;
pub mod approve;
pub mod burn;
pub mod duplication;
pub mod errors;
pub mod mint;
pub mod register_model;
pub mod transfer;
pub mod transfer_from;

use std::collections::HashMap;

use shared_types::{Address, Height, Hint};

use crate::domain::Design;
use crate::errors::RegistryError;
use crate::operation::{Operation, OperationKind};
use crate::ports::outbound::StateReader;
use crate::state::{state_design_value, StateKeyGenerator, StateMergeValue};

pub use amounts::prepare_sender_total_amounts;
pub use approve::{ApproveItemProcessor, ApproveProcessor};
pub use burn::BurnProcessor;
pub use duplication::DuplicationChecker;
pub use errors::{ProcessError, ReasonError};
pub use mint::MintProcessor;
pub use register_model::RegisterModelProcessor;
pub use transfer::{TransferItemProcessor, TransferProcessor};
pub use transfer_from::{TransferFromItemProcessor, TransferFromProcessor};

/// Admission and state-delta computation for one operation kind.
pub trait OperationProcessor: Send + Sync {
    /// Operation kind this processor accepts.
    fn kind(&self) -> OperationKind;

    /// Block height this processor was created for.
    fn height(&self) -> Height;

    /// Stateful admission check. Writes nothing.
    fn pre_process(&self, op: &Operation, reader: &dyn StateReader) -> Result<(), ProcessError>;

    /// Computes the writes of an admitted operation.
    fn process(
        &self,
        op: &Operation,
        reader: &dyn StateReader,
    ) -> Result<Vec<StateMergeValue>, ProcessError>;
}

/// Constructor registered per operation hint.
pub type GetNewProcessor = fn(Height) -> Box<dyn OperationProcessor>;

/// Borrows the fact of `$op` as `OperationFact::$variant`, or fails with a
/// type-mismatch reason.
macro_rules! expect_fact {
    ($op:expr, $variant:ident) => {
        match $op.fact() {
            $crate::operation::OperationFact::$variant(fact) => Ok(fact),
            other => Err($crate::processor::ReasonError::TypeMismatch {
                expected: $crate::operation::OperationKind::$variant,
                actual: other.kind(),
            }),
        }
    };
}
pub(crate) use expect_fact;

/// Current design of `contract`, if one is registered.
pub(crate) fn find_design(
    contract: &Address,
    reader: &dyn StateReader,
) -> Result<Option<Design>, ProcessError> {
    let key = StateKeyGenerator::new(*contract).design();
    match reader.get_state(&key)? {
        Some(st) => Ok(Some(state_design_value(&st)?)),
        None => Ok(None),
    }
}

/// Design required during admission; missing is a rejection.
pub(crate) fn admitted_design(
    contract: &Address,
    reader: &dyn StateReader,
) -> Result<Design, ProcessError> {
    find_design(contract, reader)?.ok_or_else(|| ReasonError::ServiceNotFound(*contract).into())
}

/// Design required during processing; admission already saw it, so missing
/// is a hard failure.
pub(crate) fn processed_design(
    contract: &Address,
    reader: &dyn StateReader,
) -> Result<Design, ProcessError> {
    find_design(contract, reader)?.ok_or_else(|| {
        ProcessError::Precondition(format!(
            "token design of contract account {contract} vanished after admission"
        ))
    })
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Processor constructors keyed by operation hint.
#[derive(Debug, Default, Clone)]
pub struct OperationProcessors {
    processors: HashMap<Hint, GetNewProcessor>,
}

impl OperationProcessors {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding all six token processors.
    pub fn with_token_processors() -> Result<Self, RegistryError> {
        let mut processors = Self::new();
        for kind in OperationKind::ALL {
            processors.set_processor(kind.operation_hint(), constructor(kind))?;
        }
        Ok(processors)
    }

    /// Registers `f` for `hint`. A hint can be registered once.
    pub fn set_processor(&mut self, hint: Hint, f: GetNewProcessor) -> Result<(), RegistryError> {
        if self.processors.contains_key(&hint) {
            return Err(RegistryError::DuplicateProcessor(hint));
        }
        self.processors.insert(hint, f);
        Ok(())
    }

    /// Builds the processor for `hint` at `height`.
    pub fn new_processor(
        &self,
        hint: &Hint,
        height: Height,
    ) -> Result<Box<dyn OperationProcessor>, RegistryError> {
        self.processors
            .get(hint)
            .map(|f| f(height))
            .ok_or_else(|| RegistryError::UnsupportedOperation(hint.clone()))
    }

    #[must_use]
    pub fn contains(&self, hint: &Hint) -> bool {
        self.processors.contains_key(hint)
    }

    /// Registered hints, sorted.
    #[must_use]
    pub fn hints(&self) -> Vec<Hint> {
        let mut hints: Vec<Hint> = self.processors.keys().cloned().collect();
        hints.sort();
        hints
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.processors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }
}

/// Exhaustive: a new kind does not compile until it has a processor.
#[must_use]
pub fn constructor(kind: OperationKind) -> GetNewProcessor {
    match kind {
        OperationKind::RegisterModel => RegisterModelProcessor::new_processor,
        OperationKind::Mint => MintProcessor::new_processor,
        OperationKind::Burn => BurnProcessor::new_processor,
        OperationKind::Approve => ApproveProcessor::new_processor,
        OperationKind::Transfer => TransferProcessor::new_processor,
        OperationKind::TransferFrom => TransferFromProcessor::new_processor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_processors_registered() {
        let processors = OperationProcessors::with_token_processors().unwrap();
        assert_eq!(processors.len(), 6);
        for kind in OperationKind::ALL {
            let p = processors.new_processor(&kind.operation_hint(), 7).unwrap();
            assert_eq!(p.kind(), kind);
            assert_eq!(p.height(), 7);
        }
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut processors = OperationProcessors::with_token_processors().unwrap();
        assert_eq!(
            processors.set_processor(
                OperationKind::Mint.operation_hint(),
                MintProcessor::new_processor
            ),
            Err(RegistryError::DuplicateProcessor(OperationKind::Mint.operation_hint()))
        );
    }

    #[test]
    fn test_unsupported_hint() {
        let processors = OperationProcessors::new();
        let hint = OperationKind::Burn.operation_hint();
        assert!(matches!(
            processors.new_processor(&hint, 1),
            Err(RegistryError::UnsupportedOperation(_))
        ));
    }
}
