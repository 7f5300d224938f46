//! # Token Service
//!
//! Drives one block of token operations through the processors and commits
//! the result.
//!
//! ```text
//! for op in block:
//!     Operation::is_valid ─▶ DuplicationChecker ─▶ pre_process ─▶ process
//!         │ reason error: op rejected, block continues
//!         │ hard error:   block aborted, nothing committed
//!         ▼
//!     PendingState::stage   (later ops see earlier writes)
//!
//! StateStore::commit(height, staged) ─▶ CommitObserver::on_commit
//! ```
//!
//! Once the commit succeeds the block stands. An observer failure is logged
//! and counted, never turned into a block error.

use std::sync::Arc;

use parking_lot::RwLock;
use shared_types::{Hash, Height};
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::adapters::PendingState;
use crate::errors::RegistryError;
use crate::operation::{Operation, OperationKind};
use crate::ports::outbound::{CommitObserver, StateStore};
use crate::processor::{DuplicationChecker, OperationProcessors, ProcessError, ReasonError};
use crate::state::{StateError, StateMergeValue};

/// Token service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Operations accepted into one block call.
    pub max_operations_per_block: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_operations_per_block: 1000,
        }
    }
}

/// Failures that abort a block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The block exceeds [`ServiceConfig::max_operations_per_block`].
    #[error("block carries {count} operations, limit is {limit}")]
    TooManyOperations { count: usize, limit: usize },

    /// A hard failure while admitting `operation`.
    #[error("operation {operation} failed: {source}")]
    Process {
        operation: Hash,
        #[source]
        source: ProcessError,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    State(#[from] StateError),
}

/// An operation left out of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedOperation {
    pub hash: Hash,
    pub kind: OperationKind,
    /// User-visible rejection message.
    pub reason: String,
}

/// Outcome of one processed block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockReport {
    pub height: Height,
    /// Accepted operation hashes, in block order.
    pub accepted: Vec<Hash>,
    pub rejected: Vec<RejectedOperation>,
    /// States written by the commit.
    pub states: usize,
}

/// Counters over the service lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceStats {
    /// Blocks committed.
    pub blocks: u64,
    pub accepted: u64,
    pub rejected: u64,
    /// Height of the last committed block.
    pub last_height: Option<Height>,
    /// Observer notifications that failed after a commit.
    pub observer_failures: u64,
}

/// Block processor for token operations.
pub struct TokenService {
    store: Arc<dyn StateStore>,
    processors: Arc<OperationProcessors>,
    observers: Vec<Arc<dyn CommitObserver>>,
    config: ServiceConfig,
    stats: RwLock<ServiceStats>,
}

impl TokenService {
    pub fn new(
        store: Arc<dyn StateStore>,
        processors: Arc<OperationProcessors>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            store,
            processors,
            observers: Vec::new(),
            config,
            stats: RwLock::new(ServiceStats::default()),
        }
    }

    /// Adds a listener notified after every commit.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn CommitObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    #[must_use]
    pub fn stats(&self) -> ServiceStats {
        self.stats.read().clone()
    }

    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Processes `operations` in order and commits the accepted ones at
    /// `height`.
    #[instrument(skip(self, operations), fields(operations = operations.len()))]
    pub fn process_block(
        &self,
        height: Height,
        operations: Vec<Operation>,
    ) -> Result<BlockReport, ServiceError> {
        if operations.len() > self.config.max_operations_per_block {
            return Err(ServiceError::TooManyOperations {
                count: operations.len(),
                limit: self.config.max_operations_per_block,
            });
        }

        let mut report = BlockReport {
            height,
            ..BlockReport::default()
        };
        let mut checker = DuplicationChecker::new();
        let mut pending = PendingState::new(self.store.as_ref(), height);

        for op in &operations {
            match self.admit(op, height, &mut checker, &pending) {
                Ok(values) => {
                    pending.stage(op.fact().hash(), values)?;
                    report.accepted.push(op.hash());
                }
                Err(AdmitError::Rejected(reason)) => {
                    debug!(
                        operation = %op.hash(),
                        kind = %op.kind(),
                        %reason,
                        "operation rejected"
                    );
                    report.rejected.push(RejectedOperation {
                        hash: op.hash(),
                        kind: op.kind(),
                        reason: reason.to_string(),
                    });
                }
                Err(AdmitError::Hard(err)) => {
                    warn!(operation = %op.hash(), error = %err, "block aborted");
                    return Err(err);
                }
            }
        }

        let states = self.store.commit(height, &pending.into_staged())?;
        let mut observer_failures = 0;
        for observer in &self.observers {
            if let Err(err) = observer.on_commit(height, &states) {
                error!(height, error = %err, "commit observer failed");
                observer_failures += 1;
            }
        }
        report.states = states.len();

        {
            let mut stats = self.stats.write();
            stats.blocks += 1;
            stats.accepted += report.accepted.len() as u64;
            stats.rejected += report.rejected.len() as u64;
            stats.last_height = Some(height);
            stats.observer_failures += observer_failures;
        }

        info!(
            height,
            accepted = report.accepted.len(),
            rejected = report.rejected.len(),
            states = report.states,
            "block processed"
        );
        Ok(report)
    }

    fn admit(
        &self,
        op: &Operation,
        height: Height,
        checker: &mut DuplicationChecker,
        pending: &PendingState<'_, dyn StateStore>,
    ) -> Result<Vec<StateMergeValue>, AdmitError> {
        op.is_valid()
            .map_err(|e| AdmitError::Rejected(ReasonError::InvalidFact(e)))?;

        let processor = match self.processors.new_processor(op.hint(), height) {
            Ok(p) => p,
            Err(RegistryError::UnsupportedOperation(hint)) => {
                return Err(AdmitError::Rejected(ReasonError::UnsupportedOperation(hint)));
            }
            Err(err) => return Err(AdmitError::Hard(err.into())),
        };

        checker.check(op.fact()).map_err(AdmitError::Rejected)?;

        let classify = |err: ProcessError| match err {
            ProcessError::Reason(reason) => AdmitError::Rejected(reason),
            hard => AdmitError::Hard(ServiceError::Process {
                operation: op.hash(),
                source: hard,
            }),
        };

        processor.pre_process(op, pending).map_err(classify)?;
        processor.process(op, pending).map_err(classify)
    }
}

enum AdmitError {
    Rejected(ReasonError),
    Hard(ServiceError),
}
