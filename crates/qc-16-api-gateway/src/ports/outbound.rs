//! Outbound ports for the API Gateway.

use async_trait::async_trait;
use qc_18_token_model::operation::Operation;
use shared_types::Hash;
use thiserror::Error;

/// Why an operation was not queued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("operation pool is full, capacity {capacity}")]
    PoolFull { capacity: usize },

    #[error("operation {0} is already queued")]
    Duplicate(Hash),

    #[error("operation pool is closed")]
    Closed,
}

/// Queue that feeds submitted operations into the next blocks.
#[async_trait]
pub trait OperationSubmitter: Send + Sync {
    /// Queues a structurally valid operation.
    async fn submit(&self, operation: Operation) -> Result<(), SubmitError>;
}
