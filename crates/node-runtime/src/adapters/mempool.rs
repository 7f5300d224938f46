//! # Operation Pool
//!
//! FIFO queue between `POST /operation` and the block loop.
//!
//! - `by_hash`: refuses an operation already waiting
//! - bounded by `capacity`; a full pool refuses new submissions
//! - closed on shutdown; later submissions fail with `Closed`

use std::collections::{HashSet, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use qc_16_api_gateway::{OperationSubmitter, SubmitError};
use qc_18_token_model::operation::Operation;
use shared_types::Hash;
use tracing::debug;

#[derive(Default)]
struct PoolInner {
    queue: VecDeque<Operation>,
    by_hash: HashSet<Hash>,
    closed: bool,
}

/// Bounded operation queue.
pub struct OperationPool {
    capacity: usize,
    inner: Mutex<PoolInner>,
}

impl OperationPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(PoolInner::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.inner.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().queue.is_empty()
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.inner.lock().by_hash.contains(hash)
    }

    /// Queues `operation` at the back.
    pub fn push(&self, operation: Operation) -> Result<(), SubmitError> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return Err(SubmitError::Closed);
        }
        let hash = operation.hash();
        if inner.by_hash.contains(&hash) {
            return Err(SubmitError::Duplicate(hash));
        }
        if inner.queue.len() >= self.capacity {
            return Err(SubmitError::PoolFull {
                capacity: self.capacity,
            });
        }

        inner.by_hash.insert(hash);
        inner.queue.push_back(operation);
        debug!(%hash, queued = inner.queue.len(), "operation pooled");
        Ok(())
    }

    /// Removes up to `max` operations from the front, in submission order.
    pub fn drain(&self, max: usize) -> Vec<Operation> {
        let mut inner = self.inner.lock();
        let take = max.min(inner.queue.len());
        let drained: Vec<Operation> = inner.queue.drain(..take).collect();
        for op in &drained {
            inner.by_hash.remove(&op.hash());
        }
        drained
    }

    /// Refuses further submissions. Queued operations stay drainable.
    pub fn close(&self) {
        self.inner.lock().closed = true;
    }
}

#[async_trait]
impl OperationSubmitter for OperationPool {
    async fn submit(&self, operation: Operation) -> Result<(), SubmitError> {
        self.push(operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qc_18_token_model::operation::{MintFact, TokenFact};
    use shared_types::{Address, Amount, CurrencyId};

    fn op(nonce: u8) -> Operation {
        Operation::new(MintFact::new(
            TokenFact::new(
                vec![nonce],
                Address([1; 20]),
                Address([9; 20]),
                CurrencyId::new("QCT").unwrap(),
            ),
            Address([2; 20]),
            Amount::from(1),
        ))
    }

    #[test]
    fn test_fifo_drain() {
        let pool = OperationPool::new(10);
        for n in 0..5 {
            pool.push(op(n)).unwrap();
        }

        let first = pool.drain(3);
        assert_eq!(first, vec![op(0), op(1), op(2)]);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.drain(10), vec![op(3), op(4)]);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_duplicate_refused_until_drained() {
        let pool = OperationPool::new(10);
        pool.push(op(1)).unwrap();
        assert_eq!(pool.push(op(1)), Err(SubmitError::Duplicate(op(1).hash())));

        pool.drain(1);
        assert!(!pool.contains(&op(1).hash()));
        assert!(pool.push(op(1)).is_ok());
    }

    #[test]
    fn test_capacity() {
        let pool = OperationPool::new(2);
        pool.push(op(1)).unwrap();
        pool.push(op(2)).unwrap();
        assert_eq!(pool.push(op(3)), Err(SubmitError::PoolFull { capacity: 2 }));
    }

    #[tokio::test]
    async fn test_closed_pool_refuses_submit() {
        let pool = OperationPool::new(2);
        pool.submit(op(1)).await.unwrap();
        pool.close();

        assert_eq!(pool.submit(op(2)).await, Err(SubmitError::Closed));
        assert_eq!(pool.drain(5).len(), 1);
    }
}
