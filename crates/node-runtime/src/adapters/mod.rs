//! # Adapters
//!
//! Port implementations owned by the node.

pub mod mempool;

pub use mempool::OperationPool;
