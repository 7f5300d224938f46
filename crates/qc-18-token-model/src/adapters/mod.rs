//! Adapters layer for the token model.
//!
//! - [`InMemoryStateDb`]: state store for tests and the single-node runtime
//! - [`PendingState`]: block-local overlay so later operations in a block see
//!   the writes of earlier ones

pub mod memory_state;
pub mod pending;

pub use memory_state::InMemoryStateDb;
pub use pending::PendingState;

#[cfg(test)]
pub(crate) mod testing;
