//! # Node Runtime Library
//!
//! Wires the token model, the operation pool and the API gateway into a
//! runnable node. The main entry point is the `main.rs` binary.
//!
//! ## Modular Structure
//!
//! - `container/` - configuration and component wiring
//! - `genesis/` - genesis state seeding
//! - `adapters/` - port implementations (operation pool)
//! - `runtime` - block loop and shutdown
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from `QC_*` environment variables
//! 2. Register model modules, seed genesis
//! 3. Start the API gateway and the block loop
//! 4. Stop both on Ctrl+C

#![allow(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod adapters;
pub mod container;
pub mod genesis;
pub mod runtime;

pub use adapters::OperationPool;
pub use container::{NodeConfig, NodeContainer};
pub use genesis::{GenesisBuilder, GenesisConfig};
pub use runtime::{NodeRuntime, RuntimeError};
