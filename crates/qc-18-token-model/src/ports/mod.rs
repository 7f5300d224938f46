//! Ports layer for the token model.
//!
//! Defines the hexagonal architecture port traits:
//! - Inbound (Driving) ports: read API exposed to the HTTP digest layer
//! - Outbound (Driven) ports: the host's state store and commit listeners

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
