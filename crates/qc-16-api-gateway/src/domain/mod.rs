//! Gateway domain: configuration, errors and response envelopes.

pub mod config;
pub mod error;
pub mod hal;
