//! HTTP middleware applied around the digest routes.

pub mod cors;

pub use cors::create_cors_layer;
