//! Common types for Burrow: the condition engine, errors, and utilities

#![deny(missing_docs)]

pub mod address;
pub mod conditions;
pub mod error;
pub mod probe;
pub mod retry;
pub mod telemetry;

pub use address::Address;
pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Name of the top-level aggregate condition on every Burrow resource
pub const READY_CONDITION: &str = "Ready";
