//! Broker readiness reconciler
//!
//! Drives a `Broker` through its readiness lifecycle by probing the trigger
//! channel, exchange, filter, and ingress that back it, and rolling their
//! health up into the broker's `Ready` condition.
//!
//! - [`crd`] - Broker custom resource and status types
//! - [`status`] - condition engine operations on `BrokerStatus`
//! - [`probe`] - probe summaries for channel and exchange dependents
//! - [`controller`] - reconcile driver and its collaborator traits
//! - [`config`] - controller settings
//! - [`metrics`] - reconcile metrics

#![deny(missing_docs)]

pub mod config;
pub mod controller;
pub mod crd;
pub mod error;
pub mod metrics;
pub mod probe;
pub mod status;

#[cfg(test)]
pub(crate) mod fixtures;

pub use config::ControllerConfig;
pub use controller::{error_policy, reconcile, BrokerClient, Context, DependentProber};
pub use crd::{Broker, BrokerSpec, BrokerStatus, ChannelMeta, KReference};
pub use error::BrokerError;
pub use status::BROKER_CONDITIONS;
