//! Broker controller settings
//!
//! Defaults suit an in-cluster deployment; each field can be overridden with
//! a `BURROW_*` environment variable.

use std::time::Duration;

use burrow_common::retry::RetryConfig;
use burrow_common::{Address, Error, Result};

use crate::crd::DEFAULT_BROKER_CLASS;

/// Settings for the Broker reconciler
#[derive(Clone, Debug)]
pub struct ControllerConfig {
    /// Broker class annotation value this controller owns
    pub broker_class: String,
    /// Namespace the shared ingress service runs in
    pub system_namespace: String,
    /// Name of the shared ingress service
    pub ingress_service: String,
    /// Cluster DNS suffix
    pub cluster_domain: String,
    /// Requeue interval once a Broker is Ready
    pub ready_requeue: Duration,
    /// Requeue interval while a Broker is not Ready
    pub not_ready_requeue: Duration,
    /// Requeue interval after a failed pass
    pub error_requeue: Duration,
    /// Backoff for status write conflicts
    pub conflict_retry: RetryConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            broker_class: DEFAULT_BROKER_CLASS.to_string(),
            system_namespace: "burrow-system".to_string(),
            ingress_service: "broker-ingress".to_string(),
            cluster_domain: "cluster.local".to_string(),
            ready_requeue: Duration::from_secs(300),
            not_ready_requeue: Duration::from_secs(15),
            error_requeue: Duration::from_secs(30),
            conflict_retry: RetryConfig::default(),
        }
    }
}

impl ControllerConfig {
    /// Load settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings from an arbitrary key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(class) = lookup("BURROW_BROKER_CLASS") {
            config.broker_class = class;
        }
        if let Some(ns) = lookup("BURROW_SYSTEM_NAMESPACE") {
            config.system_namespace = ns;
        }
        if let Some(svc) = lookup("BURROW_INGRESS_SERVICE") {
            config.ingress_service = svc;
        }
        if let Some(domain) = lookup("BURROW_CLUSTER_DOMAIN") {
            config.cluster_domain = domain;
        }
        if let Some(secs) = lookup("BURROW_READY_REQUEUE_SECS") {
            config.ready_requeue = parse_secs("BURROW_READY_REQUEUE_SECS", &secs)?;
        }
        if let Some(secs) = lookup("BURROW_NOT_READY_REQUEUE_SECS") {
            config.not_ready_requeue = parse_secs("BURROW_NOT_READY_REQUEUE_SECS", &secs)?;
        }
        if let Some(secs) = lookup("BURROW_ERROR_REQUEUE_SECS") {
            config.error_requeue = parse_secs("BURROW_ERROR_REQUEUE_SECS", &secs)?;
        }
        if let Some(attempts) = lookup("BURROW_CONFLICT_RETRIES") {
            let attempts = attempts.parse::<u32>().map_err(|e| {
                Error::validation_for("BURROW_CONFLICT_RETRIES", format!("{attempts:?}: {e}"))
            })?;
            config.conflict_retry = RetryConfig::with_max_attempts(attempts);
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would produce unusable addresses
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("brokerClass", &self.broker_class),
            ("systemNamespace", &self.system_namespace),
            ("ingressService", &self.ingress_service),
            ("clusterDomain", &self.cluster_domain),
        ] {
            if value.trim().is_empty() {
                return Err(Error::validation_for(
                    "ControllerConfig",
                    format!("{field} must not be empty"),
                ));
            }
        }
        Ok(())
    }

    /// Whether a Broker with this class annotation belongs to us
    pub fn handles_class(&self, class: Option<&str>) -> bool {
        class == Some(self.broker_class.as_str())
    }

    /// Address the shared ingress serves a Broker on
    pub fn ingress_address(&self, namespace: &str, name: &str) -> Address {
        Address::http(format!(
            "{}.{}.svc.{}",
            self.ingress_service, self.system_namespace, self.cluster_domain
        ))
        .with_path(format!("/{namespace}/{name}"))
    }
}

fn parse_secs(key: &str, value: &str) -> Result<Duration> {
    value
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| Error::validation_for(key, format!("{value:?}: {e}")))
}
