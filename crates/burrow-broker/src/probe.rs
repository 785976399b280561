//! Probe summaries for the Broker's channel and exchange dependents
//!
//! Endpoint-backed dependents (filter, ingress) use
//! [`burrow_common::probe::EndpointAvailability`].

use burrow_common::Address;
use serde::{Deserialize, Serialize};

use crate::crd::ChannelMeta;

/// Observed state of the trigger channel
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSummary {
    /// The channel's own readiness verdict, if known
    pub ready: Option<bool>,
    /// Resolved channel address, once the channel is addressable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    /// API version of the channel resource
    pub api_version: String,
    /// Kind of the channel resource
    pub kind: String,
    /// Name of the channel resource
    pub name: String,
    /// Why the channel is not ready, when it says
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl ChannelSummary {
    /// Channel metadata to publish, if the channel has an address
    pub fn meta(&self) -> Option<ChannelMeta> {
        self.address.as_ref().map(|address| ChannelMeta {
            api_version: self.api_version.clone(),
            kind: self.kind.clone(),
            name: self.name.clone(),
            address: address.clone(),
        })
    }
}

/// Result of looking up the trigger channel
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChannelProbe {
    /// The channel exists and reported this state
    Observed(ChannelSummary),
    /// The channel does not exist
    Gone,
}

/// Observed state of the exchange backing the Broker
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeStatus {
    /// Whether the exchange is declared and usable, if known
    pub ready: Option<bool>,
    /// Machine-readable reason when not ready
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
    /// Human-readable detail when not ready
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl ExchangeStatus {
    /// Exchange is declared and usable
    pub fn ready() -> Self {
        Self {
            ready: Some(true),
            ..Default::default()
        }
    }

    /// Exchange could not be declared or is unusable
    pub fn failed(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            ready: Some(false),
            reason: reason.into(),
            message: message.into(),
        }
    }

    /// Exchange state could not be determined
    pub fn unknown(message: impl Into<String>) -> Self {
        Self {
            ready: None,
            reason: String::new(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(address: Option<Address>) -> ChannelSummary {
        ChannelSummary {
            ready: Some(true),
            address,
            api_version: "messaging.knative.dev/v1".to_string(),
            kind: "InMemoryChannel".to_string(),
            name: "b-kne-trigger".to_string(),
            message: String::new(),
        }
    }

    #[test]
    fn test_meta_requires_address() {
        assert!(summary(None).meta().is_none());

        let meta = summary(Some(Address::http("b-kne-trigger.default.svc")))
            .meta()
            .unwrap();
        assert_eq!(meta.kind, "InMemoryChannel");
        assert_eq!(meta.address.host(), "b-kne-trigger.default.svc");
    }

    #[test]
    fn test_exchange_constructors() {
        assert_eq!(ExchangeStatus::ready().ready, Some(true));
        let failed = ExchangeStatus::failed("ExchangeFailure", "access refused");
        assert_eq!(failed.ready, Some(false));
        assert_eq!(failed.reason, "ExchangeFailure");
        assert_eq!(ExchangeStatus::unknown("timeout").ready, None);
    }
}
