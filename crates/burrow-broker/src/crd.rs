//! Broker CRD types
//!
//! A `Broker` is the composite resource this controller drives to readiness.
//! Its status carries the dependent conditions, the resolved ingress address,
//! and the metadata of the trigger channel provisioned for it.

use burrow_common::conditions::Condition;
use burrow_common::Address;
use kube::{CustomResource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Annotation selecting which broker implementation owns a Broker
pub const BROKER_CLASS_ANNOTATION: &str = "eventing.knative.dev/broker.class";

/// Broker class this controller reconciles by default
pub const DEFAULT_BROKER_CLASS: &str = "RabbitMQBroker";

// =============================================================================
// Spec
// =============================================================================

/// Reference to another Kubernetes object by kind and name
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct KReference {
    /// Kind of the referent (e.g. `RabbitmqCluster`)
    pub kind: String,
    /// Name of the referent
    pub name: String,
    /// Namespace of the referent; defaults to the Broker's namespace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// API version of the referent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
}

/// Event broker backed by a message exchange
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "eventing.knative.dev",
    version = "v1",
    kind = "Broker",
    plural = "brokers",
    namespaced,
    status = "BrokerStatus",
    printcolumn = r#"{"name":"URL","type":"string","jsonPath":".status.address"}"#,
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type==\"Ready\")].status"}"#,
    printcolumn = r#"{"name":"Reason","type":"string","jsonPath":".status.conditions[?(@.type==\"Ready\")].reason"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct BrokerSpec {
    /// Broker configuration (the backing message cluster)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<KReference>,
}

// =============================================================================
// Status
// =============================================================================

/// Trigger channel provisioned for a Broker
///
/// Downstream routing reads this to find where triggers deliver from.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChannelMeta {
    /// API version of the channel resource
    pub api_version: String,
    /// Kind of the channel resource
    pub kind: String,
    /// Name of the channel resource
    pub name: String,
    /// Resolved address of the channel
    pub address: Address,
}

/// Observed state of a Broker
///
/// Only the condition engine in [`crate::status`] mutates this during a
/// reconcile pass.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BrokerStatus {
    /// Spec generation this status reflects
    #[serde(default)]
    pub observed_generation: i64,

    /// Dependent conditions plus the `Ready` aggregate
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,

    /// Address events are sent to; present only while ingress is healthy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,

    /// Trigger channel backing this Broker, once it has been ready
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<ChannelMeta>,
}

impl Broker {
    /// The broker class annotation, if set
    pub fn class(&self) -> Option<&str> {
        self.annotations()
            .get(BROKER_CLASS_ANNOTATION)
            .map(String::as_str)
    }

    /// Whether deletion has been requested
    pub fn is_being_deleted(&self) -> bool {
        self.metadata.deletion_timestamp.is_some()
    }

    /// Current spec generation (0 when the API server has not set one)
    pub fn generation(&self) -> i64 {
        self.metadata.generation.unwrap_or(0)
    }

    /// `namespace/name` key used in logs and errors
    pub fn key(&self) -> String {
        format!(
            "{}/{}",
            self.namespace().unwrap_or_default(),
            self.name_any()
        )
    }

    /// Whether this Broker is Ready for its current generation
    ///
    /// A Ready=True status computed for an older generation does not count.
    pub fn is_ready(&self) -> bool {
        self.status
            .as_ref()
            .is_some_and(|s| s.is_ready_at(self.generation()))
    }
}
