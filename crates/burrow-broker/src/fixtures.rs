//! Test fixtures: Brokers built from a list of option closures

use burrow_common::probe::EndpointAvailability;
use burrow_common::Address;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};

use crate::crd::{
    Broker, BrokerSpec, BrokerStatus, KReference, BROKER_CLASS_ANNOTATION, DEFAULT_BROKER_CLASS,
};
use crate::probe::{ChannelProbe, ChannelSummary};

/// One field-level change applied to a Broker under construction
pub type BrokerOption = Box<dyn FnOnce(&mut Broker)>;

/// Build a Broker of the default class with a config reference, then apply
/// `options` left to right
pub fn new_broker(name: &str, namespace: &str, options: Vec<BrokerOption>) -> Broker {
    let mut broker = Broker {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            generation: Some(1),
            resource_version: Some("1".to_string()),
            annotations: Some(
                [(
                    BROKER_CLASS_ANNOTATION.to_string(),
                    DEFAULT_BROKER_CLASS.to_string(),
                )]
                .into(),
            ),
            ..Default::default()
        },
        spec: BrokerSpec {
            config: Some(KReference {
                kind: "RabbitmqCluster".to_string(),
                name: "rabbit".to_string(),
                namespace: None,
                api_version: Some("rabbitmq.com/v1beta1".to_string()),
            }),
        },
        status: None,
    };
    for option in options {
        option(&mut broker);
    }
    broker
}

fn status_mut(broker: &mut Broker) -> &mut BrokerStatus {
    broker.status.get_or_insert_with(BrokerStatus::default)
}

pub fn with_init_conditions() -> BrokerOption {
    Box::new(|b| status_mut(b).initialize_conditions())
}

pub fn with_generation(generation: i64) -> BrokerOption {
    Box::new(move |b| b.metadata.generation = Some(generation))
}

pub fn with_observed_generation(generation: i64) -> BrokerOption {
    Box::new(move |b| status_mut(b).observe_generation(generation))
}

pub fn with_resource_version(rv: &str) -> BrokerOption {
    let rv = rv.to_string();
    Box::new(move |b| b.metadata.resource_version = Some(rv))
}

pub fn with_deletion_timestamp() -> BrokerOption {
    Box::new(|b| {
        b.metadata.deletion_timestamp = Some(Time(
            chrono::DateTime::from_timestamp(1_000_000_000, 0).unwrap_or_default(),
        ))
    })
}

pub fn with_class(class: &str) -> BrokerOption {
    let class = class.to_string();
    Box::new(move |b| {
        b.metadata
            .annotations
            .get_or_insert_with(Default::default)
            .insert(BROKER_CLASS_ANNOTATION.to_string(), class);
    })
}

pub fn without_config() -> BrokerOption {
    Box::new(|b| b.spec.config = None)
}

pub fn with_ready_status() -> BrokerOption {
    Box::new(|b| {
        let status = status_mut(b);
        status.initialize_conditions();
        status.propagate_trigger_channel_readiness(&ready_channel());
        status.mark_exchange_ready();
        status.propagate_filter_availability(&EndpointAvailability::available(1));
        status.propagate_ingress_availability(&EndpointAvailability::available(1));
    })
}

pub fn with_trigger_channel_failed(reason: &str, message: &str) -> BrokerOption {
    let (reason, message) = (reason.to_string(), message.to_string());
    Box::new(move |b| status_mut(b).mark_trigger_channel_failed(&reason, &message))
}

pub fn channel_summary(ready: Option<bool>, address: Option<Address>) -> ChannelSummary {
    ChannelSummary {
        ready,
        address,
        api_version: "messaging.knative.dev/v1".to_string(),
        kind: "InMemoryChannel".to_string(),
        name: "test-channel".to_string(),
        message: String::new(),
    }
}

pub fn ready_channel() -> ChannelProbe {
    ChannelProbe::Observed(channel_summary(
        Some(true),
        Some(Address::http("test-channel.default.svc")),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::ResourceExt;

    #[test]
    fn test_options_apply_left_to_right() {
        let broker = new_broker(
            "b",
            "default",
            vec![with_generation(2), with_generation(5), with_class("Other")],
        );
        assert_eq!(broker.generation(), 5);
        assert_eq!(broker.class(), Some("Other"));
        assert_eq!(broker.namespace().as_deref(), Some("default"));
    }

    #[test]
    fn test_ready_status_fixture_is_ready() {
        let broker = new_broker(
            "b",
            "default",
            vec![with_ready_status(), with_observed_generation(1)],
        );
        assert!(broker.is_ready());
    }
}
