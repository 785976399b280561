//! Broker readiness conditions
//!
//! `Ready` is the three-valued AND of four dependents, in this order:
//! TriggerChannel, Exchange, Filter, Ingress. Every mutator here goes through
//! [`ConditionManager`], so `Ready` is recomputed after each one.

use burrow_common::conditions::{
    find_condition, Condition, ConditionAccessor, ConditionManager, ConditionSet,
};
use burrow_common::probe::EndpointAvailability;
use burrow_common::{Address, READY_CONDITION};
use once_cell::sync::Lazy;

use crate::crd::BrokerStatus;
use crate::probe::{ChannelProbe, ExchangeStatus};

/// Aggregate condition of a Broker
pub const BROKER_CONDITION_READY: &str = READY_CONDITION;
/// The trigger channel exists and is addressable
pub const BROKER_CONDITION_TRIGGER_CHANNEL: &str = "TriggerChannel";
/// The exchange events are routed through is declared
pub const BROKER_CONDITION_EXCHANGE: &str = "Exchange";
/// The filter service has available endpoints
pub const BROKER_CONDITION_FILTER: &str = "Filter";
/// The ingress service has available endpoints
pub const BROKER_CONDITION_INGRESS: &str = "Ingress";

/// Trigger channel lookup found nothing
pub const REASON_CHANNEL_NOT_FOUND: &str = "ChannelNotFound";
/// Trigger channel reported not ready
pub const REASON_CHANNEL_NOT_READY: &str = "ChannelNotReady";
/// Trigger channel is ready but has no address
pub const REASON_CHANNEL_NOT_ADDRESSABLE: &str = "ChannelNotAddressable";
/// Trigger channel readiness could not be determined
pub const REASON_CHANNEL_STATUS_UNKNOWN: &str = "ChannelStatusUnknown";
/// Exchange reported failure without a reason of its own
pub const REASON_EXCHANGE_FAILURE: &str = "ExchangeFailure";
/// Exchange state could not be determined
pub const REASON_EXCHANGE_STATUS_UNKNOWN: &str = "ExchangeStatusUnknown";

/// Condition schema shared by every Broker
pub static BROKER_CONDITIONS: Lazy<ConditionSet> = Lazy::new(|| {
    ConditionSet::new(
        BROKER_CONDITION_READY,
        [
            BROKER_CONDITION_TRIGGER_CHANNEL,
            BROKER_CONDITION_EXCHANGE,
            BROKER_CONDITION_FILTER,
            BROKER_CONDITION_INGRESS,
        ],
    )
    .expect("broker condition set is statically valid")
});

impl ConditionAccessor for BrokerStatus {
    fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    fn conditions_mut(&mut self) -> &mut Vec<Condition> {
        &mut self.conditions
    }
}

impl BrokerStatus {
    /// Condition engine bound to the Broker schema
    pub fn manage(&mut self) -> ConditionManager<'_, Self> {
        ConditionManager::new(&BROKER_CONDITIONS, self)
    }

    /// Seed every missing Broker condition as Unknown
    pub fn initialize_conditions(&mut self) {
        self.manage().initialize_conditions();
    }

    /// Look up a condition by type
    pub fn get_condition(&self, type_: &str) -> Option<&Condition> {
        find_condition(&self.conditions, type_)
    }

    /// The `Ready` condition, if initialized
    pub fn ready_condition(&self) -> Option<&Condition> {
        self.get_condition(BROKER_CONDITION_READY)
    }

    /// Record the spec generation this status is being computed for
    pub fn observe_generation(&mut self, generation: i64) {
        self.observed_generation = generation;
    }

    /// Whether `Ready` is True, ignoring generation skew
    ///
    /// Prefer [`BrokerStatus::is_ready_at`] when gating traffic.
    pub fn is_ready(&self) -> bool {
        self.ready_condition().is_some_and(Condition::is_true)
    }

    /// Whether `Ready` is True and was computed for `generation`
    pub fn is_ready_at(&self, generation: i64) -> bool {
        self.observed_generation == generation && self.is_ready()
    }

    /// Overwrite the Broker's address
    pub fn set_address(&mut self, address: Option<Address>) {
        self.address = address;
    }

    /// Mark the trigger channel failed
    pub fn mark_trigger_channel_failed(&mut self, reason: &str, message: &str) {
        self.manage()
            .mark_false(BROKER_CONDITION_TRIGGER_CHANNEL, reason, message);
    }

    /// Mark the exchange ready
    pub fn mark_exchange_ready(&mut self) {
        self.manage().mark_true(BROKER_CONDITION_EXCHANGE);
    }

    /// Mark the exchange failed
    pub fn mark_exchange_failed(&mut self, reason: &str, message: &str) {
        self.manage()
            .mark_false(BROKER_CONDITION_EXCHANGE, reason, message);
    }

    /// Mark the filter failed
    pub fn mark_filter_failed(&mut self, reason: &str, message: &str) {
        self.manage().mark_false(BROKER_CONDITION_FILTER, reason, message);
    }

    /// Mark the ingress failed
    pub fn mark_ingress_failed(&mut self, reason: &str, message: &str) {
        self.manage()
            .mark_false(BROKER_CONDITION_INGRESS, reason, message);
    }

    /// Apply an exchange probe
    pub fn propagate_exchange_status(&mut self, exchange: &ExchangeStatus) {
        match exchange.ready {
            Some(true) => self.mark_exchange_ready(),
            Some(false) => {
                let reason = if exchange.reason.is_empty() {
                    REASON_EXCHANGE_FAILURE
                } else {
                    exchange.reason.as_str()
                };
                self.mark_exchange_failed(reason, &exchange.message);
            }
            None => self.manage().mark_unknown(
                BROKER_CONDITION_EXCHANGE,
                REASON_EXCHANGE_STATUS_UNKNOWN,
                &exchange.message,
            ),
        }
    }

    /// Apply a filter endpoint probe
    pub fn propagate_filter_availability(&mut self, probe: &EndpointAvailability) {
        self.manage()
            .propagate_availability(BROKER_CONDITION_FILTER, probe);
    }

    /// Apply an ingress endpoint probe
    pub fn propagate_ingress_availability(&mut self, probe: &EndpointAvailability) {
        self.manage()
            .propagate_availability(BROKER_CONDITION_INGRESS, probe);
    }

    /// Apply a trigger channel probe
    ///
    /// Channel metadata is published only when the channel is ready and
    /// addressable. After that it is kept through not-ready and unknown
    /// probes so the published endpoint does not flap, and is retracted only
    /// once the channel is gone.
    pub fn propagate_trigger_channel_readiness(&mut self, probe: &ChannelProbe) {
        let summary = match probe {
            ChannelProbe::Gone => {
                self.channel = None;
                self.mark_trigger_channel_failed(
                    REASON_CHANNEL_NOT_FOUND,
                    "trigger channel does not exist",
                );
                return;
            }
            ChannelProbe::Observed(summary) => summary,
        };

        match (summary.ready, summary.meta()) {
            (Some(true), Some(meta)) => {
                self.channel = Some(meta);
                self.manage().mark_true(BROKER_CONDITION_TRIGGER_CHANNEL);
            }
            (Some(true), None) => self.mark_trigger_channel_failed(
                REASON_CHANNEL_NOT_ADDRESSABLE,
                "trigger channel is not ready: not addressable",
            ),
            (Some(false), _) => {
                let message = if summary.message.is_empty() {
                    "trigger channel is not ready".to_string()
                } else {
                    format!("trigger channel is not ready: {}", summary.message)
                };
                self.mark_trigger_channel_failed(REASON_CHANNEL_NOT_READY, &message);
            }
            (None, _) => self.manage().mark_unknown(
                BROKER_CONDITION_TRIGGER_CHANNEL,
                REASON_CHANNEL_STATUS_UNKNOWN,
                "trigger channel readiness could not be determined",
            ),
        }
    }
}
