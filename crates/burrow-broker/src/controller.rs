//! Broker controller implementation
//!
//! One reconcile pass per Broker: probe every dependent, feed the results
//! through the condition engine, and write the status back with a
//! compare-and-swap on the resource version. When the write loses the race
//! the pass starts over from a freshly fetched Broker.
//!
//! Deleting Brokers and Brokers of another class are never touched.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use burrow_common::conditions::Condition;
use burrow_common::probe::EndpointAvailability;
use burrow_common::retry::retry_on_conflict;
use burrow_common::Error;
use kube::runtime::controller::Action;
use kube::ResourceExt;
use tracing::{debug, info, instrument, warn};

#[cfg(test)]
use mockall::automock;

use crate::config::ControllerConfig;
use crate::crd::{Broker, BrokerStatus, KReference};
use crate::error::BrokerError;
use crate::metrics::{record_status_update, ReconcileResult, ReconcileTimer};
use crate::probe::{ChannelProbe, ExchangeStatus};
use crate::status::{
    BROKER_CONDITION_EXCHANGE, BROKER_CONDITION_FILTER, BROKER_CONDITION_INGRESS,
    BROKER_CONDITION_TRIGGER_CHANNEL,
};

/// Reason recorded when a dependent probe itself failed
pub const REASON_PROBE_FAILED: &str = "ProbeFailed";

/// Reason recorded when a Broker has no config reference
pub const REASON_CONFIG_MISSING: &str = "ConfigMissing";

/// Trait abstracting Broker storage
///
/// This trait allows mocking the API server in tests while using a real
/// client in production.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BrokerClient: Send + Sync {
    /// Fetch the latest copy of a Broker, `None` if it no longer exists
    async fn get_broker(&self, namespace: &str, name: &str) -> Result<Option<Broker>, Error>;

    /// Write `status` for `broker`
    ///
    /// Must fail with a conflict if `broker`'s resource version is stale.
    async fn patch_status(&self, broker: &Broker, status: &BrokerStatus) -> Result<(), Error>;
}

/// Trait abstracting health checks of a Broker's dependents
///
/// An `Err` means the probe could not run. Unhealthy dependents are reported
/// through the `Ok` value.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DependentProber: Send + Sync {
    /// Look up the Broker's trigger channel
    async fn trigger_channel(&self, broker: &Broker) -> Result<ChannelProbe, Error>;

    /// Check the exchange declared on the configured message cluster
    async fn exchange(&self, broker: &Broker, config: &KReference)
        -> Result<ExchangeStatus, Error>;

    /// Check the filter service endpoints
    async fn filter(&self, broker: &Broker) -> Result<EndpointAvailability, Error>;

    /// Check the ingress service endpoints
    async fn ingress(&self, broker: &Broker) -> Result<EndpointAvailability, Error>;
}

/// Shared context for the Broker controller
pub struct Context {
    /// Broker storage
    pub client: Arc<dyn BrokerClient>,
    /// Dependent health checks
    pub prober: Arc<dyn DependentProber>,
    /// Controller settings
    pub config: ControllerConfig,
}

impl Context {
    /// Create a new context
    pub fn new(
        client: Arc<dyn BrokerClient>,
        prober: Arc<dyn DependentProber>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            client,
            prober,
            config,
        }
    }
}

/// Everything the dependent probes reported in one pass
#[derive(Debug)]
pub struct ProbeResults {
    /// Trigger channel lookup
    pub trigger_channel: Result<ChannelProbe, Error>,
    /// Exchange check; `None` when the Broker has no config to check against
    pub exchange: Option<Result<ExchangeStatus, Error>>,
    /// Filter endpoints
    pub filter: Result<EndpointAvailability, Error>,
    /// Ingress endpoints
    pub ingress: Result<EndpointAvailability, Error>,
}

/// Reconcile a Broker resource
#[instrument(skip(broker, ctx), fields(broker = %broker.key()))]
pub async fn reconcile(broker: Arc<Broker>, ctx: Arc<Context>) -> Result<Action, BrokerError> {
    let timer = ReconcileTimer::start();

    match reconcile_broker(&broker, &ctx).await {
        Ok(result) => {
            timer.complete(result);
            Ok(match result {
                ReconcileResult::Ready => Action::requeue(ctx.config.ready_requeue),
                ReconcileResult::NotReady => Action::requeue(ctx.config.not_ready_requeue),
                ReconcileResult::Skipped => Action::await_change(),
            })
        }
        Err(e) => {
            timer.error(e.kind());
            Err(e)
        }
    }
}

/// Error policy for the Broker controller
pub fn error_policy(broker: Arc<Broker>, error: &BrokerError, ctx: Arc<Context>) -> Action {
    warn!(
        broker = %broker.key(),
        error = %error,
        kind = error.kind(),
        "broker reconciliation error, will retry"
    );
    Action::requeue(ctx.config.error_requeue)
}

async fn reconcile_broker(broker: &Broker, ctx: &Context) -> Result<ReconcileResult, BrokerError> {
    if let Some(reason) = skip_reason(broker, &ctx.config) {
        debug!(reason, "skipping broker");
        return Ok(ReconcileResult::Skipped);
    }

    let namespace = broker.namespace().ok_or(BrokerError::MissingNamespace)?;
    let name = broker.name_any();

    let attempts = AtomicU32::new(0);
    let result = retry_on_conflict(&ctx.config.conflict_retry, "broker_status", || {
        let refetch = attempts.fetch_add(1, Ordering::SeqCst) > 0;
        let (namespace, name) = (namespace.clone(), name.clone());
        async move {
            if !refetch {
                return reconcile_pass(broker, ctx).await;
            }
            match ctx.client.get_broker(&namespace, &name).await? {
                Some(fresh) => reconcile_pass(&fresh, ctx).await,
                None => {
                    debug!("broker disappeared before status write");
                    Ok(ReconcileResult::Skipped)
                }
            }
        }
    })
    .await?;

    Ok(result)
}

/// One full pass over a single snapshot of the Broker
async fn reconcile_pass(broker: &Broker, ctx: &Context) -> Result<ReconcileResult, Error> {
    if let Some(reason) = skip_reason(broker, &ctx.config) {
        debug!(reason, "skipping broker");
        return Ok(ReconcileResult::Skipped);
    }

    let namespace = broker.namespace().unwrap_or_default();
    let name = broker.name_any();
    let generation = broker.generation();

    let mut status = broker.status.clone().unwrap_or_default();
    status.observe_generation(generation);
    status.initialize_conditions();

    let probes = gather_probes(broker, ctx.prober.as_ref()).await;
    apply_probes(&namespace, &name, &mut status, probes, &ctx.config);

    let ready = status
        .ready_condition()
        .map(|c| c.status.to_string())
        .unwrap_or_default();

    if broker.status.as_ref() == Some(&status) {
        debug!(ready = %ready, "broker status unchanged");
    } else {
        ctx.client.patch_status(broker, &status).await?;
        record_status_update(&ready);
        info!(
            ready = %ready,
            reason = status.ready_condition().map(|c| c.reason.as_str()).unwrap_or_default(),
            generation,
            "broker status updated"
        );
    }

    Ok(if status.is_ready_at(generation) {
        ReconcileResult::Ready
    } else {
        ReconcileResult::NotReady
    })
}

fn skip_reason(broker: &Broker, config: &ControllerConfig) -> Option<&'static str> {
    if broker.is_being_deleted() {
        return Some("deleting");
    }
    if !config.handles_class(broker.class()) {
        return Some("broker class not handled");
    }
    None
}

/// Run every dependent probe concurrently
pub async fn gather_probes(broker: &Broker, prober: &dyn DependentProber) -> ProbeResults {
    let exchange = async {
        match &broker.spec.config {
            Some(config) => Some(prober.exchange(broker, config).await),
            None => None,
        }
    };

    let (trigger_channel, exchange, filter, ingress) = tokio::join!(
        prober.trigger_channel(broker),
        exchange,
        prober.filter(broker),
        prober.ingress(broker),
    );

    ProbeResults {
        trigger_channel,
        exchange,
        filter,
        ingress,
    }
}

/// Feed probe results through the condition engine
///
/// The Broker's address tracks the Ingress condition: set while Ingress is
/// True, cleared otherwise.
pub fn apply_probes(
    namespace: &str,
    name: &str,
    status: &mut BrokerStatus,
    probes: ProbeResults,
    config: &ControllerConfig,
) {
    match probes.trigger_channel {
        Ok(probe) => status.propagate_trigger_channel_readiness(&probe),
        Err(e) => mark_probe_failed(status, BROKER_CONDITION_TRIGGER_CHANNEL, &e),
    }

    match probes.exchange {
        Some(Ok(exchange)) => status.propagate_exchange_status(&exchange),
        Some(Err(e)) => mark_probe_failed(status, BROKER_CONDITION_EXCHANGE, &e),
        None => status.mark_exchange_failed(
            REASON_CONFIG_MISSING,
            "broker has no spec.config reference",
        ),
    }

    match probes.filter {
        Ok(probe) => status.propagate_filter_availability(&probe),
        Err(e) => mark_probe_failed(status, BROKER_CONDITION_FILTER, &e),
    }

    match probes.ingress {
        Ok(probe) => status.propagate_ingress_availability(&probe),
        Err(e) => mark_probe_failed(status, BROKER_CONDITION_INGRESS, &e),
    }

    let ingress_ready = status
        .get_condition(BROKER_CONDITION_INGRESS)
        .is_some_and(Condition::is_true);
    status.set_address(ingress_ready.then(|| config.ingress_address(namespace, name)));
}

fn mark_probe_failed(status: &mut BrokerStatus, dependent: &str, error: &Error) {
    warn!(dependent, error = %error, "dependent probe failed");
    status
        .manage()
        .mark_unknown(dependent, REASON_PROBE_FAILED, &error.to_string());
}
