//! Reconcile metrics for the Broker controller

use once_cell::sync::Lazy;
use opentelemetry::global;
use opentelemetry::metrics::{Counter, Histogram, Meter};
use opentelemetry::KeyValue;

static METER: Lazy<Meter> = Lazy::new(|| global::meter("burrow-broker"));

/// Histogram of broker reconciliation duration
///
/// Labels:
/// - `result`: ready, not_ready, skipped, error
pub static BROKER_RECONCILE_DURATION: Lazy<Histogram<f64>> = Lazy::new(|| {
    METER
        .f64_histogram("burrow_broker_reconcile_duration_seconds")
        .with_description("Duration of broker reconciliation in seconds")
        .with_unit("s")
        .build()
});

/// Counter of broker reconciliation errors
///
/// Labels:
/// - `error_type`: conflict, transient, permanent
pub static BROKER_RECONCILE_ERRORS: Lazy<Counter<u64>> = Lazy::new(|| {
    METER
        .u64_counter("burrow_broker_reconcile_errors_total")
        .with_description("Total number of broker reconciliation errors")
        .with_unit("{errors}")
        .build()
});

/// Counter of broker status writes
///
/// Labels:
/// - `ready`: True, False, Unknown
pub static BROKER_STATUS_UPDATES: Lazy<Counter<u64>> = Lazy::new(|| {
    METER
        .u64_counter("burrow_broker_status_updates_total")
        .with_description("Total number of broker status writes")
        .with_unit("{updates}")
        .build()
});

/// How a reconcile pass ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconcileResult {
    /// Broker is Ready
    Ready,
    /// Broker status computed, not Ready
    NotReady,
    /// Broker was deleted, being deleted, or of another class
    Skipped,
}

impl ReconcileResult {
    /// Label value for this result
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::NotReady => "not_ready",
            Self::Skipped => "skipped",
        }
    }
}

/// Timer for a reconcile pass
pub struct ReconcileTimer {
    start: std::time::Instant,
}

impl ReconcileTimer {
    /// Start timing a reconciliation
    pub fn start() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }

    /// Record a completed pass
    pub fn complete(self, result: ReconcileResult) {
        BROKER_RECONCILE_DURATION.record(
            self.start.elapsed().as_secs_f64(),
            &[KeyValue::new("result", result.as_str())],
        );
    }

    /// Record a failed pass
    pub fn error(self, error_type: &'static str) {
        BROKER_RECONCILE_DURATION.record(
            self.start.elapsed().as_secs_f64(),
            &[KeyValue::new("result", "error")],
        );
        BROKER_RECONCILE_ERRORS.add(1, &[KeyValue::new("error_type", error_type)]);
    }
}

/// Record a status write and the Ready status it carried
pub fn record_status_update(ready: &str) {
    BROKER_STATUS_UPDATES.add(1, &[KeyValue::new("ready", ready.to_string())]);
}
