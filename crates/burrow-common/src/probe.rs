//! Probe summaries handed to the condition engine by external health checks

use serde::{Deserialize, Serialize};

use crate::conditions::ConditionStatus;

/// Reason used when a probed service has no available endpoints
pub const REASON_UNAVAILABLE: &str = "Unavailable";

/// Reason used when a probe could not tell whether endpoints are available
pub const REASON_ENDPOINTS_UNKNOWN: &str = "EndpointsUnknown";

/// Endpoint availability of a service-backed dependent
///
/// `ready` is the probed resource's own verdict. `None` means the probe could
/// not determine it, which is not the same as the service being down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointAvailability {
    /// The probed resource's own readiness verdict, if known
    pub ready: Option<bool>,
    /// Number of endpoints backing the service
    pub total_endpoints: u32,
    /// Number of those endpoints currently serving
    pub available_endpoints: u32,
}

impl EndpointAvailability {
    /// Every endpoint is serving
    pub fn available(total: u32) -> Self {
        Self {
            ready: Some(true),
            total_endpoints: total,
            available_endpoints: total,
        }
    }

    /// No endpoint is serving
    pub fn unavailable(total: u32) -> Self {
        Self {
            ready: Some(false),
            total_endpoints: total,
            available_endpoints: 0,
        }
    }

    /// The probe could not determine availability
    pub fn indeterminate() -> Self {
        Self::default()
    }

    /// Map the probe onto the engine's three-valued model
    pub fn status(&self) -> ConditionStatus {
        match self.ready {
            None => ConditionStatus::Unknown,
            Some(false) => ConditionStatus::False,
            Some(true) if self.available_endpoints == 0 => ConditionStatus::False,
            Some(true) => ConditionStatus::True,
        }
    }

    /// Human-readable availability summary
    pub fn summary(&self) -> String {
        format!(
            "{} of {} endpoints available",
            self.available_endpoints, self.total_endpoints
        )
    }
}
