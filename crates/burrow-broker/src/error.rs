//! Broker controller error types

/// Errors surfaced by a Broker reconcile pass
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    /// Error from storage, a probe, or conflict retries
    #[error("{0}")]
    Common(#[from] burrow_common::Error),

    /// Broker is cluster-scoped or its namespace was stripped
    #[error("missing namespace on Broker")]
    MissingNamespace,
}

impl BrokerError {
    /// Short label for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Common(e) if e.is_conflict() => "conflict",
            Self::Common(e) if e.is_retryable() => "transient",
            Self::Common(_) => "permanent",
            Self::MissingNamespace => "permanent",
        }
    }
}
