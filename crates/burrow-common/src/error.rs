//! Error types for Burrow controllers
//!
//! The condition engine itself never returns errors. Everything here comes
//! from schema construction or from the collaborators a reconcile pass talks
//! to (status storage, dependent probes).

use thiserror::Error;

/// Default context value when no specific context is available
pub const UNKNOWN_CONTEXT: &str = "unknown";

/// Main error type for Burrow operations
#[derive(Debug, Error)]
pub enum Error {
    /// Kubernetes API error
    #[error("kubernetes error: {source}")]
    Kube {
        /// The underlying kube-rs error
        #[from]
        source: kube::Error,
    },

    /// Invalid schema or resource configuration
    #[error("validation error for {resource}: {message}")]
    Validation {
        /// Resource (or schema) the problem was found on
        resource: String,
        /// Description of what's invalid
        message: String,
    },

    /// Optimistic concurrency failure on a status write
    #[error("conflict writing {resource}: {message}")]
    Conflict {
        /// `namespace/name` of the resource whose write lost the race
        resource: String,
        /// Description from the storage layer
        message: String,
    },

    /// The resource no longer exists
    #[error("{resource} not found")]
    NotFound {
        /// `namespace/name` of the missing resource
        resource: String,
    },

    /// A dependent probe could not produce a result
    #[error("probe of {dependent} failed: {message}")]
    Probe {
        /// Dependent condition type the probe was for
        dependent: String,
        /// Description of what failed
        message: String,
    },

    /// Internal/operational error
    #[error("internal error [{context}]: {message}")]
    Internal {
        /// Description of what failed
        message: String,
        /// Context where the error occurred (e.g., "reconciler", "telemetry")
        context: String,
    },
}

impl Error {
    /// Create a validation error without resource context
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            resource: UNKNOWN_CONTEXT.to_string(),
            message: msg.into(),
        }
    }

    /// Create a validation error for a named resource
    pub fn validation_for(resource: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Validation {
            resource: resource.into(),
            message: msg.into(),
        }
    }

    /// Create a conflict error for a resource key
    pub fn conflict(resource: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Conflict {
            resource: resource.into(),
            message: msg.into(),
        }
    }

    /// Create a not-found error for a resource key
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a probe error for a dependent condition type
    pub fn probe(dependent: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Probe {
            dependent: dependent.into(),
            message: msg.into(),
        }
    }

    /// Create an internal error with the given message
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal {
            message: msg.into(),
            context: UNKNOWN_CONTEXT.to_string(),
        }
    }

    /// Create an internal error with context
    pub fn internal_with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Internal {
            message: msg.into(),
            context: context.into(),
        }
    }

    /// Whether the write lost an optimistic concurrency race
    ///
    /// Kubernetes reports these as HTTP 409 responses.
    pub fn is_conflict(&self) -> bool {
        match self {
            Self::Conflict { .. } => true,
            Self::Kube {
                source: kube::Error::Api(resp),
            } => resp.code == 409,
            _ => false,
        }
    }

    /// Whether the operation should be retried by the controller
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Kube { .. } => true,
            Self::Validation { .. } => false,
            Self::Conflict { .. } => true,
            Self::NotFound { .. } => false,
            Self::Probe { .. } => true,
            Self::Internal { .. } => true,
        }
    }

    /// Get the resource key associated with this error, if any
    pub fn resource(&self) -> Option<&str> {
        match self {
            Self::Validation { resource, .. }
            | Self::Conflict { resource, .. }
            | Self::NotFound { resource } => Some(resource),
            _ => None,
        }
    }
}
