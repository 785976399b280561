//! Kubernetes-style status conditions

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Condition status following Kubernetes conventions
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq, Hash)]
pub enum ConditionStatus {
    /// Condition is true
    True,
    /// Condition is false
    False,
    /// Condition status is unknown
    #[default]
    Unknown,
}

impl std::fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::True => write!(f, "True"),
            Self::False => write!(f, "False"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// How much a condition matters to the resource's overall health
///
/// Only `Error` severity conditions take part in aggregation. `Warning` and
/// `Info` conditions are informational and never move the aggregate.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum ConditionSeverity {
    /// Failure makes the resource not ready
    #[default]
    #[serde(rename = "")]
    Error,
    /// Worth surfacing, does not affect readiness
    Warning,
    /// Purely informational
    Info,
}

impl ConditionSeverity {
    fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }
}

/// Kubernetes-style condition for status reporting
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct Condition {
    /// Type of condition (e.g., Ready, Ingress)
    #[serde(rename = "type")]
    pub type_: String,

    /// Status of the condition (True, False, Unknown)
    pub status: ConditionStatus,

    /// Severity of a non-True status
    #[serde(default, skip_serializing_if = "ConditionSeverity::is_error")]
    pub severity: ConditionSeverity,

    /// Machine-readable reason for the condition
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,

    /// Human-readable message
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,

    /// Last time the condition's status transitioned
    #[serde(rename = "lastTransitionTime")]
    pub last_transition_time: DateTime<Utc>,
}

impl Condition {
    /// Create a new condition with the current timestamp
    pub fn new(
        type_: impl Into<String>,
        status: ConditionStatus,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            type_: type_.into(),
            status,
            severity: ConditionSeverity::Error,
            reason: reason.into(),
            message: message.into(),
            last_transition_time: Utc::now(),
        }
    }

    /// Create an Unknown condition with no diagnostics
    pub fn unknown(type_: impl Into<String>) -> Self {
        Self::new(type_, ConditionStatus::Unknown, "", "")
    }

    /// Set the severity and return self for chaining
    pub fn with_severity(mut self, severity: ConditionSeverity) -> Self {
        self.severity = severity;
        self
    }

    /// Whether this condition is True
    pub fn is_true(&self) -> bool {
        self.status == ConditionStatus::True
    }

    /// Whether this condition is False
    pub fn is_false(&self) -> bool {
        self.status == ConditionStatus::False
    }

    /// Whether this condition is Unknown
    pub fn is_unknown(&self) -> bool {
        self.status == ConditionStatus::Unknown
    }

    /// Whether this condition counts toward the aggregate
    pub fn is_error_severity(&self) -> bool {
        self.severity.is_error()
    }

    /// Compare everything except the transition timestamp
    pub fn same_state(&self, other: &Condition) -> bool {
        self.type_ == other.type_
            && self.status == other.status
            && self.severity == other.severity
            && self.reason == other.reason
            && self.message == other.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Story: Conditions follow Kubernetes API conventions
    #[test]
    fn story_conditions_follow_kubernetes_conventions() {
        let before = Utc::now();

        let condition = Condition::new(
            "Ingress",
            ConditionStatus::False,
            "ServiceUnavailable",
            "no endpoints",
        );

        let after = Utc::now();

        assert_eq!(condition.type_, "Ingress");
        assert_eq!(condition.status, ConditionStatus::False);
        assert_eq!(condition.reason, "ServiceUnavailable");
        assert_eq!(condition.message, "no endpoints");
        assert!(condition.last_transition_time >= before);
        assert!(condition.last_transition_time <= after);
    }

    /// Story: Default condition status is Unknown (safe default)
    #[test]
    fn story_default_condition_status_is_safe() {
        assert_eq!(ConditionStatus::default(), ConditionStatus::Unknown);
        assert_eq!(ConditionSeverity::default(), ConditionSeverity::Error);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ConditionStatus::True.to_string(), "True");
        assert_eq!(ConditionStatus::False.to_string(), "False");
        assert_eq!(ConditionStatus::Unknown.to_string(), "Unknown");
    }

    #[test]
    fn test_same_state_ignores_timestamp() {
        let a = Condition::new("Filter", ConditionStatus::False, "Unavailable", "0 of 2");
        let mut b = a.clone();
        b.last_transition_time = a.last_transition_time - chrono::Duration::seconds(30);
        assert!(a.same_state(&b));

        b.message = "1 of 2".to_string();
        assert!(!a.same_state(&b));
    }

    #[test]
    fn test_serialization_omits_empty_diagnostics() {
        let condition = Condition::new("Ready", ConditionStatus::True, "", "");
        let json = serde_json::to_value(&condition).unwrap();

        assert_eq!(json["type"], "Ready");
        assert_eq!(json["status"], "True");
        assert!(json.get("reason").is_none());
        assert!(json.get("message").is_none());
        assert!(json.get("severity").is_none());
        assert!(json.get("lastTransitionTime").is_some());
    }

    #[test]
    fn test_informational_severity_serializes() {
        let condition = Condition::new("Deprecated", ConditionStatus::True, "", "")
            .with_severity(ConditionSeverity::Warning);
        let json = serde_json::to_value(&condition).unwrap();
        assert_eq!(json["severity"], "Warning");

        let parsed: Condition = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.severity, ConditionSeverity::Warning);
        assert!(!parsed.is_error_severity());
    }
}
