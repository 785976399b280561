//! Condition engine: Kubernetes-style conditions, schemas, and aggregation
//!
//! - [`Condition`] - one named health fact with a tri-state status
//! - [`ConditionSet`] - which dependents roll up into which aggregate
//! - [`ConditionManager`] - mutators that keep the aggregate consistent

mod condition;
mod manager;
mod set;

pub use condition::{Condition, ConditionSeverity, ConditionStatus};
pub use manager::{find_condition, ConditionAccessor, ConditionManager};
pub use set::ConditionSet;
