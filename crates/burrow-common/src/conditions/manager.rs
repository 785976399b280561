//! Condition aggregation engine
//!
//! A [`ConditionManager`] binds a [`ConditionSet`] schema to a mutable status
//! and recomputes the aggregate condition after every dependent mutation.
//! The aggregate is a three-valued AND over the dependents:
//!
//! 1. any dependent False: aggregate False, diagnostics from the first False
//!    dependent in declared order
//! 2. otherwise any dependent Unknown (or missing): aggregate Unknown,
//!    diagnostics from the first such dependent
//! 3. otherwise True with no diagnostics
//!
//! Recomputation only reads the current dependents, so the result does not
//! depend on the order the dependents were marked in.
//!
//! Marking a condition type the schema does not declare as a dependent is a
//! programming error and panics.

use chrono::Utc;
use tracing::debug;

use super::{Condition, ConditionSet, ConditionStatus};
use crate::probe::{EndpointAvailability, REASON_ENDPOINTS_UNKNOWN, REASON_UNAVAILABLE};

/// Access to the condition list of a status object
pub trait ConditionAccessor {
    /// Current conditions, at most one per type
    fn conditions(&self) -> &[Condition];

    /// Mutable condition list; only the manager writes through this
    fn conditions_mut(&mut self) -> &mut Vec<Condition>;
}

impl ConditionAccessor for Vec<Condition> {
    fn conditions(&self) -> &[Condition] {
        self
    }

    fn conditions_mut(&mut self) -> &mut Vec<Condition> {
        self
    }
}

/// Find a condition by type in a condition list
pub fn find_condition<'c>(conditions: &'c [Condition], type_: &str) -> Option<&'c Condition> {
    conditions.iter().find(|c| c.type_ == type_)
}

/// Aggregation engine over one status object
pub struct ConditionManager<'a, A: ConditionAccessor + ?Sized> {
    set: &'a ConditionSet,
    accessor: &'a mut A,
}

impl<'a, A: ConditionAccessor + ?Sized> ConditionManager<'a, A> {
    /// Manage `accessor` according to `set`
    pub fn new(set: &'a ConditionSet, accessor: &'a mut A) -> Self {
        Self { set, accessor }
    }

    /// The schema this manager enforces
    pub fn condition_set(&self) -> &ConditionSet {
        self.set
    }

    /// Look up a condition by type
    pub fn get_condition(&self, type_: &str) -> Option<&Condition> {
        find_condition(self.accessor.conditions(), type_)
    }

    /// The aggregate condition, if it has been initialized
    pub fn aggregate_condition(&self) -> Option<&Condition> {
        self.get_condition(self.set.aggregate())
    }

    /// Whether the aggregate condition is True
    pub fn is_happy(&self) -> bool {
        self.aggregate_condition().is_some_and(Condition::is_true)
    }

    /// Seed every missing dependent and the aggregate as Unknown
    ///
    /// Conditions that already exist are left alone. When a dependent had to
    /// be added, the aggregate is recomputed so a stale True cannot survive a
    /// schema that grew a dependent.
    pub fn initialize_conditions(&mut self) {
        let set = self.set;
        let mut inserted_dependent = false;
        for type_ in set.all_types() {
            if self.get_condition(type_).is_none() {
                self.accessor
                    .conditions_mut()
                    .push(Condition::unknown(type_));
                inserted_dependent |= type_ != set.aggregate();
            }
        }
        if inserted_dependent {
            self.recompute_aggregate();
        }
    }

    /// Mark a dependent True and clear its diagnostics
    pub fn mark_true(&mut self, type_: &str) {
        self.mark(type_, ConditionStatus::True, "", "");
    }

    /// Mark a dependent False with a reason and message
    pub fn mark_false(&mut self, type_: &str, reason: &str, message: &str) {
        self.mark(type_, ConditionStatus::False, reason, message);
    }

    /// Mark a dependent Unknown with a reason and message
    ///
    /// Used when the dependent's state cannot be determined right now, as
    /// opposed to it being confirmed unhealthy.
    pub fn mark_unknown(&mut self, type_: &str, reason: &str, message: &str) {
        self.mark(type_, ConditionStatus::Unknown, reason, message);
    }

    /// Map an endpoint availability probe onto a dependent
    pub fn propagate_availability(&mut self, type_: &str, probe: &EndpointAvailability) {
        match probe.status() {
            ConditionStatus::True => self.mark_true(type_),
            ConditionStatus::False => {
                self.mark_false(type_, REASON_UNAVAILABLE, &probe.summary())
            }
            ConditionStatus::Unknown => self.mark_unknown(
                type_,
                REASON_ENDPOINTS_UNKNOWN,
                "endpoint availability could not be determined",
            ),
        }
    }

    /// Record a condition outside the schema
    ///
    /// Informational conditions are stored as given and never affect the
    /// aggregate. Panics if `condition` names a type the schema manages.
    pub fn set_informational(&mut self, condition: Condition) {
        assert!(
            !self.set.contains(&condition.type_),
            "condition {:?} is managed by the {:?} condition set and cannot be set directly",
            condition.type_,
            self.set.aggregate()
        );
        self.set_condition(condition);
    }

    /// Remove a condition outside the schema
    ///
    /// Panics if `type_` is a type the schema manages.
    pub fn clear_condition(&mut self, type_: &str) {
        assert!(
            !self.set.contains(type_),
            "condition {type_:?} is managed by the {:?} condition set and cannot be cleared",
            self.set.aggregate()
        );
        self.accessor.conditions_mut().retain(|c| c.type_ != type_);
    }

    fn mark(&mut self, type_: &str, status: ConditionStatus, reason: &str, message: &str) {
        assert!(
            self.set.is_dependent(type_),
            "condition {type_:?} is not a dependent of the {:?} condition set",
            self.set.aggregate()
        );
        self.set_condition(Condition::new(type_, status, reason, message));
        self.recompute_aggregate();
    }

    fn recompute_aggregate(&mut self) {
        let mut first_unknown: Option<(String, String)> = None;
        let mut first_false: Option<(String, String)> = None;

        for dependent in self.set.dependents() {
            match self.get_condition(dependent) {
                // Warning and Info severity never move the aggregate
                Some(c) if c.is_true() || !c.is_error_severity() => {}
                Some(c) if c.is_false() => {
                    first_false = Some((c.reason.clone(), c.message.clone()));
                    break;
                }
                Some(c) => {
                    if first_unknown.is_none() {
                        first_unknown = Some((c.reason.clone(), c.message.clone()));
                    }
                }
                None => {
                    if first_unknown.is_none() {
                        first_unknown = Some((String::new(), String::new()));
                    }
                }
            }
        }

        let aggregate = match (first_false, first_unknown) {
            (Some((reason, message)), _) => {
                Condition::new(self.set.aggregate(), ConditionStatus::False, reason, message)
            }
            (None, Some((reason, message))) => Condition::new(
                self.set.aggregate(),
                ConditionStatus::Unknown,
                reason,
                message,
            ),
            (None, None) => Condition::new(self.set.aggregate(), ConditionStatus::True, "", ""),
        };

        let previous = self.aggregate_condition().map(|c| c.status);
        let status = aggregate.status;
        self.set_condition(aggregate);
        if previous != Some(status) {
            debug!(
                condition = %self.set.aggregate(),
                from = ?previous,
                to = %status,
                "aggregate condition transitioned"
            );
        }
    }

    /// Store `condition`, keeping the existing timestamp unless the status
    /// changed
    fn set_condition(&mut self, condition: Condition) {
        let conditions = self.accessor.conditions_mut();
        match conditions.iter_mut().find(|c| c.type_ == condition.type_) {
            Some(existing) if existing.same_state(&condition) => {}
            Some(existing) => {
                let last_transition_time = if existing.status == condition.status {
                    existing.last_transition_time
                } else {
                    Utc::now()
                };
                *existing = Condition {
                    last_transition_time,
                    ..condition
                };
            }
            None => conditions.push(condition),
        }
    }
}
