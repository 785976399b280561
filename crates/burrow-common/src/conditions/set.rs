//! Condition set schema: dependents rolled up into one aggregate

use std::collections::HashSet;

use crate::{Error, Result};

/// Immutable schema naming the dependent conditions of a resource and the
/// aggregate condition they roll up into.
///
/// Dependent order is the order diagnostics are attributed in when several
/// dependents fail at once. It has no effect on the aggregate's status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConditionSet {
    aggregate: String,
    dependents: Vec<String>,
}

impl ConditionSet {
    /// Build a schema, rejecting empty names, duplicate dependents, and a
    /// dependent that shadows the aggregate.
    pub fn new<I, S>(aggregate: impl Into<String>, dependents: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let aggregate = aggregate.into();
        if aggregate.is_empty() {
            return Err(Error::validation_for(
                "ConditionSet",
                "aggregate condition type must not be empty",
            ));
        }

        let mut seen = HashSet::new();
        let mut ordered = Vec::new();
        for dependent in dependents {
            let dependent = dependent.into();
            if dependent.is_empty() {
                return Err(Error::validation_for(
                    &aggregate,
                    "dependent condition type must not be empty",
                ));
            }
            if dependent == aggregate {
                return Err(Error::validation_for(
                    &aggregate,
                    format!("dependent '{dependent}' collides with the aggregate condition"),
                ));
            }
            if !seen.insert(dependent.clone()) {
                return Err(Error::validation_for(
                    &aggregate,
                    format!("dependent '{dependent}' is declared more than once"),
                ));
            }
            ordered.push(dependent);
        }

        Ok(Self {
            aggregate,
            dependents: ordered,
        })
    }

    /// Name of the aggregate condition
    pub fn aggregate(&self) -> &str {
        &self.aggregate
    }

    /// Dependent condition types in declaration order
    pub fn dependents(&self) -> &[String] {
        &self.dependents
    }

    /// Whether `type_` is a declared dependent
    pub fn is_dependent(&self, type_: &str) -> bool {
        self.dependents.iter().any(|d| d == type_)
    }

    /// Whether `type_` is the aggregate or a declared dependent
    pub fn contains(&self, type_: &str) -> bool {
        self.aggregate == type_ || self.is_dependent(type_)
    }

    /// Every condition type the schema manages, aggregate first
    pub fn all_types(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.aggregate.as_str()).chain(self.dependents.iter().map(String::as_str))
    }
}
