//! Rules bound to one principal/resource pair for one decision.

use crate::cache::EvaluationCache;
use crate::condition::Condition;
use crate::error::Result;
use crate::types::{Effect, RawRule};
use crate::value::Attributes;
use std::fmt;

/// A rule built fresh for a single decision.
///
/// It borrows the principal, the resource and the decision's cache, so it
/// can never outlive the decision that created it.
pub struct Rule<'c, 'a> {
    principal: &'a dyn Attributes,
    resource: &'a dyn Attributes,
    description: Option<String>,
    effect: Effect,
    conditions: Vec<Condition<'c, 'a>>,
}

impl<'c, 'a> Rule<'c, 'a> {
    /// Builds a rule and all of its conditions. Malformed conditions are
    /// reported here, before any of them is evaluated.
    pub fn new(
        principal: &'a dyn Attributes,
        resource: &'a dyn Attributes,
        raw: &RawRule,
        cache: &'c dyn EvaluationCache<'a>,
    ) -> Result<Self> {
        let conditions = raw
            .conditions
            .iter()
            .map(|condition| Condition::new(condition, cache))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            principal,
            resource,
            description: raw.description.clone(),
            effect: raw.effect,
            conditions,
        })
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn effect(&self) -> Effect {
        self.effect
    }

    pub fn conditions(&self) -> &[Condition<'c, 'a>] {
        &self.conditions
    }

    /// True if the effect is Allow and every condition is met.
    pub fn allow(&self) -> Result<bool> {
        Ok(self.effect == Effect::Allow && self.conditions_met()?)
    }

    /// True if the effect is Deny and every condition is met.
    pub fn explicit_deny(&self) -> Result<bool> {
        Ok(self.effect == Effect::Deny && self.conditions_met()?)
    }

    /// Evaluates every condition, even after one is unmet, so a malformed
    /// condition always surfaces. Vacuously true without conditions.
    pub fn conditions_met(&self) -> Result<bool> {
        let mut all_met = true;
        for condition in &self.conditions {
            all_met &= condition.met(self.principal, self.resource)?;
        }
        Ok(all_met)
    }
}

impl fmt::Debug for Rule<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("description", &self.description)
            .field("effect", &self.effect)
            .field("conditions", &self.conditions)
            .finish()
    }
}
