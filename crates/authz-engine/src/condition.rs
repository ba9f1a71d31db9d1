//! Equal / NotEqual conditions over resolved attribute values.

use crate::cache::EvaluationCache;
use crate::error::{AuthzError, Result};
use crate::expression::{self, ExpressionError};
use crate::types::RawCondition;
use crate::value::{Attributes, Value};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// The comparison a condition applies to each of its pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionKind {
    /// Both sides share at least one value.
    Equal,
    /// The sides share no value.
    NotEqual,
}

impl ConditionKind {
    pub const ALL: [ConditionKind; 2] = [ConditionKind::Equal, ConditionKind::NotEqual];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionKind::Equal => "equal",
            ConditionKind::NotEqual => "not_equal",
        }
    }

    fn accepts(&self, overlap: bool) -> bool {
        match self {
            ConditionKind::Equal => overlap,
            ConditionKind::NotEqual => !overlap,
        }
    }
}

impl FromStr for ConditionKind {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self> {
        ConditionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                AuthzError::InvalidConditional(format!(
                    "'{}' is not a valid condition type, expected 'equal' or 'not_equal'",
                    s
                ))
            })
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A condition bound to the cache of the decision it belongs to.
pub struct Condition<'c, 'a> {
    kind: ConditionKind,
    conditionals: Vec<(serde_json::Value, serde_json::Value)>,
    cache: &'c dyn EvaluationCache<'a>,
}

impl<'c, 'a> Condition<'c, 'a> {
    /// Builds a condition from its declaration.
    ///
    /// The declaration must have exactly one key naming a known kind, whose
    /// value is a mapping.
    pub fn new(raw: &RawCondition, cache: &'c dyn EvaluationCache<'a>) -> Result<Self> {
        let mut entries = raw.0.iter();
        let (kind, conditionals) = match (entries.next(), entries.next()) {
            (Some(entry), None) => entry,
            _ => {
                return Err(AuthzError::InvalidConditional(format!(
                    "Expected {} to have one key",
                    serde_json::Value::Object(raw.0.clone())
                )))
            }
        };

        let kind: ConditionKind = kind.parse()?;
        let conditionals = match conditionals {
            serde_json::Value::Object(map) => map
                .iter()
                .map(|(left, right)| (serde_json::Value::String(left.clone()), right.clone()))
                .collect(),
            other => {
                return Err(AuthzError::InvalidConditional(format!(
                    "Expected the '{}' conditionals to be a mapping, got {}",
                    kind, other
                )))
            }
        };

        Ok(Self {
            kind,
            conditionals,
            cache,
        })
    }

    pub fn kind(&self) -> ConditionKind {
        self.kind
    }

    /// The declared left-hand expressions, in declaration order.
    pub fn left_expressions(&self) -> impl Iterator<Item = &str> {
        self.conditionals.iter().filter_map(|(left, _)| left.as_str())
    }

    /// Returns true if every pair is satisfied. An empty condition is met.
    ///
    /// Any resolution failure is reported as
    /// [`AuthzError::InvalidConditional`].
    pub fn met(&self, principal: &'a dyn Attributes, resource: &'a dyn Attributes) -> Result<bool> {
        self.evaluate(principal, resource).map_err(|err| {
            warn!(kind = %self.kind, error = %err, "Condition evaluation failed");
            AuthzError::InvalidConditional(err.to_string())
        })
    }

    fn evaluate(
        &self,
        principal: &'a dyn Attributes,
        resource: &'a dyn Attributes,
    ) -> std::result::Result<bool, ExpressionError> {
        for (left, right) in &self.conditionals {
            let left = expression::resolve(left, principal, resource, self.cache)?;
            let right = expression::resolve(right, principal, resource, self.cache)?;

            if !self.kind.accepts(intersects(&left, &right)) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl fmt::Debug for Condition<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition")
            .field("kind", &self.kind)
            .field("conditionals", &self.conditionals)
            .finish()
    }
}

fn intersects(left: &[Value<'_>], right: &[Value<'_>]) -> bool {
    left.iter().any(|value| right.contains(value))
}
