//! Declarative rule data as it comes out of a rule store.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Effect of a rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    Allow,
    /// Rules without an explicit effect deny.
    #[default]
    Deny,
}

impl Effect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Effect::Allow => "allow",
            Effect::Deny => "deny",
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared condition: a single `equal` / `not_equal` key mapping
/// left-hand expressions to lists of right-hand expressions or literals.
///
/// The shape is checked when a [`Condition`](crate::condition::Condition)
/// is built from it, not when it is deserialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawCondition(pub serde_json::Map<String, serde_json::Value>);

impl RawCondition {
    /// Builds a condition declaration of the given kind.
    pub fn new(kind: impl Into<String>, conditionals: serde_json::Value) -> Self {
        let mut map = serde_json::Map::new();
        map.insert(kind.into(), conditionals);
        Self(map)
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for RawCondition {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self(map)
    }
}

/// A rule as declared in a rule document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRule {
    /// Namespaced resource type name, e.g. `com::app::Document`.
    pub resource: String,

    /// Actions the rule applies to.
    pub action: Vec<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub effect: Effect,

    #[serde(default)]
    pub conditions: Vec<RawCondition>,
}

impl RawRule {
    /// Creates a deny rule without conditions.
    pub fn new(resource: impl Into<String>, actions: &[&str]) -> Self {
        Self {
            resource: resource.into(),
            action: actions.iter().map(|a| a.to_string()).collect(),
            description: None,
            effect: Effect::Deny,
            conditions: Vec::new(),
        }
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the effect.
    pub fn effect(mut self, effect: Effect) -> Self {
        self.effect = effect;
        self
    }

    /// Sets the effect to Allow.
    pub fn allow(self) -> Self {
        self.effect(Effect::Allow)
    }

    /// Sets the effect to Deny.
    pub fn deny(self) -> Self {
        self.effect(Effect::Deny)
    }

    /// Adds a condition.
    pub fn condition(mut self, condition: RawCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Returns true if this rule is declared for `resource` and `action`.
    pub fn applies_to(&self, resource: &str, action: &str) -> bool {
        self.resource == resource && self.action.iter().any(|a| a == action)
    }
}
