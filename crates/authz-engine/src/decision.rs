//! Decision types.

use crate::types::Effect;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The final decision for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Allow,
    Deny,
}

impl From<Effect> for Decision {
    fn from(effect: Effect) -> Self {
        match effect {
            Effect::Allow => Decision::Allow,
            Effect::Deny => Decision::Deny,
        }
    }
}

impl From<bool> for Decision {
    fn from(allowed: bool) -> Self {
        if allowed {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }
}

/// A decision together with what produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionReport {
    /// The final decision.
    pub decision: Decision,

    /// Reason for the decision.
    pub reason: String,

    /// Description of the rule that decided, if it had one.
    pub rule_description: Option<String>,

    /// Number of rules consulted before the decision was reached.
    pub rules_evaluated: usize,

    /// Whether no rule allowed or denied (fail-closed default).
    pub is_default: bool,

    /// Fingerprint of the rule set the decision was made against.
    pub rule_set: Option<String>,

    /// When the decision was made.
    pub decided_at: DateTime<Utc>,

    /// Time taken to evaluate (in microseconds).
    pub evaluation_time_us: Option<u64>,
}

impl DecisionReport {
    /// Creates an allow decision.
    pub fn allow(reason: impl Into<String>) -> Self {
        Self::new(Decision::Allow, reason, false)
    }

    /// Creates an explicit deny decision.
    pub fn deny(reason: impl Into<String>) -> Self {
        Self::new(Decision::Deny, reason, false)
    }

    /// Creates the fail-closed decision used when no rule allows.
    pub fn default_deny() -> Self {
        Self::new(Decision::Deny, "No matching rule allows - default deny", true)
    }

    fn new(decision: Decision, reason: impl Into<String>, is_default: bool) -> Self {
        Self {
            decision,
            reason: reason.into(),
            rule_description: None,
            rules_evaluated: 0,
            is_default,
            rule_set: None,
            decided_at: Utc::now(),
            evaluation_time_us: None,
        }
    }

    /// Sets the deciding rule's description.
    pub fn with_rule_description(mut self, description: Option<&str>) -> Self {
        self.rule_description = description.map(str::to_string);
        self
    }

    /// Sets the number of rules consulted.
    pub fn with_rules_evaluated(mut self, count: usize) -> Self {
        self.rules_evaluated = count;
        self
    }

    /// Sets the rule set fingerprint.
    pub fn with_rule_set(mut self, fingerprint: Option<String>) -> Self {
        self.rule_set = fingerprint;
        self
    }

    /// Sets the evaluation time.
    pub fn with_evaluation_time(mut self, time_us: u64) -> Self {
        self.evaluation_time_us = Some(time_us);
        self
    }

    /// Returns true if the decision is allow.
    pub fn is_allowed(&self) -> bool {
        matches!(self.decision, Decision::Allow)
    }

    /// Returns true if the decision is deny.
    pub fn is_denied(&self) -> bool {
        matches!(self.decision, Decision::Deny)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_decision() {
        let decision = DecisionReport::allow("Test allow");
        assert!(decision.is_allowed());
        assert!(!decision.is_denied());
        assert!(!decision.is_default);
    }

    #[test]
    fn test_deny_decision() {
        let decision = DecisionReport::deny("Test deny").with_rule_description(Some("No interns"));
        assert!(decision.is_denied());
        assert_eq!(decision.rule_description.as_deref(), Some("No interns"));
    }

    #[test]
    fn test_default_deny() {
        let deny = DecisionReport::default_deny();
        assert!(deny.is_denied());
        assert!(deny.is_default);
    }

    #[test]
    fn test_decision_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Decision::Allow).unwrap(), "\"allow\"");
        assert_eq!(Decision::from(false), Decision::Deny);
        assert_eq!(Decision::from(Effect::Allow), Decision::Allow);
    }
}
