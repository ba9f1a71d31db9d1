//! Decision engine.
//!
//! Candidate rules for a resource type and action are fetched from the
//! rule store, bound to the principal and resource, and folded in store
//! order: the first explicit deny ends the scan with DENY, any allowing
//! rule leaves a tentative ALLOW behind, and a scan that never allowed
//! falls through to the fail-closed default.

use crate::config::EngineConfig;
use crate::context::AuthorizationContext;
use crate::decision::DecisionReport;
use crate::error::{AuthzError, Result};
use crate::rule::Rule;
use crate::store::RuleStore;
use crate::types::RawRule;
use crate::value::Attributes;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, field, instrument, Span};

/// Action used by [`DecisionEngine::filter_readable`].
pub const READ_ACTION: &str = "read";

/// Makes allow/deny decisions against a rule store.
///
/// The engine itself holds no per-decision state: every call builds its own
/// cache and rules, so one engine can serve concurrent callers.
#[derive(Clone)]
pub struct DecisionEngine {
    store: Arc<dyn RuleStore>,
    config: EngineConfig,
}

impl DecisionEngine {
    /// Creates an engine over an already opened store.
    pub fn new(store: Arc<dyn RuleStore>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// Validates the configuration and opens the store it names.
    pub fn from_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let store = config.open_store()?;
        Ok(Self::new(store, config))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn RuleStore> {
        &self.store
    }

    /// The resource's type name qualified with the configured namespace.
    pub fn qualified_type(&self, resource: &dyn Attributes) -> String {
        self.config.qualify(resource.type_name())
    }

    /// Returns the declared rules for the resource's type and `action`.
    pub fn find_rules(&self, action: &str, resource: &dyn Attributes) -> Result<Vec<RawRule>> {
        self.store.find(&self.qualified_type(resource), action)
    }

    /// Decides whether `principal` may perform `action` on `resource`.
    pub fn decide(
        &self,
        principal: &dyn Attributes,
        action: &str,
        resource: &dyn Attributes,
    ) -> Result<bool> {
        Ok(self
            .decide_with_report(principal, action, resource)?
            .is_allowed())
    }

    /// Decides and reports which rule decided, how many rules were
    /// consulted and which rule set was used.
    #[instrument(
        level = "debug",
        skip(self, principal, resource),
        fields(resource_type = field::Empty)
    )]
    pub fn decide_with_report(
        &self,
        principal: &dyn Attributes,
        action: &str,
        resource: &dyn Attributes,
    ) -> Result<DecisionReport> {
        let start = Instant::now();
        let qualified = self.qualified_type(resource);
        Span::current().record("resource_type", qualified.as_str());
        let candidates = self.store.find(&qualified, action)?;

        let cache = self.config.cache.build();
        let rules = candidates
            .iter()
            .map(|raw| Rule::new(principal, resource, raw, &*cache))
            .collect::<Result<Vec<_>>>()?;

        let mut allowed_by: Option<(usize, &Rule)> = None;
        for (index, rule) in rules.iter().enumerate() {
            if rule.explicit_deny()? {
                debug!(rule = index, description = ?rule.description(), "Explicit deny");
                return Ok(DecisionReport::deny(format!("Rule #{} explicitly denies", index))
                    .with_rule_description(rule.description())
                    .with_rules_evaluated(index + 1)
                    .with_rule_set(self.store.fingerprint())
                    .with_evaluation_time(elapsed_us(start)));
            }
            if rule.allow()? {
                debug!(rule = index, description = ?rule.description(), "Tentative allow");
                allowed_by = Some((index, rule));
            }
        }

        let report = match allowed_by {
            Some((index, rule)) => DecisionReport::allow(format!("Rule #{} allows", index))
                .with_rule_description(rule.description()),
            None => {
                debug!(candidates = rules.len(), "No rule allows");
                DecisionReport::default_deny()
            }
        };

        Ok(report
            .with_rules_evaluated(rules.len())
            .with_rule_set(self.store.fingerprint())
            .with_evaluation_time(elapsed_us(start)))
    }

    /// Decides and fails with [`AuthzError::AuthorizationFailed`] on deny.
    ///
    /// `ctx` is marked as performed before deciding, so it records the
    /// check even when the decision fails.
    pub fn authorize(
        &self,
        ctx: &mut AuthorizationContext,
        principal: &dyn Attributes,
        action: &str,
        resource: &dyn Attributes,
    ) -> Result<()> {
        ctx.mark_performed();
        if self.decide(principal, action, resource)? {
            Ok(())
        } else {
            Err(AuthzError::AuthorizationFailed {
                action: action.to_string(),
                resource: self.qualified_type(resource),
            })
        }
    }

    /// Keeps the candidates `principal` may read, in their original order.
    pub fn filter_readable<T, I>(&self, principal: &dyn Attributes, candidates: I) -> Result<Vec<T>>
    where
        T: Attributes,
        I: IntoIterator<Item = T>,
    {
        let mut readable = Vec::new();
        for candidate in candidates {
            if self.decide(principal, READ_ACTION, &candidate)? {
                readable.push(candidate);
            }
        }
        Ok(readable)
    }
}

impl fmt::Debug for DecisionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecisionEngine")
            .field("config", &self.config)
            .field("rule_set", &self.store.fingerprint())
            .finish()
    }
}

fn elapsed_us(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX)
}
