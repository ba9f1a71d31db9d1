//! Rule stores.
//!
//! A store hands the engine the declared rules for one resource type and
//! action, in declaration order. How rules are persisted is up to the store.

use crate::canonicalization::rule_set_fingerprint;
use crate::error::Result;
use crate::parser::{self, RuleFormat};
use crate::types::RawRule;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Source of declared rules.
pub trait RuleStore: Send + Sync {
    /// Returns the rules declared for `resource` that list `action`, in
    /// declaration order.
    fn find(&self, resource: &str, action: &str) -> Result<Vec<RawRule>>;

    /// Identifies the rule set currently served, if the store can.
    fn fingerprint(&self) -> Option<String> {
        None
    }
}

/// Rules held in memory, loaded from a JSON or YAML rule document.
#[derive(Debug, Clone)]
pub struct MemoryRuleStore {
    rules: Vec<RawRule>,
    fingerprint: String,
}

impl MemoryRuleStore {
    /// Creates a store from already validated rules.
    pub fn new(rules: Vec<RawRule>) -> Result<Self> {
        parser::validate(&rules)?;
        let fingerprint = rule_set_fingerprint(&rules)?;
        Ok(Self { rules, fingerprint })
    }

    /// Loads rules from a JSON array.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::new(parser::parse_rules_with_format(json, RuleFormat::Json)?)
    }

    /// Loads rules from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Self::new(parser::parse_rules_with_format(yaml, RuleFormat::Yaml)?)
    }

    /// Loads rules, auto-detecting the format.
    pub fn parse(content: &str) -> Result<Self> {
        Self::new(parser::parse_rules(content)?)
    }

    /// Loads a rule file. The format follows the extension, falling back
    /// to content detection.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let rules = match RuleFormat::from_extension(path) {
            Some(format) => parser::parse_rules_with_format(&content, format)?,
            None => parser::parse_rules(&content)?,
        };
        debug!(path = %path.display(), rules = rules.len(), "Loaded rule file");
        Self::new(rules)
    }

    /// All rules, in declaration order.
    pub fn rules(&self) -> &[RawRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl RuleStore for MemoryRuleStore {
    fn find(&self, resource: &str, action: &str) -> Result<Vec<RawRule>> {
        Ok(self
            .rules
            .iter()
            .filter(|rule| rule.applies_to(resource, action))
            .cloned()
            .collect())
    }

    fn fingerprint(&self) -> Option<String> {
        Some(self.fingerprint.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Effect;
    use std::io::Write;

    const RULES: &str = r#"[
        {
            "resource": "com::test::Resource",
            "action": ["read", "update"],
            "description": "Read/update access for Resource.",
            "effect": "allow",
            "conditions": [{"equal": {"user::user_role_ids": ["1", "2"]}}]
        },
        {
            "resource": "com::test::Resource",
            "action": ["read"],
            "description": "Read access for Resource.",
            "effect": "deny",
            "conditions": [{"equal": {"user::user_role_ids": ["5"]}}]
        },
        {
            "resource": "com::test::Resource",
            "action": ["delete"],
            "description": "Delete access for Resource",
            "effect": "allow",
            "conditions": [{"equal": {"user::user_role_ids": ["1"]}}]
        },
        {
            "resource": "com::test::Other",
            "action": ["read"],
            "effect": "allow"
        }
    ]"#;

    #[test]
    fn test_find_by_resource_and_action() {
        let store = MemoryRuleStore::from_json(RULES).unwrap();

        let read = store.find("com::test::Resource", "read").unwrap();
        assert_eq!(read.len(), 2);
        assert_eq!(read[0].effect, Effect::Allow);
        assert_eq!(read[1].effect, Effect::Deny);

        let update = store.find("com::test::Resource", "update").unwrap();
        assert_eq!(update.len(), 1);
        assert_eq!(update[0].description.as_deref(), Some("Read/update access for Resource."));

        let delete = store.find("com::test::Resource", "delete").unwrap();
        assert_eq!(delete.len(), 1);
        assert_eq!(delete[0].description.as_deref(), Some("Delete access for Resource"));

        assert!(store.find("com::test::Resource", "archive").unwrap().is_empty());
        assert!(store.find("com::test::Missing", "read").unwrap().is_empty());
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(RULES.as_bytes()).unwrap();

        let store = MemoryRuleStore::from_path(file.path()).unwrap();
        assert_eq!(store.len(), 4);
        assert_eq!(store.fingerprint(), MemoryRuleStore::parse(RULES).unwrap().fingerprint());
    }

    #[test]
    fn test_from_path_missing_file() {
        assert!(matches!(
            MemoryRuleStore::from_path("/nonexistent/rules.json"),
            Err(crate::error::AuthzError::Io(_))
        ));
    }

    #[test]
    fn test_empty_store() {
        let store = MemoryRuleStore::from_yaml("[]").unwrap();
        assert!(store.is_empty());
        assert!(store.fingerprint().unwrap().starts_with("r:"));
    }
}
