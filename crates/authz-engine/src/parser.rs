//! Rule document parser.
//!
//! A rule document is a list of rules, written as a JSON array or a YAML
//! sequence. YAML input may be split into several `---` documents, which
//! are concatenated in order.

use crate::error::{AuthzError, Result};
use crate::types::RawRule;
use serde::Deserialize;
use std::path::Path;

/// Supported rule document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleFormat {
    Yaml,
    Json,
}

impl RuleFormat {
    /// Detects format from file extension.
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Some(RuleFormat::Yaml),
            Some("json") => Some(RuleFormat::Json),
            _ => None,
        }
    }

    /// Detects format from content.
    pub fn detect(content: &str) -> Self {
        let trimmed = content.trim_start();
        if trimmed.starts_with('[') || trimmed.starts_with('{') {
            RuleFormat::Json
        } else {
            RuleFormat::Yaml
        }
    }
}

/// Parses rules from a string, auto-detecting format.
pub fn parse_rules(content: &str) -> Result<Vec<RawRule>> {
    parse_rules_with_format(content, RuleFormat::detect(content))
}

/// Parses rules from a string with specified format.
pub fn parse_rules_with_format(content: &str, format: RuleFormat) -> Result<Vec<RawRule>> {
    let rules = match format {
        RuleFormat::Json => serde_json::from_str(content)
            .map_err(|e| AuthzError::ParseError(e.to_string()))?,
        RuleFormat::Yaml => parse_rules_yaml(content)?,
    };
    validate(&rules)?;
    Ok(rules)
}

/// Parses one or more YAML documents, each holding a list of rules.
fn parse_rules_yaml(content: &str) -> Result<Vec<RawRule>> {
    let mut rules = Vec::new();
    for document in serde_yaml::Deserializer::from_str(content) {
        let value = serde_yaml::Value::deserialize(document)?;
        if value.is_null() {
            continue;
        }
        let batch: Vec<RawRule> = serde_yaml::from_value(value)?;
        rules.extend(batch);
    }
    Ok(rules)
}

/// Checks the parts of each rule a store relies on for lookup. Conditions
/// are checked later, when rules are built for a decision.
pub fn validate(rules: &[RawRule]) -> Result<()> {
    for (index, rule) in rules.iter().enumerate() {
        if rule.resource.trim().is_empty() {
            return Err(AuthzError::ValidationError(format!(
                "Rule #{} has no resource",
                index
            )));
        }
        if rule.action.is_empty() {
            return Err(AuthzError::ValidationError(format!(
                "Rule #{} for '{}' has no action",
                index, rule.resource
            )));
        }
    }
    Ok(())
}
