//! Canonical JSON for rule set fingerprints.
//!
//! Object keys are sorted at every level and the output carries no
//! insignificant whitespace, so two rule documents that differ only in key
//! order or formatting get the same fingerprint. Array order, and with it
//! rule order, is significant and preserved.

use crate::error::Result;
use crate::hash::compute_fingerprint;
use crate::types::RawRule;
use serde_json::{Map, Value};

/// Canonicalizes a JSON value to a deterministic string representation.
pub fn canonicalize(value: &Value) -> Result<String> {
    Ok(serde_json::to_string(&sort_keys(value))?)
}

// Maps keep insertion order, so keys are re-inserted sorted.
fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.clone(), sort_keys(value)))
                    .collect::<Map<String, Value>>(),
            )
        }
        other => other.clone(),
    }
}

/// Computes the fingerprint of an ordered rule list.
pub fn rule_set_fingerprint(rules: &[RawRule]) -> Result<String> {
    let value = serde_json::to_value(rules)?;
    Ok(compute_fingerprint(&canonicalize(&value)?))
}
