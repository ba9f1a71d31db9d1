//! WASM bindings for the decision engine.

#![cfg(feature = "wasm")]

use crate::config::EngineConfig;
use crate::engine::DecisionEngine;
use crate::store::MemoryRuleStore;
use crate::value::Record;
use std::sync::Arc;
use wasm_bindgen::prelude::*;

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn record(type_name: &str, json: &str) -> Result<Record, JsValue> {
    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| JsValue::from_str(&format!("Invalid {} JSON: {}", type_name, e)))?;
    Record::from_json(type_name, &value).map_err(to_js)
}

/// WASM-compatible authorizer over JSON principals and resources.
#[wasm_bindgen]
pub struct WasmAuthorizer {
    config: EngineConfig,
    engine: Option<DecisionEngine>,
}

#[wasm_bindgen]
impl WasmAuthorizer {
    /// Creates an authorizer for the given namespace, with no rules loaded.
    #[wasm_bindgen(constructor)]
    pub fn new(namespace: &str) -> Result<WasmAuthorizer, JsValue> {
        let config = EngineConfig::default().with_namespace(namespace);
        config.validate().map_err(to_js)?;
        Ok(Self {
            config,
            engine: None,
        })
    }

    /// Loads a rule document, replacing any previously loaded rules. The
    /// format is detected from the content.
    #[wasm_bindgen]
    pub fn load_rules(&mut self, document: &str) -> Result<(), JsValue> {
        let store = MemoryRuleStore::parse(document).map_err(to_js)?;
        self.engine = Some(DecisionEngine::new(Arc::new(store), self.config.clone()));
        Ok(())
    }

    /// Decides whether the principal may perform `action` on the resource.
    /// Without loaded rules every request is denied.
    #[wasm_bindgen]
    pub fn decide(
        &self,
        principal_type: &str,
        principal_json: &str,
        action: &str,
        resource_type: &str,
        resource_json: &str,
    ) -> Result<bool, JsValue> {
        let engine = match &self.engine {
            Some(engine) => engine,
            None => return Ok(false),
        };
        let principal = record(principal_type, principal_json)?;
        let resource = record(resource_type, resource_json)?;
        engine.decide(&principal, action, &resource).map_err(to_js)
    }

    /// Like [`decide`](Self::decide), returning the decision report as a
    /// JavaScript object.
    #[wasm_bindgen]
    pub fn decide_with_report(
        &self,
        principal_type: &str,
        principal_json: &str,
        action: &str,
        resource_type: &str,
        resource_json: &str,
    ) -> Result<JsValue, JsValue> {
        let engine = self
            .engine
            .as_ref()
            .ok_or_else(|| JsValue::from_str("No rules loaded"))?;
        let principal = record(principal_type, principal_json)?;
        let resource = record(resource_type, resource_json)?;
        let report = engine
            .decide_with_report(&principal, action, &resource)
            .map_err(to_js)?;
        let json = serde_json::to_string(&report).map_err(to_js)?;
        js_sys::JSON::parse(&json)
    }

    /// Fingerprint of the loaded rule set.
    #[wasm_bindgen]
    pub fn rule_set(&self) -> Option<String> {
        self.engine
            .as_ref()
            .and_then(|engine| engine.store().fingerprint())
    }
}

/// Logs a message to the console (for debugging).
#[wasm_bindgen]
pub fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

/// Returns the version of the decision engine.
#[wasm_bindgen]
pub fn version() -> String {
    crate::VERSION.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: &str = r#"[
        {
            "resource": "com::test::Document",
            "action": ["read"],
            "effect": "allow",
            "conditions": [{"equal": {"resource::owner_id": ["user::id"]}}]
        }
    ]"#;

    #[test]
    fn test_wasm_authorizer() {
        let mut authorizer = WasmAuthorizer::new("com::test").unwrap();
        assert!(authorizer.rule_set().is_none());

        authorizer.load_rules(RULES).unwrap();
        assert!(authorizer.rule_set().is_some());
        assert!(authorizer
            .decide("User", r#"{"id": 1}"#, "read", "Document", r#"{"owner_id": 1}"#)
            .unwrap());
        assert!(!authorizer
            .decide("User", r#"{"id": 2}"#, "read", "Document", r#"{"owner_id": 1}"#)
            .unwrap());
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    const RULES: &str = r#"
- resource: com::test::Document
  action: [read]
  description: Owners read their documents
  effect: allow
  conditions:
    - equal:
        resource::owner_id: ["user::id"]
"#;

    #[wasm_bindgen_test]
    fn test_report_is_a_js_object() {
        let mut authorizer = WasmAuthorizer::new("com::test").unwrap();
        authorizer.load_rules(RULES).unwrap();

        let report = authorizer
            .decide_with_report("User", r#"{"id": 1}"#, "read", "Document", r#"{"owner_id": 1}"#)
            .unwrap();
        let decision = js_sys::Reflect::get(&report, &JsValue::from_str("decision")).unwrap();
        assert_eq!(decision.as_string().as_deref(), Some("allow"));
        let description =
            js_sys::Reflect::get(&report, &JsValue::from_str("rule_description")).unwrap();
        assert_eq!(description.as_string().as_deref(), Some("Owners read their documents"));
    }

    #[wasm_bindgen_test]
    fn test_decide_without_rules_denies() {
        let authorizer = WasmAuthorizer::new("com::test").unwrap();
        assert!(!authorizer
            .decide("User", "{}", "read", "Document", "{}")
            .unwrap());
        assert!(authorizer
            .decide_with_report("User", "{}", "read", "Document", "{}")
            .is_err());
    }
}
