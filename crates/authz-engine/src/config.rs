//! Engine configuration.

use crate::cache::CacheStrategy;
use crate::error::{AuthzError, Result};
use crate::expression::SEPARATOR;
use crate::store::{MemoryRuleStore, RuleStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "com::app";

/// Kind of rule store to open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterKind {
    /// A JSON or YAML rule file at `rules_path`.
    #[default]
    File,
}

/// Static configuration of a decision engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Prefix qualifying resource type names before rules are looked up.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Cache used within each decision.
    #[serde(default)]
    pub cache: CacheStrategy,

    /// Rule store adapter.
    #[serde(default)]
    pub adapter: AdapterKind,

    /// Rule file for the file adapter.
    #[serde(default)]
    pub rules_path: Option<PathBuf>,

    /// Additional application-defined settings.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            cache: CacheStrategy::default(),
            adapter: AdapterKind::default(),
            rules_path: None,
            extra: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    /// Sets the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Sets the cache strategy.
    pub fn with_cache(mut self, cache: CacheStrategy) -> Self {
        self.cache = cache;
        self
    }

    /// Sets the rule file.
    pub fn with_rules_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.rules_path = Some(path.into());
        self
    }

    /// Parses a configuration from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: EngineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a configuration file; `.json` files are JSON, anything else YAML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_yaml(&content),
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.namespace.trim().is_empty() {
            return Err(AuthzError::Configuration("Namespace is required".to_string()));
        }
        Ok(())
    }

    /// Adds settings, keeping any value already present.
    pub fn add_configuration<I, K>(&mut self, defaults: I)
    where
        I: IntoIterator<Item = (K, serde_json::Value)>,
        K: Into<String>,
    {
        for (key, value) in defaults {
            self.extra.entry(key.into()).or_insert(value);
        }
    }

    /// Reads an additional setting.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.extra.get(key)
    }

    /// Sets an additional setting.
    pub fn set(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.extra.insert(key.into(), value);
    }

    /// Qualifies a resource type name with the namespace.
    pub fn qualify(&self, type_name: &str) -> String {
        format!("{}{}{}", self.namespace, SEPARATOR, type_name)
    }

    /// Opens the configured rule store.
    pub fn open_store(&self) -> Result<Arc<dyn RuleStore>> {
        match self.adapter {
            AdapterKind::File => {
                let path = self.rules_path.as_ref().ok_or_else(|| {
                    AuthzError::Configuration("The file adapter requires rules_path".to_string())
                })?;
                Ok(Arc::new(MemoryRuleStore::from_path(path)?))
            }
        }
    }
}
