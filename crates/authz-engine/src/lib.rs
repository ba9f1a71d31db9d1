//! Authorization decision engine
//!
//! Decides whether a principal may perform an action on a resource by
//! evaluating declarative allow/deny rules. Rule conditions compare
//! attribute paths such as `user::role_ids` or `resource::owner::id`
//! against literals or other paths; an explicit deny always wins and
//! anything not explicitly allowed is denied.
//!
//! Compiles to both WASM (feature `wasm`) and native targets.

pub mod cache;
pub mod canonicalization;
pub mod condition;
pub mod config;
pub mod context;
pub mod decision;
pub mod engine;
pub mod error;
pub mod expression;
pub mod hash;
pub mod parser;
pub mod rule;
pub mod store;
pub mod types;
pub mod value;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use cache::CacheStrategy;
pub use config::EngineConfig;
pub use context::AuthorizationContext;
pub use decision::{Decision, DecisionReport};
pub use engine::DecisionEngine;
pub use error::{AuthzError, Result};
pub use store::{MemoryRuleStore, RuleStore};
pub use value::{AccessorRegistry, Attributes, Record, Value};

/// Version of the decision engine.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::cache::CacheStrategy;
    pub use crate::config::EngineConfig;
    pub use crate::context::AuthorizationContext;
    pub use crate::decision::{Decision, DecisionReport};
    pub use crate::engine::DecisionEngine;
    pub use crate::error::{AuthzError, Result};
    pub use crate::store::{MemoryRuleStore, RuleStore};
    pub use crate::types::*;
    pub use crate::value::{AccessorRegistry, Attributes, Record, Value};
}
