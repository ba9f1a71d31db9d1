//! Per-decision memo of resolved expressions.
//!
//! A cache lives exactly as long as one decision. Both strategies must
//! produce identical decisions; memoizing only saves repeated lookups when
//! several rules reference the same expression.

use crate::expression::ExpressionError;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;

/// Computes the values of an expression on a cache miss.
pub type Compute<'c, 'a> = dyn FnMut() -> Result<Vec<Value<'a>>, ExpressionError> + 'c;

/// Expression string to resolved values.
pub trait EvaluationCache<'a> {
    /// Returns the cached values for `key`, computing and (optionally)
    /// storing them on a miss. Failed computations are never stored.
    fn fetch(
        &self,
        key: &str,
        compute: &mut Compute<'_, 'a>,
    ) -> Result<Vec<Value<'a>>, ExpressionError>;
}

/// Never stores anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCache;

impl<'a> EvaluationCache<'a> for NullCache {
    fn fetch(
        &self,
        _key: &str,
        compute: &mut Compute<'_, 'a>,
    ) -> Result<Vec<Value<'a>>, ExpressionError> {
        compute()
    }
}

/// Remembers every successfully resolved expression.
#[derive(Debug, Default)]
pub struct MemoCache<'a> {
    entries: RefCell<HashMap<String, Vec<Value<'a>>>>,
}

impl<'a> MemoCache<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of memoized expressions.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl<'a> EvaluationCache<'a> for MemoCache<'a> {
    fn fetch(
        &self,
        key: &str,
        compute: &mut Compute<'_, 'a>,
    ) -> Result<Vec<Value<'a>>, ExpressionError> {
        if let Some(values) = self.entries.borrow().get(key) {
            return Ok(values.clone());
        }

        // The borrow is released before computing so nested fetches are safe.
        let values = compute()?;
        self.entries
            .borrow_mut()
            .insert(key.to_string(), values.clone());
        Ok(values)
    }
}

/// Which cache a decision uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStrategy {
    /// No memoization.
    #[default]
    None,
    /// Memoize resolved expressions for the duration of one decision.
    Memoize,
}

impl CacheStrategy {
    /// Creates a fresh cache for a single decision.
    pub fn build<'a>(&self) -> Box<dyn EvaluationCache<'a> + 'a> {
        match self {
            CacheStrategy::None => Box::new(NullCache),
            CacheStrategy::Memoize => Box::new(MemoCache::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting(
        calls: &RefCell<u32>,
    ) -> impl FnMut() -> Result<Vec<Value<'static>>, ExpressionError> + '_ {
        move || {
            *calls.borrow_mut() += 1;
            Ok(vec![Value::from(7)])
        }
    }

    #[test]
    fn test_null_cache_always_computes() {
        let calls = RefCell::new(0);
        let cache = NullCache;
        let mut compute = counting(&calls);

        cache.fetch("user::id", &mut compute).unwrap();
        cache.fetch("user::id", &mut compute).unwrap();
        assert_eq!(*calls.borrow(), 2);
    }

    #[test]
    fn test_memo_cache_computes_once() {
        let calls = RefCell::new(0);
        let cache = MemoCache::new();
        let mut compute = counting(&calls);

        assert_eq!(cache.fetch("user::id", &mut compute).unwrap(), vec![Value::from(7)]);
        assert_eq!(cache.fetch("user::id", &mut compute).unwrap(), vec![Value::from(7)]);
        assert_eq!(*calls.borrow(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_memo_cache_does_not_store_errors() {
        let cache = MemoCache::new();
        let mut failing = || -> Result<Vec<Value<'static>>, ExpressionError> {
            Err(ExpressionError::InvalidRoot("group".to_string()))
        };

        assert!(cache.fetch("group::id", &mut failing).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_strategy_defaults_to_none() {
        assert_eq!(CacheStrategy::default(), CacheStrategy::None);
        let parsed: CacheStrategy = serde_json::from_str("\"memoize\"").unwrap();
        assert_eq!(parsed, CacheStrategy::Memoize);
    }
}
