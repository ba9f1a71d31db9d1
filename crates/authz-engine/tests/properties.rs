//! Decision properties that must hold for any rule set and input.

use authz_engine::cache::{MemoCache, NullCache};
use authz_engine::condition::Condition;
use authz_engine::rule::Rule;
use authz_engine::types::{Effect, RawCondition, RawRule};
use authz_engine::{CacheStrategy, DecisionEngine, EngineConfig, MemoryRuleStore, Record};
use proptest::prelude::*;
use proptest::sample::Index;
use serde_json::json;
use std::sync::Arc;

const RESOURCE: &str = "com::test::Resource";

fn engine(rules: Vec<RawRule>, cache: CacheStrategy) -> DecisionEngine {
    let config = EngineConfig::default()
        .with_namespace("com::test")
        .with_cache(cache);
    DecisionEngine::new(Arc::new(MemoryRuleStore::new(rules).unwrap()), config)
}

fn user(roles: &[i64]) -> Record {
    Record::new("User").with("role_ids", roles.to_vec())
}

fn roles() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(0i64..8, 0..5)
}

proptest! {
    /// Equal and not_equal over the same pair always disagree.
    #[test]
    fn equal_and_not_equal_are_complements(held in roles(), required in roles()) {
        let principal = user(&held);
        let resource = Record::new("Resource");
        let cache = NullCache;

        let equal = RawCondition::new("equal", json!({ "user::role_ids": required }));
        let not_equal = RawCondition::new("not_equal", json!({ "user::role_ids": required }));
        let equal = Condition::new(&equal, &cache).unwrap();
        let not_equal = Condition::new(&not_equal, &cache).unwrap();

        prop_assert_eq!(
            equal.met(&principal, &resource).unwrap(),
            !not_equal.met(&principal, &resource).unwrap()
        );
    }

    /// A condition with no pairs is met by anyone.
    #[test]
    fn empty_conditionals_are_always_met(held in roles(), kind in prop::sample::select(vec!["equal", "not_equal"])) {
        let principal = user(&held);
        let resource = Record::new("Resource").with("owner_id", held.len());
        let cache = NullCache;

        let condition = Condition::new(&RawCondition::new(kind, json!({})), &cache).unwrap();
        prop_assert!(condition.met(&principal, &resource).unwrap());
    }

    /// Rules without conditions act on their effect alone.
    #[test]
    fn unconditional_rules_follow_their_effect(allow in any::<bool>(), held in roles()) {
        let principal = user(&held);
        let resource = Record::new("Resource");
        let raw = RawRule::new(RESOURCE, &["read"]).effect(if allow { Effect::Allow } else { Effect::Deny });

        let rule = Rule::new(&principal, &resource, &raw, &NullCache).unwrap();
        prop_assert_eq!(rule.allow().unwrap(), allow);
        prop_assert_eq!(rule.explicit_deny().unwrap(), !allow);
    }

    /// One matching explicit deny wins wherever it sits among allows.
    #[test]
    fn explicit_deny_always_wins(allows in prop::collection::vec(any::<bool>(), 0..8), position in any::<Index>()) {
        let mut rules: Vec<RawRule> = allows
            .iter()
            .map(|&met| {
                let rule = RawRule::new(RESOURCE, &["read"]).allow();
                if met {
                    rule
                } else {
                    rule.condition(RawCondition::new("equal", json!({"user::role_ids": [99]})))
                }
            })
            .collect();
        rules.insert(position.index(rules.len() + 1), RawRule::new(RESOURCE, &["read"]).deny());

        let engine = engine(rules, CacheStrategy::None);
        prop_assert!(!engine.decide(&user(&[1]), "read", &Record::new("Resource")).unwrap());
    }

    /// Nothing is allowed by an empty rule set.
    #[test]
    fn empty_rule_set_denies(action in "[a-z_]{1,12}", held in roles()) {
        let engine = engine(vec![], CacheStrategy::Memoize);
        let report = engine.decide_with_report(&user(&held), &action, &Record::new("Resource")).unwrap();
        prop_assert!(report.is_denied());
        prop_assert!(report.is_default);
    }

    /// Memoizing never changes a decision.
    #[test]
    fn cache_strategy_does_not_change_decisions(held in roles(), allowed in roles(), denied in roles()) {
        let rules = vec![
            RawRule::new(RESOURCE, &["read"])
                .allow()
                .condition(RawCondition::new("equal", json!({"user::role_ids": allowed}))),
            RawRule::new(RESOURCE, &["read"])
                .deny()
                .condition(RawCondition::new("equal", json!({"user::role_ids": denied})))
                .condition(RawCondition::new("not_equal", json!({"user::role_ids": allowed}))),
        ];
        let principal = user(&held);
        let resource = Record::new("Resource");

        prop_assert_eq!(
            engine(rules.clone(), CacheStrategy::None).decide(&principal, "read", &resource).unwrap(),
            engine(rules, CacheStrategy::Memoize).decide(&principal, "read", &resource).unwrap()
        );
    }

    /// A memo cache answers repeated expressions with the first result.
    #[test]
    fn memo_cache_is_consistent(held in roles()) {
        let principal = user(&held);
        let resource = Record::new("Resource");
        let cache = MemoCache::new();

        let raw = RawCondition::new("equal", json!({"user::role_ids": held}));
        let condition = Condition::new(&raw, &cache).unwrap();
        let first = condition.met(&principal, &resource).unwrap();
        prop_assert_eq!(condition.met(&principal, &resource).unwrap(), first);
        prop_assert_eq!(first, !held.is_empty());
        prop_assert_eq!(cache.len(), 1);
    }
}
