//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache's correctness properties.

use proptest::prelude::*;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;

use crate::cache::{CacheParams, CacheStore, ManualClock, ParamValue};
use crate::config::CacheConfig;

// == Test Configuration ==
const TEST_MAX_ENTRIES: usize = 100;
const TEST_TTL_MS: u64 = 300_000;

// == Strategies ==
/// Generates valid parameter names
fn name_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9_]{0,15}".prop_map(|s| s)
}

/// Generates scalar and structured filter values
fn value_strategy() -> impl Strategy<Value = ParamValue> {
    prop_oneof![
        "[a-zA-Z0-9 |:]{0,24}".prop_map(ParamValue::Text),
        "N[1-4]".prop_map(ParamValue::Level),
        (0u64..10_000).prop_map(ParamValue::Limit),
        any::<bool>().prop_map(ParamValue::Flag),
        (-1e6f64..1e6).prop_map(ParamValue::Number),
        prop::collection::btree_set("[a-z|:\\\\\"]{1,8}", 0..5).prop_map(ParamValue::Statuses),
        prop::collection::vec(("[a-z]{1,6}", json_leaf_strategy()), 0..6).prop_map(|pairs| {
            let map: Map<String, Value> = pairs.into_iter().collect();
            ParamValue::Json(Value::Object(map))
        }),
        prop::collection::vec(json_leaf_strategy(), 0..4)
            .prop_map(|items| ParamValue::Json(Value::Array(items))),
    ]
}

/// Leaf values for structured params, including strings with separator characters
fn json_leaf_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        (0i64..100).prop_map(Value::from),
        "[a-z|:\\\\\"]{0,6}".prop_map(Value::from),
    ]
}

fn fields_strategy() -> impl Strategy<Value = Vec<(String, ParamValue)>> {
    prop::collection::btree_map(name_strategy(), value_strategy(), 0..8)
        .prop_map(|fields| fields.into_iter().collect())
}

/// Splits an encoded key on every pair separator that is not escaped.
fn split_pairs(key: &str) -> Vec<String> {
    if key.is_empty() {
        return Vec::new();
    }
    let mut pairs = vec![String::new()];
    let mut chars = key.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let current = pairs.last_mut().unwrap();
                current.push(c);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            '|' => pairs.push(String::new()),
            _ => pairs.last_mut().unwrap().push(c),
        }
    }
    pairs
}

fn key_params(name: &str) -> CacheParams {
    CacheParams::new().text("key", name)
}

/// Generates a sequence of cache operations for testing
#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: u32 },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        ("[a-z]{1,3}", any::<u32>()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        "[a-z]{1,3}".prop_map(|key| CacheOp::Get { key }),
        "[a-z]{1,3}".prop_map(|key| CacheOp::Delete { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Logically equal params built in any field order encode to the same key.
    #[test]
    fn prop_key_determinism(fields in fields_strategy()) {
        let forward: CacheParams = fields.iter().cloned().collect();

        let mut backward = CacheParams::new();
        for (name, value) in fields.iter().rev() {
            backward.insert(name.clone(), value.clone());
        }

        let forward_key = forward.encode().unwrap();
        prop_assert_eq!(&forward_key, &backward.encode().unwrap());
        prop_assert_eq!(forward_key, forward.encode().unwrap(), "encoding must be pure");
    }

    // Whatever the values hold, the key splits back into exactly one pair per
    // field, in name order.
    #[test]
    fn prop_key_fields_are_separable(fields in fields_strategy()) {
        let params: CacheParams = fields.iter().cloned().collect();
        let key = params.encode().unwrap();
        let pairs = split_pairs(key.as_str());

        prop_assert_eq!(pairs.len(), fields.len(), "key {:?}", key.as_str());
        for (pair, (name, _)) in pairs.iter().zip(fields.iter()) {
            let prefix = format!("{}:", name);
            prop_assert!(pair.starts_with(&prefix), "pair {:?} for field {}", pair, name);
        }
    }

    // Distinct single-field text values never collide.
    #[test]
    fn prop_distinct_text_values_distinct_keys(a in "[a-z|:\\\\]{0,8}", b in "[a-z|:\\\\]{0,8}") {
        prop_assume!(a != b);
        let ka = CacheParams::new().text("q", a).encode().unwrap();
        let kb = CacheParams::new().text("q", b).encode().unwrap();
        prop_assert_ne!(ka, kb);
    }

    // For any sequence of operations the counters match what callers observed.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let mut store: CacheStore<u32> =
            CacheStore::new("prop", CacheConfig::new(TEST_TTL_MS, TEST_MAX_ENTRIES));
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    store.set(&key_params(&key), value).unwrap();
                }
                CacheOp::Get { key } => match store.get(&key_params(&key)).unwrap() {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
                CacheOp::Delete { key } => {
                    store.delete(&key_params(&key)).unwrap();
                }
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.total_entries, store.len(), "Total entries mismatch");
    }

    // N set+get pairs on distinct keys are N hits; N gets on unset keys are N misses.
    #[test]
    fn prop_hit_miss_accounting(keys in prop::collection::hash_set("[a-z]{1,10}", 1..40)) {
        let mut store: CacheStore<usize> =
            CacheStore::new("prop", CacheConfig::new(TEST_TTL_MS, TEST_MAX_ENTRIES));
        for (i, key) in keys.iter().enumerate() {
            store.set(&key_params(key), i).unwrap();
            prop_assert_eq!(store.get(&key_params(key)).unwrap(), Some(i));
        }
        let n = keys.len() as u64;
        prop_assert_eq!(store.stats().hits, n);
        prop_assert_eq!(store.stats().misses, 0);

        let mut fresh: CacheStore<usize> =
            CacheStore::new("prop", CacheConfig::new(TEST_TTL_MS, TEST_MAX_ENTRIES));
        for key in &keys {
            prop_assert_eq!(fresh.get(&key_params(key)).unwrap(), None);
        }
        prop_assert_eq!(fresh.stats().misses, n);
    }

    // The store never holds more than max_size entries.
    #[test]
    fn prop_capacity_enforcement(
        keys in prop::collection::vec("[a-z]{1,4}", 1..200),
        max_size in 1usize..20
    ) {
        let mut store: CacheStore<usize> =
            CacheStore::new("prop", CacheConfig::new(TEST_TTL_MS, max_size));

        for (i, key) in keys.iter().enumerate() {
            store.set(&key_params(key), i).unwrap();
            prop_assert!(
                store.len() <= max_size,
                "Cache size {} exceeds max {}",
                store.len(),
                max_size
            );
        }
    }

    // Filling to capacity and adding one new key evicts exactly the oldest
    // inserted key, whatever was read in between.
    #[test]
    fn prop_fifo_eviction_order(
        initial_keys in prop::collection::vec("[a-z]{1,8}", 2..10),
        reads in prop::collection::vec(0usize..10, 0..10),
        new_key in "[A-Z]{1,8}"
    ) {
        let mut seen = HashSet::new();
        let unique_keys: Vec<String> = initial_keys
            .into_iter()
            .filter(|k| seen.insert(k.clone()))
            .collect();
        prop_assume!(unique_keys.len() >= 2);

        let capacity = unique_keys.len();
        let mut store: CacheStore<String> =
            CacheStore::new("prop", CacheConfig::new(TEST_TTL_MS, capacity));
        for key in &unique_keys {
            store.set(&key_params(key), key.clone()).unwrap();
        }
        for i in reads {
            store.get(&key_params(&unique_keys[i % capacity])).unwrap();
        }

        store.set(&key_params(&new_key), new_key.clone()).unwrap();

        prop_assert_eq!(store.len(), capacity);
        prop_assert_eq!(store.stats().evictions, 1);
        prop_assert!(store.get(&key_params(&unique_keys[0])).unwrap().is_none());
        for key in unique_keys.iter().skip(1) {
            prop_assert!(store.get(&key_params(key)).unwrap().is_some());
        }
        prop_assert!(store.get(&key_params(&new_key)).unwrap().is_some());
    }

    // A value set at t with TTL d is readable before t + d and gone from t + d on.
    #[test]
    fn prop_ttl_expiration_behavior(
        start in 0u64..1_000_000,
        ttl in 1u64..100_000,
        elapsed in 0u64..200_000
    ) {
        let clock = ManualClock::new(start);
        let mut store: CacheStore<u8> = CacheStore::with_clock(
            "prop",
            CacheConfig::new(ttl, TEST_MAX_ENTRIES),
            Arc::new(clock.clone()),
        );
        store.set(&key_params("k"), 7).unwrap();

        clock.set(start + elapsed);
        let value = store.get(&key_params("k")).unwrap();
        if elapsed < ttl {
            prop_assert_eq!(value, Some(7));
        } else {
            prop_assert_eq!(value, None);
        }
    }

    // Below both thresholds an auto-activating cache never hits.
    #[test]
    fn prop_inert_cache_never_hits(
        keys in prop::collection::vec("[a-z]{1,3}", 1..30),
        latencies in prop::collection::vec(0u64..499, 1..30)
    ) {
        let config = CacheConfig::new(TEST_TTL_MS, TEST_MAX_ENTRIES).with_auto_activate(500, 1_000);
        let mut store: CacheStore<u8> = CacheStore::new("prop", config);

        for (key, latency) in keys.iter().zip(latencies.iter().cycle()) {
            store.set(&key_params(key), 1).unwrap();
            prop_assert_eq!(store.get_observed(&key_params(key), Some(*latency)).unwrap(), None);
        }
        prop_assert_eq!(store.stats().hits, 0);
        prop_assert!(store.is_empty());
    }
}

// Concurrent access through the shared lock the registry uses.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn prop_concurrent_access_safety(
        operations in prop::collection::vec(cache_op_strategy(), 10..50)
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();

        rt.block_on(async {
            let store = Arc::new(tokio::sync::RwLock::new(CacheStore::<u32>::new(
                "prop",
                CacheConfig::new(TEST_TTL_MS, 10),
            )));
            let mut handles = vec![];

            for op in operations {
                let store_clone = Arc::clone(&store);
                handles.push(tokio::spawn(async move {
                    let mut cache = store_clone.write().await;
                    match op {
                        CacheOp::Set { key, value } => cache.set(&key_params(&key), value).map(|_| ()),
                        CacheOp::Get { key } => cache.get(&key_params(&key)).map(|_| ()),
                        CacheOp::Delete { key } => cache.delete(&key_params(&key)).map(|_| ()),
                    }
                }));
            }

            for handle in handles {
                let result = handle.await.expect("Task should not panic");
                prop_assert!(result.is_ok(), "Concurrent operation failed: {:?}", result);
            }

            let cache = store.read().await;
            let stats = cache.stats();
            prop_assert!(stats.total_entries <= 10, "Cache should not exceed max entries");
            let hit_rate = stats.hit_rate();
            prop_assert!((0.0..=1.0).contains(&hit_rate), "Hit rate out of range: {}", hit_rate);

            Ok(())
        })?;
    }
}
