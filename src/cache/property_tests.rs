//! Property-Based Tests for Cache Module
//!
//! Uses proptest to verify the accounting and capacity properties over
//! randomized operation sequences.

use proptest::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::cache::CacheStore;
use crate::clock::ManualClock;
use crate::config::CacheConfig;

// == Test Configuration ==
const TEST_MAX_BYTES: u64 = 4_096;
const T0: u64 = 1_700_000_000_000;

fn test_store() -> (Arc<ManualClock>, CacheStore) {
    let clock = Arc::new(ManualClock::at(T0));
    let config = CacheConfig {
        max_size_bytes: TEST_MAX_BYTES,
        default_ttl_ms: 300_000,
        sweep_interval_secs: 0,
        ..CacheConfig::default()
    };
    let store = CacheStore::with_clock(config, clock.clone());
    (clock, store)
}

// == Strategies ==
/// Small key space so operations collide often
fn key_strategy() -> impl Strategy<Value = String> {
    "[ab]:[a-d]".prop_map(|s| s)
}

/// Values small enough to pass the single-entry ceiling
fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,64}".prop_map(|s| json!(s)),
        any::<u32>().prop_map(|n| json!(n)),
        Just(Value::Null),
    ]
}

/// Generates a sequence of cache operations for testing
#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: Value, ttl_ms: u64 },
    Get { key: String },
    Has { key: String },
    Remove { key: String },
    ExtendTtl { key: String },
    Sweep,
    Clear,
    Advance { delta_ms: u64 },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        4 => (key_strategy(), value_strategy(), 1_u64..10_000).prop_map(|(key, value, ttl_ms)| {
            CacheOp::Set { key, value, ttl_ms }
        }),
        3 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        1 => key_strategy().prop_map(|key| CacheOp::Has { key }),
        1 => key_strategy().prop_map(|key| CacheOp::Remove { key }),
        1 => key_strategy().prop_map(|key| CacheOp::ExtendTtl { key }),
        1 => Just(CacheOp::Sweep),
        1 => Just(CacheOp::Clear),
        2 => (1_u64..5_000).prop_map(|delta_ms| CacheOp::Advance { delta_ms }),
    ]
}

fn apply(store: &mut CacheStore, clock: &ManualClock, op: CacheOp) {
    match op {
        CacheOp::Set { key, value, ttl_ms } => {
            let _ = store.set(key, value, Some(ttl_ms));
        }
        CacheOp::Get { key } => {
            let _ = store.get(&key);
        }
        CacheOp::Has { key } => {
            let _ = store.has(&key);
        }
        CacheOp::Remove { key } => {
            let _ = store.remove(&key);
        }
        CacheOp::ExtendTtl { key } => {
            let _ = store.extend_ttl(&key, 1_000);
        }
        CacheOp::Sweep => {
            let _ = store.sweep_expired();
        }
        CacheOp::Clear => store.clear(),
        CacheOp::Advance { delta_ms } => clock.advance(delta_ms),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // For any sequence of operations, the running byte total equals the sum
    // of the estimated sizes of the resident entries, and never exceeds the
    // capacity ceiling after a set returns.
    #[test]
    fn prop_size_accounting_invariant(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let (clock, mut store) = test_store();
        // Default single-entry ceiling is 20% of capacity.
        let max_entry = TEST_MAX_BYTES / 5;

        for op in ops {
            let was_set = matches!(op, CacheOp::Set { .. });
            apply(&mut store, &clock, op);

            prop_assert_eq!(
                store.occupied_bytes(),
                store.resident_size_sum(),
                "accounting out of sync"
            );
            if was_set {
                // At most the newly inserted entry may transiently exceed
                // the ceiling, and it is bounded by the single-entry limit.
                prop_assert!(store.occupied_bytes() <= TEST_MAX_BYTES + max_entry);
            }
        }
    }

    // Hits and misses reflect exactly the get calls that found a live entry.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let (clock, mut store) = test_store();
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            if let CacheOp::Get { key } = &op {
                match store.get(key) {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                }
            } else {
                apply(&mut store, &clock, op);
            }
        }

        prop_assert_eq!(store.stats().hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(store.stats().misses, expected_misses, "Misses mismatch");
    }

    // Storing a non-null value and reading it back before expiry returns
    // exactly the stored value.
    #[test]
    fn prop_roundtrip_storage(key in key_strategy(), value in value_strategy()) {
        let (_, mut store) = test_store();

        let stored = store.set(key.clone(), value.clone(), None);
        if value.is_null() {
            prop_assert!(!stored, "null values are never stored");
            prop_assert_eq!(store.get(&key), None);
        } else {
            prop_assert!(stored);
            prop_assert_eq!(store.get(&key), Some(value), "Round-trip value mismatch");
        }
    }

    // A removed key reads as absent and its bytes are reclaimed.
    #[test]
    fn prop_remove_reclaims(key in key_strategy(), value in value_strategy()) {
        let (_, mut store) = test_store();

        if store.set(key.clone(), value, None) {
            prop_assert!(store.remove(&key));
        }
        prop_assert_eq!(store.get(&key), None);
        prop_assert_eq!(store.occupied_bytes(), 0);
    }
}
