//! Property-Based Tests for Cache Module
//!
//! Drives the store with random operation sequences and compares it against
//! a straightforward reference model.

use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use crate::cache::CacheStore;

// == Test Configuration ==
const TEST_TTL: Duration = Duration::from_secs(300);

// == Strategies ==
/// Small key space so operations actually collide.
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-f]{1,2}"
}

fn value_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..32)
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: Vec<u8> },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

// == Reference Model ==
/// Naive LRU: a vector ordered oldest-first.
#[derive(Default)]
struct ModelLru {
    order: Vec<(String, Vec<u8>)>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl ModelLru {
    fn set(&mut self, cap: usize, key: String, value: Vec<u8>) {
        if let Some(pos) = self.order.iter().position(|(k, _)| *k == key) {
            self.order.remove(pos);
        } else if self.order.len() >= cap {
            self.order.remove(0);
            self.evictions += 1;
        }
        self.order.push((key, value));
    }

    fn get(&mut self, key: &str) -> Option<Vec<u8>> {
        match self.order.iter().position(|(k, _)| k == key) {
            Some(pos) => {
                let entry = self.order.remove(pos);
                let value = entry.1.clone();
                self.order.push(entry);
                self.hits += 1;
                Some(value)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    fn delete(&mut self, key: &str) -> bool {
        match self.order.iter().position(|(k, _)| k == key) {
            Some(pos) => {
                self.order.remove(pos);
                true
            }
            None => false,
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // The store agrees with the reference model on every returned value and
    // on the final counters, for any operation sequence without expiry.
    #[test]
    fn prop_matches_reference_lru(
        cap in 1usize..6,
        ops in prop::collection::vec(cache_op_strategy(), 1..80)
    ) {
        let mut store = CacheStore::new(cap, TEST_TTL);
        let mut model = ModelLru::default();

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    store.set(key.clone(), value.clone());
                    model.set(cap, key, value);
                }
                CacheOp::Get { key } => {
                    prop_assert_eq!(store.get(&key), model.get(&key));
                }
                CacheOp::Delete { key } => {
                    prop_assert_eq!(store.delete(&key), model.delete(&key));
                }
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, model.hits);
        prop_assert_eq!(stats.misses, model.misses);
        prop_assert_eq!(stats.evictions, model.evictions);
        prop_assert_eq!(stats.size, model.order.len());
    }

    // The number of entries never exceeds max_size.
    #[test]
    fn prop_capacity_enforcement(
        cap in 1usize..20,
        keys in prop::collection::vec("[a-z]{1,8}", 1..100)
    ) {
        let mut store = CacheStore::new(cap, TEST_TTL);

        for key in &keys {
            store.set(key.clone(), b"v".to_vec());
            prop_assert!(store.len() <= cap);
        }

        let distinct: HashSet<&String> = keys.iter().collect();
        prop_assert_eq!(store.len(), distinct.len().min(cap));
    }

    // Inserting N+1 distinct keys into a cache of size N evicts exactly the
    // first one.
    #[test]
    fn prop_first_inserted_is_evicted(keys in prop::collection::hash_set("[a-z]{1,8}", 2..30)) {
        let keys: Vec<String> = keys.into_iter().collect();
        let cap = keys.len() - 1;
        let mut store = CacheStore::new(cap, TEST_TTL);

        for key in &keys {
            store.set(key.clone(), b"v".to_vec());
        }

        prop_assert_eq!(store.get(&keys[0]), None);
        for key in &keys[1..] {
            prop_assert!(store.get(key).is_some());
        }
        prop_assert_eq!(store.stats().evictions, 1);
    }

    // Overwrites keep the latest value and never evict.
    #[test]
    fn prop_overwrite_semantics(
        key in key_strategy(),
        values in prop::collection::vec(value_strategy(), 1..10)
    ) {
        let mut store = CacheStore::new(1, TEST_TTL);

        for value in &values {
            store.set(key.clone(), value.clone());
        }

        prop_assert_eq!(store.get(&key), values.last().cloned());
        prop_assert_eq!(store.len(), 1);
        prop_assert_eq!(store.stats().evictions, 0);
    }

    // Hit rate is exactly 100 * H / (H + M).
    #[test]
    fn prop_hit_rate_arithmetic(lookups in prop::collection::vec(any::<bool>(), 0..60)) {
        let mut store = CacheStore::new(10, TEST_TTL);
        store.set("present", b"v".to_vec());

        let mut hits = 0u64;
        for hit in &lookups {
            if *hit {
                store.get("present");
                hits += 1;
            } else {
                store.get("absent");
            }
        }

        let total = lookups.len() as u64;
        let expected = if total == 0 { 0.0 } else { hits as f64 / total as f64 * 100.0 };
        prop_assert_eq!(store.stats().hit_rate_percent, expected);
    }

    // Entries written at t0 are returned up to t0 + ttl - 1s and gone at
    // t0 + ttl + 1s, whatever the TTL.
    #[test]
    fn prop_ttl_correctness(ttl_secs in 2u64..100_000, entries in prop::collection::hash_map("[a-z]{1,6}", value_strategy(), 1..10)) {
        let ttl = Duration::from_secs(ttl_secs);
        let mut store = CacheStore::new(100, ttl);
        let t0 = Instant::now();

        for (key, value) in &entries {
            store.set_at(key.clone(), value.clone(), t0);
        }

        let before = t0 + ttl - Duration::from_secs(1);
        for (key, value) in &entries {
            prop_assert_eq!(store.get_at(key, before), Some(value.clone()));
        }

        let after = t0 + ttl + Duration::from_secs(1);
        for key in entries.keys() {
            prop_assert_eq!(store.get_at(key, after), None);
        }
        prop_assert!(store.is_empty());
    }

    // A sweep past the TTL removes everything it should and reports it.
    #[test]
    fn prop_cleanup_is_exhaustive(entries in prop::collection::hash_map("[a-z]{1,6}", value_strategy(), 0..40)) {
        let mut store = CacheStore::new(100, TEST_TTL);
        let t0 = Instant::now();
        let expected: HashMap<String, Vec<u8>> = entries.clone();

        for (key, value) in entries {
            store.set_at(key, value, t0);
        }

        let removed = store.cleanup_expired_at(t0 + TEST_TTL);
        prop_assert_eq!(removed, expected.len());
        prop_assert_eq!(store.stats().size, 0);
        prop_assert_eq!(store.stats().evictions, expected.len() as u64);
    }
}
