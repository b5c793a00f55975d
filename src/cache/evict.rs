//! Eviction Scorer Module
//!
//! Ranks resident entries by a composite value score so the purger can free
//! memory from the least valuable entries first.
//!
//! The score blends LFU (frequency), LRU (recency), and TTL-awareness:
//! pure LRU starves slow-changing reference data and pure LFU starves bursty
//! hot keys, while an entry about to expire anyway is a cheaper eviction than
//! one with a long remaining life.

use std::collections::HashMap;

use crate::cache::CacheEntry;

const MS_PER_MINUTE: f64 = 60_000.0;

// == Value Score ==
/// Composite worth of an entry; lower scores are evicted first.
///
/// `ln(1 + access_count) - minutes_since_last_access + remaining_ttl_fraction`
pub(crate) fn value_score(entry: &CacheEntry, now_ms: u64) -> f64 {
    let recency = now_ms.saturating_sub(entry.last_accessed_at) as f64 / MS_PER_MINUTE;
    let frequency = (1.0 + entry.access_count as f64).ln();
    let ttl_ratio = if entry.ttl_ms == 0 {
        0.0
    } else {
        (entry.deadline_ms() as f64 - now_ms as f64) / entry.ttl_ms as f64
    };
    frequency - recency + ttl_ratio
}

// == Victim Selection ==
/// Picks keys to evict, lowest score first, until their combined size
/// reaches `target_bytes` or every entry has been picked.
pub(crate) fn select_victims(
    entries: &HashMap<String, CacheEntry>,
    now_ms: u64,
    target_bytes: u64,
) -> Vec<String> {
    let mut scored: Vec<(f64, &String, u64)> = entries
        .iter()
        .map(|(key, entry)| (value_score(entry, now_ms), key, entry.estimated_size_bytes))
        .collect();
    scored.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut victims = Vec::new();
    let mut freed = 0u64;
    for (_, key, size) in scored {
        if freed >= target_bytes {
            break;
        }
        victims.push(key.clone());
        freed += size;
    }
    victims
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const T0: u64 = 1_700_000_000_000;
    const MINUTE_MS: u64 = 60_000;

    fn entry(inserted_at: u64, ttl_ms: u64, size: u64) -> CacheEntry {
        CacheEntry::new(json!("v"), ttl_ms, size, inserted_at)
    }

    #[test]
    fn test_score_penalizes_staleness() {
        let now = T0 + 20 * MINUTE_MS;
        let stale = entry(T0, 60 * MINUTE_MS, 100);
        let mut recent = entry(T0, 60 * MINUTE_MS, 100);
        recent.touch(now);

        assert!(value_score(&recent, now) > value_score(&stale, now));
    }

    #[test]
    fn test_score_rewards_frequency() {
        let now = T0 + MINUTE_MS;
        let once = entry(T0, 60 * MINUTE_MS, 100);
        let mut hot = entry(T0, 60 * MINUTE_MS, 100);
        for _ in 0..20 {
            hot.touch(T0);
        }

        assert!(value_score(&hot, now) > value_score(&once, now));
    }

    #[test]
    fn test_score_rewards_remaining_life() {
        let now = T0 + 5 * MINUTE_MS;
        // Same insertion and access history, different deadlines.
        let expiring = entry(T0, 6 * MINUTE_MS, 100);
        let long_lived = entry(T0, 600 * MINUTE_MS, 100);

        assert!(value_score(&long_lived, now) > value_score(&expiring, now));
    }

    #[test]
    fn test_score_negative_past_deadline() {
        let now = T0 + 2 * MINUTE_MS;
        let expired = entry(T0, MINUTE_MS, 100);

        // Remaining-life fraction goes negative once the deadline passes.
        let ttl_part = value_score(&expired, now) - (2.0_f64.ln() - 2.0);
        assert!(ttl_part < 0.0);
    }

    #[test]
    fn test_select_victims_lowest_score_first() {
        let now = T0 + 30 * MINUTE_MS;
        let mut entries = HashMap::new();

        let mut hot = entry(T0, 60 * MINUTE_MS, 400);
        for _ in 0..10 {
            hot.touch(now - MINUTE_MS);
        }
        entries.insert("hot".to_string(), hot);
        entries.insert("stale".to_string(), entry(T0, 60 * MINUTE_MS, 400));

        let victims = select_victims(&entries, now, 400);
        assert_eq!(victims, vec!["stale".to_string()]);
    }

    #[test]
    fn test_select_victims_accumulates_until_target() {
        let now = T0;
        let mut entries = HashMap::new();
        for i in 0..4 {
            let mut e = entry(T0, 60 * MINUTE_MS, 100);
            // Spread access counts so the order is deterministic.
            e.access_count = i + 1;
            entries.insert(format!("k{i}"), e);
        }

        let victims = select_victims(&entries, now, 250);
        assert_eq!(victims.len(), 3);
        assert_eq!(victims[0], "k0");
        assert_eq!(victims[1], "k1");
        assert_eq!(victims[2], "k2");
    }

    #[test]
    fn test_select_victims_empty_target() {
        let mut entries = HashMap::new();
        entries.insert("k".to_string(), entry(T0, MINUTE_MS, 100));

        assert!(select_victims(&entries, T0, 0).is_empty());
    }

    #[test]
    fn test_select_victims_exhausts_store() {
        let mut entries = HashMap::new();
        entries.insert("a".to_string(), entry(T0, MINUTE_MS, 100));
        entries.insert("b".to_string(), entry(T0, MINUTE_MS, 100));

        let victims = select_victims(&entries, T0, 10_000);
        assert_eq!(victims.len(), 2);
    }
}
