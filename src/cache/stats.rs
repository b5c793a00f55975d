//! Cache Statistics Module
//!
//! Tracks cache performance counters and builds read-only occupancy snapshots.

use std::collections::BTreeMap;

use serde::Serialize;

// == Cache Stats ==
/// Running performance counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of entries removed by the purger under memory pressure
    pub evictions: u64,
    /// Number of entries removed because their TTL elapsed (lazily or by
    /// the sweeper)
    pub expired_removals: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have happened.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Evictions ==
    /// Adds purged entries to the eviction counter.
    pub fn record_evictions(&mut self, count: u64) {
        self.evictions += count;
    }

    // == Record Expirations ==
    /// Adds TTL removals to the expiry counter.
    pub fn record_expirations(&mut self, count: u64) {
        self.expired_removals += count;
    }
}

// == Stats Snapshot ==
/// Point-in-time view of cache occupancy for operational visibility.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    /// Number of live entries
    pub total_items: usize,
    /// Current accounted footprint in bytes
    pub current_size_bytes: u64,
    /// Configured capacity ceiling in bytes
    pub max_size_bytes: u64,
    /// current_size_bytes / max_size_bytes, as a percentage
    pub usage_percentage: f64,
    /// Age in milliseconds of the oldest live entry, None when empty
    pub oldest_item_age_ms: Option<u64>,
    /// Live entry counts grouped by the key text before the first `:`
    pub keys_by_prefix: BTreeMap<String, usize>,
    /// Mean access count across live entries
    pub average_access_count: f64,
    /// Performance counters since the cache was created
    #[serde(flatten)]
    pub counters: CacheStats,
    /// Hit rate since the cache was created
    pub hit_rate: f64,
    /// Snapshot timestamp (RFC3339)
    pub generated_at: String,
}
